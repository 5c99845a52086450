use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging to stderr.
///
/// `RUST_LOG` wins when set; otherwise `ctp=info`, or `ctp=debug` when
/// `verbose` is true.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "ctp=debug" } else { "ctp=info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .init();
}
