use anyhow::{Context, Result};
use ctp_application::SessionStore;

pub async fn show(store: &SessionStore) -> Result<()> {
    let stats = store
        .fetch_statistics()
        .await
        .context("Failed to fetch statistics")?;

    if let Some(project) = store.state().selected_project() {
        println!("{} ({}), today", project.name, project.key);
    }
    println!(
        "Orders: {} total, {} open, {} complete",
        stats.orders.total, stats.orders.open, stats.orders.complete
    );
    println!(
        "Carts:  {} total, {} active, {} ordered",
        stats.carts.total, stats.carts.active, stats.carts.ordered
    );
    Ok(())
}
