//! Response processing shared by every API call.
//!
//! The body is always read as text first. It must parse as JSON and the
//! status must be a success; otherwise an `Api` error is built from the
//! body's `message` field, or from the raw text when the body is not JSON.

use ctp_core::error::{DashboardError, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Reads and decodes a response.
pub(crate) async fn process_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let text = response.text().await.map_err(map_transport_error)?;
    parse_body(status.as_u16(), &text)
}

/// Decodes a response body received with `status`.
pub fn parse_body<T: DeserializeOwned>(status: u16, text: &str) -> Result<T> {
    let is_success = (200..300).contains(&status);

    let parsed: Option<Value> = serde_json::from_str(text).ok();
    match parsed {
        Some(value) if is_success => {
            serde_json::from_value(value).map_err(|e| DashboardError::Api {
                status: Some(status),
                message: format!("Unexpected response body: {e}"),
                body: None,
            })
        }
        Some(value) => {
            let message = value
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string)
                .unwrap_or_else(|| text.to_string());
            Err(DashboardError::Api {
                status: Some(status),
                message,
                body: Some(value),
            })
        }
        None => Err(DashboardError::Api {
            status: Some(status),
            message: text.to_string(),
            body: None,
        }),
    }
}

/// Maps a reqwest transport failure to a dashboard error.
pub(crate) fn map_transport_error(err: reqwest::Error) -> DashboardError {
    if err.is_timeout() {
        DashboardError::network(format!("Request timed out: {err}"))
    } else {
        DashboardError::network(format!("Request failed: {err}"))
    }
}
