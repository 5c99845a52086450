//! MerchantCenterClient - REST implementation of the dashboard API.
//!
//! Talks to the Merchant Center REST endpoints for login, user profile,
//! project listing and today's statistics.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use ctp_core::api::{AuthSession, Credentials, DashboardApi};
use ctp_core::config::{DEFAULT_API_HOST, DashboardConfig};
use ctp_core::error::{DashboardError, Result};
use ctp_core::project::Project;
use ctp_core::statistics::{CartStatistics, OrderStatistics, Statistics};
use ctp_core::user::User;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, IntoUrl, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use crate::response::{map_transport_error, process_response};
use crate::statistics_query::{
    ACTIVE_CARTS, COMPLETE_ORDERS, OPEN_ORDERS, ORDERED_CARTS, count_query,
};

const JSON: &str = "application/json";

/// HTTP client for the Merchant Center API.
#[derive(Clone)]
pub struct MerchantCenterClient {
    client: Client,
    api_host: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct CountResponse {
    total: u64,
}

impl MerchantCenterClient {
    /// Creates a client for `api_host` with a per-request timeout.
    pub fn new(api_host: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_host: api_host.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        Self::new(config.api_host.clone(), config.request_timeout())
    }

    pub fn api_host(&self) -> &str {
        &self.api_host
    }

    /// Absolute URL for `path` (which must start with `/`).
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_host, path)
    }

    /// URL for `segments` under the API host. Each segment is
    /// percent-encoded, so ids containing `/` or `?` stay one segment.
    pub fn segment_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.api_host).map_err(|e| {
            DashboardError::config(format!("Invalid api_host '{}': {e}", self.api_host))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                DashboardError::config(format!("api_host '{}' cannot be a base URL", self.api_host))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: impl IntoUrl, token: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header(ACCEPT, JSON)
            .header(AUTHORIZATION, token)
            .header(CONTENT_TYPE, JSON)
    }

    async fn count(
        &self,
        token: &str,
        url: &Url,
        today: NaiveDate,
        predicate: Option<&str>,
    ) -> Result<u64> {
        let response = self
            .get(url.clone(), token)
            .query(&count_query(today, predicate))
            .send()
            .await
            .map_err(map_transport_error)?;
        let count: CountResponse = process_response(response).await?;
        Ok(count.total)
    }
}

impl Default for MerchantCenterClient {
    fn default() -> Self {
        Self {
            client: Client::new(),
            api_host: DEFAULT_API_HOST.to_string(),
        }
    }
}

#[async_trait]
impl DashboardApi for MerchantCenterClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession> {
        tracing::debug!("[MerchantCenterClient] POST /tokens for {}", email);
        let response = self
            .client
            .post(self.endpoint("/tokens"))
            .header(ACCEPT, JSON)
            .header(CONTENT_TYPE, JSON)
            .json(&LoginRequest { email, password })
            .send()
            .await
            .map_err(map_transport_error)?;
        process_response(response).await
    }

    async fn get_user(&self, credentials: &Credentials) -> Result<User> {
        let url = self.segment_url(&["users", &credentials.user_id])?;
        tracing::debug!("[MerchantCenterClient] GET {}", url.path());
        let response = self
            .get(url, &credentials.token)
            .send()
            .await
            .map_err(map_transport_error)?;
        process_response(response).await
    }

    async fn get_projects_for_user(&self, credentials: &Credentials) -> Result<Vec<Project>> {
        tracing::debug!(
            "[MerchantCenterClient] GET /projects for user {}",
            credentials.user_id
        );
        let response = self
            .get(self.endpoint("/projects"), &credentials.token)
            .query(&[("userId", credentials.user_id.as_str())])
            .send()
            .await
            .map_err(map_transport_error)?;
        process_response(response).await
    }

    async fn statistics(&self, token: &str, project_key: &str) -> Result<Statistics> {
        let today = Utc::now().date_naive();
        let orders = self.segment_url(&[project_key, "orders"])?;
        let carts = self.segment_url(&[project_key, "carts"])?;

        let (
            total_orders,
            open_orders,
            complete_orders,
            total_carts,
            active_carts,
            ordered_carts,
        ) = futures::try_join!(
            self.count(token, &orders, today, None),
            self.count(token, &orders, today, Some(OPEN_ORDERS)),
            self.count(token, &orders, today, Some(COMPLETE_ORDERS)),
            self.count(token, &carts, today, None),
            self.count(token, &carts, today, Some(ACTIVE_CARTS)),
            self.count(token, &carts, today, Some(ORDERED_CARTS)),
        )?;

        Ok(Statistics {
            orders: OrderStatistics {
                total: total_orders,
                open: open_orders,
                complete: complete_orders,
            },
            carts: CartStatistics {
                total: total_carts,
                active: active_carts,
                ordered: ordered_carts,
            },
        })
    }
}
