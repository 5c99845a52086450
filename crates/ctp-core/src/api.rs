//! Dashboard API trait.
//!
//! Defines the remote operations the session store depends on, decoupling
//! the core from the HTTP client that implements them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::project::Project;
use crate::statistics::Statistics;
use crate::user::User;

/// Token and user id identifying the caller on authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub user_id: String,
}

/// Result of an email/password login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

impl AuthSession {
    pub fn credentials(&self) -> Credentials {
        Credentials {
            token: self.token.clone(),
            user_id: self.user.id.clone(),
        }
    }
}

/// Remote API used by the dashboard.
///
/// Every method fails with an `Api` error on a non-success status or an
/// unparseable body, and with a `Network` error when the request itself
/// could not be made.
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// Exchanges email and password for a token.
    async fn login(&self, email: &str, password: &str) -> Result<AuthSession>;

    /// Fetches the profile of the user identified by `credentials`.
    async fn get_user(&self, credentials: &Credentials) -> Result<User>;

    /// Fetches every project the user can access, unordered.
    async fn get_projects_for_user(&self, credentials: &Credentials) -> Result<Vec<Project>>;

    /// Fetches today's order and cart counts for a project.
    async fn statistics(&self, token: &str, project_key: &str) -> Result<Statistics>;
}
