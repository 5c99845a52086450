//! Session store.
//!
//! The single owner of the session state. Every mutation goes through one
//! of the methods below, runs to completion (including persistence) and
//! publishes a new snapshot to subscribers.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use ctp_core::api::DashboardApi;
use ctp_core::config::DashboardConfig;
use ctp_core::error::{DashboardError, Result};
use ctp_core::project::ProjectClassifier;
use ctp_core::reporter::ErrorReporter;
use ctp_core::session::{LoginData, PersistedRecord, SelectedTab, SessionState};
use ctp_core::statistics::Statistics;
use ctp_core::storage::KeyValueStorage;
use tokio::sync::watch;

use super::persister::SessionPersister;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Owns the session state and its transitions.
///
/// Methods take `&mut self`, so transitions are serialized by construction.
/// Consumers read through [`SessionStore::state`], [`SessionStore::snapshot`]
/// or a [`SessionStore::subscribe`] receiver.
///
/// # Example
///
/// ```ignore
/// let mut store = SessionStore::new(storage, api, reporter);
/// store.hydrate().await;
/// store.complete_startup().await; // refreshes if a token was persisted
/// ```
pub struct SessionStore {
    state: SessionState,
    classifier: ProjectClassifier,
    persister: SessionPersister,
    api: Arc<dyn DashboardApi>,
    reporter: Arc<dyn ErrorReporter>,
    request_timeout: Duration,
    updates: watch::Sender<SessionState>,
}

impl SessionStore {
    /// Creates a store holding the default (not started, logged out) state.
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        api: Arc<dyn DashboardApi>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let state = SessionState::new();
        let (updates, _) = watch::channel(state.clone());
        Self {
            state,
            classifier: ProjectClassifier::default(),
            persister: SessionPersister::new(storage),
            api,
            reporter,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            updates,
        }
    }

    /// Creates a store using the timeouts and cache window from `config`.
    pub fn from_config(
        config: &DashboardConfig,
        storage: Arc<dyn KeyValueStorage>,
        api: Arc<dyn DashboardApi>,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        Self::new(storage, api, reporter)
            .with_request_timeout(config.request_timeout())
            .with_classifier(ProjectClassifier::new(config.classifier_cache()))
    }

    /// Bounds refresh, login and statistics round-trips.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_classifier(mut self, classifier: ProjectClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    // ============================================================================
    // Read access
    // ============================================================================

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    /// Returns a receiver that observes every published state.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.updates.subscribe()
    }

    pub fn classifier(&self) -> &ProjectClassifier {
        &self.classifier
    }

    // ============================================================================
    // Transitions
    // ============================================================================

    /// Loads the persisted session and hydrates from it.
    pub async fn hydrate(&mut self) {
        let record = self.persister.load().await;
        self.hydrate_with(&record);
    }

    /// Replaces the state with one hydrated from `record`.
    ///
    /// Does not persist: the record came from storage.
    pub fn hydrate_with(&mut self, record: &PersistedRecord) {
        self.state = SessionState::hydrate(record);
        tracing::info!(
            "[SessionStore] Hydrated session (logged_in={}, projects={})",
            self.state.is_logged_in(),
            self.state.projects.len()
        );
        self.publish();
    }

    /// Lets the UI start rendering. Refreshes the session when a token was
    /// restored. Only the first call has any effect.
    pub async fn complete_startup(&mut self) {
        if !self.state.complete_startup() {
            tracing::warn!("[SessionStore] complete_startup() called more than once, ignoring");
            return;
        }
        self.commit().await;

        if self.state.is_logged_in() {
            self.refresh().await;
        }
    }

    /// Re-fetches the user and project list for the current credentials.
    ///
    /// With a token, failures are reported and the state is left alone so
    /// the user keeps seeing the last known data. Without a token they are
    /// shown on the login screen.
    pub async fn refresh(&mut self) {
        let had_token = self.state.is_logged_in();
        match self.fetch_session().await {
            Ok(login) => self.login(login).await,
            Err(e) if had_token => {
                tracing::warn!("[SessionStore] Refresh failed, keeping cached session: {}", e);
                self.reporter.report(&e);
            }
            Err(e) => self.login_error(&e).await,
        }
    }

    /// Applies a successful login or refresh.
    pub async fn login(&mut self, login: LoginData) {
        tracing::info!(
            "[SessionStore] Login for user {} with {} projects",
            login.user_id,
            login.projects.len()
        );
        self.state
            .apply_login(login, &mut self.classifier, Utc::now());
        tracing::debug!(
            "[SessionStore] active={:?} inactive={:?} selected={:?}",
            self.state.active_project_ids,
            self.state.inactive_project_ids,
            self.state.selected_project_id
        );
        self.commit().await;
    }

    /// Shows `error` on the login screen.
    pub async fn login_error(&mut self, error: &DashboardError) {
        tracing::info!("[SessionStore] Login error: {}", error);
        self.state.apply_login_error(error);
        self.commit().await;
    }

    /// Email/password login: obtains a token, loads the user's projects and
    /// applies the login. Any failure ends up on the login screen.
    pub async fn authenticate(&mut self, email: &str, password: &str) {
        match self.fetch_login(email, password).await {
            Ok(login) => self.login(login).await,
            Err(e) => self.login_error(&e).await,
        }
    }

    /// Selects a project. Unknown ids are accepted as-is.
    pub async fn select_project(&mut self, project_id: impl Into<String>) {
        let project_id = project_id.into();
        if !self.state.projects.contains_key(&project_id) {
            tracing::warn!(
                "[SessionStore] Selecting unknown project '{}'",
                project_id
            );
        }
        self.state.select_project(project_id);
        self.commit().await;
    }

    pub async fn select_tab(&mut self, tab: SelectedTab) {
        self.state.select_tab(tab);
        self.commit().await;
    }

    /// Resets the session, keeping the UI started so the login screen shows.
    pub async fn logout(&mut self) {
        tracing::info!("[SessionStore] Logout");
        self.state.logout();
        self.classifier.clear();
        self.commit().await;
    }

    // ============================================================================
    // Queries
    // ============================================================================

    /// Fetches today's statistics for the selected project.
    pub async fn fetch_statistics(&self) -> Result<Statistics> {
        let token = self
            .state
            .token
            .as_deref()
            .ok_or_else(|| DashboardError::authentication("Not logged in"))?;
        let selected_id = self.state.selected_project_id.as_deref().unwrap_or_default();
        let project = self
            .state
            .selected_project()
            .ok_or_else(|| DashboardError::not_found("Project", selected_id))?;
        if project.key.is_empty() {
            return Err(DashboardError::not_found("Project key", &project.id));
        }

        self.with_timeout("statistics", self.api.statistics(token, &project.key))
            .await
    }

    // ============================================================================
    // Internals
    // ============================================================================

    async fn fetch_session(&self) -> Result<LoginData> {
        let credentials = self.state.credentials()?;
        let fetch = futures::future::try_join(
            self.api.get_user(&credentials),
            self.api.get_projects_for_user(&credentials),
        );
        let (user, projects) = self.with_timeout("refresh", fetch).await?;

        Ok(LoginData {
            token: credentials.token,
            user_id: credentials.user_id,
            user: Some(user),
            projects,
        })
    }

    async fn fetch_login(&self, email: &str, password: &str) -> Result<LoginData> {
        let api = self.api.clone();
        self.with_timeout("login", async move {
            let session = api.login(email, password).await?;
            let credentials = session.credentials();
            let projects = api.get_projects_for_user(&credentials).await?;
            Ok(LoginData {
                token: credentials.token,
                user_id: credentials.user_id,
                user: Some(session.user),
                projects,
            })
        })
        .await
    }

    async fn with_timeout<T, F>(&self, operation: &str, future: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::time::timeout(self.request_timeout, future)
            .await
            .map_err(|_| DashboardError::timeout(operation, self.request_timeout.as_secs()))?
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }

    /// Publishes the new state, then persists it. Persistence failures are
    /// reported; the in-memory transition stands either way.
    async fn commit(&mut self) {
        self.publish();
        if let Err(e) = self.persister.persist(&self.state).await {
            tracing::warn!("[SessionStore] Failed to persist session: {}", e);
            self.reporter.report(&e);
        }
    }
}
