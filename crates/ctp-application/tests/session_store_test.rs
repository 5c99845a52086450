//! Session store behavior against mock collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use ctp_application::SessionStore;
use ctp_core::DashboardError;
use ctp_core::api::{AuthSession, Credentials, DashboardApi};
use ctp_core::error::Result;
use ctp_core::project::Project;
use ctp_core::reporter::ErrorReporter;
use ctp_core::session::{
    LoginData, NO_PROJECTS_MESSAGE, PROJECTS_KEY, PersistedRecord, SELECTED_PROJECT_ID_KEY,
    SelectedTab, SessionState, TOKEN_KEY, USER_ID_KEY,
};
use ctp_core::statistics::{CartStatistics, OrderStatistics, Statistics};
use ctp_core::user::User;
use ctp_infrastructure::MemoryStorage;

// ============================================================================
// Test doubles
// ============================================================================

struct MockApi {
    user: Mutex<Result<User>>,
    projects: Mutex<Result<Vec<Project>>>,
    login: Mutex<Result<AuthSession>>,
    statistics: Mutex<Result<Statistics>>,
    delay: Option<Duration>,
    seen_credentials: Mutex<Vec<Credentials>>,
    statistics_keys: Mutex<Vec<String>>,
}

impl MockApi {
    fn new() -> Self {
        Self {
            user: Mutex::new(Ok(User::new("u1", "jane@example.com"))),
            projects: Mutex::new(Ok(vec![])),
            login: Mutex::new(Err(DashboardError::api(Some(400), "login not stubbed"))),
            statistics: Mutex::new(Ok(Statistics::default())),
            delay: None,
            seen_credentials: Mutex::new(Vec::new()),
            statistics_keys: Mutex::new(Vec::new()),
        }
    }

    fn with_projects(self, projects: Vec<Project>) -> Self {
        *self.projects.lock().unwrap() = Ok(projects);
        self
    }

    fn with_projects_error(self, error: DashboardError) -> Self {
        *self.projects.lock().unwrap() = Err(error);
        self
    }

    fn with_login(self, login: Result<AuthSession>) -> Self {
        *self.login.lock().unwrap() = login;
        self
    }

    fn with_statistics(self, statistics: Statistics) -> Self {
        *self.statistics.lock().unwrap() = Ok(statistics);
        self
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl DashboardApi for MockApi {
    async fn login(&self, _email: &str, _password: &str) -> Result<AuthSession> {
        self.pause().await;
        self.login.lock().unwrap().clone()
    }

    async fn get_user(&self, credentials: &Credentials) -> Result<User> {
        self.pause().await;
        self.seen_credentials
            .lock()
            .unwrap()
            .push(credentials.clone());
        self.user.lock().unwrap().clone()
    }

    async fn get_projects_for_user(&self, _credentials: &Credentials) -> Result<Vec<Project>> {
        self.pause().await;
        self.projects.lock().unwrap().clone()
    }

    async fn statistics(&self, _token: &str, project_key: &str) -> Result<Statistics> {
        self.statistics_keys
            .lock()
            .unwrap()
            .push(project_key.to_string());
        self.statistics.lock().unwrap().clone()
    }
}

#[derive(Default)]
struct RecordingReporter {
    reported: Mutex<Vec<DashboardError>>,
    count: AtomicUsize,
}

impl RecordingReporter {
    fn count(&self) -> usize {
        self.count.load(Ordering::SeqCst)
    }
}

impl ErrorReporter for RecordingReporter {
    fn report(&self, error: &DashboardError) {
        self.count.fetch_add(1, Ordering::SeqCst);
        self.reported.lock().unwrap().push(error.clone());
    }
}

struct Harness {
    store: SessionStore,
    storage: Arc<MemoryStorage>,
    api: Arc<MockApi>,
    reporter: Arc<RecordingReporter>,
}

fn harness_with(api: MockApi, storage: MemoryStorage) -> Harness {
    let storage = Arc::new(storage);
    let api = Arc::new(api);
    let reporter = Arc::new(RecordingReporter::default());
    let store = SessionStore::new(storage.clone(), api.clone(), reporter.clone());
    Harness {
        store,
        storage,
        api,
        reporter,
    }
}

fn harness(api: MockApi) -> Harness {
    harness_with(api, MemoryStorage::new())
}

fn login_data(projects: Vec<Project>) -> LoginData {
    LoginData {
        token: "tok".to_string(),
        user_id: "u1".to_string(),
        user: Some(User::new("u1", "jane@example.com")),
        projects,
    }
}

fn persisted_session() -> MemoryStorage {
    let mut state = SessionState::logged_out();
    state.token = Some("tok".to_string());
    state.user_id = Some("u1".to_string());
    state
        .projects
        .insert("p1".to_string(), Project::new("p1", "Cached").with_key("cached"));
    state.active_project_ids = vec!["p1".to_string()];
    state.selected_project_id = Some("p1".to_string());
    MemoryStorage::with_values(PersistedRecord::from_state(&state).unwrap().into_pairs())
}

// ============================================================================
// Hydration and startup
// ============================================================================

#[tokio::test]
async fn test_hydrate_from_empty_storage_is_logged_out() {
    let mut h = harness(MockApi::new());
    h.store.hydrate().await;

    assert_eq!(h.store.state(), &SessionState::new());
    // Hydration never writes.
    assert_eq!(h.storage.write_count().await, 0);
}

#[tokio::test]
async fn test_hydrate_with_malformed_values_falls_back_to_defaults() {
    let storage = MemoryStorage::with_values([
        (TOKEN_KEY, "\"tok\""),
        (USER_ID_KEY, "not json"),
        (PROJECTS_KEY, "{\"p1\": 12}"),
        (SELECTED_PROJECT_ID_KEY, "[]"),
    ]);
    let mut h = harness_with(MockApi::new(), storage);
    h.store.hydrate().await;

    let state = h.store.state();
    assert_eq!(state.token.as_deref(), Some("tok"));
    assert!(state.user_id.is_none());
    assert!(state.projects.is_empty());
    assert!(state.selected_project_id.is_none());
    assert!(!state.can_start);
}

#[tokio::test]
async fn test_complete_startup_logged_out_does_not_fetch() {
    let mut h = harness(MockApi::new());
    h.store.hydrate().await;
    h.store.complete_startup().await;

    assert!(h.store.state().can_start);
    assert!(h.api.seen_credentials.lock().unwrap().is_empty());
    assert!(h.store.state().login_error_message.is_none());
}

#[tokio::test]
async fn test_complete_startup_with_token_refreshes() {
    let api = MockApi::new().with_projects(vec![
        Project::new("p2", "beta").with_key("beta"),
        Project::new("p1", "Alpha").with_key("alpha"),
    ]);
    let mut h = harness_with(api, persisted_session());
    h.store.hydrate().await;
    assert_eq!(h.store.state().projects["p1"].name, "Cached");

    h.store.complete_startup().await;

    let state = h.store.state();
    assert!(state.can_start);
    assert_eq!(state.active_project_ids, vec!["p1", "p2"]);
    assert_eq!(state.projects["p1"].name, "Alpha");
    assert_eq!(state.selected_project_id.as_deref(), Some("p1"));
    assert_eq!(state.user.as_ref().map(|u| u.id.as_str()), Some("u1"));

    let seen = h.api.seen_credentials.lock().unwrap();
    assert_eq!(
        seen.as_slice(),
        &[Credentials {
            token: "tok".to_string(),
            user_id: "u1".to_string()
        }]
    );
}

#[tokio::test]
async fn test_complete_startup_twice_is_ignored() {
    let mut h = harness_with(MockApi::new(), persisted_session());
    h.store.hydrate().await;
    h.store.complete_startup().await;
    h.store.complete_startup().await;

    assert_eq!(h.api.seen_credentials.lock().unwrap().len(), 1);
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_scenario_with_expired_trial() {
    let mut h = harness(MockApi::new());
    let yesterday = Utc::now() - ChronoDuration::days(1);

    h.store
        .login(login_data(vec![
            Project::new("p1", "Beta"),
            Project::new("p2", "alpha").with_trial_until(yesterday),
        ]))
        .await;

    let state = h.store.state();
    assert_eq!(state.active_project_ids, vec!["p1"]);
    assert_eq!(state.inactive_project_ids, vec!["p2"]);
    assert_eq!(state.selected_project_id.as_deref(), Some("p1"));
    assert!(state.login_error_message.is_none());
}

#[tokio::test]
async fn test_login_persists_state() {
    let mut h = harness(MockApi::new());
    h.store
        .login(login_data(vec![Project::new("p1", "A")]))
        .await;

    assert_eq!(h.storage.get(TOKEN_KEY).await.as_deref(), Some("\"tok\""));
    assert_eq!(
        h.storage.get(SELECTED_PROJECT_ID_KEY).await.as_deref(),
        Some("\"p1\"")
    );
    assert_eq!(h.storage.write_count().await, 1);
}

#[tokio::test]
async fn test_login_with_no_projects() {
    let mut h = harness(MockApi::new());
    h.store.login(login_data(vec![])).await;

    let state = h.store.state();
    assert_eq!(state.login_error_message.as_deref(), Some(NO_PROJECTS_MESSAGE));
    assert!(state.selected_project_id.is_none());
    assert!(state.is_logged_in());
}

#[tokio::test]
async fn test_authenticate_success() {
    let api = MockApi::new()
        .with_login(Ok(AuthSession {
            token: "fresh".to_string(),
            user: User::new("u9", "joe@example.com"),
        }))
        .with_projects(vec![Project::new("p1", "Shop")]);
    let mut h = harness(api);
    h.store.complete_startup().await;

    h.store.authenticate("joe@example.com", "pw").await;

    let state = h.store.state();
    assert_eq!(state.token.as_deref(), Some("fresh"));
    assert_eq!(state.user_id.as_deref(), Some("u9"));
    assert_eq!(state.selected_project_id.as_deref(), Some("p1"));
    assert!(state.can_enter_dashboard());
}

#[tokio::test]
async fn test_authenticate_failure_sets_login_error() {
    let api = MockApi::new().with_login(Err(DashboardError::api(
        Some(400),
        "Wrong email or password",
    )));
    let mut h = harness(api);
    h.store.complete_startup().await;

    h.store.authenticate("joe@example.com", "bad").await;

    let state = h.store.state();
    assert_eq!(
        state.login_error_message.as_deref(),
        Some("Wrong email or password")
    );
    assert!(!state.is_logged_in());
    assert_eq!(h.reporter.count(), 0);
}

#[tokio::test]
async fn test_authenticate_times_out() {
    let api = MockApi::new()
        .with_login(Ok(AuthSession {
            token: "fresh".to_string(),
            user: User::new("u9", "joe@example.com"),
        }))
        .with_delay(Duration::from_millis(200));
    let mut h = harness(api);
    h.store = h.store.with_request_timeout(Duration::from_millis(20));

    h.store.authenticate("joe@example.com", "pw").await;

    let state = h.store.state();
    assert!(!state.is_logged_in());
    assert!(
        state
            .login_error_message
            .as_deref()
            .is_some_and(|m| m.contains("login"))
    );
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn test_refresh_failure_with_token_is_reported_and_state_kept() {
    let api = MockApi::new().with_projects_error(DashboardError::network("offline"));
    let mut h = harness_with(api, persisted_session());
    h.store.hydrate().await;
    h.store.complete_startup().await;
    let before = h.store.snapshot();

    h.store.refresh().await;

    // One report from startup's refresh, one from the explicit refresh.
    assert_eq!(h.reporter.count(), 2);
    let after = h.store.state();
    assert_eq!(after.token, before.token);
    assert_eq!(after.projects, before.projects);
    assert_eq!(after.login_error_message, before.login_error_message);
    assert!(after.login_error_message.is_none());
}

#[tokio::test]
async fn test_single_refresh_failure_reports_once() {
    let api = MockApi::new().with_projects_error(DashboardError::network("offline"));
    let mut h = harness_with(api, persisted_session());
    h.store.hydrate().await;
    let before = h.store.snapshot();

    h.store.refresh().await;

    assert_eq!(h.reporter.count(), 1);
    assert_eq!(
        h.reporter.reported.lock().unwrap()[0],
        DashboardError::network("offline")
    );
    assert_eq!(h.store.state(), &before);
}

#[tokio::test]
async fn test_refresh_without_token_sets_login_error() {
    let mut h = harness(MockApi::new());
    h.store.complete_startup().await;

    h.store.refresh().await;

    assert_eq!(h.reporter.count(), 0);
    assert_eq!(
        h.store.state().login_error_message.as_deref(),
        Some("No token available")
    );
}

#[tokio::test]
async fn test_refresh_timeout_is_reported() {
    let api = MockApi::new()
        .with_projects(vec![Project::new("p1", "A")])
        .with_delay(Duration::from_millis(200));
    let mut h = harness_with(api, persisted_session());
    h.store = h.store.with_request_timeout(Duration::from_millis(20));
    h.store.hydrate().await;

    h.store.refresh().await;

    assert_eq!(h.reporter.count(), 1);
    assert!(h.reporter.reported.lock().unwrap()[0].is_network());
    assert_eq!(h.store.state().projects["p1"].name, "Cached");
}

#[tokio::test]
async fn test_refresh_keeps_user_selection() {
    let api = MockApi::new().with_projects(vec![
        Project::new("p1", "A"),
        Project::new("p2", "B"),
    ]);
    let mut h = harness_with(api, persisted_session());
    h.store.hydrate().await;
    h.store.complete_startup().await;

    h.store.select_project("p2").await;
    h.store.refresh().await;

    assert_eq!(h.store.state().selected_project_id.as_deref(), Some("p2"));
}

// ============================================================================
// Selection, logout, snapshots
// ============================================================================

#[tokio::test]
async fn test_select_project_accepts_unknown_id_and_persists() {
    let mut h = harness(MockApi::new());
    h.store
        .login(login_data(vec![Project::new("p1", "A")]))
        .await;

    h.store.select_project("nope").await;

    assert_eq!(h.store.state().selected_project_id.as_deref(), Some("nope"));
    assert_eq!(
        h.storage.get(SELECTED_PROJECT_ID_KEY).await.as_deref(),
        Some("\"nope\"")
    );
}

#[tokio::test]
async fn test_select_tab_is_not_persisted() {
    let mut h = harness(MockApi::new());
    h.store.select_tab(SelectedTab::Account).await;

    assert_eq!(h.store.state().selected_tab, SelectedTab::Account);
    assert_eq!(h.storage.write_count().await, 1);
    assert!(h.storage.get("selectedTab").await.is_none());
}

#[tokio::test]
async fn test_logout_resets_and_keeps_started() {
    let mut h = harness_with(MockApi::new(), persisted_session());
    h.store.hydrate().await;
    h.store.complete_startup().await;

    h.store.logout().await;

    assert_eq!(h.store.state(), &SessionState::logged_out());
    assert_eq!(h.storage.get(TOKEN_KEY).await.as_deref(), Some("null"));
    assert_eq!(h.storage.get(PROJECTS_KEY).await.as_deref(), Some("{}"));

    // The next process start sees a logged-out session.
    let token = h.storage.get(TOKEN_KEY).await.unwrap();
    let mut next = harness_with(
        MockApi::new(),
        MemoryStorage::with_values([(TOKEN_KEY, token)]),
    );
    next.store.hydrate().await;
    assert!(!next.store.state().is_logged_in());
}

#[tokio::test]
async fn test_logout_before_startup_makes_no_api_calls() {
    let mut h = harness_with(MockApi::new(), persisted_session());
    h.store.hydrate().await;

    h.store.logout().await;

    assert!(h.api.seen_credentials.lock().unwrap().is_empty());
    assert_eq!(h.reporter.count(), 0);
    assert_eq!(h.store.state(), &SessionState::logged_out());
    assert_eq!(h.storage.get(TOKEN_KEY).await.as_deref(), Some("null"));
}

#[tokio::test]
async fn test_hydrate_clears_selection_of_unreadable_projects() {
    let storage = MemoryStorage::with_values([
        (TOKEN_KEY, "\"tok\""),
        (USER_ID_KEY, "\"u1\""),
        (PROJECTS_KEY, r#"{"p1": {"id": "p1", "name": "A", "trialUntil": "never"}}"#),
        (SELECTED_PROJECT_ID_KEY, "\"p1\""),
    ]);
    let mut h = harness_with(MockApi::new(), storage);
    h.store.hydrate().await;

    assert!(h.store.state().selected_project_id.is_none());
    assert!(!h.store.state().can_enter_dashboard());
}

#[tokio::test]
async fn test_subscribers_see_every_commit() {
    let mut h = harness(MockApi::new());
    let mut updates = h.store.subscribe();

    h.store
        .login(login_data(vec![Project::new("p1", "A")]))
        .await;
    assert!(updates.has_changed().unwrap());
    assert_eq!(
        updates.borrow_and_update().selected_project_id.as_deref(),
        Some("p1")
    );

    h.store.logout().await;
    assert!(updates.has_changed().unwrap());
    assert!(updates.borrow_and_update().projects.is_empty());
}

#[tokio::test]
async fn test_repeated_login_with_same_projects_hits_classifier_cache() {
    let mut h = harness(MockApi::new());
    let projects = vec![Project::new("p1", "A"), Project::new("p2", "B")];

    h.store.login(login_data(projects.clone())).await;
    h.store.login(login_data(projects)).await;

    assert_eq!(h.store.classifier().cache_hits(), 1);
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_fetch_statistics_for_selected_project() {
    let expected = Statistics {
        orders: OrderStatistics {
            total: 4,
            open: 1,
            complete: 3,
        },
        carts: CartStatistics {
            total: 9,
            active: 7,
            ordered: 2,
        },
    };
    let mut h = harness(MockApi::new().with_statistics(expected));
    h.store
        .login(login_data(vec![Project::new("p1", "A").with_key("shop-a")]))
        .await;

    let stats = h.store.fetch_statistics().await.unwrap();

    assert_eq!(stats, expected);
    assert_eq!(h.api.statistics_keys.lock().unwrap().as_slice(), &["shop-a"]);
}

#[tokio::test]
async fn test_fetch_statistics_requires_login_and_project() {
    let mut h = harness(MockApi::new());
    assert!(h.store.fetch_statistics().await.unwrap_err().is_authentication());

    h.store.login(login_data(vec![])).await;
    assert!(h.store.fetch_statistics().await.unwrap_err().is_not_found());

    h.store
        .login(login_data(vec![Project::new("p1", "No key")]))
        .await;
    assert!(h.store.fetch_statistics().await.unwrap_err().is_not_found());
}
