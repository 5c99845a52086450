//! Session state domain model.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::project::Project;
use crate::user::User;

/// Tab shown once the user is inside the dashboard. Never persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectedTab {
    #[default]
    Dashboard,
    Account,
}

/// The full in-memory record of the user's session.
///
/// Owned by the session store; everything else receives clones.
///
/// # Invariants
///
/// - `active_project_ids` and `inactive_project_ids` are disjoint and
///   together contain exactly the keys of `projects`.
/// - `token == None` means the user is logged out.
/// - `login_error_message` is cleared by any login yielding at least one
///   project.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// False until persisted state is loaded and startup sequencing is done.
    pub can_start: bool,
    /// Opaque API credential. `None` means logged out.
    pub token: Option<String>,
    pub user_id: Option<String>,
    pub user: Option<User>,
    /// Normalized project map (id -> project).
    pub projects: HashMap<String, Project>,
    /// Project chosen in the project switcher.
    pub selected_project_id: Option<String>,
    /// Ids of projects whose trial has not expired, sorted by name.
    pub active_project_ids: Vec<String>,
    /// Ids of expired trial projects, sorted by name.
    pub inactive_project_ids: Vec<String>,
    /// Message shown on the login screen.
    pub login_error_message: Option<String>,
    pub selected_tab: SelectedTab,
}

impl SessionState {
    /// Creates an empty, not-yet-started state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The state right after a logout: everything default, but started.
    pub fn logged_out() -> Self {
        Self {
            can_start: true,
            ..Self::default()
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.token.is_some()
    }

    /// Returns the selected project if it is present in the project map.
    pub fn selected_project(&self) -> Option<&Project> {
        self.selected_project_id
            .as_deref()
            .and_then(|id| self.projects.get(id))
    }

    /// Whether the dashboard tabs can be shown: the user is logged in and a
    /// project is selected. Otherwise the login screen is shown.
    pub fn can_enter_dashboard(&self) -> bool {
        self.token.is_some() && self.selected_project_id.is_some()
    }

    /// Active projects in display order.
    pub fn active_projects(&self) -> Vec<&Project> {
        self.lookup(&self.active_project_ids)
    }

    /// Inactive projects in display order.
    pub fn inactive_projects(&self) -> Vec<&Project> {
        self.lookup(&self.inactive_project_ids)
    }

    /// Checks that the active/inactive lists partition the project keys.
    pub fn partition_is_consistent(&self) -> bool {
        let listed = self.active_project_ids.len() + self.inactive_project_ids.len();
        if listed != self.projects.len() {
            return false;
        }
        let mut seen = std::collections::HashSet::with_capacity(listed);
        self.active_project_ids
            .iter()
            .chain(self.inactive_project_ids.iter())
            .all(|id| self.projects.contains_key(id) && seen.insert(id))
    }

    fn lookup(&self, ids: &[String]) -> Vec<&Project> {
        ids.iter().filter_map(|id| self.projects.get(id)).collect()
    }
}
