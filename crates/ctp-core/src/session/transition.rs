//! Pure session state transitions.
//!
//! These methods never touch storage or the network. The session store
//! wraps them with persistence and snapshot publication.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::model::{SelectedTab, SessionState};
use crate::api::Credentials;
use crate::error::{DashboardError, Result};
use crate::project::{Project, ProjectClassifier, sort_by_name};
use crate::user::User;

/// Message shown when a login succeeds but yields no projects.
pub const NO_PROJECTS_MESSAGE: &str = "User has no projects";

/// Everything a successful login (or refresh) produces.
#[derive(Debug, Clone, PartialEq)]
pub struct LoginData {
    pub token: String,
    pub user_id: String,
    pub user: Option<User>,
    /// Raw, unordered project list from the API.
    pub projects: Vec<Project>,
}

impl SessionState {
    /// Applies a successful login.
    ///
    /// Projects are sorted by name (case-insensitive, stable), deduplicated
    /// by id keeping the first in that order, partitioned into
    /// active/inactive ids in that order, and normalized into the project
    /// map. The current selection survives if its project is still
    /// present; otherwise the first active project is selected, if any.
    pub fn apply_login(
        &mut self,
        login: LoginData,
        classifier: &mut ProjectClassifier,
        now: DateTime<Utc>,
    ) {
        let LoginData {
            token,
            user_id,
            user,
            mut projects,
        } = login;

        sort_by_name(&mut projects);
        let mut seen = HashSet::with_capacity(projects.len());
        projects.retain(|project| {
            let first = seen.insert(project.id.clone());
            if !first {
                tracing::warn!(
                    "[SessionState] Dropping duplicate project '{}' ({})",
                    project.id,
                    project.name
                );
            }
            first
        });
        let partition = classifier.classify(&projects, now);

        let selected_project_id = self
            .selected_project_id
            .take()
            .filter(|id| partition.contains(id))
            .or_else(|| partition.active.first().cloned());

        self.login_error_message = if projects.is_empty() {
            Some(NO_PROJECTS_MESSAGE.to_string())
        } else {
            None
        };
        self.token = Some(token);
        self.user_id = Some(user_id);
        self.user = user;
        self.projects = projects
            .into_iter()
            .map(|project| (project.id.clone(), project))
            .collect();
        self.selected_project_id = selected_project_id;
        self.active_project_ids = partition.active;
        self.inactive_project_ids = partition.inactive;
    }

    /// Records a failed login attempt. Nothing but the message changes.
    pub fn apply_login_error(&mut self, error: &DashboardError) {
        self.login_error_message = Some(error.user_message());
    }

    /// Selects a project. The id is not checked against the project map.
    pub fn select_project(&mut self, project_id: impl Into<String>) {
        self.selected_project_id = Some(project_id.into());
    }

    pub fn select_tab(&mut self, tab: SelectedTab) {
        self.selected_tab = tab;
    }

    /// Marks startup as complete. Returns false if it already was.
    pub fn complete_startup(&mut self) -> bool {
        if self.can_start {
            return false;
        }
        self.can_start = true;
        true
    }

    /// Resets the state for the logged-out view.
    pub fn logout(&mut self) {
        *self = Self::logged_out();
    }

    /// Credentials for API calls made on behalf of the current user.
    pub fn credentials(&self) -> Result<Credentials> {
        let token = self
            .token
            .clone()
            .ok_or_else(|| DashboardError::authentication("No token available"))?;
        let user_id = self
            .user_id
            .clone()
            .ok_or_else(|| DashboardError::authentication("No user id available"))?;
        Ok(Credentials { token, user_id })
    }
}
