//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: `SessionState`, the aggregate root, and `SelectedTab`
//! - `transition`: pure state transitions (login, logout, selection)
//! - `persisted`: the persisted key-value record and hydration

mod model;
mod persisted;
mod transition;

pub use model::{SelectedTab, SessionState};
pub use persisted::{
    ACTIVE_PROJECT_IDS_KEY, INACTIVE_PROJECT_IDS_KEY, PERSISTED_KEYS, PROJECTS_KEY,
    PersistedRecord, SELECTED_PROJECT_ID_KEY, TOKEN_KEY, USER_ID_KEY,
};
pub use transition::{LoginData, NO_PROJECTS_MESSAGE};
