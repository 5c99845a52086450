//! Project domain module.
//!
//! # Module Structure
//!
//! - `model`: the `Project` tenant model and trial-expiry parsing
//! - `classifier`: active/inactive partitioning with a memoizing classifier

mod classifier;
mod model;

pub use classifier::{
    DEFAULT_STALENESS_WINDOW, ProjectClassifier, ProjectPartition, partition_projects,
};
pub use model::{Project, parse_trial_until};

/// Sorts projects by name, case-insensitively.
///
/// The sort is stable: projects whose names compare equal keep their
/// original relative order.
pub fn sort_by_name(projects: &mut [Project]) {
    projects.sort_by_cached_key(|project| project.name.to_lowercase());
}
