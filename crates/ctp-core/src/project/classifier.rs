//! Active/inactive project partitioning.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Duration;

use chrono::{DateTime, Utc};

use super::model::Project;

/// Default time a cached partition stays valid.
pub const DEFAULT_STALENESS_WINDOW: Duration = Duration::from_secs(60);

/// Project identifiers split by trial status, each list in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPartition {
    pub active: Vec<String>,
    pub inactive: Vec<String>,
}

impl ProjectPartition {
    /// Total number of classified projects.
    pub fn len(&self) -> usize {
        self.active.len() + self.inactive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.inactive.is_empty()
    }

    /// Returns true if `id` appears in either list.
    pub fn contains(&self, id: &str) -> bool {
        self.active.iter().chain(self.inactive.iter()).any(|p| p == id)
    }
}

/// Stable partition of `projects` into active and inactive identifiers.
///
/// A project is active when it has no trial expiry or the expiry is strictly
/// after `now`.
pub fn partition_projects(projects: &[Project], now: DateTime<Utc>) -> ProjectPartition {
    projects
        .iter()
        .fold(ProjectPartition::default(), |mut acc, project| {
            if project.is_active_at(now) {
                acc.active.push(project.id.clone());
            } else {
                acc.inactive.push(project.id.clone());
            }
            acc
        })
}

#[derive(Debug, Clone)]
struct CachedPartition {
    fingerprint: u64,
    computed_at: DateTime<Utc>,
    partition: ProjectPartition,
}

/// Memoizing wrapper around [`partition_projects`].
///
/// The last result is cached under a fingerprint of the input (each
/// project's id and trial expiry, in order). A call whose input has the same
/// fingerprint and arrives within the staleness window returns the cached
/// partition, which means `now` stays frozen at the first computation for
/// that window. A trial that expires inside the window is reported as
/// active until the window elapses.
#[derive(Debug, Clone)]
pub struct ProjectClassifier {
    staleness_window: Duration,
    cache: Option<CachedPartition>,
    cache_hits: u64,
}

impl ProjectClassifier {
    /// Creates a classifier with the given staleness window.
    /// `Duration::ZERO` disables caching.
    pub fn new(staleness_window: Duration) -> Self {
        Self {
            staleness_window,
            cache: None,
            cache_hits: 0,
        }
    }

    /// Creates a classifier that recomputes on every call.
    pub fn uncached() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn staleness_window(&self) -> Duration {
        self.staleness_window
    }

    /// Number of calls answered from the cache since creation.
    pub fn cache_hits(&self) -> u64 {
        self.cache_hits
    }

    /// Drops the cached partition.
    pub fn clear(&mut self) {
        self.cache = None;
    }

    /// Partitions `projects`, reusing the previous result when possible.
    pub fn classify(&mut self, projects: &[Project], now: DateTime<Utc>) -> ProjectPartition {
        let fingerprint = fingerprint(projects);

        if let Some(cached) = &self.cache
            && cached.fingerprint == fingerprint
            && self.is_fresh(cached.computed_at, now)
        {
            self.cache_hits += 1;
            return cached.partition.clone();
        }

        let partition = partition_projects(projects, now);
        if !self.staleness_window.is_zero() {
            self.cache = Some(CachedPartition {
                fingerprint,
                computed_at: now,
                partition: partition.clone(),
            });
        }
        partition
    }

    fn is_fresh(&self, computed_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        // A clock that went backwards invalidates the entry.
        let Ok(elapsed) = (now - computed_at).to_std() else {
            return false;
        };
        elapsed < self.staleness_window
    }
}

impl Default for ProjectClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_STALENESS_WINDOW)
    }
}

fn fingerprint(projects: &[Project]) -> u64 {
    let mut hasher = DefaultHasher::new();
    projects.len().hash(&mut hasher);
    for project in projects {
        project.id.hash(&mut hasher);
        project.trial_until.map(|t| t.timestamp_millis()).hash(&mut hasher);
    }
    hasher.finish()
}
