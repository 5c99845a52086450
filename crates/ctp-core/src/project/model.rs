//! Project domain model.
//!
//! A project is one tenant the user can access. Projects arrive from the API
//! as JSON objects with more fields than the dashboard needs; the unknown
//! fields are kept in `extra` so a persisted project round-trips unchanged.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A tenant the authenticated user can access.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique, stable identifier
    pub id: String,
    /// Display name, also the case-insensitive sort key
    pub name: String,
    /// Project key used in REST paths (e.g. `/{key}/orders`)
    #[serde(default)]
    pub key: String,
    /// Instant after which the project counts as inactive.
    /// `None` means the project is not a trial and never expires.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_trial_until",
        deserialize_with = "deserialize_trial_until"
    )]
    pub trial_until: Option<DateTime<Utc>>,
    /// Any other fields the API returned
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Project {
    /// Creates a project with no trial expiry.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            key: String::new(),
            trial_until: None,
            extra: Map::new(),
        }
    }

    /// Sets the project key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Sets the trial expiry.
    pub fn with_trial_until(mut self, trial_until: DateTime<Utc>) -> Self {
        self.trial_until = Some(trial_until);
        self
    }

    /// Returns true if the project is usable at `now`.
    ///
    /// A project without a trial expiry is always active; otherwise the
    /// expiry must be strictly after `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        match self.trial_until {
            None => true,
            Some(trial_until) => now < trial_until,
        }
    }
}

/// Parses a trial expiry as sent by the API.
///
/// Accepts full RFC 3339 timestamps as well as the short `YYYY-MM-DD` and
/// `YYYY-MM` forms, which are read as midnight UTC on that day (or on the
/// first day of that month).
pub fn parse_trial_until(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| Utc.from_utc_datetime(&dt));
    }
    // "%Y-%m" alone is not a complete date for chrono, pin it to the 1st.
    NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| Utc.from_utc_datetime(&dt))
}

fn serialize_trial_until<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

fn deserialize_trial_until<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => parse_trial_until(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid trialUntil: {raw}"))),
    }
}
