//! Key-value storage trait.

use async_trait::async_trait;

use crate::error::Result;

/// A persisted key-value region holding serialized text values.
///
/// Implementations must tolerate unknown keys on read (returning `None`)
/// and must apply a `multi_set` batch as a whole.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Reads several keys at once.
    ///
    /// # Returns
    ///
    /// One `(key, value)` pair per requested key, in request order, with
    /// `None` for keys that have no value.
    async fn multi_get(&self, keys: &[&str]) -> Result<Vec<(String, Option<String>)>>;

    /// Writes several keys at once.
    async fn multi_set(&self, pairs: Vec<(String, String)>) -> Result<()>;
}
