use crate::error::Result;
use crate::key::LookupKey;
use crate::row::LookupRow;
use async_trait::async_trait;

/// Contract of an external lookup provider.
///
/// A source answers the four query kinds with an ordered sequence of rows or
/// a failure. Implementations must be callable from worker tasks; bounding
/// execution time is the caller's job (see `LookupCall::timeout`).
#[async_trait]
pub trait LookupSource<K: LookupKey>: Send + Sync {
    /// Rows whose key equals `key`. Expected to yield at most one row.
    async fn rows_by_key(&self, key: &K) -> Result<Vec<LookupRow<K>>>;

    /// Rows matching the user's search text.
    async fn rows_by_text(&self, text: &str) -> Result<Vec<LookupRow<K>>>;

    /// Unfiltered listing, used when browsing with empty search text.
    async fn rows_by_all(&self) -> Result<Vec<LookupRow<K>>>;

    /// Rows below `parent` in a hierarchical source; `None` addresses the
    /// root level.
    async fn rows_by_rec(&self, parent: Option<&K>) -> Result<Vec<LookupRow<K>>>;
}
