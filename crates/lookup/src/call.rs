use crate::error::{LookupError, Result};
use crate::key::LookupKey;
use crate::row::LookupRow;
use crate::source::LookupSource;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time;

/// The closed set of query kinds a lookup source answers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum LookupQuery<K> {
    ByKey { key: K },
    ByText { text: String },
    ByAll,
    ByRec { parent: Option<K> },
}

/// Immutable descriptor of a single lookup query plus execution policy.
///
/// A new call is constructed per query; the issuing fetcher owns it for the
/// duration of that query.
#[derive(Debug, Clone)]
pub struct LookupCall<K> {
    query: LookupQuery<K>,
    max_row_count: Option<usize>,
    timeout: Option<Duration>,
}

impl<K: LookupKey> LookupCall<K> {
    pub fn by_key(key: K) -> Self {
        Self::with_query(LookupQuery::ByKey { key })
    }

    pub fn by_text(text: impl Into<String>) -> Self {
        Self::with_query(LookupQuery::ByText { text: text.into() })
    }

    pub fn by_all() -> Self {
        Self::with_query(LookupQuery::ByAll)
    }

    pub fn by_rec(parent: Option<K>) -> Self {
        Self::with_query(LookupQuery::ByRec { parent })
    }

    fn with_query(query: LookupQuery<K>) -> Self {
        Self {
            query,
            max_row_count: None,
            timeout: None,
        }
    }

    #[must_use]
    pub fn max_row_count(mut self, max_row_count: usize) -> Self {
        self.max_row_count = Some(max_row_count);
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn query(&self) -> &LookupQuery<K> {
        &self.query
    }

    /// The search text, when this is a by-text query.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match &self.query {
            LookupQuery::ByText { text } => Some(text),
            _ => None,
        }
    }

    /// Single dispatch point: run the query against `source`, bounded by the
    /// configured timeout. An elapsed timeout is a recoverable failure, not
    /// an abort.
    pub async fn execute(&self, source: &dyn LookupSource<K>) -> Result<Vec<LookupRow<K>>> {
        let run = async {
            match &self.query {
                LookupQuery::ByKey { key } => source.rows_by_key(key).await,
                LookupQuery::ByText { text } => source.rows_by_text(text).await,
                LookupQuery::ByAll => source.rows_by_all().await,
                LookupQuery::ByRec { parent } => source.rows_by_rec(parent.as_ref()).await,
            }
        };
        match self.timeout {
            Some(limit) => time::timeout(limit, run)
                .await
                .map_err(|_| LookupError::Timeout(limit))?,
            None => run.await,
        }
    }

    /// Apply the configured row limit, reporting whether rows were dropped.
    #[must_use]
    pub fn apply_row_limit(&self, mut rows: Vec<LookupRow<K>>) -> (Vec<LookupRow<K>>, bool) {
        match self.max_row_count {
            Some(limit) if rows.len() > limit => {
                rows.truncate(limit);
                (rows, true)
            }
            _ => (rows, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySource;
    use pretty_assertions::assert_eq;

    fn source() -> MemorySource<i64> {
        MemorySource::new(vec![
            LookupRow::new(1, "alpha"),
            LookupRow::new(2, "beta"),
            LookupRow::new(3, "gamma"),
        ])
    }

    #[tokio::test]
    async fn dispatches_by_key() {
        let rows = LookupCall::by_key(2).execute(&source()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text, "beta");
    }

    #[tokio::test]
    async fn dispatches_by_text() {
        let rows = LookupCall::by_text("ga").execute(&source()).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].key, 3);
    }

    #[tokio::test]
    async fn dispatches_by_all() {
        let rows = LookupCall::<i64>::by_all().execute(&source()).await.unwrap();
        assert_eq!(rows.len(), 3);
    }

    #[tokio::test]
    async fn elapsed_timeout_is_reported_as_failure() {
        struct SlowSource;

        #[async_trait::async_trait]
        impl LookupSource<i64> for SlowSource {
            async fn rows_by_key(&self, _key: &i64) -> Result<Vec<LookupRow<i64>>> {
                Ok(Vec::new())
            }

            async fn rows_by_text(&self, _text: &str) -> Result<Vec<LookupRow<i64>>> {
                time::sleep(Duration::from_secs(60)).await;
                Ok(Vec::new())
            }

            async fn rows_by_all(&self) -> Result<Vec<LookupRow<i64>>> {
                Ok(Vec::new())
            }

            async fn rows_by_rec(&self, _parent: Option<&i64>) -> Result<Vec<LookupRow<i64>>> {
                Ok(Vec::new())
            }
        }

        let err = LookupCall::by_text("x")
            .timeout(Duration::from_millis(20))
            .execute(&SlowSource)
            .await
            .unwrap_err();
        assert!(matches!(err, LookupError::Timeout(_)), "got {err:?}");
    }

    #[test]
    fn row_limit_truncates_and_flags() {
        let call = LookupCall::<i64>::by_all().max_row_count(2);
        let rows = vec![
            LookupRow::new(1, "a"),
            LookupRow::new(2, "b"),
            LookupRow::new(3, "c"),
        ];
        let (rows, truncated) = call.apply_row_limit(rows);
        assert_eq!(rows.len(), 2);
        assert!(truncated);

        let (rows, truncated) = call.apply_row_limit(vec![LookupRow::new(1, "a")]);
        assert_eq!(rows.len(), 1);
        assert!(!truncated);
    }
}
