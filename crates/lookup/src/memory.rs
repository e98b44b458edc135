use crate::error::Result;
use crate::key::LookupKey;
use crate::row::LookupRow;
use crate::source::LookupSource;
use async_trait::async_trait;

/// Static in-memory lookup source for fixed pick lists and tests.
///
/// Text queries use case-insensitive `*`-wildcard matching with an implicit
/// trailing wildcard, so typing `a` already matches `aName`. Inactive rows
/// stay resolvable by key but are excluded from text and browse queries.
#[derive(Debug, Clone)]
pub struct MemorySource<K> {
    rows: Vec<LookupRow<K>>,
}

impl<K: LookupKey> MemorySource<K> {
    pub fn new(rows: Vec<LookupRow<K>>) -> Self {
        Self { rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[LookupRow<K>] {
        &self.rows
    }
}

#[async_trait]
impl<K: LookupKey> LookupSource<K> for MemorySource<K> {
    async fn rows_by_key(&self, key: &K) -> Result<Vec<LookupRow<K>>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| &row.key == key)
            .cloned()
            .collect())
    }

    async fn rows_by_text(&self, text: &str) -> Result<Vec<LookupRow<K>>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.active && matches_wildcard(text, &row.text))
            .cloned()
            .collect())
    }

    async fn rows_by_all(&self) -> Result<Vec<LookupRow<K>>> {
        Ok(self.rows.iter().filter(|row| row.active).cloned().collect())
    }

    async fn rows_by_rec(&self, parent: Option<&K>) -> Result<Vec<LookupRow<K>>> {
        Ok(self
            .rows
            .iter()
            .filter(|row| row.active && row.parent_key.as_ref() == parent)
            .cloned()
            .collect())
    }
}

/// Case-insensitive wildcard match. `*` matches any run of characters; the
/// pattern is anchored at the start and carries an implicit trailing `*`.
fn matches_wildcard(pattern: &str, candidate: &str) -> bool {
    let pattern = pattern.trim().to_lowercase();
    let candidate = candidate.to_lowercase();

    let mut segments = pattern.split('*');
    let Some(first) = segments.next() else {
        return true;
    };
    if !candidate.starts_with(first) {
        return false;
    }

    let mut pos = first.len();
    for segment in segments {
        if segment.is_empty() {
            continue;
        }
        match candidate[pos..].find(segment) {
            Some(offset) => pos += offset + segment.len(),
            None => return false,
        }
    }
    true
}
