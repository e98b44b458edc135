use crate::call::LookupQuery;
use crate::error::Result;
use crate::key::LookupKey;
use crate::row::LookupRow;
use crate::source::LookupSource;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::future::Future;
use tokio::sync::Mutex;

/// Caching wrapper around a lookup source, keyed per query.
///
/// Failed queries are not cached. `invalidate` drops every cached result
/// set, e.g. after the backing data changed.
pub struct CachedSource<K, S> {
    inner: S,
    capacity: usize,
    state: Mutex<CacheState<K>>,
}

struct CacheState<K> {
    map: HashMap<LookupQuery<K>, Vec<LookupRow<K>>>,
    lru: VecDeque<LookupQuery<K>>,
}

impl<K: LookupKey> CacheState<K> {
    fn touch_lru(&mut self, query: &LookupQuery<K>) {
        self.lru.retain(|q| q != query);
        self.lru.push_back(query.clone());
    }

    fn enforce_capacity(&mut self, capacity: usize) {
        let capacity = capacity.max(1);
        while self.map.len() > capacity {
            if let Some(evict) = self.lru.pop_front() {
                self.map.remove(&evict);
            } else {
                break;
            }
        }
    }
}

impl<K: LookupKey, S: LookupSource<K>> CachedSource<K, S> {
    pub fn new(inner: S, capacity: usize) -> Self {
        Self {
            inner,
            capacity,
            state: Mutex::new(CacheState {
                map: HashMap::new(),
                lru: VecDeque::new(),
            }),
        }
    }

    pub async fn invalidate(&self) {
        let mut state = self.state.lock().await;
        state.map.clear();
        state.lru.clear();
        log::debug!("lookup cache invalidated");
    }

    async fn fetch_cached<F>(&self, query: LookupQuery<K>, load: F) -> Result<Vec<LookupRow<K>>>
    where
        F: Future<Output = Result<Vec<LookupRow<K>>>>,
    {
        {
            let mut state = self.state.lock().await;
            if let Some(rows) = state.map.get(&query).cloned() {
                state.touch_lru(&query);
                return Ok(rows);
            }
        }

        let rows = load.await?;

        let mut state = self.state.lock().await;
        state.map.insert(query.clone(), rows.clone());
        state.touch_lru(&query);
        state.enforce_capacity(self.capacity);
        Ok(rows)
    }
}

#[async_trait]
impl<K: LookupKey, S: LookupSource<K>> LookupSource<K> for CachedSource<K, S> {
    async fn rows_by_key(&self, key: &K) -> Result<Vec<LookupRow<K>>> {
        let query = LookupQuery::ByKey { key: key.clone() };
        self.fetch_cached(query, self.inner.rows_by_key(key)).await
    }

    async fn rows_by_text(&self, text: &str) -> Result<Vec<LookupRow<K>>> {
        let query = LookupQuery::ByText {
            text: text.to_string(),
        };
        self.fetch_cached(query, self.inner.rows_by_text(text)).await
    }

    async fn rows_by_all(&self) -> Result<Vec<LookupRow<K>>> {
        self.fetch_cached(LookupQuery::ByAll, self.inner.rows_by_all())
            .await
    }

    async fn rows_by_rec(&self, parent: Option<&K>) -> Result<Vec<LookupRow<K>>> {
        let query = LookupQuery::ByRec {
            parent: parent.cloned(),
        };
        self.fetch_cached(query, self.inner.rows_by_rec(parent))
            .await
    }
}
