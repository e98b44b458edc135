use crate::result::SearchResult;
use smartfield_jobs::JobHandle;
use smartfield_lookup::{LookupCall, LookupKey, LookupSource};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time;

/// Fetch policy for one field instance.
#[derive(Debug, Clone, Copy)]
pub struct FetcherConfig {
    /// Quiet period between a keystroke and the dispatched lookup; a newer
    /// search submitted within it supersedes the pending one.
    pub debounce: Duration,
    /// Bound on a single lookup execution.
    pub lookup_timeout: Duration,
    /// Row limit applied at publish; exceeding rows set the truncation flag.
    pub max_row_count: Option<usize>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(250),
            lookup_timeout: Duration::from_secs(5),
            max_row_count: Some(100),
        }
    }
}

/// Turns keystroke-level search requests into at most one authoritative
/// `SearchResult` per logical search.
///
/// Every submission gets a monotonically increasing sequence number; a
/// completion publishes only if it still carries the highest number. Task
/// cancellation is advisory and frees resources early, the sequence check is
/// what guarantees that a stale completion never overwrites a newer one.
#[derive(Clone)]
pub struct RowFetcher<K: LookupKey> {
    inner: Arc<FetcherInner<K>>,
}

struct FetcherInner<K: LookupKey> {
    source: Arc<dyn LookupSource<K>>,
    config: FetcherConfig,
    seq: AtomicU64,
    task: StdMutex<Option<JobHandle<()>>>,
    result_tx: broadcast::Sender<SearchResult<K>>,
}

impl<K: LookupKey> RowFetcher<K> {
    pub fn new(source: Arc<dyn LookupSource<K>>, config: FetcherConfig) -> Self {
        let (result_tx, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(FetcherInner {
                source,
                config,
                seq: AtomicU64::new(0),
                task: StdMutex::new(None),
                result_tx,
            }),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SearchResult<K>> {
        self.inner.result_tx.subscribe()
    }

    /// Highest sequence number submitted so far. Consumers compare a
    /// result's `seq` against this before applying it.
    #[must_use]
    pub fn latest_seq(&self) -> u64 {
        self.inner.seq.load(Ordering::SeqCst)
    }

    /// Submit a new logical search, superseding any in-flight query. Returns
    /// immediately with the assigned sequence number; the result arrives on
    /// the subscription feed. Empty text browses all rows.
    pub fn search(&self, text: &str, select_current_value: bool) -> u64 {
        let seq = self.bump();
        let text = text.trim().to_string();
        let source = Arc::clone(&self.inner.source);
        let config = self.inner.config;
        let weak = Arc::downgrade(&self.inner);

        let handle = smartfield_jobs::submit(async move {
            if !config.debounce.is_zero() {
                time::sleep(config.debounce).await;
            }
            run_search(weak, source, config, seq, text, select_current_value).await;
        });
        self.store_task(handle);
        seq
    }

    /// Supersede any in-flight search without submitting a new one. Used by
    /// direct settlement operations so a stale interactive result can never
    /// clobber a committed value.
    pub fn invalidate(&self) {
        self.bump();
        if let Ok(mut guard) = self.inner.task.lock() {
            if let Some(task) = guard.take() {
                task.cancel();
            }
        }
    }

    fn bump(&self) -> u64 {
        self.inner.seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn store_task(&self, handle: JobHandle<()>) {
        if let Ok(mut guard) = self.inner.task.lock() {
            if let Some(previous) = guard.replace(handle) {
                previous.cancel();
            }
        }
    }
}

impl<K: LookupKey> Drop for RowFetcher<K> {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            if let Ok(guard) = self.inner.task.lock() {
                if let Some(task) = guard.as_ref() {
                    task.cancel();
                }
            }
        }
    }
}

async fn run_search<K: LookupKey>(
    inner: Weak<FetcherInner<K>>,
    source: Arc<dyn LookupSource<K>>,
    config: FetcherConfig,
    seq: u64,
    text: String,
    select_current_value: bool,
) {
    let call = if text.is_empty() {
        LookupCall::by_all()
    } else {
        LookupCall::by_text(text.clone())
    };
    let call = match config.max_row_count {
        Some(limit) => call.max_row_count(limit),
        None => call,
    };
    let call = call.timeout(config.lookup_timeout);

    let outcome = call.execute(source.as_ref()).await;

    let Some(inner) = inner.upgrade() else {
        return;
    };
    if inner.seq.load(Ordering::SeqCst) != seq {
        log::debug!("discarding stale search result (seq {seq})");
        return;
    }

    let search_text = (!text.is_empty()).then_some(text);
    let result = match outcome {
        Ok(rows) => {
            let (rows, truncated) = call.apply_row_limit(rows);
            SearchResult {
                seq,
                search_text,
                rows,
                truncated,
                failure: None,
                select_current_value,
            }
        }
        Err(err) => {
            log::warn!(
                "lookup failed for '{}': {err}",
                search_text.as_deref().unwrap_or("")
            );
            SearchResult {
                seq,
                search_text,
                rows: Vec::new(),
                truncated: false,
                failure: Some(err.to_string()),
                select_current_value,
            }
        }
    };
    let _ = inner.result_tx.send(result);
}
