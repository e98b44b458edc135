use crate::chooser::ProposalChooser;
use crate::events::FieldEvent;
use crate::fetcher::{FetcherConfig, RowFetcher};
use crate::result::SearchResult;
use crate::status::ErrorStatus;
use smartfield_lookup::{LookupCall, LookupKey, LookupRow, LookupSource};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};

/// Coarse view of the field's runtime state, derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPhase {
    /// No value, no text.
    Empty,
    /// Text present, value not yet committed.
    Editing,
    /// A search or commit is in flight.
    Resolving,
    /// Value, display text and backing row are consistent.
    Valid,
    /// Display text could not be mapped to exactly one row.
    Invalid,
}

/// Cloneable view of the field state, mirrored into a watch channel after
/// every settlement so accessors never contend with the settlement mutex.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot<K> {
    pub display_text: String,
    pub value: Option<K>,
    pub current_row: Option<LookupRow<K>>,
    pub error_status: Option<ErrorStatus>,
    pub chooser_open: bool,
    pub chooser_registered: bool,
    pub proposal_count: usize,
    pub resolving: bool,
}

impl<K: LookupKey> FieldSnapshot<K> {
    fn empty() -> Self {
        Self {
            display_text: String::new(),
            value: None,
            current_row: None,
            error_status: None,
            chooser_open: false,
            chooser_registered: false,
            proposal_count: 0,
            resolving: false,
        }
    }

    #[must_use]
    pub fn phase(&self) -> ResolutionPhase {
        if self.resolving {
            ResolutionPhase::Resolving
        } else if self.error_status.is_some() {
            ResolutionPhase::Invalid
        } else if self.value.is_some() {
            ResolutionPhase::Valid
        } else if self.display_text.is_empty() {
            ResolutionPhase::Empty
        } else {
            ResolutionPhase::Editing
        }
    }
}

struct FieldState<K: LookupKey> {
    display_text: String,
    value: Option<K>,
    current_row: Option<LookupRow<K>>,
    error_status: Option<ErrorStatus>,
    chooser: ProposalChooser<K>,
    resolving: bool,
}

impl<K: LookupKey> FieldState<K> {
    fn new() -> Self {
        Self {
            display_text: String::new(),
            value: None,
            current_row: None,
            error_status: None,
            chooser: ProposalChooser::new(),
            resolving: false,
        }
    }

    fn snapshot(&self) -> FieldSnapshot<K> {
        FieldSnapshot {
            display_text: self.display_text.clone(),
            value: self.value.clone(),
            current_row: self.current_row.clone(),
            error_status: self.error_status.clone(),
            chooser_open: self.chooser.is_open(),
            chooser_registered: self.chooser.is_registered(),
            proposal_count: self.chooser.row_count(),
            resolving: self.resolving,
        }
    }

    /// Adopt a row as the committed value. Accepting destroys the chooser.
    fn settle_row(&mut self, row: LookupRow<K>) {
        self.display_text = row.text.clone();
        self.value = Some(row.key.clone());
        self.current_row = Some(row);
        self.error_status = None;
        self.chooser.unregister();
    }

    fn settle_empty(&mut self) {
        self.value = None;
        self.current_row = None;
        self.error_status = None;
        self.chooser.unregister();
    }

    fn settle_no_match(&mut self, text: &str) {
        self.value = None;
        self.current_row = None;
        self.error_status = Some(ErrorStatus::no_match(text));
        self.chooser.unregister();
    }

    fn settle_lookup_failed(&mut self, message: &str) {
        self.value = None;
        self.current_row = None;
        self.error_status = Some(ErrorStatus::lookup_failed(message));
        self.chooser.unregister();
    }

    /// Caller-supplied keys are trusted even when the backing row is
    /// missing; the display text falls back to the key's rendering.
    fn settle_trusting(&mut self, value: K) {
        self.display_text = value.to_string();
        self.value = Some(value);
        self.current_row = None;
        self.error_status = None;
        self.chooser.unregister();
    }
}

/// A searchable input control's value-resolution engine.
///
/// One instance owns one field's `ResolutionState`; all mutations run under
/// a single mutex, so the fetch worker and caller contexts never interleave
/// half-applied settlements. Cloning yields another handle to the same field.
pub struct SmartField<K: LookupKey> {
    inner: Arc<FieldInner<K>>,
}

impl<K: LookupKey> Clone for SmartField<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct FieldInner<K: LookupKey> {
    source: Arc<dyn LookupSource<K>>,
    fetcher: RowFetcher<K>,
    lookup_timeout: Duration,
    state: Mutex<FieldState<K>>,
    snapshot_tx: watch::Sender<FieldSnapshot<K>>,
    event_tx: broadcast::Sender<FieldEvent<K>>,
}

impl<K: LookupKey> SmartField<K> {
    pub fn new(source: Arc<dyn LookupSource<K>>, config: FetcherConfig) -> Self {
        let fetcher = RowFetcher::new(Arc::clone(&source), config);
        let (snapshot_tx, _) = watch::channel(FieldSnapshot::empty());
        let (event_tx, _) = broadcast::channel(64);
        let inner = Arc::new(FieldInner {
            source,
            fetcher,
            lookup_timeout: config.lookup_timeout,
            state: Mutex::new(FieldState::new()),
            snapshot_tx,
            event_tx,
        });
        spawn_result_loop(&inner);
        Self { inner }
    }

    /// Fire-and-forget search feeding the proposal chooser. Returns once the
    /// query is submitted; the result arrives on the subscription feeds.
    pub async fn search(&self, text: &str, select_current_value: bool) {
        let mut state = self.inner.state.lock().await;
        let before = state.snapshot();
        state.display_text = text.to_string();
        state.chooser.register();
        state.resolving = true;
        self.inner.fetcher.search(text, select_current_value);
        self.inner.publish(&state, before);
    }

    /// Commit free text: resolve it against the source and settle on a
    /// value or a validation error. Suspends the caller for the lookup.
    pub async fn parse_and_set_value(&self, text: &str) {
        self.inner.fetcher.invalidate();
        let mut state = self.inner.state.lock().await;
        let before = state.snapshot();
        state.display_text = text.to_string();

        let trimmed = text.trim();
        if trimmed.is_empty() {
            state.display_text.clear();
            state.settle_empty();
            self.inner.publish(&state, before);
            return;
        }

        state.resolving = true;
        self.inner.snapshot_tx.send_replace(state.snapshot());

        let call = LookupCall::by_text(trimmed).timeout(self.inner.lookup_timeout);
        let outcome = call.execute(self.inner.source.as_ref()).await;
        state.resolving = false;

        match outcome {
            Ok(mut rows) => match rows.len() {
                0 => state.settle_no_match(trimmed),
                1 => state.settle_row(rows.remove(0)),
                candidates => {
                    state.chooser.update_rows(rows);
                    state.chooser.register();
                    state.chooser.open();
                    state.value = None;
                    state.current_row = None;
                    state.error_status = Some(ErrorStatus::ambiguous(trimmed, candidates));
                }
            },
            Err(err) => state.settle_lookup_failed(&err.to_string()),
        }
        self.inner.publish(&state, before);
    }

    /// Resolve `text` against the chooser's current candidate set.
    ///
    /// Resolution order: explicitly highlighted row, unique candidate,
    /// unique exact text match. Without a unique match, `force_close`
    /// reports the ambiguity instead of guessing; otherwise the field is
    /// left untouched while the user keeps choosing.
    pub async fn accept_proposal(&self, text: &str, force_close: bool) {
        self.inner.fetcher.invalidate();
        let mut state = self.inner.state.lock().await;
        let before = state.snapshot();
        let trimmed = text.trim();

        let chosen = state.chooser.selected_row().cloned().or_else(|| {
            let rows = state.chooser.rows();
            if rows.len() == 1 {
                Some(rows[0].clone())
            } else {
                unique_exact_match(rows, trimmed)
            }
        });

        if let Some(row) = chosen {
            state.settle_row(row);
        } else if force_close {
            state.display_text = text.to_string();
            state.value = None;
            state.current_row = None;
            if state.chooser.row_count() == 0 {
                state.settle_no_match(trimmed);
            } else {
                // Ambiguous input is reported, not guessed; the chooser
                // keeps its rows so the user can still pick one.
                state.error_status =
                    Some(ErrorStatus::ambiguous(trimmed, state.chooser.row_count()));
            }
        }
        self.inner.publish(&state, before);
    }

    /// Set the value by key, fetching its backing row. A missing row or a
    /// failed lookup stores the value unverified (trusting set).
    pub async fn set_value(&self, value: K) {
        self.inner.fetcher.invalidate();
        let mut state = self.inner.state.lock().await;
        let before = state.snapshot();
        state.resolving = true;
        self.inner.snapshot_tx.send_replace(state.snapshot());

        let call = LookupCall::by_key(value.clone()).timeout(self.inner.lookup_timeout);
        let outcome = call.execute(self.inner.source.as_ref()).await;
        state.resolving = false;

        match outcome {
            Ok(mut rows) if !rows.is_empty() => {
                if rows.len() > 1 {
                    log::warn!("key lookup returned {} rows; using the first", rows.len());
                }
                state.settle_row(rows.remove(0));
            }
            Ok(_) => {
                log::warn!("no row found for value {value}; storing it unverified");
                state.settle_trusting(value);
            }
            Err(err) => {
                log::warn!("key lookup failed ({err}); storing value {value} unverified");
                state.settle_trusting(value);
            }
        }
        self.inner.publish(&state, before);
    }

    /// Destroy the proposal chooser, e.g. when the field loses focus.
    pub async fn close_chooser(&self) {
        let mut state = self.inner.state.lock().await;
        let before = state.snapshot();
        state.chooser.unregister();
        self.inner.publish(&state, before);
    }

    #[must_use]
    pub fn snapshot(&self) -> FieldSnapshot<K> {
        self.inner.snapshot_tx.subscribe().borrow().clone()
    }

    #[must_use]
    pub fn display_text(&self) -> String {
        self.snapshot().display_text
    }

    #[must_use]
    pub fn value(&self) -> Option<K> {
        self.snapshot().value
    }

    #[must_use]
    pub fn current_lookup_row(&self) -> Option<LookupRow<K>> {
        self.snapshot().current_row
    }

    #[must_use]
    pub fn error_status(&self) -> Option<ErrorStatus> {
        self.snapshot().error_status
    }

    #[must_use]
    pub fn is_chooser_open(&self) -> bool {
        self.snapshot().chooser_open
    }

    #[must_use]
    pub fn is_chooser_registered(&self) -> bool {
        self.snapshot().chooser_registered
    }

    #[must_use]
    pub fn proposal_row_count(&self) -> usize {
        self.snapshot().proposal_count
    }

    #[must_use]
    pub fn phase(&self) -> ResolutionPhase {
        self.snapshot().phase()
    }

    #[must_use]
    pub fn subscribe_events(&self) -> broadcast::Receiver<FieldEvent<K>> {
        self.inner.event_tx.subscribe()
    }

    /// Feed of published fetch results, in submission order.
    #[must_use]
    pub fn subscribe_results(&self) -> broadcast::Receiver<SearchResult<K>> {
        self.inner.fetcher.subscribe()
    }

    #[must_use]
    pub fn watch_snapshots(&self) -> watch::Receiver<FieldSnapshot<K>> {
        self.inner.snapshot_tx.subscribe()
    }
}

impl<K: LookupKey> FieldInner<K> {
    /// Apply one published fetch result to the chooser. The sequence check
    /// under the field mutex is the authoritative staleness gate.
    async fn apply_search_result(&self, result: SearchResult<K>) {
        let mut state = self.state.lock().await;
        if result.seq != self.fetcher.latest_seq() {
            log::debug!("ignoring superseded search result (seq {})", result.seq);
            return;
        }
        let before = state.snapshot();
        state.resolving = false;

        if let Some(message) = result.failure.as_deref() {
            state.chooser.update_rows(Vec::new());
            state.error_status = Some(ErrorStatus::lookup_failed(message));
        } else {
            state.chooser.update_rows(result.rows);
            if state.chooser.row_count() > 0 {
                state.chooser.register();
                state.chooser.open();
                if result.select_current_value {
                    if let Some(value) = state.value.clone() {
                        state.chooser.select_by_key(&value);
                    }
                }
            }
        }
        self.publish(&state, before);
    }

    /// Mirror the new state into the snapshot channel and fire one change
    /// event per field that actually changed.
    fn publish(&self, state: &FieldState<K>, before: FieldSnapshot<K>) {
        let after = state.snapshot();
        self.snapshot_tx.send_replace(after.clone());

        if after.display_text != before.display_text {
            let _ = self.event_tx.send(FieldEvent::DisplayTextChanged {
                old: before.display_text,
                new: after.display_text,
            });
        }
        if after.value != before.value {
            let _ = self.event_tx.send(FieldEvent::ValueChanged {
                old: before.value,
                new: after.value,
            });
        }
        if after.current_row != before.current_row {
            let _ = self.event_tx.send(FieldEvent::CurrentRowChanged {
                old: before.current_row,
                new: after.current_row,
            });
        }
        if after.error_status != before.error_status {
            let _ = self.event_tx.send(FieldEvent::ErrorStatusChanged {
                old: before.error_status,
                new: after.error_status,
            });
        }
        if after.chooser_open != before.chooser_open {
            let _ = self.event_tx.send(FieldEvent::ChooserOpenChanged {
                old: before.chooser_open,
                new: after.chooser_open,
            });
        }
        if after.chooser_registered != before.chooser_registered {
            let _ = self.event_tx.send(FieldEvent::ChooserRegisteredChanged {
                old: before.chooser_registered,
                new: after.chooser_registered,
            });
        }
    }
}

fn spawn_result_loop<K: LookupKey>(inner: &Arc<FieldInner<K>>) {
    let mut results = inner.fetcher.subscribe();
    let weak: Weak<FieldInner<K>> = Arc::downgrade(inner);
    smartfield_jobs::submit(async move {
        loop {
            match results.recv().await {
                Ok(result) => {
                    let Some(inner) = weak.upgrade() else {
                        break;
                    };
                    inner.apply_search_result(result).await;
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    log::warn!("search result feed lagged, skipped {skipped}");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}

fn unique_exact_match<K: LookupKey>(rows: &[LookupRow<K>], text: &str) -> Option<LookupRow<K>> {
    let lowered = text.to_lowercase();
    let mut matches = rows
        .iter()
        .filter(|row| row.text.trim().to_lowercase() == lowered);
    let first = matches.next()?;
    matches.next().is_none().then(|| first.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use smartfield_lookup::MemorySource;

    fn field() -> SmartField<i64> {
        let source = Arc::new(MemorySource::new(vec![
            LookupRow::new(1, "aName"),
            LookupRow::new(2, "bName1"),
            LookupRow::new(3, "bName2"),
        ]));
        SmartField::new(
            source,
            FetcherConfig {
                debounce: Duration::ZERO,
                ..Default::default()
            },
        )
    }

    #[test]
    fn phase_is_derived_from_the_snapshot() {
        let mut snapshot = FieldSnapshot::<i64>::empty();
        assert_eq!(snapshot.phase(), ResolutionPhase::Empty);

        snapshot.display_text = "a".to_string();
        assert_eq!(snapshot.phase(), ResolutionPhase::Editing);

        snapshot.resolving = true;
        assert_eq!(snapshot.phase(), ResolutionPhase::Resolving);

        snapshot.resolving = false;
        snapshot.value = Some(1);
        assert_eq!(snapshot.phase(), ResolutionPhase::Valid);

        snapshot.value = None;
        snapshot.error_status = Some(ErrorStatus::no_match("a"));
        assert_eq!(snapshot.phase(), ResolutionPhase::Invalid);
    }

    #[test]
    fn unique_exact_match_ignores_case_and_padding() {
        let rows = vec![
            LookupRow::new(1, "Alpha"),
            LookupRow::new(2, "Beta"),
        ];
        let row = unique_exact_match(&rows, "alpha").unwrap();
        assert_eq!(row.key, 1);
        assert_eq!(unique_exact_match(&rows, "alp"), None);
    }

    #[tokio::test]
    async fn settlement_fires_each_event_at_most_once() {
        let field = field();
        let mut events = field.subscribe_events();

        field.parse_and_set_value("aName").await;

        let mut display = 0;
        let mut value = 0;
        while let Ok(event) = events.try_recv() {
            match event {
                FieldEvent::DisplayTextChanged { .. } => display += 1,
                FieldEvent::ValueChanged { .. } => value += 1,
                _ => {}
            }
        }
        assert_eq!(display, 1);
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn empty_parse_settles_empty() {
        let field = field();
        field.parse_and_set_value("aName").await;
        assert_eq!(field.value(), Some(1));

        field.parse_and_set_value("  ").await;
        assert_eq!(field.value(), None);
        assert_eq!(field.display_text(), "");
        assert_eq!(field.error_status(), None);
        assert_eq!(field.phase(), ResolutionPhase::Empty);
    }
}
