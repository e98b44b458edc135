use smartfield_lookup::{LookupKey, LookupRow};

/// Candidate rows awaiting user selection, plus the single highlighted row.
///
/// The chooser is pure state behind the field's mutex: the fetcher's publish
/// step is its only writer, the state machine and presentation layer read it.
/// `registered` tracks whether the UI-visible chooser instance exists at all;
/// `open` whether it is currently showing.
#[derive(Debug, Clone)]
pub struct ProposalChooser<K> {
    rows: Vec<LookupRow<K>>,
    open: bool,
    registered: bool,
    selected: Option<usize>,
}

impl<K: LookupKey> ProposalChooser<K> {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            open: false,
            registered: false,
            selected: None,
        }
    }

    /// Replace the candidate set. An empty set closes the chooser; any
    /// previous selection is dropped.
    pub fn update_rows(&mut self, rows: Vec<LookupRow<K>>) {
        self.selected = None;
        if rows.is_empty() {
            self.rows.clear();
            self.open = false;
        } else {
            self.rows = rows;
        }
    }

    pub fn register(&mut self) {
        self.registered = true;
    }

    /// Destroy the chooser instance, releasing the candidate set so a later
    /// reopen can never present stale rows.
    pub fn unregister(&mut self) {
        self.close();
        self.registered = false;
    }

    pub fn open(&mut self) {
        if !self.rows.is_empty() {
            self.open = true;
        }
    }

    pub fn close(&mut self) {
        self.rows.clear();
        self.selected = None;
        self.open = false;
    }

    /// Highlight the row with the given key. Returns whether a row matched.
    pub fn select_by_key(&mut self, key: &K) -> bool {
        self.selected = self.rows.iter().position(|row| &row.key == key);
        self.selected.is_some()
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    #[must_use]
    pub fn selected_row(&self) -> Option<&LookupRow<K>> {
        self.selected.and_then(|index| self.rows.get(index))
    }

    #[must_use]
    pub fn rows(&self) -> &[LookupRow<K>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.registered
    }
}

impl<K: LookupKey> Default for ProposalChooser<K> {
    fn default() -> Self {
        Self::new()
    }
}
