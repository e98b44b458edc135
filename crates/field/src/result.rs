use smartfield_lookup::LookupRow;

/// Outcome of one fetch cycle, published by the row fetcher and consumed
/// once by the resolution state machine.
#[derive(Debug, Clone)]
pub struct SearchResult<K> {
    /// Sequence number assigned when the search was submitted. Only the
    /// result carrying the highest submitted sequence number is ever applied.
    pub seq: u64,
    /// The text that produced this result; `None` for a browse-all query.
    pub search_text: Option<String>,
    pub rows: Vec<LookupRow<K>>,
    /// Rows were dropped to honor the configured row limit.
    pub truncated: bool,
    /// Source error or timeout, converted to a published failure rather than
    /// silently swallowed.
    pub failure: Option<String>,
    /// The submitter asked for the row matching the current value to be
    /// re-highlighted in the proposal chooser.
    pub select_current_value: bool,
}
