/// Why the last settlement attempt could not map the display text to exactly
/// one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionErrorKind {
    /// No row matched the committed text.
    NoMatch,
    /// Several rows matched and none was explicitly accepted.
    AmbiguousMatch { candidates: usize },
    /// The lookup source failed or timed out.
    LookupFailed,
}

/// Validation status surfaced to the presentation layer. Absent means valid.
///
/// The status is never sticky: any later settlement that resolves
/// successfully clears it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorStatus {
    kind: ResolutionErrorKind,
    message: String,
}

impl ErrorStatus {
    pub fn no_match(text: &str) -> Self {
        Self {
            kind: ResolutionErrorKind::NoMatch,
            message: format!("no match found for '{text}'"),
        }
    }

    pub fn ambiguous(text: &str, candidates: usize) -> Self {
        Self {
            kind: ResolutionErrorKind::AmbiguousMatch { candidates },
            message: format!("'{text}' matches {candidates} proposals; select one"),
        }
    }

    pub fn lookup_failed(message: impl Into<String>) -> Self {
        Self {
            kind: ResolutionErrorKind::LookupFailed,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn kind(&self) -> &ResolutionErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
