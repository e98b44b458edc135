//! # Smartfield Field
//!
//! Asynchronous value-resolution engine behind a searchable input control.
//!
//! ## Pipeline
//!
//! ```text
//! UI action
//!     │
//!     ├──> SmartField (resolution state machine)
//!     │      └─> RowFetcher ──> LookupSource
//!     │             └─> SearchResult (stale-suppressed, broadcast)
//!     │
//!     └──> ProposalChooser updated, state re-settled,
//!          change events + snapshot published
//! ```
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use smartfield_field::{FetcherConfig, SmartField};
//! use smartfield_lookup::{LookupRow, MemorySource};
//!
//! #[tokio::main]
//! async fn main() {
//!     let source = Arc::new(MemorySource::new(vec![LookupRow::new(1i64, "aName")]));
//!     let field = SmartField::new(source, FetcherConfig::default());
//!
//!     field.parse_and_set_value("aName").await;
//!     assert_eq!(field.value(), Some(1));
//!     assert!(field.error_status().is_none());
//! }
//! ```

mod chooser;
mod events;
mod fetcher;
mod field;
mod result;
mod status;

pub use chooser::ProposalChooser;
pub use events::FieldEvent;
pub use fetcher::{FetcherConfig, RowFetcher};
pub use field::{FieldSnapshot, ResolutionPhase, SmartField};
pub use result::SearchResult;
pub use status::{ErrorStatus, ResolutionErrorKind};
