//! # Smartfield Lookup
//!
//! Data model and source contract for key/text/all/recursive lookups.
//!
//! ## Pipeline
//!
//! ```text
//! LookupCall (query descriptor)
//!     │
//!     ├──> LookupSource (external provider)
//!     │      └─> ordered LookupRows or LookupError
//!     │
//!     └──> timeout / row-limit policy applied at the dispatch point
//! ```
//!
//! ## Example
//!
//! ```
//! use smartfield_lookup::{LookupCall, LookupRow, MemorySource};
//!
//! #[tokio::main]
//! async fn main() -> smartfield_lookup::Result<()> {
//!     let source = MemorySource::new(vec![
//!         LookupRow::new(1i64, "aName"),
//!         LookupRow::new(2i64, "bName"),
//!     ]);
//!     let rows = LookupCall::by_text("a").execute(&source).await?;
//!     assert_eq!(rows.len(), 1);
//!     Ok(())
//! }
//! ```

mod cache;
mod call;
mod error;
mod key;
mod memory;
mod row;
mod source;

pub use cache::CachedSource;
pub use call::{LookupCall, LookupQuery};
pub use error::{LookupError, Result};
pub use key::LookupKey;
pub use memory::MemorySource;
pub use row::LookupRow;
pub use source::LookupSource;
