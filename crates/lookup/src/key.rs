use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Bound for the typed key a lookup row resolves to.
///
/// `Display` backs the best-effort display text when a value is set without
/// a backing row; `Hash`/`Eq` back per-query result caching.
pub trait LookupKey: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {}

impl<T> LookupKey for T where T: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static {}
