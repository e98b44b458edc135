//! # Smartfield Jobs
//!
//! The async-runtime seam used by the field engine: fire-and-forget job
//! submission with advisory cancellation and bounded awaiting, plus a named
//! blocking-condition gate for callers that must synchronously observe an
//! asynchronous result (test harnesses, polling endpoints).
//!
//! ## Example
//!
//! ```no_run
//! use std::time::Duration;
//! use smartfield_jobs::{submit, BlockingCondition};
//!
//! #[tokio::main]
//! async fn main() -> smartfield_jobs::Result<()> {
//!     let loaded = BlockingCondition::new("loaded", true);
//!     let signal = loaded.clone();
//!     submit(async move {
//!         // ... load something ...
//!         signal.set_blocking(false);
//!     });
//!     loaded.wait_for(Duration::from_secs(5)).await
//! }
//! ```

mod condition;
mod error;
mod handle;

pub use condition::BlockingCondition;
pub use error::{JobError, Result};
pub use handle::{submit, JobHandle};
