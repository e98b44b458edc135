use crate::error::{JobError, Result};
use std::time::Duration;
use tokio::sync::watch;

/// Named, resettable gate between async workers and waiting callers.
///
/// A worker releases waiters with `set_blocking(false)`; `set_blocking(true)`
/// re-arms the gate for the next cycle. All clones observe the same gate, so
/// a condition can be signaled from a fetch worker while another context
/// waits on it.
#[derive(Debug, Clone)]
pub struct BlockingCondition {
    name: String,
    tx: watch::Sender<bool>,
}

impl BlockingCondition {
    pub fn new(name: impl Into<String>, initially_blocking: bool) -> Self {
        let (tx, _) = watch::channel(initially_blocking);
        Self {
            name: name.into(),
            tx,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_blocking(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn set_blocking(&self, blocking: bool) {
        let previous = self.tx.send_replace(blocking);
        if previous && !blocking {
            log::debug!("condition '{}' released", self.name);
        }
    }

    /// Suspend the caller until the gate is released or `timeout` elapses.
    pub async fn wait_for(&self, timeout: Duration) -> Result<()> {
        let mut rx = self.tx.subscribe();
        let wait = rx.wait_for(|blocking| !*blocking);
        let result = match tokio::time::timeout(timeout, wait).await {
            Err(_) => Err(JobError::WaitTimeout(timeout)),
            // The sender lives as long as `self`, so `wait_for` cannot
            // observe a closed channel while we hold a reference.
            Ok(_) => Ok(()),
        };
        result
    }
}
