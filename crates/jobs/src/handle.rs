use crate::error::{JobError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time;

/// Submit a unit of work for execution off the caller's context.
pub fn submit<F, T>(work: F) -> JobHandle<T>
where
    F: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    JobHandle {
        handle: tokio::spawn(work),
    }
}

/// Handle to a unit of work running on the async runtime.
#[derive(Debug)]
pub struct JobHandle<T> {
    handle: JoinHandle<T>,
}

impl<T> JobHandle<T> {
    /// Advisory cancellation. The job may still run to completion; callers
    /// must not rely on interruption for correctness.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the job outcome, bounded by `timeout`.
    ///
    /// On timeout the handle is released and the job keeps running detached.
    pub async fn wait(self, timeout: Duration) -> Result<T> {
        match time::timeout(timeout, self.handle).await {
            Err(_) => Err(JobError::WaitTimeout(timeout)),
            Ok(Ok(value)) => Ok(value),
            Ok(Err(join)) if join.is_cancelled() => Err(JobError::Canceled),
            Ok(Err(join)) => Err(JobError::Failed(join.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tokio::sync::oneshot;

    #[tokio::test]
    async fn wait_returns_job_output() {
        let job = submit(async { 6 * 7 });
        let value = job.wait(Duration::from_secs(1)).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn wait_times_out_on_stuck_job() {
        let (_tx, rx) = oneshot::channel::<()>();
        let job = submit(async move {
            let _ = rx.await;
        });
        let err = job.wait(Duration::from_millis(20)).await.unwrap_err();
        assert!(matches!(err, JobError::WaitTimeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn canceled_job_reports_cancellation() {
        let (_tx, rx) = oneshot::channel::<()>();
        let job = submit(async move {
            let _ = rx.await;
        });
        job.cancel();
        let err = job.wait(Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, JobError::Canceled), "got {err:?}");
    }
}
