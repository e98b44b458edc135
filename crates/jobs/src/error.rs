use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, JobError>;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("wait timed out after {0:?}")]
    WaitTimeout(Duration),

    #[error("job was canceled before it completed")]
    Canceled,

    #[error("job failed: {0}")]
    Failed(String),
}
