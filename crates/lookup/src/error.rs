use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LookupError>;

#[derive(Error, Debug)]
pub enum LookupError {
    #[error("lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("lookup source error: {0}")]
    Source(#[from] anyhow::Error),
}
