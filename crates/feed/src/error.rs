use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    #[error("Notification store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Malformed record: {0}")]
    MalformedRecord(String),
}

pub type FeedResult<T> = Result<T, FeedError>;
