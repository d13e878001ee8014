use thiserror::Error;

use crate::stack::EntityId;

#[derive(Debug, Error)]
pub enum StackError {
    #[error("entity {0} is not present in the stack")]
    InvalidReference(EntityId),
    #[error("index {index} is out of range for a stack of length {len}")]
    OutOfRange { index: usize, len: usize },
    #[error("malformed snapshot entry {index}: {reason}")]
    MalformedSnapshot { index: usize, reason: String },
    #[error("entity {0} does not allow closing")]
    NotClosable(EntityId),
    #[error("snapshot json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StackResult<T> = Result<T, StackError>;
