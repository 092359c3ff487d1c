//! Upload error taxonomy.

use std::fmt;

use assetmint_transfer::{AttemptError, TransferError};

use crate::backend::BackendError;
use crate::validation::ValidationError;

/// Backend operation that produced an upstream failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RpcOperation {
    Prepare,
    Complete,
    StartMint,
}

impl fmt::Display for RpcOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Prepare => "prepare",
            Self::Complete => "complete",
            Self::StartMint => "start-mint",
        })
    }
}

/// Fieldless discriminant of [`UploadError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Cancelled,
    RetriesExhausted,
    Upstream,
    Unexpected,
}

/// Errors produced by an upload run.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("upload cancelled")]
    Cancelled,

    #[error("chunk {part_number} failed after {attempts} attempts: {reason}")]
    RetriesExhausted {
        part_number: u32,
        attempts: u32,
        reason: AttemptError,
    },

    #[error("{operation} failed: {detail}")]
    Upstream {
        operation: RpcOperation,
        detail: String,
    },

    #[error("upload failed: {0}")]
    Unexpected(String),
}

impl UploadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::RetriesExhausted { .. } => ErrorKind::RetriesExhausted,
            Self::Upstream { .. } => ErrorKind::Upstream,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    pub(crate) fn upstream(operation: RpcOperation, detail: impl fmt::Display) -> Self {
        Self::Upstream {
            operation,
            detail: detail.to_string(),
        }
    }

    /// The backend answered `operation` but the answer is unusable.
    pub(crate) fn rejected(operation: RpcOperation, detail: impl Into<String>) -> Self {
        Self::upstream(operation, BackendError::Rejected(detail.into()))
    }

    /// Maps a transfer failure of chunk `part_number`.
    ///
    /// An invalid chunk plan means the prepare response broke its own
    /// invariants, so it is reported against the prepare operation.
    pub(crate) fn from_transfer(part_number: u32, err: TransferError) -> Self {
        match err {
            TransferError::Cancelled => Self::Cancelled,
            TransferError::RetriesExhausted { attempts, last } => Self::RetriesExhausted {
                part_number,
                attempts,
                reason: last,
            },
            TransferError::InvalidPlan(detail) => Self::rejected(RpcOperation::Prepare, detail),
            other => Self::Unexpected(other.to_string()),
        }
    }
}
