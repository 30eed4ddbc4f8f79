use thiserror::Error;
use tick_mcp_client::ClientError;
use tick_mcp_core::{ErrorKind, ValidationError};

use crate::filter_util::FilterBuildError;

/// Failure of a whole tool invocation.
///
/// Per-item failures inside a batch are reported in the batch report instead.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Filter(#[from] FilterBuildError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
}

impl ServiceError {
    /// Kind reported to callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Filter(_) => ErrorKind::InvalidFilterError,
            Self::Validation(_) => ErrorKind::ValidationError,
            Self::Client(err) => err.kind(),
        }
    }

    /// Whether the caller sent bad input, as opposed to a provider or auth failure.
    #[must_use]
    pub const fn is_invalid_input(&self) -> bool {
        matches!(self, Self::Filter(_) | Self::Validation(_))
    }
}
