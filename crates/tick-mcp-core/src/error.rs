//! Error taxonomy shared by the query engine, the dispatcher and the tool surface.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Classification attached to every failed item and tool error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Malformed or missing input; never reached the provider.
    ValidationError,
    /// Bad date-filter token, day count or timezone.
    InvalidFilterError,
    /// No usable access token.
    AuthError,
    /// Provider answered 404.
    RemoteNotFound,
    /// Provider answered 403.
    RemotePermissionDenied,
    /// Provider answered 429.
    RemoteRateLimited,
    /// Network failure or provider 5xx.
    RemoteTransient,
    /// Unmapped provider status or undecodable body.
    RemoteUnexpected,
    /// The HTTP client timeout elapsed.
    Timeout,
}

impl ErrorKind {
    /// Name as serialized in reports.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ValidationError => "ValidationError",
            Self::InvalidFilterError => "InvalidFilterError",
            Self::AuthError => "AuthError",
            Self::RemoteNotFound => "RemoteNotFound",
            Self::RemotePermissionDenied => "RemotePermissionDenied",
            Self::RemoteRateLimited => "RemoteRateLimited",
            Self::RemoteTransient => "RemoteTransient",
            Self::RemoteUnexpected => "RemoteUnexpected",
            Self::Timeout => "Timeout",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Item-level input validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is absent or blank.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    /// A field is present but does not parse.
    #[error("invalid `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("the inbox cannot be deleted")]
    InboxNotDeletable,
    /// The item did not match the expected shape, e.g. a number where text belongs.
    #[error("malformed item: {0}")]
    Malformed(String),
}

impl ValidationError {
    /// Shorthand for [`ValidationError::InvalidField`].
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}
