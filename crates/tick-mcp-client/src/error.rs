use std::path::PathBuf;

use reqwest::{Response, StatusCode};
use thiserror::Error;
use tick_mcp_core::ErrorKind;
use tracing::warn;

/// Failure to obtain or refresh an access token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("no access token available; run `tick-mcp auth` or set TICKTICK_ACCESS_TOKEN")]
    MissingToken,
    #[error("access token expired and no refresh token is stored")]
    RefreshUnavailable,
    #[error("client id and secret are required for this OAuth request")]
    MissingClientCredentials,
    #[error("access token was rejected by the provider")]
    Rejected,
    #[error("token endpoint returned {status}: {message}")]
    OAuth { status: u16, message: String },
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("authorization state mismatch")]
    StateMismatch,
    #[error("authorization response did not contain a code")]
    MissingCode,
    #[error("failed to access token file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid token file {path}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of a single provider call.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No usable token, or the provider rejected it.
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("not found: {message}")]
    NotFound { message: String },
    #[error("permission denied: {message}")]
    PermissionDenied { message: String },
    #[error("rate limited: {message}")]
    RateLimited { message: String },
    #[error("provider unavailable: {message}")]
    Transient { message: String },
    /// 400 or 422: the provider refused the payload.
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("request timed out: {message}")]
    Timeout { message: String },
    /// Any other status, or a body that does not decode.
    #[error("unexpected provider response: {message}")]
    Unexpected {
        status: Option<u16>,
        message: String,
    },
}

impl ClientError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: StatusCode, body: String) -> Self {
        let message = if body.trim().is_empty() {
            status.to_string()
        } else {
            body
        };
        match status {
            StatusCode::UNAUTHORIZED => Self::Auth(AuthError::Rejected),
            StatusCode::FORBIDDEN => Self::PermissionDenied { message },
            StatusCode::NOT_FOUND => Self::NotFound { message },
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited { message },
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Self::Rejected {
                status: status.as_u16(),
                message,
            },
            status if status.is_server_error() => Self::Transient { message },
            status => Self::Unexpected {
                status: Some(status.as_u16()),
                message,
            },
        }
    }

    /// Classify a transport-level failure.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            Self::Timeout { message }
        } else if err.is_connect() || err.is_request() {
            Self::Transient { message }
        } else {
            Self::Unexpected {
                status: None,
                message,
            }
        }
    }

    /// Kind reported to callers.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Auth(_) => ErrorKind::AuthError,
            Self::NotFound { .. } => ErrorKind::RemoteNotFound,
            Self::PermissionDenied { .. } => ErrorKind::RemotePermissionDenied,
            Self::RateLimited { .. } => ErrorKind::RemoteRateLimited,
            Self::Transient { .. } => ErrorKind::RemoteTransient,
            Self::Rejected { .. } => ErrorKind::ValidationError,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Unexpected { .. } => ErrorKind::RemoteUnexpected,
        }
    }

    /// Whether the whole invocation must stop.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

/// Body of a failed response, for error messages.
pub(crate) async fn error_body(response: Response) -> String {
    let status = response.status();
    describe_body(status, response.text().await)
}

fn describe_body(status: StatusCode, body: Result<String, reqwest::Error>) -> String {
    body.unwrap_or_else(|err| {
        warn!(%status, "failed to read error response body: {err}");
        format!("{status} (response body could not be read: {err})")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_kinds() {
        let cases = [
            (StatusCode::UNAUTHORIZED, ErrorKind::AuthError),
            (StatusCode::FORBIDDEN, ErrorKind::RemotePermissionDenied),
            (StatusCode::NOT_FOUND, ErrorKind::RemoteNotFound),
            (StatusCode::TOO_MANY_REQUESTS, ErrorKind::RemoteRateLimited),
            (StatusCode::BAD_GATEWAY, ErrorKind::RemoteTransient),
            (StatusCode::SERVICE_UNAVAILABLE, ErrorKind::RemoteTransient),
            (StatusCode::BAD_REQUEST, ErrorKind::ValidationError),
            (StatusCode::UNPROCESSABLE_ENTITY, ErrorKind::ValidationError),
            (StatusCode::CONFLICT, ErrorKind::RemoteUnexpected),
        ];
        for (status, kind) in cases {
            assert_eq!(ClientError::from_status(status, String::new()).kind(), kind, "{status}");
        }
    }

    #[test]
    fn empty_bodies_fall_back_to_the_status_text() {
        let err = ClientError::from_status(StatusCode::NOT_FOUND, "  ".into());
        assert_eq!(err.to_string(), "not found: 404 Not Found");
        assert!(ClientError::from_status(StatusCode::UNAUTHORIZED, String::new()).is_auth());
    }

    #[test]
    fn unreadable_bodies_are_described_not_dropped() {
        let Err(read_error) = reqwest::Client::new().get("not a url").build() else {
            panic!("relative URL should not build");
        };
        let message = describe_body(StatusCode::NOT_FOUND, Err(read_error));
        assert!(message.starts_with("404 Not Found (response body could not be read"), "{message}");

        let err = ClientError::from_status(StatusCode::NOT_FOUND, message);
        assert_eq!(err.kind(), ErrorKind::RemoteNotFound);
        assert_eq!(describe_body(StatusCode::NOT_FOUND, Ok("gone".into())), "gone");
    }
}
