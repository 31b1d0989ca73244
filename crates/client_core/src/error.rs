use reqwest::StatusCode;
use shared::error::{ApiError, ErrorCode, RequestFailure};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("server returned {status}: {error}")]
    Http { status: u16, error: ApiError },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid server url: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(err) => err.status().map(|status| status.as_u16()),
            Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Builds an HTTP error from a non-success response body, falling back to
    /// the status line when the body is not a JSON error document.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let error = serde_json::from_str::<ApiError>(body).unwrap_or_else(|_| {
            let message = if body.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("request failed")
                    .to_string()
            } else {
                body.trim().to_string()
            };
            ApiError::new(code_for_status(status), message)
        });
        Self::Http {
            status: status.as_u16(),
            error,
        }
    }
}

fn code_for_status(status: StatusCode) -> ErrorCode {
    match status {
        StatusCode::BAD_REQUEST => ErrorCode::BadRequest,
        StatusCode::UNAUTHORIZED => ErrorCode::Unauthorized,
        StatusCode::FORBIDDEN => ErrorCode::Forbidden,
        StatusCode::NOT_FOUND => ErrorCode::NotFound,
        StatusCode::CONFLICT => ErrorCode::Conflict,
        StatusCode::UNPROCESSABLE_ENTITY => ErrorCode::InvalidInput,
        _ => ErrorCode::Unknown,
    }
}

impl From<ClientError> for RequestFailure {
    fn from(value: ClientError) -> Self {
        match value {
            ClientError::Http { status, error } => RequestFailure::new(Some(status), error.message),
            other => RequestFailure::new(other.status(), other.to_string()),
        }
    }
}
