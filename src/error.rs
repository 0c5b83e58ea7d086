use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// No HTTP response was obtained (timeout, DNS failure, connection refused).
    #[error("Transport error: {0}")]
    Transport(String),

    /// A success response carried a body that could not be decoded as JSON.
    #[error("Decode error: {0}")]
    Decode(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Creation paths treat a conflict as "row already exists" rather than a failure.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        self.status() == Some(StatusCode::CONFLICT)
    }

    /// Probing paths treat a 404 as "endpoint absent".
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
