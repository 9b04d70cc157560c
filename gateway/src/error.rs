use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("relay unreachable: {0}")]
    Unreachable(String),

    #[error("request to relay failed: {0}")]
    RequestFailed(String),

    #[error("invalid response from relay: {0}")]
    InvalidResponse(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("event feed closed")]
    Closed,
}

impl GatewayError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            GatewayError::Unreachable(_) | GatewayError::RequestFailed(_)
        )
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            GatewayError::Unreachable(format!("request timed out: {e}"))
        } else if e.is_connect() {
            GatewayError::Unreachable(format!("connection failed: {e}"))
        } else if e.is_decode() {
            GatewayError::InvalidResponse(e.to_string())
        } else {
            GatewayError::RequestFailed(e.to_string())
        }
    }
}
