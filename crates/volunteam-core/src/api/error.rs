use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("Server error (status {status}): {body}")]
    ServerError { status: u16, body: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Image upload failed: {0}")]
    UploadFailed(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl ApiError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let cut: String = body.chars().take(MAX_ERROR_BODY_LENGTH).collect();
            format!("{}... (truncated, {} total bytes)", cut, body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        ApiError::ServerError {
            status: status.as_u16(),
            body: Self::truncate_body(body),
        }
    }

    /// True when the request never got an answer from the server.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::NetworkUnreachable(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            ApiError::ServerError {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            // connect, timeout, request building and body errors
            ApiError::NetworkUnreachable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_keeps_code() {
        let err = ApiError::from_status(reqwest::StatusCode::NOT_FOUND, "Not Found");
        match err {
            ApiError::ServerError { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, "Not Found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_from_status_truncates_long_body() {
        let body = "x".repeat(2000);
        let err = ApiError::from_status(reqwest::StatusCode::INTERNAL_SERVER_ERROR, &body);
        let message = err.to_string();
        assert!(message.contains("truncated, 2000 total bytes"));
        assert!(message.len() < 700);
    }

    #[test]
    fn test_is_unreachable() {
        assert!(ApiError::NetworkUnreachable("refused".to_string()).is_unreachable());
        assert!(!ApiError::InvalidResponse("bad".to_string()).is_unreachable());
    }
}
