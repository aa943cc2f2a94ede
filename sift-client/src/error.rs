//! Error types for the Sift client

use sift_core::dto::analysis::ErrorResponse;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Sift client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// A pipeline stage failed or the request was rejected; the server's
    /// error body is preserved as-is
    #[error("API error (status {status}): {}", .body.error)]
    Pipeline {
        /// HTTP status code
        status: u16,
        /// Parsed error body
        body: Box<ErrorResponse>,
    },

    /// API returned an error status code with a body that is not an error body
    #[error("API error (status {status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Raw response text
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::ApiError {
            status,
            message: message.into(),
        }
    }

    /// Builds the error for a non-2xx response from its status and body text
    pub fn from_response_body(status: u16, text: String) -> Self {
        match serde_json::from_str::<ErrorResponse>(&text) {
            Ok(body) => Self::Pipeline {
                status,
                body: Box::new(body),
            },
            Err(_) => Self::api_error(status, text),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Pipeline { status, .. } | Self::ApiError { status, .. } => Some(*status),
            Self::RequestFailed(err) => err.status().map(|status| status.as_u16()),
            Self::ParseError(_) => None,
        }
    }

    /// The server's error body, when it sent one
    pub fn error_body(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Pipeline { body, .. } => Some(body.as_ref()),
            _ => None,
        }
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(status) if (400..500).contains(&status))
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(status) if status >= 500)
    }

    /// Check if the request or a pipeline stage ran out of time
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::RequestFailed(err) => err.is_timeout(),
            _ => self.status() == Some(408),
        }
    }
}
