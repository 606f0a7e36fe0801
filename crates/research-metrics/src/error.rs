//! Error types for the research-metrics pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

/// Errors from the HTTP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Middleware error (retries exhausted, middleware failure)
    #[error("Middleware error: {0}")]
    Middleware(#[from] reqwest_middleware::Error),

    /// Rate limited by the upstream API (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Suggested wait time before retry
        retry_after: Duration,
    },

    /// Resource not found (404 response)
    #[error("Resource not found: {resource}")]
    NotFound {
        /// Description of the missing resource
        resource: String,
    },

    /// Invalid request parameters (400 response)
    #[error("Bad request: {message}")]
    BadRequest {
        /// Error message from API
        message: String,
    },

    /// Response body did not match the expected record schema.
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Response parsed but reports an upstream failure.
    #[error("Malformed response: {message}")]
    MalformedResponse {
        /// What was wrong with the payload
        message: String,
    },

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },
}

impl ClientError {
    /// Create a rate limited error with retry-after duration.
    #[must_use]
    pub fn rate_limited(seconds: u64) -> Self {
        Self::RateLimited { retry_after: Duration::from_secs(seconds) }
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound { resource: resource.into() }
    }

    /// Create a bad request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest { message: message.into() }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Create a malformed response error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse { message: message.into() }
    }

    /// Returns true for network-level failures (no usable HTTP response).
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Middleware(_))
    }

    /// Returns true if the response body could not be used.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Parse(_) | Self::MalformedResponse { .. })
    }

    /// Get the retry-after duration if this is a rate limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}

/// Errors from dashboard pipeline execution.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Error from the API client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// Input validation failed
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation
        field: String,
        /// Validation error message
        message: String,
    },

    /// The query key resolved to nothing upstream.
    #[error("Not found: {what}")]
    NotFound {
        /// What could not be resolved
        what: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PipelineError {
    /// Create a validation error.
    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Create a not-found error.
    #[must_use]
    pub fn not_found(what: impl Into<String>) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Returns true if the query resolved to no data.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Client(ClientError::NotFound { .. }))
    }

    /// Convert to the status line shown next to the dashboard input.
    #[must_use]
    pub fn to_user_message(&self) -> String {
        match self {
            Self::NotFound { .. } | Self::Client(ClientError::NotFound { .. }) => {
                "Invalid DOI or no data available".to_string()
            }
            Self::Client(ClientError::RateLimited { retry_after }) => {
                format!("Rate limited by upstream API. Please wait {:?} before retrying.", retry_after)
            }
            Self::Client(err) if err.is_transport() => {
                "Could not reach the data source. Please try again later.".to_string()
            }
            Self::Client(err) if err.is_malformed() => {
                "The data source returned an unexpected response.".to_string()
            }
            Self::Validation { field, message } => {
                format!("Invalid input for '{field}': {message}")
            }
            _ => self.to_string(),
        }
    }
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_retry_after() {
        let err = ClientError::rate_limited(60);
        assert_eq!(err.retry_after(), Some(Duration::from_secs(60)));

        let err = ClientError::not_found("work");
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_parse_error_is_malformed() {
        let err: ClientError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(err.is_malformed());
        assert!(!err.is_transport());
    }

    #[test]
    fn test_not_found_user_message() {
        let err = PipelineError::not_found("doi 10.1/x");
        assert!(err.is_not_found());
        assert_eq!(err.to_user_message(), "Invalid DOI or no data available");

        let err = PipelineError::from(ClientError::not_found("works"));
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_user_message() {
        let err = PipelineError::validation("doi", "cannot be empty");
        assert!(err.to_user_message().contains("doi"));
        assert!(err.to_user_message().contains("cannot be empty"));
    }
}
