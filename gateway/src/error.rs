//! Error types for the flight booking API client

use thiserror::Error;

/// Errors that can occur when calling the booking API
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The request never produced a response (connection refused, timeout, TLS)
    #[error("Request failed: {0}")]
    Transport(String),

    /// The API answered with a non-2xx status
    #[error("API error (status {status}): {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Error message from the API, or the raw body
        message: String,
    },

    /// The response body did not match the expected shape
    #[error("Response parsing failed: {0}")]
    Decode(String),

    /// The base URL cannot be joined with an endpoint path
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// Returns true for failures worth retrying on idempotent requests
    ///
    /// Transport failures and 5xx responses are retryable; 4xx and decode errors are not.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Decode(_) | Self::InvalidUrl(_) => false,
        }
    }

    /// Message suitable for showing to the user at the step where the call failed
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => {
                "Could not reach the booking service. Please check your connection and try again."
                    .to_string()
            },
            Self::Status { status, message } if !message.is_empty() && *status < 500 => {
                message.clone()
            },
            Self::Status { .. } => {
                "The booking service is unavailable right now. Please try again.".to_string()
            },
            Self::Decode(_) | Self::InvalidUrl(_) => {
                "Received an unexpected response from the booking service.".to_string()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_errors_are_retryable() {
        assert!(GatewayError::Transport("reset".into()).is_retryable());
        assert!(
            GatewayError::Status {
                status: 503,
                message: String::new()
            }
            .is_retryable()
        );
        assert!(
            !GatewayError::Status {
                status: 404,
                message: "Flight not found".into()
            }
            .is_retryable()
        );
        assert!(!GatewayError::Decode("eof".into()).is_retryable());
    }

    #[test]
    fn client_errors_surface_api_message() {
        let error = GatewayError::Status {
            status: 402,
            message: "Payment failed".into(),
        };
        assert_eq!(error.user_message(), "Payment failed");
    }
}
