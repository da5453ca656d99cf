//! Error types for mgc-client

use thiserror::Error;

/// API client failures
#[derive(Debug, Error)]
pub enum ClientError {
    /// Backend unreachable, connection dropped, or request timed out
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 2xx response whose body is not what the endpoint promises
    #[error("Invalid response from API: {0}")]
    InvalidResponse(String),

    /// Local file handling (audio files, pending-ratings queue)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Local state file exists but cannot be parsed
    #[error("Corrupt local state: {0}")]
    Storage(String),
}

impl ClientError {
    /// The backend refused the request itself (4xx); resending will not help
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Api { status, .. } if (400..500).contains(status))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_is_4xx_only() {
        let bad_request = ClientError::Api {
            status: 400,
            message: "Missing required fields".to_string(),
        };
        let server_error = ClientError::Api {
            status: 500,
            message: "Failed to save rating".to_string(),
        };

        assert!(bad_request.is_rejection());
        assert!(!server_error.is_rejection());
        assert!(!ClientError::InvalidResponse("x".to_string()).is_rejection());
        assert_eq!(bad_request.to_string(), "Missing required fields");
        assert_eq!(server_error.status(), Some(500));
    }
}
