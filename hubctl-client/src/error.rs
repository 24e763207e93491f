//! Error types for the hub client

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the hub client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed before a status was received
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Selector matched nothing
    #[error("No Stack Instance \"{0}\" found")]
    NotFound(String),

    /// Domain selector matched more than one instance
    #[error("More than one Stack Instance ({count}) returned by domain \"{selector}\"")]
    Ambiguous {
        /// The domain that was queried
        selector: String,
        /// Number of instances returned
        count: usize,
    },

    /// API answered with a status the operation does not accept
    #[error("Got {status} HTTP {action}, expected {} HTTP", expected_list(.expected))]
    UnexpectedStatus {
        /// What the client was doing, e.g. "deleting Stack Instance"
        action: String,
        /// HTTP status code received
        status: u16,
        /// Status codes that would have been accepted
        expected: Vec<u16>,
    },

    /// Response body could not be decoded
    #[error("Failed to decode response {action}: {source}")]
    Decode {
        action: String,
        #[source]
        source: serde_json::Error,
    },

    /// Successful response without the body the operation needs
    #[error("Got empty response {0}")]
    EmptyBody(String),

    /// Secret payload without a readable value
    #[error("Secret `{0}` has no plaintext value")]
    SecretUnreadable(String),

    /// Request payload rejected before it was sent
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl ClientError {
    /// Create an unexpected status error
    pub fn unexpected_status(action: impl Into<String>, status: u16, expected: &[u16]) -> Self {
        Self::UnexpectedStatus {
            action: action.into(),
            status,
            expected: expected.to_vec(),
        }
    }

    /// Create a decode error
    pub fn decode(action: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Decode {
            action: action.into(),
            source,
        }
    }

    /// Check if this error means the selector matched nothing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this error is a payload decode failure
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Check if the API broke the protocol: unexpected status or unreadable body
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Self::UnexpectedStatus { .. } | Self::Decode { .. } | Self::EmptyBody(_)
        )
    }
}

fn expected_list(expected: &[u16]) -> String {
    match expected {
        [single] => single.to_string(),
        many => format!(
            "[{}]",
            many.iter()
                .map(u16::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        let err = ClientError::NotFound("my.app.com".to_string());
        assert_eq!(err.to_string(), r#"No Stack Instance "my.app.com" found"#);
        assert!(err.is_not_found());
        assert!(!err.is_protocol());
    }

    #[test]
    fn test_unexpected_status_message() {
        let single = ClientError::unexpected_status("patching Stack Instance", 409, &[200]);
        assert_eq!(
            single.to_string(),
            "Got 409 HTTP patching Stack Instance, expected 200 HTTP"
        );

        let many = ClientError::unexpected_status("deleting Stack Instance", 500, &[202, 204]);
        assert_eq!(
            many.to_string(),
            "Got 500 HTTP deleting Stack Instance, expected [202, 204] HTTP"
        );
        assert!(many.is_protocol());
    }

    #[test]
    fn test_decode_is_protocol() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = ClientError::decode("querying Stack Instances", source);
        assert!(err.is_decode());
        assert!(err.is_protocol());
    }
}
