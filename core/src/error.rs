//! Error types for the OpenADR 3 client.
//!
//! # Design
//! Only local failures are errors. A well-formed response outside the 2xx
//! range is not an error at all: it comes back as data in
//! [`Envelope::problem`](crate::envelope::Envelope). `ClientError` therefore
//! covers validation (before sending or after decoding), the transport, and
//! bodies that do not decode as the expected type.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Failures at the network boundary, including request assembly and token
/// acquisition.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request could not be assembled (bad URL, unserializable body).
    #[error("failed to build request: {0}")]
    Build(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    /// The token endpoint answered with a non-2xx status.
    #[error("token request rejected with HTTP {status}: {body}")]
    Token { status: u16, body: String },

    /// The token endpoint answered 2xx but the body is not a token response.
    #[error("token response could not be decoded: {0}")]
    TokenDecode(#[source] serde_json::Error),

    #[error(transparent)]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

/// Errors returned by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("configuration error: {0}")]
    Config(String),

    /// Input rejected before any request was sent.
    #[error("invalid {subject}: {}", .errors.join("; "))]
    InvalidInput { subject: String, errors: Vec<String> },

    /// The server answered 2xx with a payload that fails validation.
    #[error("invalid {subject} in response: {}", .errors.join("; "))]
    InvalidResponse { subject: String, errors: Vec<String> },

    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A 2xx body that does not decode as the expected type.
    #[error("failed to decode HTTP {status} response body: {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        ClientError::Config(message.into())
    }

    /// True for both request-side and response-side validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidInput { .. } | ClientError::InvalidResponse { .. }
        )
    }

    /// The violated rules, in order, for validation failures.
    pub fn validation_errors(&self) -> Option<&[String]> {
        match self {
            ClientError::InvalidInput { errors, .. } | ClientError::InvalidResponse { errors, .. } => {
                Some(errors)
            }
            _ => None,
        }
    }
}
