//! Error types for travellocal-core

use std::time::Duration;

use thiserror::Error;

/// Result type alias using travellocal-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in travellocal-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Connection or transport failure
    #[error("{0}")]
    Network(#[from] reqwest::Error),

    /// Request did not complete in time
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// Non-2xx HTTP response
    #[error("{message}")]
    Api { status: u16, message: String },

    /// 2xx response whose envelope status was not accepted
    #[error("{message}")]
    ServerRejected {
        status: Option<String>,
        message: String,
    },

    /// A gated action was attempted without a stored access token
    #[error("Login is required for this action.")]
    AuthRequired,

    /// A response record could not be turned into a typed value
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Point balance is lower than the requested spend
    #[error("Not enough points: balance {balance}, required {cost}")]
    InsufficientPoints { balance: i64, cost: i64 },

    /// Credential store failure
    #[error("Credential store error: {0}")]
    CredentialStore(String),

    /// Invalid client configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// Operation not offered by this resource
    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

impl Error {
    /// Text to show in an alert or inline error slot.
    ///
    /// Server-provided messages win, then the transport error text, then
    /// `fallback` when neither produced anything readable.
    pub fn user_message(&self, fallback: &str) -> String {
        let message = match self {
            Self::Api { message, .. } | Self::ServerRejected { message, .. } => message.clone(),
            Self::Network(error) => error.to_string(),
            other => other.to_string(),
        };
        let message = message.trim();
        if message.is_empty() {
            fallback.to_string()
        } else {
            message.to_string()
        }
    }

    pub const fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    /// Network failures and server rejections are displayed the same way.
    pub const fn is_remote_failure(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout(_) | Self::Api { .. } | Self::ServerRejected { .. }
        )
    }
}

/// Typed failure produced while normalizing a backend record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{record} record is missing '{field}'")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },
    #[error("{record} record has an unexpected shape: {detail}")]
    InvalidShape {
        record: &'static str,
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_server_message() {
        let error = Error::Api {
            status: 400,
            message: "리뷰가 이미 존재합니다 (400)".to_string(),
        };
        assert_eq!(error.user_message("fallback"), "리뷰가 이미 존재합니다 (400)");
    }

    #[test]
    fn user_message_uses_fallback_for_blank_text() {
        let error = Error::ServerRejected {
            status: None,
            message: "  ".to_string(),
        };
        assert_eq!(error.user_message("추천 목록을 불러오지 못했습니다."), "추천 목록을 불러오지 못했습니다.");
    }

    #[test]
    fn remote_failures_are_grouped() {
        assert!(Error::Timeout(Duration::from_secs(5)).is_remote_failure());
        assert!(!Error::AuthRequired.is_remote_failure());
        assert!(Error::AuthRequired.is_auth_required());
    }
}
