// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Error
//!
//! Error taxonomy shared by every Eka Care resource.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Maps transport and HTTP failures onto SDK errors

use reqwest::StatusCode;

/// Errors that can occur while talking to the Eka Care platform
#[derive(Debug, thiserror::Error)]
pub enum EkaCareError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded")]
    RateLimit,

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, EkaCareError>;

impl EkaCareError {
    /// Translate a non-success HTTP status and its body into a domain error
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status.as_u16() {
            401 | 403 => EkaCareError::Authentication(body),
            404 => EkaCareError::NotFound(body),
            429 => EkaCareError::RateLimit,
            code => EkaCareError::Api {
                status: code,
                message: body,
            },
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, EkaCareError::Authentication(_))
    }
}

impl From<reqwest::Error> for EkaCareError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EkaCareError::Timeout(err.to_string())
        } else if err.is_decode() {
            EkaCareError::Decode(err.to_string())
        } else {
            EkaCareError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for EkaCareError {
    fn from(err: serde_json::Error) -> Self {
        EkaCareError::Decode(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            EkaCareError::from_status(StatusCode::UNAUTHORIZED, "expired".into()),
            EkaCareError::Authentication(_)
        ));
        assert!(matches!(
            EkaCareError::from_status(StatusCode::FORBIDDEN, String::new()),
            EkaCareError::Authentication(_)
        ));
        assert!(matches!(
            EkaCareError::from_status(StatusCode::NOT_FOUND, String::new()),
            EkaCareError::NotFound(_)
        ));
        assert!(matches!(
            EkaCareError::from_status(StatusCode::TOO_MANY_REQUESTS, String::new()),
            EkaCareError::RateLimit
        ));

        match EkaCareError::from_status(StatusCode::BAD_GATEWAY, "upstream".into()) {
            EkaCareError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_display() {
        let err = EkaCareError::Api {
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "API error (HTTP 500): boom");
        assert!(EkaCareError::Authentication("x".into()).is_unauthorized());
        assert!(!EkaCareError::RateLimit.is_unauthorized());
    }
}
