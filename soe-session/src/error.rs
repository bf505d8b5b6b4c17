//! Session error types.

use crate::config::ConfigError;
use soe_protocol::ProtocolError;
use thiserror::Error;

/// Errors surfaced by the session layer.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl SessionError {
    /// Returns whether the error comes from misuse of a builder rather than
    /// from the environment.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, SessionError::Protocol(e) if e.is_usage_error())
    }
}
