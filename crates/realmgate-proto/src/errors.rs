//! Protocol error types.

use thiserror::Error;

/// Errors produced while interpreting protocol messages.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// Numeric message code does not name a known message type
    #[error("unknown message code: {0}")]
    UnknownMessageCode(u16),
}
