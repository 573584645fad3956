//! Error types for xbdm-rpc
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using RpcError
pub type Result<T> = std::result::Result<T, RpcError>;

/// Status code reported when the target cannot be reached
pub const E_CONNECT_FAILED: u32 = 0x82DA_0100;

/// Status code reported for mid-conversation failures
pub const E_IO_FAILURE: u32 = 0x82DA_0007;

/// Unified error type for xbdm-rpc operations
#[derive(Debug, Error)]
pub enum RpcError {
    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connect failed ({addr}): {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bad connection id: expected {expected}, got {got}")]
    BadConnectionId { expected: u64, got: u64 },

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Target reported error: {0}")]
    Protocol(String),

    #[error("The remote call agent is not installed on the target")]
    AgentNotInstalled,

    // -------------------------------------------------------------------------
    // Call Errors
    // -------------------------------------------------------------------------
    #[error("Cannot use more than {max} parameters in a call (got {count})")]
    ArgumentLimitExceeded { count: usize, max: usize },

    #[error("Decode mismatch: {0}")]
    DecodeMismatch(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RpcError {
    /// The 32-bit status code callers branch on, if this error carries one
    pub fn code(&self) -> Option<u32> {
        match self {
            RpcError::Connect { .. } => Some(E_CONNECT_FAILED),
            RpcError::Io(_) | RpcError::BadConnectionId { .. } | RpcError::AgentNotInstalled => {
                Some(E_IO_FAILURE)
            }
            _ => None,
        }
    }

    /// True when the target could not be reached at all
    pub fn is_connect_failure(&self) -> bool {
        self.code() == Some(E_CONNECT_FAILED)
    }
}
