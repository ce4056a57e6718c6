//! Vehicle client error types

use contracts::ContractError;
use thiserror::Error;

/// Vehicle client specific error
#[derive(Debug, Error)]
pub enum VehicleError {
    /// Simulator unreachable or handshake failed
    #[error("failed to connect to simulator: {message}")]
    ConnectionFailed { message: String },

    /// Operation issued before `connect`
    #[error("not connected to simulator")]
    NotConnected,

    /// The simulator refused or failed the command
    #[error("command '{command}' failed: {message}")]
    CommandRejected { command: String, message: String },

    /// Malformed or unexpected RPC frame
    #[error("rpc protocol error: {message}")]
    Protocol { message: String },

    /// Socket error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped ContractError
    #[error(transparent)]
    Contract(#[from] ContractError),
}

impl VehicleError {
    /// Create connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            message: message.into(),
        }
    }

    /// Create command rejection error
    pub fn rejected(command: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CommandRejected {
            command: command.into(),
            message: message.into(),
        }
    }

    /// Create protocol error
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

/// Result alias
pub type Result<T> = std::result::Result<T, VehicleError>;
