//! Station error types
//!
//! Errors raised while validating input or talking to the station server.

use thiserror::Error;

use crate::login::ValidationError;
use crate::session::ControlAction;

/// Generic message shown for transport and parse failures.
pub const SERVER_COMMUNICATION_ERROR: &str = "Error al comunicarse con el servidor";

/// Errors that can occur while driving the station
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StationError {
    /// Input rejected before any request was made
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Server answered with a non-success status or an error payload
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Request could not be delivered (connection refused, timeout, abort)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Response body was not what the endpoint promises
    #[error("Parse error: {0}")]
    Parse(String),

    /// The same action is already waiting for a response
    #[error("Action already in progress: {0}")]
    Busy(ControlAction),

    /// The operation was invalidated before its response arrived
    #[error("Operation cancelled")]
    Cancelled,

    /// Client could not be built from the given settings
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StationError {
    /// Message suitable for showing to the operator.
    ///
    /// Server-reported messages are passed through verbatim; transport and
    /// parse failures collapse into one localized message.
    pub fn user_message(&self) -> String {
        match self {
            StationError::Validation(e) => e.to_string(),
            StationError::Server { message, .. } => message.clone(),
            StationError::Transport(_) | StationError::Parse(_) => {
                SERVER_COMMUNICATION_ERROR.to_string()
            }
            StationError::Busy(_) => "Operación en curso, espere la respuesta".to_string(),
            StationError::Cancelled => "Operación cancelada".to_string(),
            StationError::Config(msg) => format!("Configuración inválida: {}", msg),
        }
    }

    /// True for failures where the request never produced a usable response.
    pub fn is_transport(&self) -> bool {
        matches!(self, StationError::Transport(_) | StationError::Parse(_))
    }
}

impl From<serde_json::Error> for StationError {
    fn from(err: serde_json::Error) -> Self {
        StationError::Parse(err.to_string())
    }
}

#[cfg(feature = "native")]
impl From<reqwest::Error> for StationError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StationError::Parse(err.to_string())
        } else {
            StationError::Transport(err.to_string())
        }
    }
}

/// Result type for station operations
pub type StationResult<T> = Result<T, StationError>;
