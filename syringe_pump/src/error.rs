use std::io;

use utilities::command_executor::Disconnected;

pub type Result<T> = std::result::Result<T, DispenserError>;

#[derive(Debug, thiserror::Error)]
pub enum DispenserError {
    #[error("Invalid configuration for axis {axis}: {reason}")]
    InvalidConfiguration { axis: String, reason: String },

    #[error("Axis {0} is not configured")]
    UnknownAxis(String),

    #[error("Invalid volume {0}, expected a finite non-zero number of ml")]
    InvalidVolume(f64),

    #[error("Invalid duration {0}, expected a finite positive number of seconds")]
    InvalidDuration(f64),

    #[error("Transport error: {0}")]
    Transport(#[from] io::Error),

    #[error(transparent)]
    Executor(#[from] Disconnected),

    #[error("Unexpected response type")]
    UnexpectedResponse,
}
