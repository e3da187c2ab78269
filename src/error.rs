//! Error types for the console.

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    #[error("No controlling terminal")]
    NoTerminal,

    #[error("Terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("Input stream closed")]
    InputClosed,

    #[error("A raw terminal session is already active")]
    AlreadyActive,

    #[error("Selection menu must have at least one option")]
    EmptyMenu,

    #[error("Invalid range: min {min} is greater than max {max}")]
    InvalidRange { min: i32, max: i32 },
}

impl ConsoleError {
    /// Errors that leave the terminal unusable for the rest of the session.
    pub fn is_environment(&self) -> bool {
        matches!(self, Self::NoTerminal | Self::Io(_) | Self::InputClosed)
    }
}

pub type Result<T> = std::result::Result<T, ConsoleError>;
