//! Error handling for Plotkit
//!
//! Provides error types for every stage of the drawing pipeline:
//! - Command errors (parsing/validation of wire lines)
//! - Connection errors (transport)
//! - Actuator errors (motion execution)
//! - Dispatch errors (fatal conditions in the dispatch loop)
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Command error type
///
/// Raised while turning a wire line into a [`crate::Command`]. These are always
/// recoverable: the line is logged and discarded, and ingestion continues.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The command name is not one of `nop`, `point`, `line`, `polyline`
    #[error("Unrecognized command: \"{name}\"")]
    UnknownCommand {
        /// The offending command name.
        name: String,
    },

    /// Wrong parameter count or a parameter that is not a finite number
    #[error("Malformed arguments for '{command}': {reason}")]
    MalformedArguments {
        /// The command whose arguments were rejected.
        command: String,
        /// Why the arguments were rejected.
        reason: String,
    },

    /// The line is not valid UTF-8
    #[error("Line is not valid UTF-8 ({len} bytes)")]
    InvalidEncoding {
        /// Length of the rejected line in bytes.
        len: usize,
    },

    /// The line exceeded the configured maximum length
    #[error("Line exceeds {limit} bytes")]
    LineTooLong {
        /// The configured limit in bytes.
        limit: usize,
    },
}

impl CommandError {
    pub(crate) fn malformed(command: &str, reason: impl Into<String>) -> Self {
        CommandError::MalformedArguments {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

/// Connection error type
///
/// Ends servicing of the current connection only. Queue contents are untouched.
#[derive(Error, Debug, Clone)]
pub enum ConnectionError {
    /// Failed to bind the listening endpoint
    #[error("Failed to bind {address}: {reason}")]
    BindFailed {
        /// The address that could not be bound.
        address: String,
        /// The reason the bind failed.
        reason: String,
    },

    /// Failed to accept a pending connection
    #[error("Failed to accept connection: {reason}")]
    AcceptFailed {
        /// The reason the accept failed.
        reason: String,
    },

    /// Connection lost while reading
    #[error("Connection lost: {reason}")]
    ConnectionLost {
        /// The reason the connection was lost.
        reason: String,
    },
}

/// Actuator error type
///
/// Any of these halts the dispatch loop: the pen state is unknown after a failed move.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ActuatorError {
    /// The actuator is not connected or not ready
    #[error("Actuator not ready: {reason}")]
    NotReady {
        /// The reason the actuator is not ready.
        reason: String,
    },

    /// A motion could not be executed
    #[error("Motion failed: {reason}")]
    MotionFailed {
        /// The reason the motion failed.
        reason: String,
    },

    /// A path with no edges was submitted
    #[error("Cannot draw an empty path")]
    EmptyPath,

    /// Output to the motion target failed
    #[error("Actuator I/O error: {reason}")]
    Io {
        /// The reason for the I/O failure.
        reason: String,
    },
}

impl From<std::io::Error> for ActuatorError {
    fn from(e: std::io::Error) -> Self {
        ActuatorError::Io {
            reason: e.to_string(),
        }
    }
}

/// Dispatch error type
///
/// Fatal conditions that stop the dispatch loop.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DispatchError {
    /// The actuator failed to execute a stroke
    #[error("Drawing halted: {0}")]
    Actuator(#[from] ActuatorError),

    /// A command that could never have passed the parser reached the dispatcher
    #[error("Queue invariant violated: {command}")]
    InvariantViolation {
        /// The wire form of the offending command.
        command: String,
    },
}
