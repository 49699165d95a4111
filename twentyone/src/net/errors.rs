//! Network error types for framing and protocol operations.

use std::io;

use thiserror::Error;

use crate::game::{RoundError, entities::RoundResult};

/// The single decode failure. Which check failed is deliberately not
/// reported.
#[derive(Clone, Copy, Debug, Default, Eq, Error, PartialEq)]
#[error("invalid message")]
pub struct InvalidMessage;

/// Errors that end a session.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The peer sent bytes that don't decode to the expected message.
    #[error(transparent)]
    Invalid(#[from] InvalidMessage),

    /// The peer closed the connection mid-message.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A round ended before the initial deal finished.
    #[error("unexpected {0} during the initial deal")]
    UnexpectedResult(RoundResult),

    #[error(transparent)]
    Round(#[from] RoundError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for protocol operations
pub type Result<T> = std::result::Result<T, ProtocolError>;
