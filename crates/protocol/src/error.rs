//! Protocol error types.

use thiserror::Error;

/// Errors that can occur while framing or parsing protocol messages.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Invalid packet opcode: {0:#04x}")]
    InvalidOpcode(u8),

    #[error("Unexpected end of data")]
    UnexpectedEof,

    #[error("Unsupported protocol version: {0}")]
    UnsupportedProtocol(u32),

    #[error("Frame of {len} bytes exceeds limit of {max}")]
    FrameTooLarge { len: usize, max: usize },

    #[error("Empty frame")]
    EmptyFrame,

    #[error("{0} trailing bytes after packet")]
    TrailingBytes(usize),

    #[error("String is not valid UTF-8")]
    InvalidUtf8,
}
