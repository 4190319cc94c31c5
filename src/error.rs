//! Unified error type for sunshine-face.
//!
//! No variant carries heap data so the enum stays `Copy` and can be logged
//! with `defmt` on target.

use core::fmt;

/// Top-level error type used across the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // Sync channel
    /// The synchronization channel is not connected.
    NotConnected,

    /// Connecting to the synchronization channel failed.
    ConnectFailed,

    /// The channel refused or lost a document request.
    Transport,

    /// A sync document could not be encoded or decoded.
    Codec(CodecError),

    // Forecast store
    /// The forecast store could not run the query.
    QueryFailed,

    // Display
    /// Drawing to the display failed.
    Display,

    // Generic
    /// A fixed-capacity buffer or queue is full.
    BufferOverflow,
}

/// Errors of the sync document wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CodecError {
    /// Input ended in the middle of an entry.
    Truncated,
    /// Value tag is not one of the known wire types.
    UnknownTag(u8),
    /// A key or string value is not valid UTF-8.
    InvalidUtf8,
    /// A string does not fit its fixed-capacity field.
    FieldTooLong,
    /// The output buffer is too small for the encoded document.
    BufferTooSmall,
}

impl From<CodecError> for Error {
    fn from(e: CodecError) -> Self {
        Error::Codec(e)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotConnected => f.write_str("sync channel not connected"),
            Error::ConnectFailed => f.write_str("sync channel connection failed"),
            Error::Transport => f.write_str("sync channel request failed"),
            Error::Codec(e) => write!(f, "sync document codec: {e}"),
            Error::QueryFailed => f.write_str("forecast query failed"),
            Error::Display => f.write_str("display error"),
            Error::BufferOverflow => f.write_str("buffer overflow"),
        }
    }
}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Truncated => f.write_str("truncated input"),
            CodecError::UnknownTag(tag) => write!(f, "unknown value tag {tag:#04x}"),
            CodecError::InvalidUtf8 => f.write_str("invalid utf-8"),
            CodecError::FieldTooLong => f.write_str("field too long"),
            CodecError::BufferTooSmall => f.write_str("buffer too small"),
        }
    }
}

/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codec_error_converts_into_error() {
        let e: Error = CodecError::Truncated.into();
        assert_eq!(e, Error::Codec(CodecError::Truncated));
    }

    #[test]
    fn display_names_the_unknown_tag() {
        let text = Error::Codec(CodecError::UnknownTag(0x7f)).to_string();
        assert_eq!(text, "sync document codec: unknown value tag 0x7f");
    }
}
