//! Marshaling error type.
//!
//! Every error produced by this crate is the first failing sub-operation's
//! error, carried untouched in the variant naming where it came from:
//! - [`Error::Message`]: the schema-aware (proto3 JSON) serializer
//! - [`Error::Transcode`]: merging a decoded message into a typed target
//! - [`Error::Json`]: the generic `serde_json` serializer or frame reader
//! - [`Error::Io`]: the underlying stream
//! - [`Error::EndOfStream`]: the input stream ended cleanly between frames

use std::io;

/// Errors returned by the marshaler, encoders and decoders.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Schema-aware serialization or deserialization failed
    /// (unknown field, type mismatch, unresolvable `Any` type, ...).
    #[error(transparent)]
    Message(serde_json::Error),

    /// A decoded message could not be merged into the typed target.
    #[error(transparent)]
    Transcode(#[from] prost::DecodeError),

    /// Generic JSON encoding or decoding failed (malformed JSON, type mismatch).
    #[error(transparent)]
    Json(serde_json::Error),

    /// Reading from or writing to the stream failed.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The input stream has no further frames.
    #[error("end of stream")]
    EndOfStream,
}

impl Error {
    /// Classify an error raised by the generic serializer.
    ///
    /// `serde_json` reports stream failures as its own error type; those are
    /// unwrapped back into the original [`io::Error`].
    pub(crate) fn json(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::Json(err)
        }
    }

    /// Returns `true` if this is the clean end-of-stream signal.
    ///
    /// A stream that ends in the middle of a frame is not a clean end; it
    /// surfaces as [`Error::Json`] with an EOF category instead.
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Error::EndOfStream)
    }

    /// Returns `true` if the error came from the schema-aware path.
    pub fn is_message(&self) -> bool {
        matches!(self, Error::Message(_) | Error::Transcode(_))
    }
}
