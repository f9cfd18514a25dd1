//! Newline-delimited frame writer.
//!
//! Every call to [`Encoder::encode`] writes exactly one frame: one JSON value
//! followed by a single `\n`, so readers can split the stream uniformly no
//! matter which encoding produced the value.

use std::io::Write;
use std::sync::Arc;

use crate::config::MarshalConfiguration;
use crate::error::Error;
use crate::json::LineWriter;
use crate::payload::Payload;
use crate::protojson;

/// Frame delimiter.
const DELIMITER: &[u8] = b"\n";

/// Writes a sequence of values onto one output stream.
///
/// Created by [`ProtoJsonMarshaler::encoder`](crate::ProtoJsonMarshaler::encoder).
/// Frames are written in call order; nothing is buffered across calls.
///
/// # Frame Format
///
/// - Schema-aware messages are rendered with the marshaler's
///   [`MarshalConfiguration`] (pretty-printed when an indent unit is set).
/// - Generic values are always rendered compactly.
///
/// ```text
/// {"name":"a","value":1}\n
/// {"code":5,"message":"not found"}\n
/// ```
#[derive(Debug)]
pub struct Encoder<W> {
    config: Arc<MarshalConfiguration>,
    inner: LineWriter<W>,
}

impl<W: Write> Encoder<W> {
    pub(crate) fn new(writer: W, config: Arc<MarshalConfiguration>) -> Self {
        Self {
            config,
            inner: LineWriter::new(writer),
        }
    }

    /// Encode one value as one frame.
    ///
    /// If a schema-aware message fails to serialize, nothing is written.
    /// If the stream fails mid-frame, the partial frame stays on the stream;
    /// treat any error as terminal for this stream.
    pub fn encode(&mut self, value: Payload<'_>) -> Result<(), Error> {
        match value {
            Payload::Generic(value) => {
                let len = self.inner.encode(value)?;
                tracing::trace!(frame = "generic", bytes = len, "frame written");
                Ok(())
            }
            Payload::Message(message) => {
                let frame = protojson::marshal(message, &self.config).inspect_err(|e| {
                    tracing::debug!(error = %e, "message serialization failed, frame skipped")
                })?;

                let writer = self.inner.get_mut();
                writer.write_all(&frame)?;
                writer.write_all(DELIMITER)?;

                tracing::trace!(frame = "message", bytes = frame.len() + 1, "frame written");
                Ok(())
            }
        }
    }

    /// The configuration frames are rendered with.
    pub fn config(&self) -> &MarshalConfiguration {
        &self.config
    }

    /// Get a reference to the underlying stream.
    pub fn get_ref(&self) -> &W {
        self.inner.get_ref()
    }

    /// Get a mutable reference to the underlying stream, e.g. to flush it.
    ///
    /// Writing to it directly breaks framing.
    pub fn get_mut(&mut self) -> &mut W {
        self.inner.get_mut()
    }

    /// Unwrap the underlying stream.
    pub fn into_inner(self) -> W {
        self.inner.into_inner()
    }
}
