//! Sequential frame reader.
//!
//! Frames are located with generic JSON framing rules (one complete JSON
//! value at a time, separated by whitespace). Schema-aware targets then get
//! the raw bytes of that frame handed to the proto3 JSON decoder, which works
//! on complete buffers rather than streams.

use std::io::Read;
use std::sync::Arc;

use crate::config::UnmarshalConfiguration;
use crate::error::Error;
use crate::json::FrameReader;
use crate::payload::Target;
use crate::protojson;

/// Reads a sequence of values from one input stream.
///
/// Created by [`ProtoJsonMarshaler::decoder`](crate::ProtoJsonMarshaler::decoder).
/// The stream is read through an internal buffer, so bytes past the current
/// frame may already have been consumed from it; the decoder must be the
/// stream's only reader.
///
/// # Limits
///
/// A frame may nest objects and arrays at most 127 levels deep. Deeper frames
/// fail with [`Error::Json`] (`recursion limit exceeded`), and the stream
/// cannot be read past them.
///
/// # Example
///
/// ```ignore
/// let mut decoder = marshaler.decoder(body);
/// loop {
///     let mut message = DynamicMessage::new(descriptor.clone());
///     match decoder.decode(Target::message(&mut message)) {
///         Ok(()) => handle(message),
///         Err(e) if e.is_end_of_stream() => break,
///         Err(e) => return Err(e),
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Decoder<R: Read> {
    config: Arc<UnmarshalConfiguration>,
    inner: FrameReader<R>,
}

impl<R: Read> Decoder<R> {
    pub(crate) fn new(reader: R, config: Arc<UnmarshalConfiguration>) -> Self {
        Self {
            config,
            inner: FrameReader::new(reader),
        }
    }

    /// Decode the next frame into `target`.
    ///
    /// Returns [`Error::EndOfStream`] when the stream ends between frames.
    /// On any error the stream position is left wherever the failing read
    /// stopped; treat it as terminal for this stream.
    pub fn decode(&mut self, target: Target<'_>) -> Result<(), Error> {
        match target {
            Target::Generic(target) => {
                self.inner.decode(target)?;
                tracing::trace!(frame = "generic", offset = self.byte_offset(), "frame read");
                Ok(())
            }
            Target::Message(target) => {
                let raw = self.inner.next_raw()?;
                protojson::unmarshal(raw.get().as_bytes(), &self.config, target).inspect_err(
                    |e| tracing::debug!(error = %e, "message deserialization failed"),
                )?;

                tracing::trace!(frame = "message", offset = self.byte_offset(), "frame read");
                Ok(())
            }
        }
    }

    /// The configuration schema-aware frames are decoded with.
    pub fn config(&self) -> &UnmarshalConfiguration {
        &self.config
    }

    /// Bytes of the stream consumed by the frames decoded so far.
    pub fn byte_offset(&self) -> usize {
        self.inner.byte_offset()
    }
}
