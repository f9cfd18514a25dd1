//! Generic (`serde_json`) encoding, whole-buffer and streaming.

use std::io::{BufReader, Read, Write};

use serde::Serialize;
use serde_json::StreamDeserializer;
use serde_json::de::IoRead;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::value::RawValue;

use crate::error::Error;
use crate::payload::GenericTarget;

/// Encode `value` into a complete buffer, pretty-printed when `indent` is non-empty.
pub(crate) fn marshal(
    value: &dyn erased_serde::Serialize,
    indent: &str,
) -> Result<Vec<u8>, Error> {
    if indent.is_empty() {
        return serde_json::to_vec(value).map_err(Error::json);
    }

    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(indent.as_bytes());
    let mut ser = Serializer::with_formatter(&mut buf, formatter);
    Serialize::serialize(value, &mut ser).map_err(Error::json)?;
    Ok(buf)
}

/// Decode `data` into `target`.
pub(crate) fn unmarshal(data: &[u8], target: &mut dyn GenericTarget) -> Result<(), Error> {
    target.assign_json(data).map_err(Error::json)
}

/// Writes compact JSON values, each followed by `\n`.
#[derive(Debug)]
pub(crate) struct LineWriter<W> {
    writer: W,
}

impl<W: Write> LineWriter<W> {
    pub(crate) fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Serialize `value` and write it with its delimiter in one `write_all`.
    ///
    /// Nothing is written if serialization fails. Returns the frame length.
    pub(crate) fn encode(&mut self, value: &dyn erased_serde::Serialize) -> Result<usize, Error> {
        let mut frame = serde_json::to_vec(value).map_err(Error::json)?;
        frame.push(b'\n');
        self.writer.write_all(&frame)?;
        Ok(frame.len())
    }

    pub(crate) fn get_ref(&self) -> &W {
        &self.writer
    }

    pub(crate) fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    pub(crate) fn into_inner(self) -> W {
        self.writer
    }
}

/// Splits a byte stream into consecutive JSON values.
///
/// Values may be separated by any JSON whitespace, so both newline-delimited
/// and pretty-printed multi-line frames are accepted. Frames nested deeper
/// than `serde_json`'s recursion limit (128 levels) are rejected.
pub(crate) struct FrameReader<R: Read> {
    frames: StreamDeserializer<'static, IoRead<BufReader<R>>, Box<RawValue>>,
}

impl<R: Read> FrameReader<R> {
    pub(crate) fn new(reader: R) -> Self {
        Self {
            frames: serde_json::Deserializer::from_reader(BufReader::new(reader)).into_iter(),
        }
    }

    /// Read the next complete value without interpreting it.
    ///
    /// Returns [`Error::EndOfStream`] once only whitespace remains. After any
    /// other error the reader is exhausted.
    pub(crate) fn next_raw(&mut self) -> Result<Box<RawValue>, Error> {
        match self.frames.next() {
            Some(frame) => frame.map_err(Error::json),
            None => Err(Error::EndOfStream),
        }
    }

    /// Read the next value into `target`.
    pub(crate) fn decode(&mut self, target: &mut dyn GenericTarget) -> Result<(), Error> {
        let raw = self.next_raw()?;
        unmarshal(raw.get().as_bytes(), target)
    }

    /// Bytes consumed from the stream by the frames read so far.
    pub(crate) fn byte_offset(&self) -> usize {
        self.frames.byte_offset()
    }
}

impl<R: Read> std::fmt::Debug for FrameReader<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameReader")
            .field("byte_offset", &self.byte_offset())
            .finish()
    }
}
