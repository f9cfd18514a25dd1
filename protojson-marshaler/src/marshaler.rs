//! The gateway's serialization contract and its proto3 JSON implementation.
//!
//! The gateway talks to a [`Marshaler`] for whole bodies and asks it for an
//! [`Encode`] / [`Decode`] stream session per streaming request or response.
//! [`ProtoJsonMarshaler`] is the implementation this crate provides; it
//! dispatches every value to schema-aware or generic encoding.

use std::io::{Read, Write};
use std::sync::Arc;

use crate::config::{MarshalConfiguration, UnmarshalConfiguration};
use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::Error;
use crate::json;
use crate::payload::{Payload, Target};
use crate::protojson;

/// Media type of everything this crate produces.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Serialization contract consumed by the gateway.
///
/// Object safe, so a gateway can hold any implementation behind a
/// [`BoxedMarshaler`].
pub trait Marshaler: Send + Sync + 'static {
    /// Encode one value into a complete buffer.
    fn marshal(&self, value: Payload<'_>) -> Result<Vec<u8>, Error>;

    /// Decode a complete buffer into `target`.
    fn unmarshal(&self, data: &[u8], target: Target<'_>) -> Result<(), Error>;

    /// Start a stream session that writes frames to `writer`.
    fn new_encoder<'w>(&self, writer: Box<dyn Write + Send + 'w>) -> Box<dyn Encode + Send + 'w>;

    /// Start a stream session that reads frames from `reader`.
    fn new_decoder<'r>(&self, reader: Box<dyn Read + Send + 'r>) -> Box<dyn Decode + Send + 'r>;

    /// The media type for `value`.
    fn content_type(&self, value: Payload<'_>) -> &'static str;
}

/// Writes one frame per call onto a stream.
pub trait Encode {
    fn encode(&mut self, value: Payload<'_>) -> Result<(), Error>;
}

/// Reads one frame per call from a stream.
pub trait Decode {
    fn decode(&mut self, target: Target<'_>) -> Result<(), Error>;
}

impl<W: Write> Encode for Encoder<W> {
    fn encode(&mut self, value: Payload<'_>) -> Result<(), Error> {
        Encoder::encode(self, value)
    }
}

impl<R: Read> Decode for Decoder<R> {
    fn decode(&mut self, target: Target<'_>) -> Result<(), Error> {
        Decoder::decode(self, target)
    }
}

/// Dual-mode marshaler: proto3 JSON for schema-aware messages, plain
/// `serde_json` for everything else.
///
/// Immutable after construction and cheap to clone; one instance can serve
/// any number of concurrent requests. Each [`Encoder`] / [`Decoder`] it creates
/// belongs to a single stream.
///
/// # Example
///
/// ```rust
/// use protojson_marshaler::{Payload, ProtoJsonMarshaler};
///
/// let marshaler = ProtoJsonMarshaler::new("  ");
/// let body = marshaler
///     .marshal(Payload::generic(&serde_json::json!({"status": "ok"})))
///     .unwrap();
/// assert_eq!(body, b"{\n  \"status\": \"ok\"\n}");
/// assert_eq!(marshaler.content_type(Payload::generic(&())), "application/json");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ProtoJsonMarshaler {
    marshal_config: Arc<MarshalConfiguration>,
    unmarshal_config: Arc<UnmarshalConfiguration>,
}

impl ProtoJsonMarshaler {
    /// Create a marshaler with the given indent unit and default options.
    ///
    /// An empty indent unit means compact output.
    pub fn new<S: Into<String>>(indent: S) -> Self {
        Self::with_configuration(
            MarshalConfiguration::new(indent),
            UnmarshalConfiguration::default(),
        )
    }

    /// Create a marshaler with explicit configuration.
    pub fn with_configuration(
        marshal_config: MarshalConfiguration,
        unmarshal_config: UnmarshalConfiguration,
    ) -> Self {
        Self {
            marshal_config: Arc::new(marshal_config),
            unmarshal_config: Arc::new(unmarshal_config),
        }
    }

    pub fn marshal_config(&self) -> &MarshalConfiguration {
        &self.marshal_config
    }

    pub fn unmarshal_config(&self) -> &UnmarshalConfiguration {
        &self.unmarshal_config
    }

    /// Encode one value into a complete buffer.
    ///
    /// Schema-aware messages use the full [`MarshalConfiguration`]; generic
    /// values are pretty-printed with the same indent unit when one is set.
    pub fn marshal(&self, value: Payload<'_>) -> Result<Vec<u8>, Error> {
        match value {
            Payload::Message(message) => protojson::marshal(message, &self.marshal_config),
            Payload::Generic(value) => json::marshal(value, self.marshal_config.indent()),
        }
    }

    /// Decode a complete buffer into `target`.
    ///
    /// Schema-aware targets are fully replaced; fields absent from `data`
    /// end up at their defaults.
    pub fn unmarshal(&self, data: &[u8], target: Target<'_>) -> Result<(), Error> {
        match target {
            Target::Message(target) => protojson::unmarshal(data, &self.unmarshal_config, target),
            Target::Generic(target) => json::unmarshal(data, target),
        }
    }

    /// Start a stream session that writes frames to `writer`.
    pub fn encoder<W: Write>(&self, writer: W) -> Encoder<W> {
        Encoder::new(writer, Arc::clone(&self.marshal_config))
    }

    /// Start a stream session that reads frames from `reader`.
    pub fn decoder<R: Read>(&self, reader: R) -> Decoder<R> {
        Decoder::new(reader, Arc::clone(&self.unmarshal_config))
    }

    /// Always [`JSON_CONTENT_TYPE`].
    pub fn content_type(&self, _value: Payload<'_>) -> &'static str {
        JSON_CONTENT_TYPE
    }
}

impl Marshaler for ProtoJsonMarshaler {
    fn marshal(&self, value: Payload<'_>) -> Result<Vec<u8>, Error> {
        ProtoJsonMarshaler::marshal(self, value)
    }

    fn unmarshal(&self, data: &[u8], target: Target<'_>) -> Result<(), Error> {
        ProtoJsonMarshaler::unmarshal(self, data, target)
    }

    fn new_encoder<'w>(&self, writer: Box<dyn Write + Send + 'w>) -> Box<dyn Encode + Send + 'w> {
        Box::new(self.encoder(writer))
    }

    fn new_decoder<'r>(&self, reader: Box<dyn Read + Send + 'r>) -> Box<dyn Decode + Send + 'r> {
        Box::new(self.decoder(reader))
    }

    fn content_type(&self, value: Payload<'_>) -> &'static str {
        ProtoJsonMarshaler::content_type(self, value)
    }
}

/// A boxed marshaler for type-erased storage in the gateway.
#[derive(Clone)]
pub struct BoxedMarshaler(Arc<dyn Marshaler>);

impl BoxedMarshaler {
    /// Create a new boxed marshaler.
    pub fn new<M: Marshaler>(marshaler: M) -> Self {
        BoxedMarshaler(Arc::new(marshaler))
    }

    pub fn marshal(&self, value: Payload<'_>) -> Result<Vec<u8>, Error> {
        self.0.marshal(value)
    }

    pub fn unmarshal(&self, data: &[u8], target: Target<'_>) -> Result<(), Error> {
        self.0.unmarshal(data, target)
    }

    pub fn new_encoder<'w>(
        &self,
        writer: Box<dyn Write + Send + 'w>,
    ) -> Box<dyn Encode + Send + 'w> {
        self.0.new_encoder(writer)
    }

    pub fn new_decoder<'r>(
        &self,
        reader: Box<dyn Read + Send + 'r>,
    ) -> Box<dyn Decode + Send + 'r> {
        self.0.new_decoder(reader)
    }

    pub fn content_type(&self, value: Payload<'_>) -> &'static str {
        self.0.content_type(value)
    }
}

impl std::fmt::Debug for BoxedMarshaler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoxedMarshaler")
            .field(&self.content_type(Payload::generic(&())))
            .finish()
    }
}
