//! Dual-mode JSON marshaler for RPC-to-HTTP gateways.
//!
//! A gateway converts values crossing the HTTP boundary: request bodies into
//! in-memory protobuf messages, and messages (or untyped values such as error
//! payloads) into response bodies. This crate provides the adapter the gateway
//! calls for that, deciding per value between two encodings:
//!
//! - **Schema-aware** (proto3 JSON mapping via `prost-reflect`) for values that
//!   carry a message descriptor: json names, enum names, 64-bit integers as
//!   strings, well-known types, optional pretty-printing.
//! - **Generic** (`serde_json`) for everything else.
//!
//! ## Modules
//!
//! - [`config`]: Immutable marshal/unmarshal configuration
//! - [`payload`]: Tagged dispatch types ([`Payload`], [`Target`])
//! - [`marshaler`]: The gateway contract and [`ProtoJsonMarshaler`]
//! - [`encoder`]: Newline-delimited frame writer
//! - [`decoder`]: Sequential frame reader
//! - [`error`]: The [`Error`] type
//!
//! ## Example
//!
//! ```ignore
//! use protojson_marshaler::{Payload, ProtoJsonMarshaler, Target};
//!
//! let marshaler = ProtoJsonMarshaler::new("  ");
//!
//! let body = marshaler.marshal(Payload::message(&reply))?;
//! marshaler.unmarshal(&request_body, Target::message(&mut request))?;
//!
//! let mut encoder = marshaler.encoder(&mut response_body);
//! encoder.encode(Payload::message(&first))?;
//! encoder.encode(Payload::message(&second))?;
//! ```

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod marshaler;
pub mod payload;

mod json;
mod protojson;

#[cfg(test)]
mod testing;

pub use config::{MarshalConfiguration, UnmarshalConfiguration};
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::Error;
pub use marshaler::{
    BoxedMarshaler, Decode, Encode, JSON_CONTENT_TYPE, Marshaler, ProtoJsonMarshaler,
};
pub use payload::{GenericTarget, Payload, Target, TypedMessage};

// Re-export the crates that appear in the public API
pub use erased_serde;
pub use prost;
pub use prost_reflect;
pub use serde_json;
