//! Tagged dispatch between schema-aware and generic values.
//!
//! Values enter the marshaler as a [`Payload`] (something to encode) or a
//! [`Target`] (somewhere to decode into). Each is either a schema-aware
//! message or a generic value; the tag is decided once, by the constructor,
//! and every operation matches on it exactly once.

use prost::{DecodeError, Message};
use prost_reflect::{DynamicMessage, MessageDescriptor, ReflectMessage};
use serde::{Serialize, de::DeserializeOwned};

/// A value the schema-aware serializer can handle.
///
/// Implemented for every [`ReflectMessage`], i.e. any prost message that
/// carries its [`MessageDescriptor`], including [`DynamicMessage`].
pub trait TypedMessage {
    /// The schema describing this message.
    fn message_descriptor(&self) -> MessageDescriptor;

    /// Copy this message into its dynamic representation.
    fn to_dynamic(&self) -> DynamicMessage;

    /// Replace the contents of this message with `message`.
    ///
    /// Previously set fields are cleared first.
    fn replace_with(&mut self, message: DynamicMessage) -> Result<(), DecodeError>;
}

impl<M: ReflectMessage> TypedMessage for M {
    fn message_descriptor(&self) -> MessageDescriptor {
        self.descriptor()
    }

    fn to_dynamic(&self) -> DynamicMessage {
        self.transcode_to_dynamic()
    }

    fn replace_with(&mut self, message: DynamicMessage) -> Result<(), DecodeError> {
        self.clear();
        self.merge(message.encode_to_vec().as_slice())
    }
}

/// A generic (non-schema) value that can be filled from JSON.
///
/// Implemented for every [`DeserializeOwned`] type.
pub trait GenericTarget {
    /// Replace this value with the one decoded from `json`.
    fn assign_json(&mut self, json: &[u8]) -> serde_json::Result<()>;
}

impl<T: DeserializeOwned> GenericTarget for T {
    fn assign_json(&mut self, json: &[u8]) -> serde_json::Result<()> {
        *self = serde_json::from_slice(json)?;
        Ok(())
    }
}

/// A value to encode.
#[derive(Clone, Copy)]
pub enum Payload<'a> {
    /// Encoded with the proto3 JSON mapping.
    Message(&'a dyn TypedMessage),
    /// Encoded with `serde_json`.
    Generic(&'a dyn erased_serde::Serialize),
}

impl<'a> Payload<'a> {
    /// Wrap a schema-aware message.
    pub fn message<M: ReflectMessage>(message: &'a M) -> Self {
        Payload::Message(message)
    }

    /// Wrap any serializable value (mappings, error descriptors, ...).
    pub fn generic<T: Serialize>(value: &'a T) -> Self {
        Payload::Generic(value)
    }

    /// Returns `true` for the schema-aware variant.
    pub fn is_message(&self) -> bool {
        matches!(self, Payload::Message(_))
    }
}

impl std::fmt::Debug for Payload<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Payload::Message(m) => f
                .debug_tuple("Message")
                .field(&m.message_descriptor().full_name())
                .finish(),
            Payload::Generic(_) => f.write_str("Generic"),
        }
    }
}

/// A value to decode into.
pub enum Target<'a> {
    /// Filled with the proto3 JSON mapping.
    Message(&'a mut dyn TypedMessage),
    /// Filled with `serde_json`.
    Generic(&'a mut dyn GenericTarget),
}

impl<'a> Target<'a> {
    /// Wrap a schema-aware message.
    pub fn message<M: ReflectMessage>(message: &'a mut M) -> Self {
        Target::Message(message)
    }

    /// Wrap any deserializable value.
    pub fn generic<T: DeserializeOwned>(value: &'a mut T) -> Self {
        Target::Generic(value)
    }

    /// Returns `true` for the schema-aware variant.
    pub fn is_message(&self) -> bool {
        matches!(self, Target::Message(_))
    }
}

impl std::fmt::Debug for Target<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Target::Message(m) => f
                .debug_tuple("Message")
                .field(&m.message_descriptor().full_name())
                .finish(),
            Target::Generic(_) => f.write_str("Generic"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample, sample_descriptor, string_field};

    #[test]
    fn test_payload_classification() {
        let message = sample("a", 1);
        let mapping = serde_json::json!({"a": 1});

        assert!(Payload::message(&message).is_message());
        assert!(!Payload::generic(&mapping).is_message());
        assert!(!Payload::generic(&()).is_message());
    }

    #[test]
    fn test_target_classification() {
        let mut message = DynamicMessage::new(sample_descriptor());
        let mut mapping = serde_json::Value::Null;

        assert!(Target::message(&mut message).is_message());
        assert!(!Target::generic(&mut mapping).is_message());
    }

    #[test]
    fn test_payload_debug_names_message_type() {
        let message = sample("a", 1);
        assert_eq!(
            format!("{:?}", Payload::message(&message)),
            "Message(\"demo.Sample\")"
        );
        assert_eq!(format!("{:?}", Payload::generic(&1)), "Generic");
    }

    #[test]
    fn test_replace_with_clears_previous_fields() {
        let mut target = sample("old", 9);
        let mut replacement = DynamicMessage::new(sample_descriptor());
        replacement.set_field_by_name("name", prost_reflect::Value::String("new".into()));

        target.replace_with(replacement).unwrap();

        assert_eq!(string_field(&target, "name"), "new");
        assert_eq!(
            target.get_field_by_name("value").unwrap().as_i32(),
            Some(0)
        );
    }

    #[test]
    fn test_generic_target_replaces_value() {
        let mut value = vec![1, 2, 3];
        value.assign_json(b"[4]").unwrap();
        assert_eq!(value, vec![4]);

        let err = value.assign_json(b"{\"a\":1}").unwrap_err();
        assert!(err.is_data());
    }
}
