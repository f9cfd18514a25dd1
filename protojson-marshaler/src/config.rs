//! Marshal and unmarshal configuration.
//!
//! Both values are created once, when the marshaler is constructed, and are
//! shared read-only with every encoder and decoder it creates.

use prost_reflect::{DeserializeOptions, SerializeOptions};

/// Indent unit meaning "compact output, no pretty-printing".
pub const COMPACT: &str = "";

/// Options for schema-aware encoding, plus the indent unit that also applies
/// to whole-buffer generic encoding.
///
/// The defaults match the canonical proto3 JSON mapping: json field names,
/// enum names, fields holding default values omitted.
///
/// # Example
///
/// ```rust
/// use protojson_marshaler::MarshalConfiguration;
///
/// // Compact output
/// let config = MarshalConfiguration::default();
/// assert!(config.is_compact());
///
/// // Two-space indentation, proto field names
/// let config = MarshalConfiguration::new("  ").with_use_proto_names(true);
/// assert_eq!(config.indent(), "  ");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MarshalConfiguration {
    indent: String,
    use_proto_names: bool,
    use_enum_numbers: bool,
    emit_unpopulated: bool,
}

impl MarshalConfiguration {
    /// Create a configuration with the given indent unit.
    ///
    /// Any string is accepted; the empty string means compact output.
    pub fn new<S: Into<String>>(indent: S) -> Self {
        Self {
            indent: indent.into(),
            ..Default::default()
        }
    }

    /// The whitespace repeated per nesting level when pretty-printing.
    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Returns `true` when no pretty-printing is applied.
    pub fn is_compact(&self) -> bool {
        self.indent.is_empty()
    }

    /// Emit proto field names (`display_name`) instead of json names (`displayName`).
    pub fn with_use_proto_names(mut self, enabled: bool) -> Self {
        self.use_proto_names = enabled;
        self
    }

    /// Emit enum values as numbers instead of names.
    pub fn with_use_enum_numbers(mut self, enabled: bool) -> Self {
        self.use_enum_numbers = enabled;
        self
    }

    /// Emit fields that hold their default value.
    pub fn with_emit_unpopulated(mut self, enabled: bool) -> Self {
        self.emit_unpopulated = enabled;
        self
    }

    pub fn use_proto_names(&self) -> bool {
        self.use_proto_names
    }

    pub fn use_enum_numbers(&self) -> bool {
        self.use_enum_numbers
    }

    pub fn emit_unpopulated(&self) -> bool {
        self.emit_unpopulated
    }

    pub(crate) fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions::new()
            .stringify_64_bit_integers(true)
            .use_proto_field_name(self.use_proto_names)
            .use_enum_numbers(self.use_enum_numbers)
            .skip_default_fields(!self.emit_unpopulated)
    }
}

/// Options for schema-aware decoding.
///
/// [`ProtoJsonMarshaler::new`](crate::ProtoJsonMarshaler::new) always uses the
/// default, which rejects fields unknown to the target's schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UnmarshalConfiguration {
    discard_unknown: bool,
}

impl UnmarshalConfiguration {
    /// Silently skip fields the target's schema does not know.
    pub fn with_discard_unknown(mut self, enabled: bool) -> Self {
        self.discard_unknown = enabled;
        self
    }

    pub fn discard_unknown(&self) -> bool {
        self.discard_unknown
    }

    pub(crate) fn deserialize_options(&self) -> DeserializeOptions {
        DeserializeOptions::new().deny_unknown_fields(!self.discard_unknown)
    }
}
