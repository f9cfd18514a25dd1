//! Schema-aware (proto3 JSON) encoding backed by `prost-reflect`.

use prost_reflect::DynamicMessage;
use serde_json::ser::{PrettyFormatter, Serializer};

use crate::config::{MarshalConfiguration, UnmarshalConfiguration};
use crate::error::Error;
use crate::payload::TypedMessage;

/// Encode `message` into a complete buffer.
///
/// No trailing delimiter is written.
pub(crate) fn marshal(
    message: &dyn TypedMessage,
    config: &MarshalConfiguration,
) -> Result<Vec<u8>, Error> {
    let dynamic = message.to_dynamic();
    let options = config.serialize_options();
    let mut buf = Vec::new();

    let result = if config.is_compact() {
        let mut ser = Serializer::new(&mut buf);
        dynamic.serialize_with_options(&mut ser, &options)
    } else {
        let formatter = PrettyFormatter::with_indent(config.indent().as_bytes());
        let mut ser = Serializer::with_formatter(&mut buf, formatter);
        dynamic.serialize_with_options(&mut ser, &options)
    };
    result.map_err(Error::Message)?;

    Ok(buf)
}

/// Decode `data` into `target`, replacing everything it held before.
///
/// Trailing non-whitespace after the message is rejected.
pub(crate) fn unmarshal(
    data: &[u8],
    config: &UnmarshalConfiguration,
    target: &mut dyn TypedMessage,
) -> Result<(), Error> {
    let options = config.deserialize_options();
    let mut de = serde_json::Deserializer::from_slice(data);

    let decoded =
        DynamicMessage::deserialize_with_options(target.message_descriptor(), &mut de, &options)
            .map_err(Error::Message)?;
    de.end().map_err(Error::Message)?;

    target.replace_with(decoded)?;
    Ok(())
}
