//! Shared test fixtures: a small descriptor pool and stream doubles.

use std::io;
use std::sync::LazyLock;

use prost_reflect::{DescriptorPool, DynamicMessage, MessageDescriptor, Value};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, FileDescriptorSet,
};

static POOL: LazyLock<DescriptorPool> = LazyLock::new(|| {
    let any = FileDescriptorProto {
        name: Some("google/protobuf/any.proto".into()),
        package: Some("google.protobuf".into()),
        syntax: Some("proto3".into()),
        message_type: vec![DescriptorProto {
            name: Some("Any".into()),
            field: vec![
                field("type_url", 1, Type::String, None, "typeUrl"),
                field("value", 2, Type::Bytes, None, "value"),
            ],
            ..Default::default()
        }],
        ..Default::default()
    };

    let demo = FileDescriptorProto {
        name: Some("demo.proto".into()),
        package: Some("demo".into()),
        syntax: Some("proto3".into()),
        dependency: vec!["google/protobuf/any.proto".into()],
        enum_type: vec![EnumDescriptorProto {
            name: Some("State".into()),
            value: vec![
                enum_value("STATE_UNSPECIFIED", 0),
                enum_value("STATE_ACTIVE", 1),
            ],
            ..Default::default()
        }],
        message_type: vec![
            DescriptorProto {
                name: Some("Sample".into()),
                field: vec![
                    field("name", 1, Type::String, None, "name"),
                    field("value", 2, Type::Int32, None, "value"),
                ],
                ..Default::default()
            },
            DescriptorProto {
                name: Some("Envelope".into()),
                field: vec![
                    field("sample", 1, Type::Message, Some(".demo.Sample"), "sample"),
                    field("display_name", 2, Type::String, None, "displayName"),
                    field("count", 3, Type::Int64, None, "count"),
                    field("state", 4, Type::Enum, Some(".demo.State"), "state"),
                    FieldDescriptorProto {
                        label: Some(Label::Repeated as i32),
                        ..field("tags", 5, Type::String, None, "tags")
                    },
                    field(
                        "detail",
                        6,
                        Type::Message,
                        Some(".google.protobuf.Any"),
                        "detail",
                    ),
                ],
                ..Default::default()
            },
        ],
        ..Default::default()
    };

    DescriptorPool::from_file_descriptor_set(FileDescriptorSet {
        file: vec![any, demo],
    })
    .expect("test descriptors are valid")
});

fn field(
    name: &str,
    number: i32,
    ty: Type,
    type_name: Option<&str>,
    json_name: &str,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        type_name: type_name.map(Into::into),
        json_name: Some(json_name.into()),
        ..Default::default()
    }
}

fn enum_value(name: &str, number: i32) -> EnumValueDescriptorProto {
    EnumValueDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        ..Default::default()
    }
}

fn descriptor(name: &str) -> MessageDescriptor {
    POOL.get_message_by_name(name)
        .unwrap_or_else(|| panic!("{name} is registered"))
}

pub(crate) fn sample_descriptor() -> MessageDescriptor {
    descriptor("demo.Sample")
}

pub(crate) fn envelope_descriptor() -> MessageDescriptor {
    descriptor("demo.Envelope")
}

/// `demo.Sample { name, value }`
pub(crate) fn sample(name: &str, value: i32) -> DynamicMessage {
    let mut message = DynamicMessage::new(sample_descriptor());
    message.set_field_by_name("name", Value::String(name.into()));
    message.set_field_by_name("value", Value::I32(value));
    message
}

/// An envelope whose `detail` names a type the pool cannot resolve, so the
/// proto3 JSON serializer rejects it.
pub(crate) fn unresolvable_envelope() -> DynamicMessage {
    let mut any = DynamicMessage::new(descriptor("google.protobuf.Any"));
    any.set_field_by_name(
        "type_url",
        Value::String("type.googleapis.com/demo.Missing".into()),
    );

    let mut envelope = DynamicMessage::new(envelope_descriptor());
    envelope.set_field_by_name("detail", Value::Message(any));
    envelope
}

/// Field-by-field projection of a `demo.Envelope`.
///
/// Compares what the proto3 JSON mapping preserves: proto3 scalars compare by
/// value, the nested `sample` by presence and value.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EnvelopeView {
    pub sample: Option<(String, i32)>,
    pub display_name: String,
    pub count: i64,
    pub state: i32,
    pub tags: Vec<String>,
}

impl EnvelopeView {
    pub(crate) fn of(message: &DynamicMessage) -> Self {
        let sample = if message.has_field_by_name("sample") {
            message.get_field_by_name("sample").and_then(|v| {
                v.as_message()
                    .map(|s| (string_field(s, "name"), i32_field(s, "value")))
            })
        } else {
            None
        };

        let tags = message
            .get_field_by_name("tags")
            .and_then(|v| {
                v.as_list().map(|list| {
                    list.iter()
                        .filter_map(|t| t.as_str().map(str::to_owned))
                        .collect()
                })
            })
            .unwrap_or_default();

        Self {
            sample,
            display_name: string_field(message, "display_name"),
            count: message
                .get_field_by_name("count")
                .and_then(|v| v.as_i64())
                .unwrap_or_default(),
            state: message
                .get_field_by_name("state")
                .and_then(|v| v.as_enum_number())
                .unwrap_or_default(),
            tags,
        }
    }

    pub(crate) fn to_message(&self) -> DynamicMessage {
        let mut message = DynamicMessage::new(envelope_descriptor());
        if let Some((name, value)) = &self.sample {
            message.set_field_by_name("sample", Value::Message(sample(name, *value)));
        }
        message.set_field_by_name("display_name", Value::String(self.display_name.clone()));
        message.set_field_by_name("count", Value::I64(self.count));
        message.set_field_by_name("state", Value::EnumNumber(self.state));
        message.set_field_by_name(
            "tags",
            Value::List(self.tags.iter().cloned().map(Value::String).collect()),
        );
        message
    }
}

pub(crate) fn string_field(message: &DynamicMessage, name: &str) -> String {
    message
        .get_field_by_name(name)
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default()
}

pub(crate) fn i32_field(message: &DynamicMessage, name: &str) -> i32 {
    message
        .get_field_by_name(name)
        .and_then(|v| v.as_i32())
        .unwrap_or_default()
}

/// Writer that records every `write` call separately.
#[derive(Debug, Default)]
pub(crate) struct RecordingWriter {
    pub writes: Vec<Vec<u8>>,
}

impl RecordingWriter {
    pub(crate) fn bytes(&self) -> Vec<u8> {
        self.writes.concat()
    }
}

impl io::Write for RecordingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.writes.push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Writer that accepts `budget` writes, then fails every later one.
#[derive(Debug)]
pub(crate) struct FailingWriter {
    pub budget: usize,
    pub written: Vec<u8>,
}

impl FailingWriter {
    pub(crate) fn after(budget: usize) -> Self {
        Self {
            budget,
            written: Vec::new(),
        }
    }
}

impl io::Write for FailingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.budget == 0 {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "stream closed"));
        }
        self.budget -= 1;
        self.written.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reader whose every read fails.
pub(crate) struct BrokenReader;

impl io::Read for BrokenReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "peer reset"))
    }
}
