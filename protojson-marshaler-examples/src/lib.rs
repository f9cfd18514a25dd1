//! Greeting gateway built on [`protojson_marshaler`].
//!
//! Every body the gateway reads or writes goes through one [`BoxedMarshaler`]:
//! greetings as schema-aware messages, health and error bodies as generic
//! values.

use std::net::SocketAddr;

use axum::{
    Router,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bytes::Bytes;
use prost_reflect::{DescriptorPool, DynamicMessage, MessageDescriptor, Value};
use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{DescriptorProto, FieldDescriptorProto, FileDescriptorProto, FileDescriptorSet};
use protojson_marshaler::{BoxedMarshaler, Error, Payload, Target};
use serde::Serialize;

/// Fully qualified name of the greeting message.
pub const GREETING: &str = "demo.v1.Greeting";

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Returns the listen address from `PROTOJSON_ADDR`, defaulting to
/// `127.0.0.1:3000`.
pub fn server_addr() -> anyhow::Result<SocketAddr> {
    let addr = std::env::var("PROTOJSON_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.into());
    Ok(addr.parse()?)
}

/// Returns the indent unit from `PROTOJSON_INDENT`; unset means compact.
pub fn indent_from_env() -> String {
    std::env::var("PROTOJSON_INDENT").unwrap_or_default()
}

/// Descriptor pool holding the gateway's schema:
///
/// ```proto
/// package demo.v1;
/// message Greeting {
///   string name = 1;
///   string message = 2;
///   int64 sent_at_unix = 3;
/// }
/// ```
pub fn descriptor_pool() -> Result<DescriptorPool, prost_reflect::DescriptorError> {
    let file = FileDescriptorProto {
        name: Some("demo/v1/greeting.proto".into()),
        package: Some("demo.v1".into()),
        syntax: Some("proto3".into()),
        message_type: vec![DescriptorProto {
            name: Some("Greeting".into()),
            field: vec![
                scalar("name", 1, Type::String, "name"),
                scalar("message", 2, Type::String, "message"),
                scalar("sent_at_unix", 3, Type::Int64, "sentAtUnix"),
            ],
            ..Default::default()
        }],
        ..Default::default()
    };

    DescriptorPool::from_file_descriptor_set(FileDescriptorSet { file: vec![file] })
}

fn scalar(name: &str, number: i32, ty: Type, json_name: &str) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.into()),
        number: Some(number),
        label: Some(Label::Optional as i32),
        r#type: Some(ty as i32),
        json_name: Some(json_name.into()),
        ..Default::default()
    }
}

/// Shared handler state.
#[derive(Clone, Debug)]
pub struct AppState {
    marshaler: BoxedMarshaler,
    greeting: MessageDescriptor,
}

/// Build the gateway router around `marshaler`.
pub fn router(marshaler: BoxedMarshaler) -> anyhow::Result<Router> {
    let pool = descriptor_pool()?;
    let greeting = pool
        .get_message_by_name(GREETING)
        .ok_or_else(|| anyhow::anyhow!("{GREETING} missing from descriptor pool"))?;

    let state = AppState {
        marshaler,
        greeting,
    };

    Ok(Router::new()
        .route("/healthz", get(healthz))
        .route("/v1/greetings:echo", post(echo))
        .route("/v1/greetings:stream", post(stream))
        .with_state(state))
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
}

async fn healthz(State(state): State<AppState>) -> Response {
    let health = HealthResponse { status: "ok" };
    let payload = Payload::generic(&health);
    match state.marshaler.marshal(payload) {
        Ok(body) => respond(&state, StatusCode::OK, payload, body),
        Err(err) => error_response(&state, err),
    }
}

async fn echo(State(state): State<AppState>, body: Bytes) -> Response {
    let mut greeting = DynamicMessage::new(state.greeting.clone());
    if let Err(err) = state
        .marshaler
        .unmarshal(&body, Target::message(&mut greeting))
    {
        return error_response(&state, err);
    }

    greet(&mut greeting);

    let payload = Payload::message(&greeting);
    match state.marshaler.marshal(payload) {
        Ok(body) => respond(&state, StatusCode::OK, payload, body),
        Err(err) => error_response(&state, err),
    }
}

async fn stream(State(state): State<AppState>, body: Bytes) -> Response {
    match relay(&state, &body) {
        Ok(frames) => {
            let empty = DynamicMessage::new(state.greeting.clone());
            respond(&state, StatusCode::OK, Payload::message(&empty), frames)
        }
        Err(err) => error_response(&state, err),
    }
}

/// Answer every greeting frame in `body` with one greeting frame, in order.
fn relay(state: &AppState, body: &[u8]) -> Result<Vec<u8>, Error> {
    let mut out = Vec::new();
    let mut frames = 0usize;
    {
        let mut decoder = state.marshaler.new_decoder(Box::new(body));
        let mut encoder = state.marshaler.new_encoder(Box::new(&mut out));

        loop {
            let mut greeting = DynamicMessage::new(state.greeting.clone());
            match decoder.decode(Target::message(&mut greeting)) {
                Ok(()) => {}
                Err(err) if err.is_end_of_stream() => break,
                Err(err) => return Err(err),
            }

            greet(&mut greeting);
            encoder.encode(Payload::message(&greeting))?;
            frames += 1;
        }
    }

    tracing::debug!(frames, "greeting stream relayed");
    Ok(out)
}

fn greet(greeting: &mut DynamicMessage) {
    let name = greeting
        .get_field_by_name("name")
        .and_then(|v| v.as_str().map(str::to_owned))
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| "World".to_string());

    greeting.set_field_by_name("message", Value::String(format!("Hello, {name}!")));
}

fn respond(state: &AppState, status: StatusCode, payload: Payload<'_>, body: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, state.marshaler.content_type(payload))],
        body,
    )
        .into_response()
}

/// Error codes surfaced in [`ErrorBody`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Code {
    InvalidArgument,
    Internal,
}

impl Code {
    /// Get the string representation of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Code::InvalidArgument => "invalid_argument",
            Code::Internal => "internal",
        }
    }

    /// Map this code to an HTTP status.
    pub fn http_status(&self) -> StatusCode {
        match self {
            Code::InvalidArgument => StatusCode::BAD_REQUEST,
            Code::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn from_error(err: &Error) -> Self {
        match err {
            Error::Io(_) => Code::Internal,
            _ => Code::InvalidArgument,
        }
    }
}

/// Generic error payload returned for any marshaling failure.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

fn error_response(state: &AppState, err: Error) -> Response {
    let code = Code::from_error(&err);
    tracing::debug!(code = code.as_str(), error = %err, "request failed");

    let body = ErrorBody {
        code: code.as_str(),
        message: err.to_string(),
    };
    let payload = Payload::generic(&body);
    match state.marshaler.marshal(payload) {
        Ok(bytes) => respond(state, code.http_status(), payload, bytes),
        Err(err) => {
            tracing::error!(error = %err, "failed to marshal error body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
