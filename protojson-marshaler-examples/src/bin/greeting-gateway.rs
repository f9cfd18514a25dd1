//! Greeting gateway
//!
//! Serves a unary and a newline-delimited streaming greeting endpoint, all
//! bodies encoded by the proto3 JSON marshaler.
//!
//! Run with: cargo run --bin greeting-gateway
//! Pretty output: PROTOJSON_INDENT="  " cargo run --bin greeting-gateway
//!
//! Test with:
//!   curl http://localhost:3000/healthz
//!   curl -d '{"name":"Ada"}' http://localhost:3000/v1/greetings:echo
//!   printf '{"name":"a"}\n{"name":"b"}\n' \
//!     | curl --data-binary @- http://localhost:3000/v1/greetings:stream

use protojson_marshaler::{BoxedMarshaler, ProtoJsonMarshaler};
use protojson_marshaler_examples::{indent_from_env, router, server_addr};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let marshaler = ProtoJsonMarshaler::new(indent_from_env());
    tracing::info!(indent = ?marshaler.marshal_config().indent(), "marshaler configured");

    let app = router(BoxedMarshaler::new(marshaler))?;

    let addr = server_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "greeting gateway listening");

    axum::serve(listener, app).await?;
    Ok(())
}
