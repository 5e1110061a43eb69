//! Telemetry initialization and capability span helpers.

use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::{info, info_span, Span};
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

/// Initialize `tracing` and format developer logs.
///
/// Logs always go to stderr; stdout carries the stdio transport.
pub fn init_tracing() -> Result<()> {
    if tracing::dispatcher::has_been_set() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to initialize tracing: {err}"))
}

/// Span helper that records one resource read, tool call, or prompt render.
pub struct CapabilitySpan {
    span: Span,
    started_at: Instant,
    request_id: Uuid,
    capability: &'static str,
}

impl CapabilitySpan {
    /// Start a capability span.
    pub fn start(kind: &'static str, capability: &'static str) -> Self {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            target: "user_registry::tools",
            "capability",
            %request_id,
            kind,
            capability
        );
        Self {
            span,
            started_at: Instant::now(),
            request_id,
            capability,
        }
    }

    /// Close the span while recording the outcome.
    pub fn finish(self, status: &'static str) {
        let elapsed_ms = self.started_at.elapsed().as_millis();
        let _entered = self.span.enter();
        info!(
            target: "user_registry::tools",
            request_id = %self.request_id,
            capability = self.capability,
            status = status,
            elapsed_ms = elapsed_ms,
            "Completed capability request"
        );
    }
}

/// Payload for logging MCP runtime state as structured telemetry.
#[derive(Debug, Serialize)]
pub struct RuntimeModeTelemetry<'a> {
    pub transport: &'a str,
    pub host: Option<&'a str>,
    pub port: Option<u16>,
    pub config_path: &'a str,
    pub store_backend: &'a str,
    pub launch_args: &'a [String],
}

/// Emit runtime mode to `tracing`.
pub fn emit_runtime_mode(telemetry: &RuntimeModeTelemetry<'_>) {
    info!(
        target: "user_registry::runtime",
        transport = telemetry.transport,
        host = telemetry.host.unwrap_or(""),
        port = telemetry.port.unwrap_or_default(),
        config_path = telemetry.config_path,
        store_backend = telemetry.store_backend,
        launch_args = ?telemetry.launch_args,
        "Started MCP server"
    );
}
