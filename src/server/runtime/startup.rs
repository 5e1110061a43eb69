use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Error};
use rmcp::{model::ErrorData, ServiceExt};
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::{
    cli::{LaunchProfile, TransportMode},
    lib::{
        errors::{
            ConfigError, StoreError, ToolErrorDescriptor, STORE_UNREACHABLE_ERROR,
            STORE_URL_REQUIRED_ERROR,
        },
        telemetry::{emit_runtime_mode, RuntimeModeTelemetry},
    },
    server::{
        config::ServerConfig,
        runtime::{build_instructions, UserRegistryServer},
    },
    store::{open_store, redact_url, RecordStore},
    tools::users::UserRepository,
};

/// Exit code when no connection string was provided.
pub const STORE_URL_REQUIRED_EXIT: u8 = 43;
/// Exit code when the record store could not be opened.
pub const STORE_UNREACHABLE_EXIT: u8 = 44;

/// Bundles a runtime error message with an exit code and optional structured error data.
#[derive(Debug)]
pub struct RuntimeExit {
    message: String,
    exit_code: u8,
    error_data: Option<ErrorData>,
}

impl RuntimeExit {
    pub fn structured(error: ErrorData, exit_code: u8) -> Self {
        Self {
            message: error.message.to_string(),
            exit_code,
            error_data: Some(error),
        }
    }

    pub fn from_error(err: impl Into<Error>) -> Self {
        let err = err.into();
        Self {
            message: format!("{err:?}"),
            exit_code: 1,
            error_data: None,
        }
    }

    /// Map a configuration failure; a missing connection string gets its own exit code.
    pub fn from_config_error(err: ConfigError) -> Self {
        match &err {
            ConfigError::MissingEnv { key } => {
                let details = serde_json::json!({ "key": key });
                Self::described(
                    &STORE_URL_REQUIRED_ERROR,
                    details,
                    STORE_URL_REQUIRED_EXIT,
                    false,
                )
            }
            _ => Self::from_error(Error::new(err)),
        }
    }

    /// Map a failure to open the record store.
    pub fn from_store_error(err: StoreError, url: &str) -> Self {
        match err {
            StoreError::Connect { .. } => {
                let details = serde_json::json!({
                    "url": redact_url(url),
                    "reason": err.to_string(),
                });
                Self::described(
                    &STORE_UNREACHABLE_ERROR,
                    details,
                    STORE_UNREACHABLE_EXIT,
                    true,
                )
            }
            other => Self::from_error(Error::new(other)),
        }
    }

    fn described(
        descriptor: &ToolErrorDescriptor,
        details: serde_json::Value,
        exit_code: u8,
        retryable: bool,
    ) -> Self {
        match descriptor
            .builder()
            .retryable(retryable)
            .details(details)
            .with_exit_code_value(exit_code)
            .build()
        {
            Ok(data) => Self::structured(data, exit_code),
            Err(err) => Self {
                message: err.to_string(),
                exit_code,
                error_data: None,
            },
        }
    }

    pub fn report(self) -> ExitCode {
        if let Some(data) = self.error_data {
            if let Ok(serialized) = serde_json::to_string(&data) {
                eprintln!("{serialized}");
            } else {
                eprintln!("{}", data.message);
            }
        } else {
            eprintln!("{}", self.message);
        }
        ExitCode::from(self.exit_code)
    }

    /// Raw process status reported by [`RuntimeExit::report`].
    pub fn exit_status(&self) -> u8 {
        self.exit_code
    }

    pub fn error_data(&self) -> Option<&ErrorData> {
        self.error_data.as_ref()
    }
}

/// Open the store, then start the MCP server on the transport chosen by the launch profile.
pub async fn run_server(profile: LaunchProfile, config: ServerConfig) -> Result<(), RuntimeExit> {
    let store = open_configured_store(&config).await?;
    let repository = UserRepository::new(store);
    let instructions = build_instructions(&profile, &config, repository.backend());
    let source_label = config.source_label();

    emit_runtime_mode(&RuntimeModeTelemetry {
        transport: profile.transport.as_str(),
        host: Some(config.server.host.as_str()),
        port: Some(config.server.port),
        config_path: &source_label,
        store_backend: repository.backend(),
        launch_args: &profile.launch_args,
    });

    let server = UserRegistryServer::new(config.clone(), instructions, repository);
    match profile.transport {
        TransportMode::Stdio => run_stdio(server).await,
        TransportMode::Tcp => run_tcp(server, &config).await,
    }
}

async fn open_configured_store(config: &ServerConfig) -> Result<Arc<dyn RecordStore>, RuntimeExit> {
    open_store(&config.store.url, config.store.max_connections)
        .await
        .map_err(|err| {
            error!(
                target: "user_registry::runtime",
                url = %redact_url(&config.store.url),
                error = %err,
                "Failed to open record store"
            );
            RuntimeExit::from_store_error(err, &config.store.url)
        })
}

async fn run_stdio(server: UserRegistryServer) -> Result<(), RuntimeExit> {
    let running = server
        .serve(rmcp::transport::stdio())
        .await
        .map_err(RuntimeExit::from_error)?;
    running.waiting().await.map_err(RuntimeExit::from_error)?;
    Ok(())
}

async fn run_tcp(server: UserRegistryServer, config: &ServerConfig) -> Result<(), RuntimeExit> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind TCP port {addr}"))
        .map_err(RuntimeExit::from_error)?;
    info!(
        target: "user_registry::runtime",
        transport = "tcp",
        bind_addr = %addr,
        "Started listening in TCP mode"
    );

    loop {
        let (stream, peer) = listener
            .accept()
            .await
            .with_context(|| format!("failed to accept TCP connection ({addr})"))
            .map_err(RuntimeExit::from_error)?;
        info!(
            target: "user_registry::runtime",
            peer = %peer,
            "Accepted connection from MCP client"
        );
        let outcome = match server.clone().serve(stream).await {
            Ok(running) => running.waiting().await.map(|_| ()).map_err(Error::from),
            Err(err) => Err(Error::from(err)),
        };
        if let Err(err) = outcome {
            warn!(
                target: "user_registry::runtime",
                peer = %peer,
                error = %err,
                "MCP session ended with an error"
            );
        }
    }
}
