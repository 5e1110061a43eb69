use std::{io, path::PathBuf, process::Stdio, sync::Arc};

use anyhow::{Context, Result};
use rmcp::{
    model::{CallToolResult, ClientInfo, ReadResourceResult},
    service::RunningService,
    ClientHandler, RoleClient, ServiceExt,
};
use serde_json::Value;
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf},
    process::{Child, ChildStdin, ChildStdout, Command},
    task::JoinHandle,
};

use user_registry_mcp::{
    server::{
        config::{SamplingSection, ServerConfig, ServerSection, StoreSection},
        runtime::UserRegistryServer,
    },
    store::MemoryStore,
    tools::users::UserRepository,
};

pub const BINARY_PATH: &str = env!("CARGO_BIN_EXE_user-registry-mcp");

pub type ServerTask = JoinHandle<Result<()>>;

pub fn fixture(relative: &str) -> String {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    root.join(relative).display().to_string()
}

pub fn test_server_config() -> ServerConfig {
    ServerConfig {
        server: ServerSection {
            host: "127.0.0.1".into(),
            port: 8787,
        },
        store: StoreSection {
            url: "memory://".into(),
            max_connections: 1,
        },
        sampling: SamplingSection { max_tokens: 256 },
        source_path: None,
    }
}

pub fn build_server() -> UserRegistryServer {
    let repository = UserRepository::new(Arc::new(MemoryStore::new()));
    UserRegistryServer::new(
        test_server_config(),
        "user-registry-integration".into(),
        repository,
    )
}

/// Serve `server` over an in-memory duplex pipe and connect `client` to it.
pub async fn connect_with<C>(
    server: UserRegistryServer,
    client: C,
) -> Result<(RunningService<RoleClient, C>, ServerTask)>
where
    C: ClientHandler,
{
    let (server_transport, client_transport) = tokio::io::duplex(4096);
    let server_task = tokio::spawn(async move {
        server.serve(server_transport).await?.waiting().await?;
        Result::<_, anyhow::Error>::Ok(())
    });
    let client = client
        .serve(client_transport)
        .await
        .context("client handshake failed")?;
    Ok((client, server_task))
}

pub async fn connect(
    server: UserRegistryServer,
) -> Result<(RunningService<RoleClient, ClientInfo>, ServerTask)> {
    connect_with(server, ClientInfo::default()).await
}

/// Text of the single content item of a tool result plus its error flag.
pub fn tool_text(result: &CallToolResult) -> Result<(String, bool)> {
    let value = serde_json::to_value(result)?;
    let text = value["content"][0]["text"]
        .as_str()
        .context("tool result should carry text content")?
        .to_string();
    let is_error = value["isError"].as_bool().unwrap_or(false);
    Ok((text, is_error))
}

/// Parsed JSON body of the first resource content item.
pub fn resource_body(result: &ReadResourceResult) -> Result<Value> {
    let value = serde_json::to_value(result)?;
    let text = value["contents"][0]["text"]
        .as_str()
        .context("resource should carry text contents")?;
    Ok(serde_json::from_str(text)?)
}

pub async fn spawn_server_process(
    database_url: &str,
) -> Result<(Child, ChildIoBridge, Option<JoinHandle<()>>)> {
    let mut command = Command::new(BINARY_PATH);
    command
        .env("DATABASE_URL", database_url)
        .env(
            "MCP_CONFIG_PATH",
            fixture("tests/fixtures/config_valid.toml"),
        )
        .stdout(Stdio::piped())
        .stdin(Stdio::piped())
        .stderr(Stdio::piped());
    let mut child = command.spawn().context("failed to spawn server process")?;
    let stdout = child.stdout.take().context("child stdout")?;
    let stdin = child.stdin.take().context("child stdin")?;
    let bridge = ChildIoBridge::new(stdout, stdin);
    let stderr_handle = child.stderr.take().map(|mut stderr| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stderr.read_to_end(&mut buf).await;
        })
    });
    Ok((child, bridge, stderr_handle))
}

pub struct ChildIoBridge {
    stdout: ChildStdout,
    stdin: ChildStdin,
}

impl ChildIoBridge {
    pub fn new(stdout: ChildStdout, stdin: ChildStdin) -> Self {
        Self { stdout, stdin }
    }
}

impl AsyncRead for ChildIoBridge {
    fn poll_read(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdout).poll_read(cx, buf)
    }
}

impl AsyncWrite for ChildIoBridge {
    fn poll_write(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
        data: &[u8],
    ) -> std::task::Poll<io::Result<usize>> {
        std::pin::Pin::new(&mut self.stdin).poll_write(cx, data)
    }

    fn poll_flush(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_flush(cx)
    }

    fn poll_shutdown(
        mut self: std::pin::Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<io::Result<()>> {
        std::pin::Pin::new(&mut self.stdin).poll_shutdown(cx)
    }
}
