use std::{
    process::{Command as StdCommand, Stdio},
    time::Duration,
};

use anyhow::Result;
use rmcp::{model::ClientInfo, serve_client};
use tokio::time::timeout;

use crate::common::{fixture, spawn_server_process, BINARY_PATH};

#[tokio::test]
async fn inspector_style_spawn_lists_capabilities() -> Result<()> {
    let (mut child, transport, stderr_task) = spawn_server_process("memory://").await?;

    let client = serve_client(ClientInfo::default(), transport).await?;
    let tools = client.list_tools(None).await?;
    let names: Vec<&str> = tools.tools.iter().map(|tool| tool.name.as_ref()).collect();
    assert!(names.contains(&"create-user"), "tools: {names:?}");
    assert!(names.contains(&"create-random-user"), "tools: {names:?}");

    let prompts = client.list_prompts(None).await?;
    assert!(
        prompts
            .prompts
            .iter()
            .any(|prompt| prompt.name == "generate-fake-user"),
        "prompts: {:?}",
        prompts.prompts
    );

    client.cancel().await?;
    let status = timeout(Duration::from_secs(5), child.wait()).await??;
    assert!(
        status.success(),
        "server should exit cleanly but exit status was {status:?}"
    );
    if let Some(handle) = stderr_task {
        let _ = handle.await;
    }
    Ok(())
}

#[test]
fn missing_database_url_exits_with_store_url_required() -> Result<()> {
    let workdir = tempfile::tempdir()?;
    let output = StdCommand::new(BINARY_PATH)
        .current_dir(workdir.path())
        .env_remove("DATABASE_URL")
        .env(
            "MCP_CONFIG_PATH",
            fixture("tests/fixtures/config_valid.toml"),
        )
        .stdin(Stdio::null())
        .output()?;

    assert_eq!(
        output.status.code(),
        Some(43),
        "STORE_URL_REQUIRED exit code (43) expected, got {:?}",
        output.status
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("STORE_URL_REQUIRED"), "stderr: {stderr}");
    Ok(())
}

#[test]
fn unsupported_scheme_fails_before_serving() -> Result<()> {
    let workdir = tempfile::tempdir()?;
    let output = StdCommand::new(BINARY_PATH)
        .current_dir(workdir.path())
        .env("DATABASE_URL", "mongodb://localhost/users")
        .env_remove("MCP_CONFIG_PATH")
        .stdin(Stdio::null())
        .output()?;

    assert_eq!(output.status.code(), Some(1), "{:?}", output.status);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        !stderr.contains("localhost"),
        "connection string must not be echoed: {stderr}"
    );
    Ok(())
}

#[test]
fn unreachable_sqlite_store_exits_with_store_unreachable() -> Result<()> {
    let workdir = tempfile::tempdir()?;
    let url = format!(
        "sqlite://{}/missing-dir/users.db",
        workdir.path().display()
    );
    let output = StdCommand::new(BINARY_PATH)
        .current_dir(workdir.path())
        .env("DATABASE_URL", url)
        .env_remove("MCP_CONFIG_PATH")
        .stdin(Stdio::null())
        .output()?;

    assert_eq!(
        output.status.code(),
        Some(44),
        "STORE_UNREACHABLE exit code (44) expected, got {:?}",
        output.status
    );
    Ok(())
}
