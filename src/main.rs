//! Entry point for the User Registry MCP server.
use std::process::ExitCode;

use clap::Parser;
use user_registry_mcp::{
    cli::LaunchProfileArgs,
    lib::telemetry,
    server::{
        config::ServerConfig,
        runtime::{self, RuntimeExit},
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match bootstrap().await {
        Ok(_) => ExitCode::SUCCESS,
        Err(exit) => exit.report(),
    }
}

async fn bootstrap() -> Result<(), RuntimeExit> {
    // A missing .env is fine; real environment variables still apply.
    dotenvy::dotenv().ok();
    telemetry::init_tracing().map_err(RuntimeExit::from_error)?;

    let profile = LaunchProfileArgs::parse()
        .build()
        .map_err(RuntimeExit::from_error)?;
    let config = ServerConfig::load(&profile).map_err(RuntimeExit::from_config_error)?;
    runtime::run_server(profile, config).await
}
