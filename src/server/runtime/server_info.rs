use crate::{cli::LaunchProfile, server::config::ServerConfig};

/// Build the `ServerInfo.instructions` string shown to MCP clients.
pub fn build_instructions(profile: &LaunchProfile, config: &ServerConfig, backend: &str) -> String {
    format!(
        "User registry backed by the {backend} store (config: {path}; {transport} mode, host={host}, port={port}). \
Read users://all or users://{{userId}}/profile, create users with create-user or create-random-user, \
and render generate-fake-user for a ready-made instruction.",
        path = config.source_label(),
        transport = profile.transport.as_str(),
        host = config.server.host,
        port = config.server.port
    )
}
