use std::path::Path;

use tracing::{debug, info};

use super::ServerConfig;

pub fn log_config_source(path: &Path, explicit: bool) {
    if explicit {
        info!(
            target: "user_registry::config",
            path = %path.display(),
            "Loading configuration from explicit path"
        );
    } else {
        debug!(
            target: "user_registry::config",
            path = %path.display(),
            "MCP_CONFIG_PATH not set; trying default config.toml"
        );
    }
}

pub fn log_default_missing(path: &Path) {
    debug!(
        target: "user_registry::config",
        path = %path.display(),
        "Default configuration file not found; using built-in defaults"
    );
}

pub fn log_loaded(config: &ServerConfig) {
    info!(
        target: "user_registry::config",
        source = %config.source_label(),
        host = %config.server.host,
        port = config.server.port,
        store_url = %crate::store::redact_url(&config.store.url),
        max_connections = config.store.max_connections,
        sampling_max_tokens = config.sampling.max_tokens,
        "Configuration loaded successfully"
    );
}
