//! Load and validate server configuration.
use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::{cli::LaunchProfile, lib::errors::ConfigError};

pub mod sampling;
pub mod server;
pub mod store;
pub mod telemetry;

pub use sampling::{parse_sampling_section, RawSamplingSection, SamplingSection, DEFAULT_MAX_TOKENS};
pub use server::{parse_server_section, RawServerSection, ServerSection, DEFAULT_HOST, DEFAULT_PORT};
pub use store::{
    parse_store_section, RawStoreSection, StoreSection, DATABASE_URL_ENV, DEFAULT_MAX_CONNECTIONS,
};

/// Top-level configuration container.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub server: ServerSection,
    pub store: StoreSection,
    pub sampling: SamplingSection,
    /// Config file that was read, if any.
    pub source_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default)]
struct RawServerConfig {
    server: Option<RawServerSection>,
    store: Option<RawStoreSection>,
    sampling: Option<RawSamplingSection>,
}

impl ServerConfig {
    /// Load the config file named by the launch profile and attach the connection string.
    ///
    /// A missing file is only an error when the path was given explicitly.
    pub fn load(profile: &LaunchProfile) -> Result<Self, ConfigError> {
        telemetry::log_config_source(&profile.config_path, profile.config_explicit);
        if !profile.config_explicit && !profile.config_path.exists() {
            telemetry::log_default_missing(&profile.config_path);
            return Self::from_raw(
                RawServerConfig::default(),
                None,
                profile.database_url.clone(),
            );
        }
        Self::load_from_path(profile.config_path.clone(), profile.database_url.clone())
    }

    /// Load configuration from a specific path.
    pub fn load_from_path(
        path: PathBuf,
        database_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        info!(
            target: "user_registry::config",
            path = %path.display(),
            "Starting configuration load"
        );

        let builder = config::Config::builder().add_source(config::File::from(path.clone()));
        let document = builder.build().map_err(|err| {
            let error = ConfigError::from_read_error(path.clone(), err);
            error!(
                target: "user_registry::config",
                path = %path.display(),
                reason = %error,
                "Failed to read configuration file"
            );
            error
        })?;

        let raw: RawServerConfig = document.try_deserialize().map_err(|err| {
            let error = ConfigError::from_parse_error(path.clone(), err);
            error!(
                target: "user_registry::config",
                path = %path.display(),
                reason = %error,
                "Failed to parse configuration file"
            );
            error
        })?;

        Self::from_raw(raw, Some(path), database_url)
    }

    fn from_raw(
        raw: RawServerConfig,
        source_path: Option<PathBuf>,
        database_url: Option<String>,
    ) -> Result<Self, ConfigError> {
        let server = parse_server_section(raw.server)?;
        let store = parse_store_section(raw.store, database_url)?;
        let sampling = parse_sampling_section(raw.sampling)?;

        let config = Self {
            server,
            store,
            sampling,
            source_path,
        };
        telemetry::log_loaded(&config);
        Ok(config)
    }

    /// Display form of the config source used in logs.
    pub fn source_label(&self) -> String {
        self.source_path
            .as_ref()
            .map(|path| path.display().to_string())
            .unwrap_or_else(|| "<defaults>".into())
    }
}
