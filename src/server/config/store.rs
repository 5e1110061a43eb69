use serde::Deserialize;

use crate::lib::errors::ConfigError;

/// Environment variable holding the record store connection string.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Record store settings.
#[derive(Clone)]
pub struct StoreSection {
    pub url: String,
    pub max_connections: u32,
}

impl std::fmt::Debug for StoreSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSection")
            .field("url", &crate::store::redact_url(&self.url))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct RawStoreSection {
    pub max_connections: Option<u32>,
}

/// Combine the `[store]` section with the connection string from the environment.
pub fn parse_store_section(
    raw: Option<RawStoreSection>,
    database_url: Option<String>,
) -> Result<StoreSection, ConfigError> {
    let url = database_url
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or(ConfigError::MissingEnv {
            key: DATABASE_URL_ENV,
        })?;

    let max_connections = raw
        .unwrap_or_default()
        .max_connections
        .unwrap_or(DEFAULT_MAX_CONNECTIONS);
    if !(1..=64).contains(&max_connections) {
        return Err(ConfigError::InvalidField {
            field: "store.max_connections",
            message: "Specify a value between 1 and 64".into(),
        });
    }

    Ok(StoreSection {
        url,
        max_connections,
    })
}
