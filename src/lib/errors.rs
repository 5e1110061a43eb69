use std::path::PathBuf;

use config::ConfigError as ConfigLoaderError;
use rmcp::model::{ErrorCode, ErrorData};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use thiserror::Error;

/// Errors that can occur while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to build (read) the configuration file.
    #[error("Failed to read configuration file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Failed to deserialize TOML into a struct.
    #[error("Failed to parse configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ConfigLoaderError,
    },
    /// Required environment variable is missing or blank.
    #[error("{key} environment variable is not set")]
    MissingEnv { key: &'static str },
    /// Field failed validation.
    #[error("Configuration has invalid `{field}`: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    /// Helper to wrap `config::ConfigError` as a read failure.
    pub fn from_read_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::FileRead { path, source }
    }

    /// Helper to wrap `config::ConfigError` as a parse failure.
    pub fn from_parse_error(path: PathBuf, source: ConfigLoaderError) -> Self {
        Self::Parse { path, source }
    }
}

/// Failures raised by a record store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection string scheme is not supported: {url}")]
    UnsupportedUrl { url: String },
    #[error("Failed to connect to the record store: {source}")]
    Connect {
        #[source]
        source: sqlx::Error,
    },
    #[error("A user with id {id} already exists")]
    DuplicateKey { id: i64 },
    #[error("Record store query failed: {source}")]
    Query {
        #[source]
        source: sqlx::Error,
    },
}

/// Structured error metadata surfaced to MCP clients and startup reports.
#[derive(Debug, Clone, Serialize)]
pub struct ToolErrorDescriptor {
    /// JSON-RPC error code used for the resulting `ErrorData`.
    #[serde(skip)]
    pub kind: ErrorCode,
    /// Error code.
    pub code: &'static str,
    /// User-facing message.
    pub message: &'static str,
    /// Recommended remediation.
    pub remediation: &'static str,
}

impl ToolErrorDescriptor {
    /// Simple constructor.
    pub const fn new(
        kind: ErrorCode,
        code: &'static str,
        message: &'static str,
        remediation: &'static str,
    ) -> Self {
        Self {
            kind,
            code,
            message,
            remediation,
        }
    }

    /// Create a builder.
    pub fn builder(&self) -> ToolErrorDescriptorBuilder<'_> {
        ToolErrorDescriptorBuilder::new(self)
    }
}

/// Builder for error data that fails if required fields are missing.
pub struct ToolErrorDescriptorBuilder<'a> {
    descriptor: &'a ToolErrorDescriptor,
    retryable: Option<bool>,
    details: Option<Value>,
    extra_fields: Map<String, Value>,
}

impl<'a> ToolErrorDescriptorBuilder<'a> {
    pub fn new(descriptor: &'a ToolErrorDescriptor) -> Self {
        Self {
            descriptor,
            retryable: None,
            details: None,
            extra_fields: Map::new(),
        }
    }

    pub fn retryable(mut self, retryable: bool) -> Self {
        self.retryable = Some(retryable);
        self
    }

    pub fn details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_context_field(mut self, key: &str, value: Value) -> Self {
        self.extra_fields.insert(key.to_string(), value);
        self
    }

    pub fn with_exit_code_value(mut self, exit_code: u8) -> Self {
        let numeric = Number::from(exit_code);
        self.extra_fields
            .insert("exit_code".into(), Value::Number(numeric));
        self
    }

    pub fn build(self) -> Result<ErrorData, ToolErrorBuilderError> {
        if self.descriptor.remediation.trim().is_empty() {
            return Err(ToolErrorBuilderError::MissingRemediation {
                code: self.descriptor.code,
            });
        }
        let retryable = self
            .retryable
            .ok_or(ToolErrorBuilderError::MissingRetryable {
                code: self.descriptor.code,
            })?;

        let mut data = Map::new();
        data.insert("code".into(), Value::String(self.descriptor.code.into()));
        data.insert(
            "remediation".into(),
            Value::String(self.descriptor.remediation.into()),
        );
        data.insert("retryable".into(), Value::Bool(retryable));
        if let Some(details) = self.details {
            data.insert("details".into(), details);
        }
        for (key, value) in self.extra_fields {
            data.insert(key, value);
        }

        Ok(ErrorData::new(
            self.descriptor.kind,
            self.descriptor.message,
            Some(Value::Object(data)),
        ))
    }
}

/// Errors when required builder fields are missing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ToolErrorBuilderError {
    #[error("retryable is missing (code={code})")]
    MissingRetryable { code: &'static str },
    #[error("remediation is empty (code={code})")]
    MissingRemediation { code: &'static str },
}

/// Startup error when no connection string was provided.
pub const STORE_URL_REQUIRED_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    ErrorCode::INVALID_PARAMS,
    "STORE_URL_REQUIRED",
    "DATABASE_URL environment variable is not set",
    "Set DATABASE_URL (for example `sqlite://users.db?mode=rwc` or `memory://`) or pass --database-url.",
);

/// Startup error when the record store cannot be opened.
pub const STORE_UNREACHABLE_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    ErrorCode::INTERNAL_ERROR,
    "STORE_UNREACHABLE",
    "Failed to connect to the record store",
    "Check that DATABASE_URL points at a reachable store and that its directory is writable.",
);

/// Routing error for URIs that match no registered resource.
pub const RESOURCE_NOT_FOUND_ERROR: ToolErrorDescriptor = ToolErrorDescriptor::new(
    ErrorCode::RESOURCE_NOT_FOUND,
    "RESOURCE_NOT_FOUND",
    "No resource is registered for the requested URI",
    "Use `users://all` or `users://{userId}/profile`.",
);
