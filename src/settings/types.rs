//! Settings types
//!
//! One [`IntegrationSettings`] object per integration name in the settings
//! file. Field names are snake_case; the upper-case keys used by existing
//! addin settings files (`BASE_URL`, `API_KEY`, ...) are accepted as aliases.

use crate::error::{Error, Result};
use crate::pagination::{EndpointSpec, PaginationMode, DEFAULT_PAGE_SIZE};
use crate::types::{Method, OptionStringExt};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Integration used when none is named
pub const DEFAULT_INTEGRATION: &str = "TALENT";

/// Environment variable holding the settings file path
pub const SETTINGS_ENV_VAR: &str = "LMS_ETL_SETTINGS";

// ============================================================================
// Integration Settings
// ============================================================================

/// Settings of one LMS integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrationSettings {
    /// API base URL (e.g. `https://acme.talentlms.com/api/v1`)
    #[serde(alias = "BASE_URL")]
    pub base_url: String,

    /// API key, sent as the basic-auth username
    #[serde(alias = "API_KEY")]
    pub api_key: String,

    /// Default page size
    #[serde(
        default = "default_page_size",
        alias = "PAGE_SIZE",
        deserialize_with = "number_or_string"
    )]
    pub page_size: u32,

    /// Request timeout in seconds
    #[serde(
        default = "default_timeout_secs",
        alias = "TIMEOUT",
        deserialize_with = "number_or_string"
    )]
    pub timeout_secs: u64,

    /// HTTP method for page requests
    #[serde(default = "default_method", alias = "METHOD")]
    pub method: Method,

    /// Endpoint key -> endpoint definition
    #[serde(default, alias = "ENDPOINTS")]
    pub endpoints: HashMap<String, EndpointDef>,

    /// Schema description file (table -> column type tags)
    #[serde(default, alias = "SCHEMA_FILE")]
    pub schema_file: Option<PathBuf>,

    /// Relational destination
    #[serde(flatten)]
    pub database: DatabaseSettings,
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_method() -> Method {
    Method::POST
}

impl IntegrationSettings {
    /// Create settings with defaults for everything but the URL and key
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            page_size: default_page_size(),
            timeout_secs: default_timeout_secs(),
            method: default_method(),
            endpoints: HashMap::new(),
            schema_file: None,
            database: DatabaseSettings::default(),
        }
    }

    /// Add an endpoint definition
    #[must_use]
    pub fn with_endpoint(mut self, key: &str, def: impl Into<EndpointDef>) -> Self {
        self.endpoints.insert(key.to_uppercase(), def.into());
        self
    }

    /// Upper-case every endpoint key and drop blank destination fields
    pub fn normalize(&mut self) {
        self.endpoints = std::mem::take(&mut self.endpoints)
            .into_iter()
            .map(|(key, def)| (key.to_uppercase(), def))
            .collect();

        let db = &mut self.database;
        db.host = db.host.take().none_if_empty();
        db.user = db.user.take().none_if_empty();
        db.database = db.database.take().none_if_empty();
        db.connection_string = db.connection_string.take().none_if_empty();
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(Error::missing_field("base_url"));
        }
        let url = url::Url::parse(&self.base_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "base_url",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.api_key.trim().is_empty() {
            return Err(Error::missing_field("api_key"));
        }
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be greater than 0"));
        }
        if self.timeout_secs == 0 {
            return Err(Error::invalid_value("timeout_secs", "must be greater than 0"));
        }
        for (key, def) in &self.endpoints {
            if def.path().trim().is_empty() {
                return Err(Error::invalid_value(
                    format!("endpoints.{key}"),
                    "path cannot be empty",
                ));
            }
        }
        Ok(())
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Endpoint definition for a key (case-insensitive)
    pub fn endpoint(&self, key: &str) -> Option<&EndpointDef> {
        self.endpoints.get(&key.to_uppercase())
    }

    /// Build the endpoint spec for a key
    ///
    /// `default_mode` applies when the definition does not name a mode.
    pub fn endpoint_spec(&self, key: &str, default_mode: PaginationMode) -> Result<EndpointSpec> {
        let def = self
            .endpoint(key)
            .ok_or_else(|| Error::config(format!("Endpoint '{key}' is not configured")))?;

        let mut spec = EndpointSpec::list(key.to_uppercase(), def.path())
            .with_mode(def.mode().unwrap_or(default_mode));
        if let Some(size) = def.page_size() {
            spec = spec.with_page_size(size);
        }
        Ok(spec)
    }
}

// ============================================================================
// Endpoints
// ============================================================================

/// One configured endpoint: a bare path, or a path with options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointDef {
    Path(String),
    Detailed(EndpointOptions),
}

/// Endpoint path with pagination options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointOptions {
    #[serde(alias = "PATH")]
    pub path: String,
    #[serde(default, alias = "PAGE_SIZE")]
    pub page_size: Option<u32>,
    #[serde(default, alias = "MODE")]
    pub mode: Option<PaginationMode>,
}

impl EndpointDef {
    /// Path fragment
    pub fn path(&self) -> &str {
        match self {
            EndpointDef::Path(path) => path,
            EndpointDef::Detailed(options) => &options.path,
        }
    }

    /// Page size override
    pub fn page_size(&self) -> Option<u32> {
        match self {
            EndpointDef::Path(_) => None,
            EndpointDef::Detailed(options) => options.page_size,
        }
    }

    /// Pagination mode override
    pub fn mode(&self) -> Option<PaginationMode> {
        match self {
            EndpointDef::Path(_) => None,
            EndpointDef::Detailed(options) => options.mode,
        }
    }
}

impl From<&str> for EndpointDef {
    fn from(path: &str) -> Self {
        EndpointDef::Path(path.to_string())
    }
}

impl From<EndpointOptions> for EndpointDef {
    fn from(options: EndpointOptions) -> Self {
        EndpointDef::Detailed(options)
    }
}

// ============================================================================
// Database Settings
// ============================================================================

/// Destination database type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseKind {
    #[default]
    #[serde(alias = "MYSQL", alias = "mariadb")]
    Mysql,
    #[serde(alias = "POSTGRES", alias = "postgresql")]
    Postgres,
    #[serde(alias = "DUCKDB")]
    Duckdb,
}

impl std::fmt::Display for DatabaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseKind::Mysql => write!(f, "mysql"),
            DatabaseKind::Postgres => write!(f, "postgres"),
            DatabaseKind::Duckdb => write!(f, "duckdb"),
        }
    }
}

/// Destination connection parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    #[serde(default, alias = "ENGINE")]
    pub engine: DatabaseKind,
    #[serde(default, alias = "HOST")]
    pub host: Option<String>,
    #[serde(default, alias = "PORT", deserialize_with = "optional_number_or_string")]
    pub port: Option<u16>,
    #[serde(default, alias = "USER")]
    pub user: Option<String>,
    #[serde(default, alias = "PASSWORD")]
    pub password: Option<String>,
    #[serde(default, alias = "DATABASE")]
    pub database: Option<String>,
    #[serde(default, alias = "CONNECTION_STRING")]
    pub connection_string: Option<String>,
}

impl DatabaseSettings {
    /// A DuckDB file (or `:memory:`)
    pub fn duckdb(path: impl Into<String>) -> Self {
        Self {
            engine: DatabaseKind::Duckdb,
            database: Some(path.into()),
            ..Self::default()
        }
    }

    /// Check whether enough is configured to open a destination
    pub fn is_configured(&self) -> bool {
        self.connection_string.is_some() || self.database.is_some() || self.host.is_some()
    }
}

// ============================================================================
// Helpers
// ============================================================================

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString<T> {
    Number(T),
    String(String),
}

/// Accept `250` as well as `"250"`
fn number_or_string<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match NumberOrString::<T>::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn optional_number_or_string<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match Option::<NumberOrString<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::String(s)) if s.trim().is_empty() => Ok(None),
        Some(NumberOrString::String(s)) => s.trim().parse().map(Some).map_err(serde::de::Error::custom),
    }
}
