//! Settings module
//!
//! Loads integration settings (API location, credentials, endpoint map,
//! schema file and destination) and process batch files.

mod parser;
mod types;

pub use parser::{load_batch, load_settings, parse_batch, parse_settings, settings_path, FileFormat};
pub use types::{
    DatabaseKind, DatabaseSettings, EndpointDef, EndpointOptions, IntegrationSettings,
    DEFAULT_INTEGRATION, SETTINGS_ENV_VAR,
};
