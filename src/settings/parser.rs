//! Settings and batch file parsing
//!
//! Settings files hold one object per integration name. JSON is the
//! default; `.yaml`/`.yml` files are parsed as YAML.

use super::types::{IntegrationSettings, SETTINGS_ENV_VAR};
use crate::engine::ProcessDescriptor;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File format, chosen by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Json,
    Yaml,
}

impl FileFormat {
    /// Format of a path
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                FileFormat::Yaml
            }
            _ => FileFormat::Json,
        }
    }
}

/// Resolve the settings file path from an explicit path or the environment
pub fn settings_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    match std::env::var(SETTINGS_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Ok(PathBuf::from(path)),
        _ => Err(Error::config(format!(
            "No settings file provided (use --settings or set {SETTINGS_ENV_VAR})"
        ))),
    }
}

/// Load and validate the settings of one integration
///
/// A relative `schema_file` is resolved against the settings file's
/// directory.
pub fn load_settings(path: Option<&Path>, integration: &str) -> Result<IntegrationSettings> {
    let path = settings_path(path)?;
    info!("Get settings for {} from {}", integration, path.display());

    let content = read_file(&path)?;
    let mut settings = parse_settings(&content, FileFormat::from_path(&path), integration)?;

    if let (Some(schema), Some(dir)) = (settings.schema_file.as_ref(), path.parent()) {
        if schema.is_relative() {
            settings.schema_file = Some(dir.join(schema));
        }
    }

    Ok(settings)
}

/// Parse and validate the settings of one integration
pub fn parse_settings(
    content: &str,
    format: FileFormat,
    integration: &str,
) -> Result<IntegrationSettings> {
    let root: JsonValue = match format {
        FileFormat::Json => serde_json::from_str(content)?,
        FileFormat::Yaml => serde_yaml::from_str(content)?,
    };

    let JsonValue::Object(mut integrations) = root else {
        return Err(Error::config("Settings file must contain an object of integrations"));
    };

    let section = match integrations.remove(integration) {
        Some(section) => section,
        None => integrations
            .remove(&integration.to_uppercase())
            .ok_or_else(|| {
                Error::config(format!("Integration '{integration}' not found in settings"))
            })?,
    };

    let mut settings: IntegrationSettings = serde_json::from_value(section)
        .map_err(|e| Error::config(format!("Invalid settings for '{integration}': {e}")))?;
    settings.normalize();
    settings.validate()?;

    debug!(
        "Settings for {}: {} endpoint(s), page size {}",
        integration,
        settings.endpoints.len(),
        settings.page_size
    );
    Ok(settings)
}

/// Load a batch file: a list of process descriptors
pub fn load_batch(path: &Path) -> Result<Vec<ProcessDescriptor>> {
    let content = read_file(path)?;
    parse_batch(&content, FileFormat::from_path(path))
}

/// Parse a batch of process descriptors
pub fn parse_batch(content: &str, format: FileFormat) -> Result<Vec<ProcessDescriptor>> {
    let batch = match format {
        FileFormat::Json => serde_json::from_str(content)?,
        FileFormat::Yaml => serde_yaml::from_str(content)?,
    };
    Ok(batch)
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound {
                path: path.display().to_string(),
            }
        } else {
            Error::config(format!("Failed to read '{}': {}", path.display(), e))
        }
    })
}
