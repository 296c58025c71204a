//! YAML settings loading and parsing

use crate::config::Settings;
use crate::error::MergeError;
use crate::system::System;
use anyhow::{Context as _, Result};
use std::path::Path;

/// Load and parse YAML settings from file
///
/// An empty file yields the default settings.
///
/// # Errors
///
/// Returns an error if:
/// - The file does not exist or cannot be read
/// - The YAML is malformed
/// - Schema or semantic validation fails
pub fn load_settings(system: &dyn System, path: &str) -> Result<Settings> {
    let path_obj = Path::new(path);

    if !system.exists(path_obj) {
        return Err(MergeError::configuration(format!(
            "Settings file not found: {path}\n\
            Create config/settings.yaml or specify a different path with --settings"
        ))
        .into());
    }

    let content = system
        .read_to_string(path_obj)
        .with_context(|| format!("Failed to read settings file: {path}"))?;

    let settings = parse_settings(&content).with_context(|| {
        return format!(
            "Failed to parse settings file: {path}\n\
            Please check the syntax and structure of your settings file"
        );
    })?;

    Ok(settings)
}

/// Parse and validate settings from YAML text
///
/// # Errors
///
/// Returns an error if:
/// - The YAML is malformed
/// - Schema or semantic validation fails
pub fn parse_settings(content: &str) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    // Validate the raw document first so unknown keys are reported by name
    let raw: serde_json::Value = serde_yaml::from_str(content)
        .map_err(|e| MergeError::configuration(format!("Invalid YAML: {e}")))?;

    crate::config::schema::validate_against_schema(&raw)
        .context("Settings validation failed")?;

    let settings: Settings = serde_json::from_value(raw)
        .map_err(|e| MergeError::configuration(format!("Invalid settings: {e}")))?;

    settings.validate().context("Settings validation failed")?;

    Ok(settings)
}
