//! Rendering and writing of output artifacts

use crate::config::OutputSettings;
use crate::error::MergeError;
use crate::system::System;
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde_yaml::Value;
use std::path::{Path, PathBuf};

/// Render the document with its generated header
///
/// # Errors
///
/// Returns an error if the document cannot be serialized to YAML.
pub fn render_document(document: &Value, generated_at: &DateTime<Utc>) -> Result<String> {
    let body = serde_yaml::to_string(document)
        .map_err(|e| MergeError::serialization(format!("Configuration document: {e}")))?;

    Ok(format!(
        "# Automatically generated `Clash` yaml file by clashgraft\n\
         # Do not modify manually\n\
         # Last Update: {}\n\
         \n\
         {body}",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    ))
}

/// Where one profile's artifacts are written
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct OutputPaths {
    /// `<dir>/<config_filename>-<profile>-<auth_token>.yaml`
    pub document: PathBuf,

    /// `<dir>/<stats_filename>-<profile>.json`
    pub stats: PathBuf,

    /// Document path with the auth token masked, for logs
    pub display_document: String,
}

impl OutputPaths {
    #[must_use]
    pub fn new(
        output_dir: &Path,
        settings: &OutputSettings,
        profile: &str,
        auth_token: &str,
    ) -> Self {
        let config_prefix = format!("{}-{profile}", settings.config_filename);
        Self {
            document: output_dir.join(format!("{config_prefix}-{auth_token}.yaml")),
            stats: output_dir.join(format!("{}-{profile}.json", settings.stats_filename)),
            display_document: output_dir
                .join(format!("{config_prefix}-***.yaml"))
                .display()
                .to_string(),
        }
    }
}

/// Write a file, creating its directory first
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file cannot be
/// written.
pub fn write_output(system: &dyn System, path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        system.create_dir_all(parent).map_err(|e| {
            MergeError::filesystem(format!(
                "Failed to create output directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    system.write(path, contents.as_bytes()).map_err(|e| {
        MergeError::filesystem(format!("Failed to write {}: {e}", path.display())).into()
    })
}
