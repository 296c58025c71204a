//! Local directory source

use super::ContentSource;
use crate::error::MergeError;
use crate::http::HttpClient;
use crate::system::System;
use crate::utils::path::has_yaml_suffix;
use crate::utils::patterns::is_remote_yaml;
use anyhow::{Context as _, Result};
use std::path::Path;
use tracing::debug;

/// Reads category files from the local filesystem
///
/// Absolute YAML URLs are fetched through the optional HTTP client.
pub struct LocalSource<'src> {
    system: &'src dyn System,
    http: Option<&'src dyn HttpClient>,
}

impl<'src> LocalSource<'src> {
    /// Create a local source with no network access
    #[must_use]
    #[inline]
    pub fn new(system: &'src dyn System) -> Self {
        Self { system, http: None }
    }

    /// Allow absolute YAML URLs to be fetched over HTTP (builder pattern)
    #[must_use]
    #[inline]
    pub fn with_http(mut self, http: &'src dyn HttpClient) -> Self {
        self.http = Some(http);
        self
    }
}

impl ContentSource for LocalSource<'_> {
    fn list_files(&self, directory: &str) -> Result<Vec<String>> {
        let dir = Path::new(directory);
        if !self.system.is_dir(dir) {
            debug!("Local directory does not exist: {directory}");
            return Ok(Vec::new());
        }

        let mut files: Vec<String> = self
            .system
            .read_dir(dir)
            .with_context(|| format!("Failed to read directory: {directory}"))?
            .into_iter()
            .filter(|path| self.system.is_file(path))
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| has_yaml_suffix(name, true))
            })
            .map(|path| path.to_string_lossy().into_owned())
            .collect();

        // Directory iteration order is platform dependent
        files.sort();
        debug!("Local listing of {directory}: {files:?}");

        Ok(files)
    }

    fn fetch(&self, identifier: &str) -> Result<String> {
        if is_remote_yaml(identifier) {
            let http = self.http.ok_or_else(|| {
                MergeError::configuration("Remote YAML URLs need network access")
            })?;
            let response = http.get(identifier, &[])?;
            if !response.is_success() {
                return Err(MergeError::network(format!("HTTP {}", response.status)).into());
            }
            return Ok(response.body);
        }

        self.system
            .read_to_string(Path::new(identifier))
            .map_err(|e| MergeError::filesystem(e.to_string()).into())
    }
}
