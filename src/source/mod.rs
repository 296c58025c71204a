//! Content sources: where category files are listed and read from
//!
//! Two backends implement [`ContentSource`]: a local directory tree and a
//! remote repository contents API. Both accept absolute YAML URLs as file
//! identifiers and fetch those directly.

pub mod local;
pub mod remote;

pub use local::LocalSource;
pub use remote::RemoteSource;

use crate::utils::patterns::is_remote_yaml;
use crate::utils::redact::redact_url;
use anyhow::Result;
use tracing::{error, info, warn};

/// Listing and reading of category files
///
/// Implementors provide the fallible primitives; the provided methods apply
/// the skip-and-log policy the merge pipeline relies on.
pub trait ContentSource {
    /// List YAML file identifiers directly inside a directory
    ///
    /// A missing directory is not an error: implementors return an empty list
    /// and log a warning.
    ///
    /// # Errors
    ///
    /// Returns an error when the listing itself fails.
    fn list_files(&self, directory: &str) -> Result<Vec<String>>;

    /// Fetch the UTF-8 text of one file identifier
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be fetched or decoded.
    fn fetch(&self, identifier: &str) -> Result<String>;

    /// List a directory, logging and absorbing failures
    fn list(&self, directory: &str) -> Vec<String> {
        match self.list_files(directory) {
            Ok(files) => {
                if files.is_empty() {
                    warn!("No YAML files found in directory: {}", redact_url(directory));
                } else {
                    info!(
                        "Found {} YAML file(s) in directory: {}",
                        files.len(),
                        redact_url(directory)
                    );
                }
                files
            }
            Err(e) => {
                error!("Failed to list directory {}: {e:#}", redact_url(directory));
                Vec::new()
            }
        }
    }

    /// Read a file, logging and absorbing failures
    fn read(&self, identifier: &str) -> Option<String> {
        match self.fetch(identifier) {
            Ok(content) => {
                info!("Fetched file: {}", redact_url(identifier));
                Some(content)
            }
            Err(e) => {
                error!("Failed to fetch file {}: {e:#}", redact_url(identifier));
                None
            }
        }
    }

    /// Expand a configured entry into file identifiers
    ///
    /// Absolute YAML URLs stand for themselves; anything else is a directory.
    fn resolve(&self, entry: &str) -> Vec<String> {
        if is_remote_yaml(entry) {
            vec![entry.to_owned()]
        } else {
            self.list(entry)
        }
    }
}
