//! Remote repository source backed by a contents API
//!
//! Listing calls `GET {api}/repos/{owner}/{repo}/contents/{dir}` and keeps
//! `file` entries whose name ends in `.yaml`. Reading calls the same endpoint
//! for a file and decodes its base64 payload. Absolute YAML URLs bypass the
//! API and are fetched as raw text without credentials.

use super::ContentSource;
use crate::error::MergeError;
use crate::http::HttpClient;
use crate::utils::path::has_yaml_suffix;
use crate::utils::patterns::is_remote_yaml;
use anyhow::{Context as _, Result};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Accept header for the v3 contents API
const ACCEPT: &str = "application/vnd.github.v3+json";

/// One entry of a directory listing
#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    path: String,
}

/// A single file as returned by the contents API
#[derive(Debug, Deserialize)]
struct ContentFile {
    #[serde(default)]
    encoding: String,
    #[serde(default)]
    content: String,
}

/// Reads category files from a remote repository
pub struct RemoteSource<'src> {
    http: &'src dyn HttpClient,
    contents_url: Url,
    authorization: String,
}

impl<'src> RemoteSource<'src> {
    /// Create a source for `owner/repository` under the given API base URL
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The API URL is not a valid base URL
    /// - Owner or repository is empty
    #[inline]
    pub fn new(
        http: &'src dyn HttpClient,
        api_url: &str,
        owner: &str,
        repository: &str,
        token: &str,
    ) -> Result<Self> {
        if owner.trim().is_empty() || repository.trim().is_empty() {
            return Err(MergeError::configuration(
                "Repository owner and name are required in remote mode \
                (set REPO_OWNER/REPO_NAME or github.owner/github.repository)",
            )
            .into());
        }

        let mut contents_url = Url::parse(api_url)
            .map_err(|e| MergeError::configuration(format!("Invalid API URL '{api_url}': {e}")))?;
        contents_url
            .path_segments_mut()
            .map_err(|()| MergeError::configuration(format!("Invalid API URL '{api_url}'")))?
            .pop_if_empty()
            .extend(["repos", owner.trim(), repository.trim(), "contents"]);

        Ok(Self {
            http,
            contents_url,
            authorization: format!("token {token}"),
        })
    }

    /// Contents API URL for a repository path
    #[must_use]
    pub fn contents_url(&self, path: &str) -> String {
        let mut url = self.contents_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.extend(path.split('/').filter(|segment| !segment.is_empty()));
        }
        url.to_string()
    }

    fn api_get(&self, path: &str) -> Result<Option<String>> {
        let headers = [
            ("Authorization", self.authorization.as_str()),
            ("Accept", ACCEPT),
        ];
        let response = self.http.get(&self.contents_url(path), &headers)?;

        if response.status == 404 {
            return Ok(None);
        }
        if !response.is_success() {
            return Err(MergeError::network(format!(
                "HTTP {} from contents API for '{path}'",
                response.status
            ))
            .into());
        }

        Ok(Some(response.body))
    }
}

impl ContentSource for RemoteSource<'_> {
    fn list_files(&self, directory: &str) -> Result<Vec<String>> {
        let Some(body) = self.api_get(directory)? else {
            debug!("Remote directory does not exist: {directory}");
            return Ok(Vec::new());
        };

        let entries: Vec<ContentEntry> = serde_json::from_str(&body)
            .with_context(|| format!("Unexpected listing format for '{directory}'"))?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.kind == "file" && has_yaml_suffix(&entry.name, false))
            .map(|entry| entry.path)
            .collect())
    }

    fn fetch(&self, identifier: &str) -> Result<String> {
        if is_remote_yaml(identifier) {
            let response = self.http.get(identifier, &[])?;
            if !response.is_success() {
                return Err(MergeError::network(format!("HTTP {}", response.status)).into());
            }
            return Ok(response.body);
        }

        let body = self.api_get(identifier)?.ok_or_else(|| {
            MergeError::network(format!("File not found in repository: {identifier}"))
        })?;

        let file: ContentFile = serde_json::from_str(&body)
            .with_context(|| format!("Unexpected contents format for '{identifier}'"))?;

        decode_content(&file)
    }
}

fn decode_content(file: &ContentFile) -> Result<String> {
    if file.encoding != "base64" {
        return Err(MergeError::network(format!(
            "Unsupported content encoding: '{}'",
            file.encoding
        ))
        .into());
    }

    // The API wraps base64 payloads at 60 columns
    let compact: String = file
        .content
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .context("Invalid base64 content")?;

    String::from_utf8(bytes).context("File content is not valid UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wrapped_base64() {
        let file = ContentFile {
            encoding: "base64".to_owned(),
            content: "cHJveGllczog\nW10=\n".to_owned(),
        };
        assert_eq!(decode_content(&file).unwrap(), "proxies: []");
    }

    #[test]
    fn rejects_other_encodings() {
        let file = ContentFile {
            encoding: "none".to_owned(),
            content: String::new(),
        };
        assert!(decode_content(&file).is_err());
    }
}
