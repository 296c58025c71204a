//! Identifier and path helpers

use crate::error::MergeError;
use anyhow::Result;
use std::path::{Component, Path};

/// YAML suffixes recognised by the local listing, longest first
pub const YAML_SUFFIXES: &[&str] = &[".yaml", ".yml"];

/// Last `/`-separated segment of a path or URL
#[must_use]
pub fn basename(identifier: &str) -> &str {
    let trimmed = identifier.trim_end_matches('/');
    trimmed
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(trimmed)
}

/// Source tag for a file identifier: basename with the YAML suffix stripped
///
/// Works the same for local paths, repository paths and absolute URLs.
#[must_use]
pub fn source_name(identifier: &str) -> String {
    let name = basename(identifier);
    YAML_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .unwrap_or(name)
        .to_owned()
}

/// Whether a file name carries a YAML suffix
///
/// `accept_yml` additionally admits the short `.yml` form.
#[must_use]
pub fn has_yaml_suffix(name: &str, accept_yml: bool) -> bool {
    name.ends_with(".yaml") || (accept_yml && name.ends_with(".yml"))
}

/// Validate that a configured directory stays inside its root
///
/// # Errors
///
/// Returns an error if:
/// - The path is empty
/// - The path contains a `..` component
#[inline]
pub fn validate_path_safety(path: &str) -> Result<()> {
    if path.trim().is_empty() {
        return Err(MergeError::configuration("Directory path cannot be empty").into());
    }

    if Path::new(path)
        .components()
        .any(|component| matches!(component, Component::ParentDir))
    {
        return Err(MergeError::configuration(format!(
            "Path contains unsafe directory traversal: '{path}'"
        ))
        .into());
    }

    Ok(())
}
