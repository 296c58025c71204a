//! Profile spec parsing
//!
//! A profile spec lists one or more output documents and the full-settings
//! sources each is built from:
//!
//! ```text
//! home|fconfs,https://example.com/base.yaml;work|fconfs-work
//! ```
//!
//! Groups are separated by `;`, sources by `,`. A group without a `name|`
//! prefix is named after its first source.

use crate::error::MergeError;
use crate::utils::path::source_name;
use crate::utils::patterns::is_profile_name;
use anyhow::Result;
use std::collections::HashSet;

/// One output document and the full-settings sources it merges
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct Profile {
    /// Name embedded in the output file names
    pub name: String,

    /// Directories or absolute YAML URLs, in merge order
    pub sources: Vec<String>,
}

impl Profile {
    /// Create a profile from a name and its sources
    #[must_use]
    #[inline]
    pub fn new<S: Into<String>>(name: S, sources: Vec<String>) -> Self {
        Self {
            name: name.into(),
            sources,
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empties
#[must_use]
pub fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Parse a profile spec, prefixing every profile with the remote YAML URLs
///
/// # Errors
///
/// Returns an error if:
/// - The spec contains no profile
/// - A profile name is invalid or used twice
/// - A profile ends up with no sources
pub fn parse_profiles(spec: &str, remote_yamls: &[String]) -> Result<Vec<Profile>> {
    let mut profiles = Vec::new();
    let mut names = HashSet::new();

    for group in spec.split(';').map(str::trim).filter(|g| !g.is_empty()) {
        let (explicit_name, entries) = match group.split_once('|') {
            Some((name, rest)) => (Some(name.trim()), split_list(rest)),
            None => (None, split_list(group)),
        };

        let name = match explicit_name {
            Some(name) => {
                if !is_profile_name(name) {
                    return Err(MergeError::configuration(format!(
                        "Invalid profile name '{name}' in '{group}'. \
                        Names start with a letter and contain only letters, digits, '_' or '-'"
                    ))
                    .into());
                }
                name.to_owned()
            }
            None => entries.first().map(|first| source_name(first)).ok_or_else(|| {
                MergeError::configuration(format!("Profile '{group}' has no sources"))
            })?,
        };

        let sources = dedup_preserving_order(remote_yamls.iter().cloned().chain(entries));
        if sources.is_empty() {
            return Err(
                MergeError::configuration(format!("Profile '{name}' has no sources")).into(),
            );
        }

        if !names.insert(name.clone()) {
            return Err(MergeError::configuration(format!(
                "Profile '{name}' is defined more than once"
            ))
            .into());
        }

        profiles.push(Profile { name, sources });
    }

    if profiles.is_empty() {
        return Err(MergeError::configuration(
            "No profiles configured. Set github.fconfs_directories or --fconfs-directories",
        )
        .into());
    }

    Ok(profiles)
}

fn dedup_preserving_order<I: IntoIterator<Item = String>>(items: I) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
