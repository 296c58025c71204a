//! Identifier patterns shared by the sources and the settings validation

use regex::Regex;
use std::sync::LazyLock;

/// Absolute YAML URL: https scheme, path ending in `.yaml`
pub const REMOTE_YAML_PATTERN: &str = r"^https://.+\.yaml$";

/// Any absolute http(s) URL
pub const REMOTE_FILE_PATTERN: &str = r"^https?://.+$";

/// Profile name in a `name|sources` profile spec
pub const PROFILE_NAME_PATTERN: &str = r"^[a-zA-Z][a-zA-Z0-9_-]*$";

#[expect(clippy::unwrap_used, reason = "Pattern is a compile-time constant")]
static REMOTE_YAML: LazyLock<Regex> = LazyLock::new(|| Regex::new(REMOTE_YAML_PATTERN).unwrap());

#[expect(clippy::unwrap_used, reason = "Pattern is a compile-time constant")]
static REMOTE_FILE: LazyLock<Regex> = LazyLock::new(|| Regex::new(REMOTE_FILE_PATTERN).unwrap());

#[expect(clippy::unwrap_used, reason = "Pattern is a compile-time constant")]
static PROFILE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PROFILE_NAME_PATTERN).unwrap());

/// Whether an identifier is an absolute YAML URL to be fetched directly
#[must_use]
#[inline]
pub fn is_remote_yaml(identifier: &str) -> bool {
    REMOTE_YAML.is_match(identifier)
}

/// Whether a string is any absolute http(s) URL
#[must_use]
#[inline]
pub fn is_remote_file(identifier: &str) -> bool {
    REMOTE_FILE.is_match(identifier)
}

/// Whether a string is a valid profile name
#[must_use]
#[inline]
pub fn is_profile_name(name: &str) -> bool {
    PROFILE_NAME.is_match(name)
}
