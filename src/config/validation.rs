//! Settings validation logic

use crate::config::profiles::{parse_profiles, split_list};
use crate::config::{MergePolicy, Settings};
use crate::utils::path::validate_path_safety;
use crate::utils::patterns::is_remote_yaml;
use crate::utils::redact::redact_url;
use anyhow::{Result, anyhow};

/// Validate complete settings
///
/// # Errors
///
/// Returns an error if:
/// - A category directory is empty or escapes its root
/// - A remote YAML entry is not an absolute https `.yaml` URL
/// - The profile spec is invalid
/// - An output file name prefix is empty or contains a path separator
/// - The policy is inconsistent
#[inline]
pub fn validate_settings(settings: &Settings) -> Result<()> {
    let github = &settings.github;

    for (label, dir) in [
        ("proxy_providers_directory", &github.proxy_providers_directory),
        ("proxies_directory", &github.proxies_directory),
        ("rule_providers_directory", &github.rule_providers_directory),
        ("rules_directory", &github.rules_directory),
    ] {
        validate_category(dir).map_err(|e| anyhow!("github.{label}: {e}"))?;
    }

    let remote_yamls = split_list(&github.fconfs_remote_yamls);
    validate_remote_yamls(&remote_yamls)?;

    if !github.fconfs_directories.trim().is_empty() {
        validate_profile_spec(&github.fconfs_directories, &remote_yamls)?;
    }

    validate_file_prefix("output.config_filename", &settings.output.config_filename)?;
    validate_file_prefix("output.stats_filename", &settings.output.stats_filename)?;

    validate_policy(&settings.merge_policy())
}

/// Validate that every remote entry is an absolute YAML URL
///
/// # Errors
///
/// Returns an error naming the first offending entry.
#[inline]
pub fn validate_remote_yamls(remote_yamls: &[String]) -> Result<()> {
    for (index, url) in remote_yamls.iter().enumerate() {
        if !is_remote_yaml(url) {
            return Err(anyhow!(
                "Remote YAML #{}: '{}' must be an https URL ending in .yaml",
                index + 1,
                redact_url(url)
            ));
        }
    }
    Ok(())
}

/// Validate a category entry: directories or absolute YAML URLs, comma separated
///
/// # Errors
///
/// Returns an error if the entry is empty, names an unsafe path or holds a URL
/// that is not an https `.yaml` URL.
#[inline]
pub fn validate_category(entry: &str) -> Result<()> {
    let items = split_list(entry);
    if items.is_empty() {
        return validate_path_safety(entry);
    }

    for item in &items {
        if item.contains("://") {
            if !is_remote_yaml(item) {
                return Err(anyhow!(
                    "'{}' must be an https URL ending in .yaml",
                    redact_url(item)
                ));
            }
        } else {
            validate_path_safety(item)?;
        }
    }
    Ok(())
}

/// Validate a profile spec and the local directories it names
///
/// # Errors
///
/// Returns an error if the spec does not parse or names an unsafe path.
#[inline]
pub fn validate_profile_spec(spec: &str, remote_yamls: &[String]) -> Result<()> {
    for profile in parse_profiles(spec, remote_yamls)? {
        for source in profile.sources.iter().filter(|s| !is_remote_yaml(s)) {
            validate_path_safety(source)
                .map_err(|e| anyhow!("Profile '{}': {e}", profile.name))?;
        }
    }
    Ok(())
}

fn validate_file_prefix(label: &str, prefix: &str) -> Result<()> {
    if prefix.trim().is_empty() {
        return Err(anyhow!("{label} cannot be empty"));
    }
    if prefix.contains(['/', '\\']) {
        return Err(anyhow!(
            "{label} must be a file name prefix, not a path: '{prefix}'"
        ));
    }
    Ok(())
}

/// Validate a resolved merge policy
///
/// # Errors
///
/// Returns an error if:
/// - A group name is empty or contains a comma
/// - Two synthesized groups share a name
/// - The interval is zero
#[inline]
pub fn validate_policy(policy: &MergePolicy) -> Result<()> {
    let groups = [
        ("network_group", &policy.network_group),
        ("auto_group", &policy.auto_group),
        ("fallback_group", &policy.fallback_group),
    ];

    for (label, name) in groups {
        if name.trim().is_empty() {
            return Err(anyhow!("policy.{label} cannot be empty"));
        }
        if name.contains(',') {
            return Err(anyhow!(
                "policy.{label} '{name}' cannot contain ',' (it is used as a rule target)"
            ));
        }
    }

    if policy.network_group == policy.auto_group
        || policy.network_group == policy.fallback_group
        || policy.auto_group == policy.fallback_group
    {
        return Err(anyhow!("policy group names must be distinct"));
    }

    if policy.interval == 0 {
        return Err(anyhow!("policy.interval must be greater than zero"));
    }

    if policy.default_rule_target.trim().is_empty() {
        return Err(anyhow!("policy.default_rule_target cannot be empty"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicySettings;

    #[test]
    fn default_settings_are_valid() {
        validate_settings(&Settings::default()).unwrap();
    }

    #[test]
    fn rejects_traversal_in_category_directory() {
        let mut settings = Settings::default();
        settings.github.rules_directory = "../rules".to_owned();
        let err = validate_settings(&settings).unwrap_err();
        assert!(err.to_string().contains("github.rules_directory"));
    }

    #[test]
    fn category_accepts_url_list() {
        let mut settings = Settings::default();
        settings.github.proxies_directory =
            "https://h.example.com/a.yaml, https://h.example.com/b.yaml".to_owned();
        settings.github.rules_directory = "rules,extra-rules".to_owned();
        validate_settings(&settings).unwrap();
    }

    #[test]
    fn category_list_checks_every_entry() {
        assert!(validate_category("https://h.example.com/a.yaml,../nodes").is_err());
        assert!(validate_category("proxies,http://h.example.com/a.yaml").is_err());
        assert!(validate_category("https://h.example.com/a.json").is_err());
        assert!(validate_category(" , ").is_err());
    }

    #[test]
    fn rejects_non_yaml_remote() {
        let mut settings = Settings::default();
        settings.github.fconfs_remote_yamls = "https://example.com/base.json".to_owned();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn rejects_path_like_output_prefix() {
        let mut settings = Settings::default();
        settings.output.config_filename = "out/clash".to_owned();
        assert!(validate_settings(&settings).is_err());
    }

    #[test]
    fn rejects_clashing_group_names() {
        let mut settings = Settings::default();
        settings.policy = PolicySettings {
            auto_group: Some("network".to_owned()),
            ..PolicySettings::default()
        };
        assert!(validate_settings(&settings).is_err());
    }
}
