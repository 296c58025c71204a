//! Configuration management module
//!
//! Handles settings file parsing, JSON schema validation, profile specs and
//! the merge policy.

pub mod policy;
pub mod profiles;
pub mod schema;
pub mod validation;
pub mod yaml;

use crate::system::System;
use serde::{Deserialize, Serialize};

pub use policy::{MergePolicy, PolicyPreset, RuleTargetPolicy};
pub use profiles::{Profile, parse_profiles};

/// Default settings file location, relative to the working directory
pub const DEFAULT_SETTINGS_PATH: &str = "config/settings.yaml";

/// Main settings structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Source repository and category directories
    pub github: GithubSettings,

    /// Output artifact naming
    pub output: OutputSettings,

    /// Group naming and rule targeting policy
    pub policy: PolicySettings,
}

/// Repository and directory layout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GithubSettings {
    /// Repository owner
    pub owner: String,

    /// Repository name
    pub repository: String,

    /// Base URL of the repository API
    pub api_url: String,

    /// Comma-separated absolute YAML URLs prefixed to every profile
    pub fconfs_remote_yamls: String,

    /// Profile spec for the full-settings category
    pub fconfs_directories: String,

    pub proxy_providers_directory: String,
    pub proxies_directory: String,
    pub rule_providers_directory: String,
    pub rules_directory: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GithubSettings {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repository: String::new(),
            api_url: "https://api.github.com".to_owned(),
            fconfs_remote_yamls: String::new(),
            fconfs_directories: "fconfs".to_owned(),
            proxy_providers_directory: "proxy-providers".to_owned(),
            proxies_directory: "proxies".to_owned(),
            rule_providers_directory: "rule-providers".to_owned(),
            rules_directory: "rules".to_owned(),
            timeout_secs: 30,
        }
    }
}

/// Output artifact naming
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputSettings {
    /// Prefix of the generated configuration file name
    pub config_filename: String,

    /// Prefix of the statistics file name
    pub stats_filename: String,

    /// Fetch every proxy provider URL to count its proxies
    pub count_provider_proxies: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            config_filename: "clash".to_owned(),
            stats_filename: "stats".to_owned(),
            count_provider_proxies: false,
        }
    }
}

/// Policy selection: a preset plus optional per-field overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PolicySettings {
    pub preset: PolicyPreset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_rule_target: Option<String>,
    pub rule_target: RuleTargetPolicy,
}

impl Settings {
    /// Load settings from file
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or parsed
    /// - The settings fail schema or semantic validation
    pub fn load_from_file(system: &dyn System, path: &str) -> anyhow::Result<Self> {
        yaml::load_settings(system, path)
    }

    /// Validate settings semantics
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any directory, URL, profile or policy value is invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        validation::validate_settings(self)
    }

    /// Resolve the merge policy from preset and overrides
    #[must_use]
    pub fn merge_policy(&self) -> MergePolicy {
        MergePolicy::from_settings(&self.policy)
    }
}
