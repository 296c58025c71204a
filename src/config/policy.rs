//! Merge policy: group naming, health checks and rule targeting
//!
//! Earlier generations of the merge pipeline differed only in group names
//! and the catch-all target. Those generations are kept as presets of one
//! policy instead of separate code paths.

use crate::config::PolicySettings;
use serde::{Deserialize, Serialize};

/// Health-check URL shared by both presets
pub const DEFAULT_HEALTH_CHECK_URL: &str = "http://www.gstatic.com/generate_204";

/// Health-check interval in seconds shared by both presets
pub const DEFAULT_INTERVAL: u64 = 300;

/// Named policy generations
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum PolicyPreset {
    /// `network` / `auto-select` / `fail-over`, catch-all to `network`
    #[default]
    Standard,
    /// Localised group names, catch-all to `DIRECT`
    Legacy,
}

/// What to do with a rule that already names a target
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum RuleTargetPolicy {
    /// Replace any embedded target with the network group
    #[default]
    Override,
    /// Keep an embedded target, fill in only missing ones
    Respect,
}

/// Fully resolved merge policy
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct MergePolicy {
    /// Top-level `select` group every rule targets
    pub network_group: String,

    /// Latency-tested group over all proxies
    pub auto_group: String,

    /// Ordered fallback group over all proxies
    pub fallback_group: String,

    pub health_check_url: String,

    /// Health-check interval in seconds
    pub interval: u64,

    /// Target of the synthesized `MATCH` rule
    pub default_rule_target: String,

    pub rule_target: RuleTargetPolicy,
}

impl MergePolicy {
    /// Policy for a preset with no overrides
    #[must_use]
    pub fn preset(preset: PolicyPreset) -> Self {
        match preset {
            PolicyPreset::Standard => Self {
                network_group: "network".to_owned(),
                auto_group: "auto-select".to_owned(),
                fallback_group: "fail-over".to_owned(),
                health_check_url: DEFAULT_HEALTH_CHECK_URL.to_owned(),
                interval: DEFAULT_INTERVAL,
                default_rule_target: "network".to_owned(),
                rule_target: RuleTargetPolicy::Override,
            },
            PolicyPreset::Legacy => Self {
                network_group: "网络代理".to_owned(),
                auto_group: "自动选择".to_owned(),
                fallback_group: "故障转移".to_owned(),
                health_check_url: DEFAULT_HEALTH_CHECK_URL.to_owned(),
                interval: DEFAULT_INTERVAL,
                default_rule_target: "DIRECT".to_owned(),
                rule_target: RuleTargetPolicy::Override,
            },
        }
    }

    /// Resolve a policy from settings: preset first, then overrides
    ///
    /// Overriding only the network group also moves the catch-all target
    /// when the preset's catch-all pointed at the network group.
    #[must_use]
    pub fn from_settings(settings: &PolicySettings) -> Self {
        let mut policy = Self::preset(settings.preset);
        let catch_all_follows_network = policy.default_rule_target == policy.network_group;

        if let Some(name) = settings.network_group.as_ref() {
            policy.network_group.clone_from(name);
            if catch_all_follows_network {
                policy.default_rule_target.clone_from(name);
            }
        }
        if let Some(name) = settings.auto_group.as_ref() {
            policy.auto_group.clone_from(name);
        }
        if let Some(name) = settings.fallback_group.as_ref() {
            policy.fallback_group.clone_from(name);
        }
        if let Some(url) = settings.health_check_url.as_ref() {
            policy.health_check_url.clone_from(url);
        }
        if let Some(interval) = settings.interval {
            policy.interval = interval;
        }
        if let Some(target) = settings.default_rule_target.as_ref() {
            policy.default_rule_target.clone_from(target);
        }
        policy.rule_target = settings.rule_target;

        policy
    }

    /// The synthesized catch-all rule, always placed last
    #[must_use]
    pub fn catch_all_rule(&self) -> String {
        format!("MATCH,{}", self.default_rule_target)
    }
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self::preset(PolicyPreset::Standard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_preset() {
        let policy = MergePolicy::default();
        assert_eq!(policy.network_group, "network");
        assert_eq!(policy.catch_all_rule(), "MATCH,network");
        assert_eq!(policy.interval, 300);
    }

    #[test]
    fn legacy_preset_targets_direct() {
        let policy = MergePolicy::preset(PolicyPreset::Legacy);
        assert_eq!(policy.catch_all_rule(), "MATCH,DIRECT");
        assert_eq!(policy.auto_group, "自动选择");
    }

    #[test]
    fn network_override_moves_catch_all_for_standard() {
        let settings = PolicySettings {
            network_group: Some("proxy".to_owned()),
            ..PolicySettings::default()
        };
        let policy = MergePolicy::from_settings(&settings);
        assert_eq!(policy.network_group, "proxy");
        assert_eq!(policy.catch_all_rule(), "MATCH,proxy");
    }

    #[test]
    fn network_override_keeps_direct_for_legacy() {
        let settings = PolicySettings {
            preset: PolicyPreset::Legacy,
            network_group: Some("proxy".to_owned()),
            ..PolicySettings::default()
        };
        let policy = MergePolicy::from_settings(&settings);
        assert_eq!(policy.catch_all_rule(), "MATCH,DIRECT");
    }

    #[test]
    fn explicit_overrides_win() {
        let settings = PolicySettings {
            interval: Some(60),
            default_rule_target: Some("REJECT".to_owned()),
            rule_target: RuleTargetPolicy::Respect,
            ..PolicySettings::default()
        };
        let policy = MergePolicy::from_settings(&settings);
        assert_eq!(policy.interval, 60);
        assert_eq!(policy.catch_all_rule(), "MATCH,REJECT");
        assert_eq!(policy.rule_target, RuleTargetPolicy::Respect);
    }
}
