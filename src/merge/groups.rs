//! Proxy group synthesis
//!
//! Produces, in order:
//! 1. the top-level `select` group offering the health-checked groups and
//!    one group per non-empty source file,
//! 2. a `url-test` and a `fallback` group over every proxy,
//! 3. one `select` group per non-empty source file.

use crate::config::MergePolicy;
use crate::merge::proxies::{TaggedProxies, proxy_name};
use crate::utils::path::source_name;
use serde::Serialize;
use tracing::{info, warn};

/// Selection strategy of a proxy group
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
#[non_exhaustive]
pub enum GroupType {
    Select,
    UrlTest,
    Fallback,
}

/// A routing group as written to the `proxy-groups` section
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct ProxyGroup {
    pub name: String,

    #[serde(rename = "type")]
    pub group_type: GroupType,

    /// Group or proxy names, in preference order
    pub proxies: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Health-check interval in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u64>,
}

impl ProxyGroup {
    /// Manual selection group
    #[must_use]
    pub fn select<S: Into<String>>(name: S, proxies: Vec<String>) -> Self {
        Self {
            name: name.into(),
            group_type: GroupType::Select,
            proxies,
            url: None,
            interval: None,
        }
    }

    /// Health-checked group of the given type
    #[must_use]
    pub fn health_checked<S: Into<String>>(
        name: S,
        group_type: GroupType,
        proxies: Vec<String>,
        policy: &MergePolicy,
    ) -> Self {
        Self {
            name: name.into(),
            group_type,
            proxies,
            url: Some(policy.health_check_url.clone()),
            interval: Some(policy.interval),
        }
    }
}

/// Build the proxy groups for a de-duplicated proxy list
///
/// `source_identifiers` fixes bucket order; membership is decided by exact
/// source tag equality. Buckets that stay empty produce no group and are not
/// offered by the top-level group.
#[must_use]
pub fn synthesize_groups(
    proxies: &TaggedProxies,
    source_identifiers: &[String],
    policy: &MergePolicy,
) -> Vec<ProxyGroup> {
    let reserved = [
        policy.network_group.as_str(),
        policy.auto_group.as_str(),
        policy.fallback_group.as_str(),
    ];

    let mut buckets: Vec<(String, Vec<String>)> = Vec::new();
    for identifier in source_identifiers {
        let name = source_name(identifier);
        if reserved.contains(&name.as_str()) {
            warn!("Source '{identifier}' is named like a built-in group; it gets no group of its own");
            continue;
        }
        if !buckets.iter().any(|(existing, _)| *existing == name) {
            buckets.push((name, Vec::new()));
        }
    }

    for (proxy, source) in proxies.iter() {
        let Some(name) = proxy_name(proxy) else {
            continue;
        };
        if let Some((_, members)) = buckets.iter_mut().find(|(bucket, _)| bucket.as_str() == source) {
            members.push(name);
        }
    }

    let buckets: Vec<(String, Vec<String>)> = buckets
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .collect();

    let health_checked = || vec![policy.auto_group.clone(), policy.fallback_group.clone()];

    let mut network_options = health_checked();
    network_options.extend(buckets.iter().map(|(name, _)| name.clone()));

    let all_names = proxies.names();
    let mut groups = vec![
        ProxyGroup::select(policy.network_group.clone(), network_options),
        ProxyGroup::health_checked(
            policy.auto_group.clone(),
            GroupType::UrlTest,
            all_names.clone(),
            policy,
        ),
        ProxyGroup::health_checked(
            policy.fallback_group.clone(),
            GroupType::Fallback,
            all_names,
            policy,
        ),
    ];

    for (name, members) in buckets {
        let mut options = health_checked();
        options.extend(members);
        groups.push(ProxyGroup::select(name, options));
    }

    info!("Created {} proxy groups", groups.len());
    groups
}
