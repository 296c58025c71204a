//! Summary statistics of a generated document

use crate::error::MergeError;
use crate::http::HttpClient;
use crate::operations::assemble::{
    PROXIES_KEY, PROXY_GROUPS_KEY, PROXY_PROVIDERS_KEY, RULE_PROVIDERS_KEY, RULES_KEY,
};
use crate::utils::patterns::is_remote_file;
use crate::utils::redact::redact_url;
use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;
use serde_yaml::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Prefix of rules that reference a rule provider
const RULE_SET_PREFIX: &str = "RULE-SET,";

/// Counts written next to each generated document
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub struct Stats {
    pub generated_at: String,
    pub proxy_providers_count: usize,

    /// Proxies served by each provider; zero unless counting is enabled
    pub proxy_providers_proxies_count: BTreeMap<String, usize>,
    pub proxies_count: usize,
    pub proxy_groups_count: usize,
    pub rule_providers_count: usize,

    /// Rules that reference a rule provider
    pub rule_providers_used_count: usize,
    pub rules_count: usize,
}

impl Stats {
    /// Collect statistics from an assembled document
    ///
    /// With a `provider_client`, every proxy provider whose `url` is an HTTP(S)
    /// URL is fetched and its proxies counted.
    #[must_use]
    pub fn collect(
        document: &Value,
        generated_at: &DateTime<Utc>,
        provider_client: Option<&dyn HttpClient>,
    ) -> Self {
        let providers = document
            .get(PROXY_PROVIDERS_KEY)
            .and_then(Value::as_mapping);

        let proxy_providers_proxies_count = providers
            .into_iter()
            .flatten()
            .filter_map(|(name, provider)| {
                let name = name.as_str()?.to_owned();
                let count = match (provider_client, provider_url(provider)) {
                    (Some(http), Some(url)) => count_provider_proxies(http, url),
                    _ => 0,
                };
                Some((name, count))
            })
            .collect();

        let rules = document.get(RULES_KEY).and_then(Value::as_sequence);

        Self {
            generated_at: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            proxy_providers_count: providers.map_or(0, serde_yaml::Mapping::len),
            proxy_providers_proxies_count,
            proxies_count: sequence_len(document, PROXIES_KEY),
            proxy_groups_count: sequence_len(document, PROXY_GROUPS_KEY),
            rule_providers_count: document
                .get(RULE_PROVIDERS_KEY)
                .and_then(Value::as_mapping)
                .map_or(0, serde_yaml::Mapping::len),
            rule_providers_used_count: rules
                .into_iter()
                .flatten()
                .filter_map(Value::as_str)
                .filter(|rule| rule.trim().starts_with(RULE_SET_PREFIX))
                .count(),
            rules_count: rules.map_or(0, Vec::len),
        }
    }

    /// Pretty JSON with two-space indentation
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| MergeError::serialization(format!("Statistics: {e}")).into())
    }

    /// Log a one-line summary per count
    pub fn log_summary(&self, profile: &str) {
        info!("Statistics for profile '{profile}':");
        info!("  Proxy providers: {}", self.proxy_providers_count);
        info!("  Proxies: {}", self.proxies_count);
        info!("  Proxy groups: {}", self.proxy_groups_count);
        info!(
            "  Rule providers: {} ({} used)",
            self.rule_providers_count, self.rule_providers_used_count
        );
        info!("  Rules: {}", self.rules_count);
    }
}

fn sequence_len(document: &Value, key: &str) -> usize {
    document
        .get(key)
        .and_then(Value::as_sequence)
        .map_or(0, Vec::len)
}

fn provider_url(provider: &Value) -> Option<&str> {
    provider
        .get("url")
        .and_then(Value::as_str)
        .filter(|url| is_remote_file(url))
}

/// Fetch a provider subscription and count its proxies, 0 on any failure
fn count_provider_proxies(http: &dyn HttpClient, url: &str) -> usize {
    let response = match http.get(url, &[]) {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            warn!("HTTP {} from provider {}", response.status, redact_url(url));
            return 0;
        }
        Err(e) => {
            warn!("Failed to fetch provider {}: {e:#}", redact_url(url));
            return 0;
        }
    };

    let count = serde_yaml::from_str::<Value>(&response.body)
        .ok()
        .as_ref()
        .and_then(|doc| doc.get(PROXIES_KEY))
        .and_then(Value::as_sequence)
        .map_or(0, Vec::len);
    debug!("Provider {} serves {count} proxies", redact_url(url));
    count
}
