//! Assembly of one configuration document from its categories
//!
//! The full-settings sources of a profile form the base document. The
//! proxy-provider, proxy, rule-provider and rule categories are then merged
//! into it one after another. A category that yields no usable document is
//! left out; only an empty full-settings category is fatal.

use crate::config::profiles::split_list;
use crate::config::{GithubSettings, MergePolicy, Profile};
use crate::error::MergeError;
use crate::merge::{
    ProxyDeduplicator, RuleNormalizer, deep_merge, is_catch_all, merge_all, proxy_name,
    synthesize_groups,
};
use crate::source::ContentSource;
use crate::utils::path::source_name;
use crate::utils::redact::{redact_all, redact_url};
use anyhow::Result;
use serde_yaml::{Mapping, Value};
use tracing::{debug, error, info, warn};

pub const PROXY_PROVIDERS_KEY: &str = "proxy-providers";
pub const PROXIES_KEY: &str = "proxies";
pub const PROXY_GROUPS_KEY: &str = "proxy-groups";
pub const RULE_PROVIDERS_KEY: &str = "rule-providers";
pub const RULES_KEY: &str = "rules";

/// Entries of the non-primary categories
///
/// Each entry is a comma separated list of directories and absolute YAML URLs.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CategoryDirectories {
    pub proxy_providers: String,
    pub proxies: String,
    pub rule_providers: String,
    pub rules: String,
}

impl From<&GithubSettings> for CategoryDirectories {
    fn from(settings: &GithubSettings) -> Self {
        Self {
            proxy_providers: settings.proxy_providers_directory.clone(),
            proxies: settings.proxies_directory.clone(),
            rule_providers: settings.rule_providers_directory.clone(),
            rules: settings.rules_directory.clone(),
        }
    }
}

impl Default for CategoryDirectories {
    fn default() -> Self {
        Self::from(&GithubSettings::default())
    }
}

/// A decoded document and the identifier it was read from
type SourcedDocument = (Value, String);

/// Builds configuration documents from a content source
pub struct ConfigAssembler<'src> {
    source: &'src dyn ContentSource,
    policy: &'src MergePolicy,
    directories: &'src CategoryDirectories,
}

impl<'src> ConfigAssembler<'src> {
    #[must_use]
    #[inline]
    pub fn new(
        source: &'src dyn ContentSource,
        policy: &'src MergePolicy,
        directories: &'src CategoryDirectories,
    ) -> Self {
        Self {
            source,
            policy,
            directories,
        }
    }

    /// Assemble the document for one profile
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - None of the profile's full-settings sources yields a document
    /// - The merged full settings are not a mapping
    /// - Synthesized proxy groups cannot be converted to YAML
    pub fn assemble(&self, profile: &Profile) -> Result<Value> {
        info!("Assembling profile '{}'", profile.name);

        let identifiers: Vec<String> = profile
            .sources
            .iter()
            .flat_map(|entry| self.source.resolve(entry))
            .collect();
        let documents = self.load_documents(&identifiers);

        if documents.is_empty() {
            return Err(MergeError::from_source(format!(
                "No full-settings documents for profile '{}' (sources: {})",
                profile.name,
                redact_all(&profile.sources).join(", ")
            ))
            .into());
        }

        let Value::Mapping(mut document) = merge_all(documents.into_iter().map(|(doc, _)| doc))
        else {
            return Err(MergeError::from_source(format!(
                "Full settings of profile '{}' are not a mapping",
                profile.name
            ))
            .into());
        };

        self.attach_generic(
            &mut document,
            PROXY_PROVIDERS_KEY,
            &self.directories.proxy_providers,
        );
        self.attach_proxies(&mut document)?;
        self.attach_generic(
            &mut document,
            RULE_PROVIDERS_KEY,
            &self.directories.rule_providers,
        );
        self.attach_rules(&mut document);

        Ok(Value::Mapping(document))
    }

    /// Fold a mapping-shaped category and attach it under `key`
    fn attach_generic(&self, document: &mut Mapping, key: &str, directory: &str) {
        let documents = self.load_category(key, directory);
        if documents.is_empty() {
            return;
        }

        let merged = merge_all(
            documents
                .into_iter()
                .map(|(doc, _)| unwrap_category(doc, key)),
        );
        attach(document, key, merged);
    }

    fn attach_proxies(&self, document: &mut Mapping) -> Result<()> {
        let documents = self.load_category(PROXIES_KEY, &self.directories.proxies);
        if documents.is_empty() {
            return Ok(());
        }

        // Proxies share one namespace with the groups synthesized below
        let mut deduplicator = ProxyDeduplicator::new();
        deduplicator.reserve(base_proxy_names(document));
        deduplicator.reserve([
            &self.policy.network_group,
            &self.policy.auto_group,
            &self.policy.fallback_group,
        ]);
        deduplicator.reserve(
            documents
                .iter()
                .map(|(_, identifier)| source_name(identifier)),
        );
        for (doc, identifier) in &documents {
            let accepted = deduplicator.push_document(doc, identifier);
            debug!("{accepted} proxies from {}", redact_url(identifier));
        }
        let proxies = deduplicator.finish();

        if proxies.is_empty() {
            warn!("Proxy files contained no usable proxies; proxies and groups are left out");
            return Ok(());
        }

        let identifiers: Vec<String> = documents
            .into_iter()
            .map(|(_, identifier)| identifier)
            .collect();
        let groups = synthesize_groups(&proxies, &identifiers, self.policy);
        let groups = serde_yaml::to_value(&groups)
            .map_err(|e| MergeError::serialization(format!("Proxy groups: {e}")))?;

        attach(document, PROXIES_KEY, proxies.to_value());
        attach(document, PROXY_GROUPS_KEY, groups);
        Ok(())
    }

    /// Normalize rules after those of the base document and close with the catch-all
    fn attach_rules(&self, document: &mut Mapping) {
        let documents = self.load_category(RULES_KEY, &self.directories.rules);
        if documents.is_empty() {
            return;
        }

        let mut rules: Vec<String> = document
            .get(RULES_KEY)
            .and_then(Value::as_sequence)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(str::trim)
            .filter(|rule| !rule.is_empty())
            .filter(|rule| {
                let catch_all = is_catch_all(rule);
                if catch_all {
                    debug!("Dropping base catch-all rule '{rule}'");
                }
                !catch_all
            })
            .map(str::to_owned)
            .collect();

        let mut normalizer = RuleNormalizer::new(self.policy);
        normalizer.reserve(rules.iter().cloned());
        for (doc, identifier) in &documents {
            let added = normalizer.push_document(doc, identifier);
            debug!("{added} rules from {}", redact_url(identifier));
        }
        rules.extend(normalizer.finish());
        rules.push(self.policy.catch_all_rule());

        if !document.contains_key(PROXY_GROUPS_KEY) {
            warn!(
                "Rules target '{}' but no proxy groups were synthesized",
                self.policy.network_group
            );
        }

        document.insert(
            Value::from(RULES_KEY),
            Value::Sequence(rules.into_iter().map(Value::from).collect()),
        );
    }

    fn load_category(&self, key: &str, directory: &str) -> Vec<SourcedDocument> {
        let identifiers: Vec<String> = split_list(directory)
            .iter()
            .flat_map(|entry| self.source.resolve(entry))
            .collect();
        let documents = self.load_documents(&identifiers);
        if documents.is_empty() {
            warn!("No usable '{key}' documents; the key is left out");
        }
        documents
    }

    /// Read and decode every identifier, skipping failures
    fn load_documents(&self, identifiers: &[String]) -> Vec<SourcedDocument> {
        identifiers
            .iter()
            .filter_map(|identifier| {
                let content = self.source.read(identifier)?;
                let document = decode_document(&content, identifier)?;
                Some((document, identifier.clone()))
            })
            .collect()
    }
}

/// Decode YAML text, logging and skipping unusable documents
fn decode_document(content: &str, identifier: &str) -> Option<Value> {
    match serde_yaml::from_str::<Value>(content) {
        Ok(Value::Null) => {
            warn!("Empty YAML document: {}", redact_url(identifier));
            None
        }
        Ok(document) => Some(document),
        Err(e) => {
            error!("Invalid YAML in {}: {e}", redact_url(identifier));
            None
        }
    }
}

/// Strip a redundant top-level category key from a fragment
///
/// Fragments may be written either as the bare section body or wrapped in the
/// section key.
fn unwrap_category(document: Value, key: &str) -> Value {
    match document {
        Value::Mapping(mut mapping) if mapping.len() == 1 && mapping.contains_key(key) => {
            mapping.remove(key).unwrap_or_default()
        }
        other => other,
    }
}

/// Merge `value` into whatever the document already holds under `key`
fn attach(document: &mut Mapping, key: &str, value: Value) {
    let merged = match document.get(key) {
        Some(existing) => deep_merge(existing, &value),
        None => value,
    };
    document.insert(Value::from(key), merged);
}

fn base_proxy_names(document: &Mapping) -> Vec<String> {
    document
        .get(PROXIES_KEY)
        .and_then(Value::as_sequence)
        .into_iter()
        .flatten()
        .filter_map(Value::as_mapping)
        .filter_map(proxy_name)
        .collect()
}
