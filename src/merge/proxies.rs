//! Proxy node de-duplication with provenance
//!
//! Proxies from every source file are flattened into one list with globally
//! unique names. The file each proxy came from is kept in a side table next
//! to the list rather than injected into the proxy mapping, so nothing has
//! to be stripped before output.

use crate::utils::path::source_name;
use serde_yaml::{Mapping, Value};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

/// Why a single proxy entry was skipped
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum EntryError {
    #[error("entry is not a mapping")]
    NotMapping,

    #[error("entry has no usable 'name'")]
    MissingName,
}

/// De-duplicated proxies with their source tags
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaggedProxies {
    proxies: Vec<Mapping>,
    sources: Vec<String>,
}

impl TaggedProxies {
    /// Number of proxies
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.proxies.len()
    }

    /// Whether no proxy survived
    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.proxies.is_empty()
    }

    /// Proxies paired with their source tag, in merge order
    pub fn iter(&self) -> impl Iterator<Item = (&Mapping, &str)> {
        self.proxies
            .iter()
            .zip(self.sources.iter().map(String::as_str))
    }

    /// Final proxy names, in merge order
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.proxies.iter().filter_map(proxy_name).collect()
    }

    /// Source tag of the proxy at `index`
    #[must_use]
    pub fn source_of(&self, index: usize) -> Option<&str> {
        self.sources.get(index).map(String::as_str)
    }

    /// Drop the side table and keep the proxy mappings
    #[must_use]
    pub fn into_proxies(self) -> Vec<Mapping> {
        self.proxies
    }

    /// Proxy mappings as a YAML sequence
    #[must_use]
    pub fn to_value(&self) -> Value {
        Value::Sequence(self.proxies.iter().cloned().map(Value::Mapping).collect())
    }
}

/// Incremental de-duplicator over proxy documents
#[derive(Debug, Default)]
pub struct ProxyDeduplicator {
    seen: HashSet<String>,
    merged: TaggedProxies,
}

impl ProxyDeduplicator {
    /// Create an empty de-duplicator
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark names as taken without adding proxies
    ///
    /// Used for proxies already present in the base settings and for group
    /// names, so that incoming proxies are renamed around them.
    pub fn reserve<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seen.extend(names.into_iter().map(Into::into));
    }

    /// Add every proxy of one document, returning how many were accepted
    ///
    /// Documents without a `proxies` sequence contribute nothing. Malformed
    /// entries are skipped.
    pub fn push_document(&mut self, document: &Value, source_identifier: &str) -> usize {
        let Some(entries) = document.get("proxies").and_then(Value::as_sequence) else {
            debug!("No proxies sequence in {source_identifier}");
            return 0;
        };

        let source = source_name(source_identifier);
        let mut accepted = 0;

        for (index, entry) in entries.iter().enumerate() {
            match parse_entry(entry) {
                Ok((mapping, name)) => {
                    let unique = self.unique_name(&name);
                    let mut proxy = mapping.clone();
                    proxy.insert(Value::from("name"), Value::from(unique.as_str()));
                    self.seen.insert(unique);
                    self.merged.proxies.push(proxy);
                    self.merged.sources.push(source.clone());
                    accepted += 1;
                }
                Err(e) => debug!("Skipping proxy #{} in {source_identifier}: {e}", index + 1),
            }
        }

        accepted
    }

    /// Finish and return the tagged proxy list
    #[must_use]
    pub fn finish(self) -> TaggedProxies {
        info!("Merged {} proxies", self.merged.len());
        self.merged
    }

    fn unique_name(&self, name: &str) -> String {
        if !self.seen.contains(name) {
            return name.to_owned();
        }
        (1_usize..)
            .map(|counter| format!("{name}_{counter}"))
            .find(|candidate| !self.seen.contains(candidate))
            .unwrap_or_else(|| name.to_owned())
    }
}

/// De-duplicate proxies across `(document, source identifier)` pairs
#[must_use]
pub fn dedupe_proxies<'doc, I>(inputs: I) -> TaggedProxies
where
    I: IntoIterator<Item = (&'doc Value, &'doc str)>,
{
    let mut deduplicator = ProxyDeduplicator::new();
    for (document, source) in inputs {
        deduplicator.push_document(document, source);
    }
    deduplicator.finish()
}

/// Name of a proxy mapping, if it has a usable one
#[must_use]
pub fn proxy_name(proxy: &Mapping) -> Option<String> {
    match proxy.get("name")? {
        Value::String(name) if !name.is_empty() => Some(name.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

fn parse_entry(entry: &Value) -> Result<(&Mapping, String), EntryError> {
    let mapping = entry.as_mapping().ok_or(EntryError::NotMapping)?;
    let name = proxy_name(mapping).ok_or(EntryError::MissingName)?;
    Ok((mapping, name))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "This is a test module")]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn parse_entry_reports_reason() {
        assert_eq!(parse_entry(&yaml("[1]")).unwrap_err(), EntryError::NotMapping);
        assert_eq!(
            parse_entry(&yaml("{server: a}")).unwrap_err(),
            EntryError::MissingName
        );
        assert_eq!(
            parse_entry(&yaml("{name: ''}")).unwrap_err(),
            EntryError::MissingName
        );
        assert_eq!(parse_entry(&yaml("{name: 42}")).unwrap().1, "42");
    }

    #[test]
    fn collision_chain_skips_taken_suffixes() {
        let a = yaml("proxies: [{name: A}, {name: A_1}]");
        let b = yaml("proxies: [{name: A}]");
        let merged = dedupe_proxies([(&a, "a.yaml"), (&b, "b.yaml")]);
        assert_eq!(merged.names(), vec!["A", "A_1", "A_2"]);
        assert_eq!(merged.source_of(2), Some("b"));
    }

    #[test]
    fn reserved_names_force_renames() {
        let doc = yaml("proxies: [{name: base}]");
        let mut deduplicator = ProxyDeduplicator::new();
        deduplicator.reserve(["base"]);
        deduplicator.push_document(&doc, "p.yaml");
        assert_eq!(deduplicator.finish().names(), vec!["base_1"]);
    }

    #[test]
    fn renamed_proxy_keeps_field_order() {
        let doc = yaml("proxies: [{name: X, type: ss, server: s}]");
        let mut deduplicator = ProxyDeduplicator::new();
        deduplicator.reserve(["X"]);
        deduplicator.push_document(&doc, "p.yaml");
        let proxies = deduplicator.finish().into_proxies();
        let keys: Vec<&str> = proxies[0].keys().map(|k| k.as_str().unwrap()).collect();
        assert_eq!(keys, vec!["name", "type", "server"]);
    }
}
