//! Rule list normalization
//!
//! Rule files carry a `payload` sequence of `MATCHER,VALUE[,TARGET][,OPTION]`
//! lines. Every line is rewritten to target the top-level group and the
//! result is de-duplicated, first occurrence winning.

use crate::config::{MergePolicy, RuleTargetPolicy};
use serde_yaml::Value;
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, info};

/// Trailing rule options that follow the target
const RULE_OPTIONS: &[&str] = &["no-resolve", "src"];

/// Why a single payload entry was skipped
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RuleError {
    #[error("entry is not a string")]
    NotString,

    #[error("entry is blank")]
    Blank,

    #[error("catch-all rules are synthesized, not merged")]
    CatchAll,
}

/// Rewrite one rule line to point at `target`
///
/// Fields are split on top-level commas only, so logical rules such as
/// `AND,((DOMAIN,a),(NETWORK,UDP))` keep their inner commas. `MATCH` has no
/// value field. With [`RuleTargetPolicy::Respect`] an embedded target is
/// kept.
#[must_use]
pub fn rewrite_rule(rule: &str, target: &str, policy: RuleTargetPolicy) -> String {
    let fields = split_fields(rule);
    let head_len = if fields
        .first()
        .is_some_and(|matcher| matcher.eq_ignore_ascii_case("MATCH"))
    {
        1
    } else {
        2
    }
    .min(fields.len());

    let (head, rest) = fields.split_at(head_len);
    let (existing, options) = match rest.split_first() {
        Some((first, remaining)) if !is_option(first) => (Some(*first), remaining),
        _ => (None, rest),
    };

    let chosen = match (policy, existing) {
        (RuleTargetPolicy::Respect, Some(existing)) => existing,
        _ => target,
    };

    head.iter()
        .copied()
        .chain(std::iter::once(chosen))
        .chain(options.iter().copied())
        .collect::<Vec<&str>>()
        .join(",")
}

/// Incremental normalizer over rule documents
#[derive(Debug)]
pub struct RuleNormalizer<'policy> {
    policy: &'policy MergePolicy,
    seen: HashSet<String>,
    rules: Vec<String>,
}

impl<'policy> RuleNormalizer<'policy> {
    /// Create a normalizer for the given policy
    #[must_use]
    pub fn new(policy: &'policy MergePolicy) -> Self {
        Self {
            policy,
            seen: HashSet::new(),
            rules: Vec::new(),
        }
    }

    /// Mark rules as already present so later duplicates are dropped
    pub fn reserve<I, S>(&mut self, rules: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.seen.extend(rules.into_iter().map(Into::into));
    }

    /// Add the `payload` of one rule document, returning how many rules were new
    pub fn push_document(&mut self, document: &Value, source_identifier: &str) -> usize {
        let Some(payload) = document.get("payload").and_then(Value::as_sequence) else {
            debug!("No payload sequence in {source_identifier}");
            return 0;
        };

        let mut added = 0;
        for (index, entry) in payload.iter().enumerate() {
            match self.normalize_entry(entry) {
                Ok(rule) => {
                    if self.seen.insert(rule.clone()) {
                        self.rules.push(rule);
                        added += 1;
                    }
                }
                Err(e) => debug!("Skipping rule #{} in {source_identifier}: {e}", index + 1),
            }
        }
        added
    }

    /// Finish and return the normalized rules, without the catch-all
    #[must_use]
    pub fn finish(self) -> Vec<String> {
        info!("Merged {} rules", self.rules.len());
        self.rules
    }

    fn normalize_entry(&self, entry: &Value) -> Result<String, RuleError> {
        let raw = entry.as_str().ok_or(RuleError::NotString)?.trim();
        if raw.is_empty() {
            return Err(RuleError::Blank);
        }
        if is_catch_all(raw) {
            return Err(RuleError::CatchAll);
        }
        Ok(rewrite_rule(
            raw,
            &self.policy.network_group,
            self.policy.rule_target,
        ))
    }
}

/// Normalize the payloads of `(document, source identifier)` pairs
#[must_use]
pub fn normalize_rules<'doc, I>(documents: I, policy: &MergePolicy) -> Vec<String>
where
    I: IntoIterator<Item = (&'doc Value, &'doc str)>,
{
    let mut normalizer = RuleNormalizer::new(policy);
    for (document, source) in documents {
        normalizer.push_document(document, source);
    }
    normalizer.finish()
}

/// Whether a rule is a `MATCH` catch-all
#[must_use]
pub fn is_catch_all(rule: &str) -> bool {
    split_fields(rule)
        .first()
        .is_some_and(|matcher| matcher.eq_ignore_ascii_case("MATCH"))
}

fn is_option(field: &str) -> bool {
    RULE_OPTIONS
        .iter()
        .any(|option| field.eq_ignore_ascii_case(option))
}

/// Split on commas outside parentheses, trimming each field
fn split_fields(rule: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut depth: usize = 0;
    let mut start = 0;

    for (index, ch) in rule.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                fields.push(rule[start..index].trim());
                start = index + 1;
            }
            _ => {}
        }
    }
    fields.push(rule[start..].trim());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const OVERRIDE: RuleTargetPolicy = RuleTargetPolicy::Override;
    const RESPECT: RuleTargetPolicy = RuleTargetPolicy::Respect;

    #[test]
    fn appends_missing_target() {
        assert_eq!(
            rewrite_rule("DOMAIN,example.com", "network", OVERRIDE),
            "DOMAIN,example.com,network"
        );
    }

    #[test]
    fn override_replaces_embedded_target() {
        assert_eq!(
            rewrite_rule("DOMAIN-SUFFIX,cn,DIRECT", "network", OVERRIDE),
            "DOMAIN-SUFFIX,cn,network"
        );
    }

    #[test]
    fn respect_keeps_embedded_target() {
        assert_eq!(
            rewrite_rule("DOMAIN-SUFFIX,cn,DIRECT", "network", RESPECT),
            "DOMAIN-SUFFIX,cn,DIRECT"
        );
        assert_eq!(
            rewrite_rule("DOMAIN,a.com", "network", RESPECT),
            "DOMAIN,a.com,network"
        );
    }

    #[test]
    fn options_stay_after_target() {
        assert_eq!(
            rewrite_rule("IP-CIDR,10.0.0.0/8,no-resolve", "network", OVERRIDE),
            "IP-CIDR,10.0.0.0/8,network,no-resolve"
        );
        assert_eq!(
            rewrite_rule("IP-CIDR,10.0.0.0/8,DIRECT,no-resolve", "network", RESPECT),
            "IP-CIDR,10.0.0.0/8,DIRECT,no-resolve"
        );
    }

    #[test]
    fn logical_rules_keep_inner_commas() {
        assert_eq!(
            rewrite_rule("AND,((DOMAIN,a.com),(NETWORK,UDP))", "network", OVERRIDE),
            "AND,((DOMAIN,a.com),(NETWORK,UDP)),network"
        );
    }

    #[test]
    fn whitespace_around_fields_is_trimmed() {
        assert_eq!(
            rewrite_rule("DOMAIN , example.com", "network", OVERRIDE),
            "DOMAIN,example.com,network"
        );
    }

    #[test]
    fn catch_all_detection_ignores_case_and_spacing() {
        assert!(is_catch_all("MATCH,DIRECT"));
        assert!(is_catch_all(" match "));
        assert!(!is_catch_all("DOMAIN,match.com"));
    }

    #[test]
    fn match_has_no_value_field() {
        assert_eq!(rewrite_rule("MATCH", "network", OVERRIDE), "MATCH,network");
        assert_eq!(rewrite_rule("MATCH,DIRECT", "network", RESPECT), "MATCH,DIRECT");
    }
}
