//! Merge engine for Clash configuration documents

pub mod deep;
pub mod groups;
pub mod proxies;
pub mod rules;

pub use deep::{deep_merge, merge_all, merge_mappings};
pub use groups::{GroupType, ProxyGroup, synthesize_groups};
pub use proxies::{ProxyDeduplicator, TaggedProxies, dedupe_proxies, proxy_name};
pub use rules::{RuleNormalizer, is_catch_all, normalize_rules, rewrite_rule};
