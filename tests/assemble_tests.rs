//! Document assembly and generate operation tests over an in-memory filesystem

use clap::Parser as _;
use clashgraft::cli::Args;
use clashgraft::config::{MergePolicy, Profile};
use clashgraft::error::MergeError;
use clashgraft::http::MockHttpClient;
use clashgraft::operations::{
    CategoryDirectories, ConfigAssembler, GenerateOperation, render_document,
};
use clashgraft::source::LocalSource;
use clashgraft::system::{MockSystem, System as _};
use chrono::{TimeZone as _, Utc};
use serde_yaml::Value;
use std::path::Path;

fn yaml(text: &str) -> Value {
    serde_yaml::from_str(text).unwrap()
}

fn strings(value: &Value) -> Vec<&str> {
    value
        .as_sequence()
        .unwrap()
        .iter()
        .map(|item| item.as_str().unwrap())
        .collect()
}

/// Two proxy files sharing a name plus one rule file
fn scenario() -> MockSystem {
    MockSystem::new()
        .with_file("fconfs/base.yaml", b"port: 7890\nmode: rule\n")
        .unwrap()
        .with_file("proxies/a.yaml", b"proxies:\n  - {name: X, type: ss, server: a.example.com}\n")
        .unwrap()
        .with_file("proxies/b.yaml", b"proxies:\n  - {name: X, type: ss, server: b.example.com}\n")
        .unwrap()
        .with_file("rules/r.yaml", b"payload:\n  - DOMAIN,foo.com\n")
        .unwrap()
}

fn assemble(system: &MockSystem) -> anyhow::Result<Value> {
    let source = LocalSource::new(system);
    let policy = MergePolicy::default();
    let directories = CategoryDirectories::default();
    let assembler = ConfigAssembler::new(&source, &policy, &directories);
    assembler.assemble(&Profile::new("fconfs", vec!["fconfs".to_owned()]))
}

fn local_args(extra: &[&str]) -> Args {
    let base = [
        "clashgraft",
        "--local",
        "--output-dir",
        "output",
        "--auth-token",
        "local-test",
        "--fconfs-directories",
        "",
        "--remote-yamls",
        "",
    ];
    Args::try_parse_from(base.iter().chain(extra.iter()).copied()).unwrap()
}

#[test]
fn test_end_to_end_scenario() {
    let document = assemble(&scenario()).unwrap();

    let proxy_names: Vec<&str> = document["proxies"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|proxy| proxy["name"].as_str().unwrap())
        .collect();
    assert_eq!(proxy_names, vec!["X", "X_1"]);

    let groups = document["proxy-groups"].as_sequence().unwrap();
    assert_eq!(groups[0]["name"], yaml("network"));
    assert_eq!(strings(&groups[0]["proxies"]), vec!["auto-select", "fail-over", "a", "b"]);

    let group_a = groups.iter().find(|g| g["name"] == yaml("a")).unwrap();
    let group_b = groups.iter().find(|g| g["name"] == yaml("b")).unwrap();
    assert_eq!(strings(&group_a["proxies"]), vec!["auto-select", "fail-over", "X"]);
    assert_eq!(strings(&group_b["proxies"]), vec!["auto-select", "fail-over", "X_1"]);

    assert_eq!(strings(&document["rules"]), vec!["DOMAIN,foo.com,network", "MATCH,network"]);

    assert_eq!(document["port"], yaml("7890"));
}

#[test]
fn test_missing_non_primary_category_leaves_key_absent() {
    let system = MockSystem::new()
        .with_file("fconfs/base.yaml", b"mode: rule\n")
        .unwrap();

    let document = assemble(&system).unwrap();
    let mapping = document.as_mapping().unwrap();

    for key in ["proxy-providers", "proxies", "proxy-groups", "rule-providers", "rules"] {
        assert!(!mapping.contains_key(key), "{key} should be absent");
    }
}

#[test]
fn test_missing_primary_category_is_a_source_error() {
    let system = MockSystem::new()
        .with_file("proxies/a.yaml", b"proxies: [{name: X}]\n")
        .unwrap();

    let err = assemble(&system).unwrap_err();
    assert_eq!(err.downcast_ref::<MergeError>().unwrap().exit_code(), 2);
}

#[test]
fn test_invalid_files_are_skipped() {
    let system = scenario()
        .with_file("proxies/broken.yaml", b"proxies: [\n")
        .unwrap()
        .with_file("rules/empty.yaml", b"")
        .unwrap();

    let document = assemble(&system).unwrap();

    assert_eq!(document["proxies"].as_sequence().unwrap().len(), 2);
    assert_eq!(strings(&document["rules"]).len(), 2);
}

#[test]
fn test_providers_fold_into_their_sections() {
    let system = scenario()
        .with_file("proxy-providers/one.yaml", b"sub1: {type: http, url: 'https://sub.example.com/1'}\n")
        .unwrap()
        .with_file("proxy-providers/two.yaml", b"proxy-providers:\n  sub2: {type: http, url: 'https://sub.example.com/2'}\n")
        .unwrap()
        .with_file("rule-providers/r.yaml", b"ads: {type: http, behavior: domain}\n")
        .unwrap();

    let document = assemble(&system).unwrap();

    let providers = document["proxy-providers"].as_mapping().unwrap();
    assert_eq!(providers.len(), 2);
    assert!(providers.contains_key("sub1"));
    assert!(providers.contains_key("sub2"));
    assert!(document["rule-providers"].as_mapping().unwrap().contains_key("ads"));
}

#[test]
fn test_base_settings_proxies_and_rules_are_kept() {
    let system = scenario()
        .with_file(
            "fconfs/base.yaml",
            b"proxies: [{name: X, type: direct}]\nrules: ['DOMAIN,foo.com,network', 'MATCH,DIRECT']\n",
        )
        .unwrap();

    let document = assemble(&system).unwrap();

    assert_eq!(proxy_names(&document), vec!["X", "X_1", "X_2"]);
    assert_eq!(strings(&document["rules"]), vec!["DOMAIN,foo.com,network", "MATCH,network"]);
}

fn proxy_names(document: &Value) -> Vec<&str> {
    document["proxies"]
        .as_sequence()
        .unwrap()
        .iter()
        .map(|proxy| proxy["name"].as_str().unwrap())
        .collect()
}

#[test]
fn test_category_accepts_a_list_of_remote_yamls() {
    let system = MockSystem::new()
        .with_file("fconfs/base.yaml", b"mode: rule\n")
        .unwrap();
    let http = MockHttpClient::new()
        .with_response(
            "https://h.example.com/a.yaml",
            200,
            "proxies:\n  - {name: X, type: ss, server: a.example.com}\n",
        )
        .with_response(
            "https://h.example.com/b.yaml",
            200,
            "proxies:\n  - {name: X, type: ss, server: b.example.com}\n",
        );
    let source = LocalSource::new(&system).with_http(&http);
    let policy = MergePolicy::default();
    let mut directories = CategoryDirectories::default();
    directories.proxies =
        "https://h.example.com/a.yaml, https://h.example.com/b.yaml".to_owned();

    let document = ConfigAssembler::new(&source, &policy, &directories)
        .assemble(&Profile::new("fconfs", vec!["fconfs".to_owned()]))
        .unwrap();

    assert_eq!(proxy_names(&document), vec!["X", "X_1"]);
    let groups = document["proxy-groups"].as_sequence().unwrap();
    let group_a = groups.iter().find(|g| g["name"] == yaml("a")).unwrap();
    let group_b = groups.iter().find(|g| g["name"] == yaml("b")).unwrap();
    assert_eq!(strings(&group_a["proxies"]), vec!["auto-select", "fail-over", "X"]);
    assert_eq!(strings(&group_b["proxies"]), vec!["auto-select", "fail-over", "X_1"]);

    let urls: Vec<String> = http.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec!["https://h.example.com/a.yaml", "https://h.example.com/b.yaml"]
    );
}

#[test]
fn test_proxies_are_renamed_around_group_names() {
    let system = MockSystem::new()
        .with_file("fconfs/base.yaml", b"mode: rule\n")
        .unwrap()
        .with_file(
            "proxies/hk.yaml",
            b"proxies:\n  - {name: hk, type: ss}\n  - {name: auto-select, type: ss}\n  - {name: network, type: ss}\n",
        )
        .unwrap();

    let document = assemble(&system).unwrap();

    let names = proxy_names(&document);
    assert_eq!(names, vec!["hk_1", "auto-select_1", "network_1"]);

    let groups = document["proxy-groups"].as_sequence().unwrap();
    for group in groups {
        let group_name = group["name"].as_str().unwrap();
        assert!(!names.contains(&group_name), "{group_name} is both a proxy and a group");
        assert!(!strings(&group["proxies"]).contains(&group_name));
    }
    let group_hk = groups.iter().find(|g| g["name"] == yaml("hk")).unwrap();
    assert_eq!(
        strings(&group_hk["proxies"]),
        vec!["auto-select", "fail-over", "hk_1", "auto-select_1", "network_1"]
    );
}

#[test]
fn test_rendering_is_stable_across_runs() {
    let at = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();

    let first = render_document(&assemble(&scenario()).unwrap(), &at).unwrap();
    let second = render_document(&assemble(&scenario()).unwrap(), &at).unwrap();

    assert_eq!(first, second);
    assert!(first.starts_with("# Automatically generated `Clash` yaml file by clashgraft\n"));
}

#[test]
fn test_generate_writes_document_and_stats() {
    let system = scenario();
    let http = MockHttpClient::new();
    let operation = GenerateOperation::new(&local_args(&[]), &system).unwrap();

    operation.execute(&http).unwrap();

    let document = system
        .read_to_string(Path::new("output/clash-fconfs-local-test.yaml"))
        .unwrap();
    assert!(document.contains("# Do not modify manually\n"));
    assert!(document.contains("X_1"));

    let stats: serde_json::Value = serde_json::from_str(
        &system
            .read_to_string(Path::new("output/stats-fconfs.json"))
            .unwrap(),
    )
    .unwrap();
    assert_eq!(stats["proxies_count"], 2);
    assert_eq!(stats["proxy_groups_count"], 5);
    assert_eq!(stats["rules_count"], 2);
    assert!(http.requests().is_empty());
}

#[test]
fn test_generate_profiles_produce_separate_documents() {
    let system = scenario()
        .with_file("fconfs-work/base.yaml", b"mode: global\n")
        .unwrap();
    let args = local_args(&["--fconfs-directories", "work|fconfs-work"]);
    let operation = GenerateOperation::new(&args, &system).unwrap();

    let names: Vec<&str> = operation.profiles().iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["fconfs", "work"]);

    operation.execute(&MockHttpClient::new()).unwrap();

    assert!(system.exists(Path::new("output/clash-fconfs-local-test.yaml")));
    assert!(system.exists(Path::new("output/clash-work-local-test.yaml")));
    assert!(system.exists(Path::new("output/stats-work.json")));
}

#[test]
fn test_dry_run_writes_nothing() {
    let system = scenario();
    let operation = GenerateOperation::new(&local_args(&["--dry-run"]), &system).unwrap();

    operation.execute(&MockHttpClient::new()).unwrap();

    assert!(!system.exists(Path::new("output")));
}

#[test]
fn test_unwritable_output_is_a_filesystem_error() {
    let system = scenario().read_only().unwrap();
    let operation = GenerateOperation::new(&local_args(&[]), &system).unwrap();

    let err = operation.execute(&MockHttpClient::new()).unwrap_err();
    assert_eq!(err.downcast_ref::<MergeError>().unwrap().exit_code(), 5);
}

#[test]
fn test_remote_mode_requires_token() {
    let system = MockSystem::new();
    let args = Args::try_parse_from([
        "clashgraft",
        "--github-token",
        "",
        "--fconfs-directories",
        "",
        "--remote-yamls",
        "",
    ])
    .unwrap();

    let err = GenerateOperation::new(&args, &system).err().unwrap();
    assert_eq!(err.downcast_ref::<MergeError>().unwrap().exit_code(), 1);
}

#[test]
fn test_missing_custom_settings_file_is_a_configuration_error() {
    let system = MockSystem::new();
    let args = local_args(&["--settings", "elsewhere.yaml"]);

    let err = GenerateOperation::new(&args, &system).err().unwrap();
    assert_eq!(err.downcast_ref::<MergeError>().unwrap().exit_code(), 1);
}
