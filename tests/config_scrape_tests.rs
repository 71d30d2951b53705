//! Tests for run-config scraping and resolution:
//! - indentation-scoped structured-config extraction
//! - shell-style env-default extraction
//! - merge precedence and the unknown sentinel

use shardscope::runconfig::{
    scrape_env_defaults, scrape_structured_config, ConfigOverrides, ConfigRecord, UNKNOWN,
};

use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

const DEVELOPMENT_YAML: &str = r#"
logging:
  level: debug

shardDistribution:
  enabled: true
  process:
    period: "15s"
    heartbeatTTL: 30s
    loadBalance:
      disableBenefitGating: false
      severeImbalanceRatio: "0.4"
      moveBudgetProportion: 0.1  # per cycle
      hysteresisUpperBand: '1.2'
      hysteresisLowerBand: "0.9"
  namespaces:
    - name: other-namespace
      shardNum: 64
    - name: shard-distributor-replay
      shardNum: 128
      type: fixed

otherTopLevel:
  period: "99s"
"#;

// =========================================================================
// Structured-config scoping
// =========================================================================

#[test]
fn test_documented_scenario_severe_imbalance_ratio() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "development.yaml", DEVELOPMENT_YAML);

    let cfg = scrape_structured_config(&path, "shard-distributor-replay").unwrap();
    assert_eq!(cfg.get("severeImbalanceRatio").map(String::as_str), Some("0.4"));
}

#[test]
fn test_captures_allow_listed_keys_per_scope() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "development.yaml", DEVELOPMENT_YAML);

    let cfg = scrape_structured_config(&path, "shard-distributor-replay").unwrap();
    assert_eq!(cfg.get("period").map(String::as_str), Some("15s"));
    assert_eq!(cfg.get("heartbeatTTL").map(String::as_str), Some("30s"));
    assert_eq!(cfg.get("disableBenefitGating").map(String::as_str), Some("false"));
    assert_eq!(cfg.get("moveBudgetProportion").map(String::as_str), Some("0.1"));
    assert_eq!(cfg.get("hysteresisUpperBand").map(String::as_str), Some("1.2"));
    assert_eq!(cfg.get("hysteresisLowerBand").map(String::as_str), Some("0.9"));
}

#[test]
fn test_shard_num_only_from_target_namespace() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "development.yaml", DEVELOPMENT_YAML);

    let cfg = scrape_structured_config(&path, "shard-distributor-replay").unwrap();
    assert_eq!(cfg.get("shardNum").map(String::as_str), Some("128"));

    let other = scrape_structured_config(&path, "other-namespace").unwrap();
    assert_eq!(other.get("shardNum").map(String::as_str), Some("64"));

    let absent = scrape_structured_config(&path, "nope").unwrap();
    assert!(absent.get("shardNum").is_none());
}

#[test]
fn test_keys_outside_recognized_scopes_are_skipped() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), "development.yaml", DEVELOPMENT_YAML);

    let cfg = scrape_structured_config(&path, "shard-distributor-replay").unwrap();
    // `period` under otherTopLevel must not shadow the process value
    assert_eq!(cfg.get("period").map(String::as_str), Some("15s"));
    // non-allow-listed keys are never captured
    assert!(cfg.get("enabled").is_none());
    assert!(cfg.get("type").is_none());
    assert!(cfg.get("level").is_none());
}

#[test]
fn test_scope_closes_at_parent_indent() {
    let dir = tempdir().unwrap();
    // severeImbalanceRatio appears after loadBalance closed (back at indent 4)
    let path = write(
        dir.path(),
        "dev.yaml",
        "shardDistribution:\n  process:\n    loadBalance:\n      hysteresisUpperBand: 1.5\n    period: 10s\n    severeImbalanceRatio: 0.7\n",
    );

    let cfg = scrape_structured_config(&path, "ns").unwrap();
    assert_eq!(cfg.get("hysteresisUpperBand").map(String::as_str), Some("1.5"));
    assert_eq!(cfg.get("period").map(String::as_str), Some("10s"));
    assert!(
        cfg.get("severeImbalanceRatio").is_none(),
        "load-balance key at process indent must not be captured"
    );
}

#[test]
fn test_comments_and_blank_lines_ignored() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "dev.yaml",
        "# top comment\nshardDistribution:\n\n  process:\n    period: 20s # trailing comment\n",
    );

    let cfg = scrape_structured_config(&path, "ns").unwrap();
    assert_eq!(cfg.get("period").map(String::as_str), Some("20s"));
}

#[test]
fn test_missing_structured_config_yields_empty_map() {
    let dir = tempdir().unwrap();
    let cfg = scrape_structured_config(&dir.path().join("absent.yaml"), "ns").unwrap();
    assert!(cfg.is_empty());
}

// =========================================================================
// Env-defaults scraping
// =========================================================================

#[test]
fn test_env_defaults_extraction() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "startenv.bash",
        "#!/bin/bash\n\
         CANARY_CSV=\"${CANARY_CSV:-/data/replay.csv}\"\n\
         CANARY_NAMESPACE=\"${CANARY_NAMESPACE:-shard-distributor-replay}\"\n\
         CANARY_EXECUTORS=\"${CANARY_EXECUTORS:-8}\"\n\
         UNRELATED_VAR=\"${UNRELATED_VAR:-whatever}\"\n\
         export PATH\n",
    );

    let env = scrape_env_defaults(&path).unwrap();
    assert_eq!(env.get("replay_csv").map(String::as_str), Some("/data/replay.csv"));
    assert_eq!(
        env.get("namespace").map(String::as_str),
        Some("shard-distributor-replay")
    );
    assert_eq!(env.get("executors").map(String::as_str), Some("8"));
    assert_eq!(env.len(), 3, "unknown variables are ignored");
}

#[test]
fn test_env_defaults_strip_quotes_in_token() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        "startenv.bash",
        "CANARY_EXECUTORS=${CANARY_EXECUTORS:-'12'}\n",
    );

    let env = scrape_env_defaults(&path).unwrap();
    assert_eq!(env.get("executors").map(String::as_str), Some("12"));
}

#[test]
fn test_env_defaults_missing_file_yields_empty_map() {
    let dir = tempdir().unwrap();
    let env = scrape_env_defaults(&dir.path().join("absent.bash")).unwrap();
    assert!(env.is_empty());
}

// =========================================================================
// Record resolution and precedence
// =========================================================================

#[test]
fn test_override_wins_over_env_default() {
    let dir = tempdir().unwrap();
    let env_path = write(
        dir.path(),
        "startenv.bash",
        "CANARY_EXECUTORS=\"${CANARY_EXECUTORS:-8}\"\n\
         CANARY_CSV=\"${CANARY_CSV:-/data/replay.csv}\"\n",
    );
    let env = scrape_env_defaults(&env_path).unwrap();

    let overrides = ConfigOverrides {
        executors: Some("32".to_string()),
        ..Default::default()
    };
    let record = ConfigRecord::resolve("ns", &Default::default(), &env, &overrides);

    assert_eq!(record.get("executors"), Some("32"), "override wins");
    assert_eq!(record.get("replay_csv"), Some("/data/replay.csv"), "env survives");
}

#[test]
fn test_absent_keys_resolve_to_unknown_sentinel() {
    let record = ConfigRecord::resolve(
        "ns",
        &Default::default(),
        &Default::default(),
        &Default::default(),
    );

    assert_eq!(record.get("namespace"), Some("ns"));
    assert_eq!(record.get("period"), Some(UNKNOWN));
    assert_eq!(record.get("shardNum"), Some(UNKNOWN));
    assert_eq!(record.get("executors"), Some(UNKNOWN));
    // run bounds default empty, not unknown
    assert_eq!(record.get("start"), Some(""));
    assert_eq!(record.get("end"), Some(""));
}

#[test]
fn test_record_row_order_is_fixed() {
    let record = ConfigRecord::resolve(
        "ns",
        &Default::default(),
        &Default::default(),
        &Default::default(),
    );
    let keys: Vec<&str> = record.rows.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "namespace",
            "period",
            "heartbeatTTL",
            "disableBenefitGating",
            "severeImbalanceRatio",
            "moveBudgetProportion",
            "hysteresisUpperBand",
            "hysteresisLowerBand",
            "shardNum",
            "executors",
            "replay_speed",
            "replay_csv",
            "start",
            "end",
        ]
    );
}

#[test]
fn test_tex_and_json_serializations() {
    let overrides = ConfigOverrides {
        start: Some("2025-12-02T18:44:15Z".to_string()),
        ..Default::default()
    };
    let record = ConfigRecord::resolve(
        "ns",
        &Default::default(),
        &Default::default(),
        &overrides,
    );

    let tex = record.to_tex();
    assert!(tex.starts_with("\\begin{tabular}{ll}"));
    assert!(tex.contains("namespace & ns \\\\"));
    assert!(tex.trim_end().ends_with("\\end{tabular}"));

    let json: serde_json::Value = serde_json::from_str(&record.to_json().unwrap()).unwrap();
    assert_eq!(json["namespace"], "ns");
    assert_eq!(json["start"], "2025-12-02T18:44:15Z");
    assert!(json.get("end").is_none(), "empty values are omitted from JSON");
}
