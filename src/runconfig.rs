//! Run-configuration capture.
//!
//! Scrapes two semi-structured sources: the distributor's YAML-ish config
//! (indentation-scoped, allow-listed keys only) and a shell-style env file of
//! `VAR="${VAR:-default}"` assignments. Neither source failing to exist nor
//! unrecognized structure is an error — an absent key just resolves to the
//! `unknown` sentinel. Explicit overrides win over env values, which win over
//! structured-config values.

use crate::Result;

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

pub const UNKNOWN: &str = "unknown";

/// Process-scope keys captured at indent 4.
const PROCESS_KEYS: &[&str] = &["period", "heartbeatTTL"];

/// Load-balance-scope keys captured at indent 6.
const LOAD_BALANCE_KEYS: &[&str] = &[
    "disableBenefitGating",
    "severeImbalanceRatio",
    "moveBudgetProportion",
    "hysteresisUpperBand",
    "hysteresisLowerBand",
];

/// Env-file variables and the record keys their defaults land under.
const ENV_PATTERNS: &[(&str, &str)] = &[
    ("CANARY_CSV", "replay_csv"),
    ("CANARY_NAMESPACE", "namespace"),
    ("CANARY_EXECUTORS", "executors"),
];

/// Which indentation scope the structured-config scanner is inside.
///
/// The scanner is a line-by-line state machine, not a YAML parser: a scope is
/// entered by its keyword at the expected indent and left as soon as a line
/// at or below the parent indent appears. Anything unrecognized is skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Outside,
    ShardDistribution,
    Process,
    LoadBalance,
    Namespaces { current: Option<String> },
}

/// Extract the allow-listed parameters from the structured config file.
///
/// Captures `period`/`heartbeatTTL` from the process block, the load-balance
/// tunables from its `loadBalance` sub-block, and `shardNum` from the
/// namespaces entry whose `name` equals `target_namespace`. A missing file
/// yields an empty map.
pub fn scrape_structured_config(path: &Path, target_namespace: &str) -> Result<BTreeMap<String, String>> {
    let mut result = BTreeMap::new();
    if !path.exists() {
        debug!(path = %path.display(), "structured config missing, skipping");
        return Ok(result);
    }

    let mut scope = Scope::Outside;
    for raw in std::fs::read_to_string(path)?.lines() {
        let line = raw.split('#').next().unwrap_or("").trim_end();
        let stripped = line.trim_start();
        if stripped.is_empty() {
            continue;
        }
        let indent = line.len() - stripped.len();

        if indent == 0 {
            scope = if stripped.starts_with("shardDistribution:") {
                Scope::ShardDistribution
            } else {
                Scope::Outside
            };
            continue;
        }
        if scope == Scope::Outside {
            continue;
        }

        if indent == 2 {
            scope = if stripped.starts_with("process:") {
                Scope::Process
            } else if stripped.starts_with("namespaces:") {
                Scope::Namespaces { current: None }
            } else {
                Scope::ShardDistribution
            };
            continue;
        }

        match scope {
            Scope::Process | Scope::LoadBalance => {
                if indent == 4 {
                    if stripped.starts_with("loadBalance:") {
                        scope = Scope::LoadBalance;
                        continue;
                    }
                    // An indent-4 key closes loadBalance and belongs to process
                    if let Some((key, value)) = parse_kv(stripped) {
                        if PROCESS_KEYS.contains(&key) {
                            result.insert(key.to_string(), value);
                        }
                    }
                    scope = Scope::Process;
                } else if indent == 6 && scope == Scope::LoadBalance {
                    if let Some((key, value)) = parse_kv(stripped) {
                        if LOAD_BALANCE_KEYS.contains(&key) {
                            result.insert(key.to_string(), value);
                        }
                    }
                }
            }
            Scope::Namespaces { ref mut current } => {
                if indent == 4 && stripped.starts_with("- name:") {
                    *current = stripped
                        .split_once(':')
                        .map(|(_, v)| strip_quotes(v.trim()).to_string());
                } else if indent == 6 && current.as_deref() == Some(target_namespace) {
                    if let Some((key, value)) = parse_kv(stripped) {
                        if key == "shardNum" {
                            result.insert("shardNum".to_string(), value);
                        }
                    }
                }
            }
            Scope::Outside | Scope::ShardDistribution => {}
        }
    }

    Ok(result)
}

/// Extract default tokens from the shell-style env file: for each known
/// variable, the text between `:-` and the first `}` on a line starting with
/// that variable name. A missing file yields an empty map.
pub fn scrape_env_defaults(path: &Path) -> Result<BTreeMap<String, String>> {
    let mut result = BTreeMap::new();
    if !path.exists() {
        debug!(path = %path.display(), "env defaults file missing, skipping");
        return Ok(result);
    }

    for line in std::fs::read_to_string(path)?.lines() {
        for (var, key) in ENV_PATTERNS {
            if !line.starts_with(var) {
                continue;
            }
            let Some(after) = line.split_once(":-").map(|(_, rest)| rest) else {
                continue;
            };
            let Some((token, _)) = after.split_once('}') else {
                continue;
            };
            if token.is_empty() {
                continue;
            }
            result.insert(key.to_string(), strip_quotes(token.trim()).to_string());
        }
    }

    Ok(result)
}

/// Caller-supplied values that take precedence over both scraped sources.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub executors: Option<String>,
    pub replay_speed: Option<String>,
    pub replay_csv: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
}

/// The resolved flat run-config record, rows in fixed display order.
#[derive(Debug, Clone)]
pub struct ConfigRecord {
    pub rows: Vec<(String, String)>,
}

impl ConfigRecord {
    /// Merge the sources. Overrides beat env defaults, which beat the
    /// structured config; absent keys resolve to `unknown`, except the run
    /// bounds which default empty.
    pub fn resolve(
        namespace: &str,
        structured: &BTreeMap<String, String>,
        env: &BTreeMap<String, String>,
        overrides: &ConfigOverrides,
    ) -> Self {
        let mut env = env.clone();
        for (key, value) in [
            ("executors", &overrides.executors),
            ("replay_speed", &overrides.replay_speed),
            ("replay_csv", &overrides.replay_csv),
            ("start", &overrides.start),
            ("end", &overrides.end),
        ] {
            if let Some(value) = value {
                env.insert(key.to_string(), value.clone());
            }
        }

        let cfg = |key: &str| structured.get(key).cloned().unwrap_or_else(|| UNKNOWN.to_string());
        let env_or = |key: &str, default: &str| {
            env.get(key).cloned().unwrap_or_else(|| default.to_string())
        };

        let rows = vec![
            ("namespace".to_string(), namespace.to_string()),
            ("period".to_string(), cfg("period")),
            ("heartbeatTTL".to_string(), cfg("heartbeatTTL")),
            ("disableBenefitGating".to_string(), cfg("disableBenefitGating")),
            ("severeImbalanceRatio".to_string(), cfg("severeImbalanceRatio")),
            ("moveBudgetProportion".to_string(), cfg("moveBudgetProportion")),
            ("hysteresisUpperBand".to_string(), cfg("hysteresisUpperBand")),
            ("hysteresisLowerBand".to_string(), cfg("hysteresisLowerBand")),
            ("shardNum".to_string(), cfg("shardNum")),
            ("executors".to_string(), env_or("executors", UNKNOWN)),
            ("replay_speed".to_string(), env_or("replay_speed", UNKNOWN)),
            ("replay_csv".to_string(), env_or("replay_csv", UNKNOWN)),
            ("start".to_string(), env_or("start", "")),
            ("end".to_string(), env_or("end", "")),
        ];

        Self { rows }
    }

    /// Look up one resolved value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Two-column LaTeX `tabular` of the record.
    pub fn to_tex(&self) -> String {
        let mut lines = vec![
            "\\begin{tabular}{ll}".to_string(),
            "\\textbf{Parameter} & \\textbf{Value} \\\\".to_string(),
        ];
        for (key, value) in &self.rows {
            lines.push(format!("{key} & {value} \\\\"));
        }
        lines.push("\\end{tabular}".to_string());
        lines.join("\n") + "\n"
    }

    /// Flat JSON object of the record, empty values omitted.
    pub fn to_json(&self) -> Result<String> {
        let mut map = Map::new();
        for (key, value) in &self.rows {
            if !value.is_empty() {
                map.insert(key.clone(), Value::String(value.clone()));
            }
        }
        Ok(serde_json::to_string_pretty(&Value::Object(map))?)
    }

    pub fn write_tex(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_tex())?;
        Ok(())
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

fn parse_kv(stripped: &str) -> Option<(&str, String)> {
    let (key, value) = stripped.split_once(':')?;
    Some((key.trim(), strip_quotes(value.trim()).to_string()))
}

fn strip_quotes(raw: &str) -> &str {
    raw.trim_matches('"').trim_matches('\'')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_quotes_handles_both_kinds() {
        assert_eq!(strip_quotes("\"0.4\""), "0.4");
        assert_eq!(strip_quotes("'1m'"), "1m");
        assert_eq!(strip_quotes("plain"), "plain");
    }

    #[test]
    fn test_parse_kv_splits_on_first_colon() {
        let (key, value) = parse_kv("period: \"15s\"").unwrap();
        assert_eq!(key, "period");
        assert_eq!(value, "15s");
        assert!(parse_kv("no colon here").is_none());
    }
}
