//! Loading raw configuration maps from files and command-line assignments.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::domain::RawConfig;

/// Read one raw configuration map from a JSON file, or from YAML when the
/// extension is `.yaml`/`.yml`. An empty document yields an empty map.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or if the document
/// is not a mapping.
pub fn load_raw_config(path: &Path) -> Result<RawConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;
    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    );
    let value: Value = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("cannot parse {}", path.display()))?
    };
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(RawConfig::new()),
        _ => anyhow::bail!("{} must contain a mapping of settings", path.display()),
    }
}

/// Parse a `key=value` command-line assignment.
///
/// # Errors
///
/// Returns a message suitable for clap when `=` is missing or the key is empty.
pub fn parse_assignment(input: &str) -> Result<(String, String), String> {
    match input.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got {input:?}")),
    }
}

/// Turn `--set` assignments into a raw map that overrides file settings.
#[must_use]
pub fn assignments_to_raw(assignments: &[(String, String)]) -> RawConfig {
    assignments
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect()
}

/// Snapshot of the process environment for template rendering.
#[must_use]
pub fn process_env() -> BTreeMap<String, String> {
    env_snapshot(std::env::vars_os())
}

/// Keep only the entries whose name and value are both UTF-8.
fn env_snapshot(vars: impl IntoIterator<Item = (OsString, OsString)>) -> BTreeMap<String, String> {
    vars.into_iter()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect()
}
