//! Provisioner configuration: raw map merging, interpolation, validation
//! and defaulting.
//!
//! Pure functions only — no I/O, no async, no filesystem access.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::domain::error::ConfigError;
use crate::domain::interpolate::InterpolationContext;

// ── Constants ────────────────────────────────────────────────────────────────

/// Release tag installed when `mitamae_version` is not set.
pub const DEFAULT_MITAMAE_VERSION: &str = "v1.4.5";

/// Remote install directory used when `bin_dir` is not set.
pub const DEFAULT_BIN_DIR: &str = "/usr/local/bin";

/// Keys owned by this provisioner.
pub const PROVISIONER_KEYS: &[&str] = &["mitamae_version", "bin_dir", "option", "recipe_path"];

/// Keys the host injects into every provisioner's configuration.
pub const HOST_KEYS: &[&str] = &[
    "packer_build_name",
    "packer_builder_type",
    "packer_debug",
    "packer_force",
    "packer_on_error",
    "packer_user_variables",
];

/// One raw configuration map as supplied by the host.
pub type RawConfig = serde_json::Map<String, Value>;

// ── Config schema ────────────────────────────────────────────────────────────

/// Validated provisioner configuration. Immutable once prepared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionerConfig {
    /// Release tag of mitamae to install, e.g. `v1.4.5`.
    pub mitamae_version: String,
    /// Directory on the target the binary is installed into.
    pub bin_dir: String,
    /// Recipe path on the target. Never empty.
    pub recipe_path: String,
    /// Extra arguments for `mitamae local`, passed through verbatim.
    pub option: String,
    /// Host-supplied build metadata.
    pub host: HostConfig,
}

/// Host-common settings shared by all provisioners of a build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder_type: Option<String>,
    pub debug: bool,
    pub force: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_error: Option<String>,
}

impl ProvisionerConfig {
    /// Merge, render, validate and default the raw configuration maps.
    ///
    /// Maps are merged in order; a key in a later map replaces the same key
    /// in an earlier one. Keys match case-insensitively. Every provisioner
    /// string value is rendered through `ctx` before validation.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownKey` for keys outside the recognized set,
    /// `ConfigError::InvalidType` for values of the wrong shape,
    /// `ConfigError::Interpolation` when a template cannot be rendered, and
    /// `ConfigError::MissingRequired` when `recipe_path` ends up empty.
    pub fn prepare(raws: &[RawConfig], ctx: &InterpolationContext) -> Result<Self, ConfigError> {
        let merged = merge_raw(raws);
        reject_unknown_keys(&merged)?;

        let host = HostConfig {
            build_name: string_value(&merged, "packer_build_name")?,
            builder_type: string_value(&merged, "packer_builder_type")?,
            debug: bool_value(&merged, "packer_debug")?,
            force: bool_value(&merged, "packer_force")?,
            on_error: string_value(&merged, "packer_on_error")?,
        };

        let mut ctx = ctx.clone();
        for (name, value) in user_variables(&merged)? {
            ctx.user_variables.entry(name).or_insert(value);
        }
        if ctx.build_name.is_none() {
            ctx.build_name.clone_from(&host.build_name);
        }
        if ctx.builder_type.is_none() {
            ctx.builder_type.clone_from(&host.builder_type);
        }

        let render = |key: &'static str| -> Result<String, ConfigError> {
            let raw = string_value(&merged, key)?.unwrap_or_default();
            ctx.render(&raw).map_err(|reason| ConfigError::Interpolation {
                key: key.to_string(),
                reason,
            })
        };

        let recipe_path = render("recipe_path")?;
        if recipe_path.is_empty() {
            return Err(ConfigError::MissingRequired { key: "recipe_path" });
        }

        let mut bin_dir = render("bin_dir")?;
        if bin_dir.is_empty() {
            bin_dir = DEFAULT_BIN_DIR.to_string();
        }

        let mut mitamae_version = render("mitamae_version")?;
        if mitamae_version.is_empty() {
            mitamae_version = DEFAULT_MITAMAE_VERSION.to_string();
        }

        Ok(Self {
            mitamae_version,
            bin_dir,
            recipe_path,
            option: render("option")?,
            host,
        })
    }
}

// ── Decoding helpers ─────────────────────────────────────────────────────────

fn merge_raw(raws: &[RawConfig]) -> RawConfig {
    let mut merged = RawConfig::new();
    for raw in raws {
        for (key, value) in raw {
            merged.insert(key.to_ascii_lowercase(), value.clone());
        }
    }
    merged
}

fn reject_unknown_keys(merged: &RawConfig) -> Result<(), ConfigError> {
    let unknown = merged
        .keys()
        .find(|k| !PROVISIONER_KEYS.contains(&k.as_str()) && !HOST_KEYS.contains(&k.as_str()));
    match unknown {
        Some(key) => Err(ConfigError::UnknownKey {
            key: key.clone(),
            valid: PROVISIONER_KEYS.join(", "),
        }),
        None => Ok(()),
    }
}

/// Strings decode weakly: numbers and booleans are accepted as their text.
fn string_value(merged: &RawConfig, key: &str) -> Result<Option<String>, ConfigError> {
    match merged.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(ConfigError::InvalidType {
            key: key.to_string(),
            expected: "a string",
        }),
    }
}

fn bool_value(merged: &RawConfig, key: &str) -> Result<bool, ConfigError> {
    match merged.get(key) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(Value::String(s)) if s == "true" || s == "1" => Ok(true),
        Some(Value::String(s)) if s == "false" || s == "0" || s.is_empty() => Ok(false),
        Some(_) => Err(ConfigError::InvalidType {
            key: key.to_string(),
            expected: "a boolean",
        }),
    }
}

fn user_variables(merged: &RawConfig) -> Result<BTreeMap<String, String>, ConfigError> {
    let invalid = || ConfigError::InvalidType {
        key: "packer_user_variables".to_string(),
        expected: "a map of strings",
    };
    match merged.get("packer_user_variables") {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| match v {
                Value::String(s) => Ok((k.clone(), s.clone())),
                _ => Err(invalid()),
            })
            .collect(),
        Some(_) => Err(invalid()),
    }
}

// ── Unit tests ───────────────────────────────────────────────────────────────
