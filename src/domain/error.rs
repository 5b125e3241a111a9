//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors raised while preparing the provisioner configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} is required")]
    MissingRequired { key: &'static str },

    #[error("Unknown configuration key: {key}\n\nValid keys: {valid}")]
    UnknownKey { key: String, valid: String },

    #[error("Invalid value for {key}: expected {expected}")]
    InvalidType { key: String, expected: &'static str },

    #[error("Cannot render template in {key}: {reason}")]
    Interpolation { key: String, reason: String },

    #[error("provisioner has not been prepared")]
    NotPrepared,
}

// ── Provision errors ──────────────────────────────────────────────────────────

/// Errors surfaced by a provisioning run. Every variant is terminal for the run.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("platform detection failed: {reason}")]
    RemoteExecution { reason: String },

    #[error("{platform} is not supported (supported operating systems: linux, darwin)")]
    UnsupportedPlatform { platform: String },

    #[error("download of {url} failed: {reason}")]
    Download { url: String, reason: String },

    #[error("recipe execution failed: {reason}")]
    RecipeExecution { reason: String },

    #[error("provisioning cancelled")]
    Cancelled,
}

impl ProvisionError {
    /// Short machine-friendly name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "configuration",
            Self::RemoteExecution { .. } => "remote_execution",
            Self::UnsupportedPlatform { .. } => "unsupported_platform",
            Self::Download { .. } => "download",
            Self::RecipeExecution { .. } => "recipe_execution",
            Self::Cancelled => "cancelled",
        }
    }
}
