//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, or `std::process`.
//! All functions are synchronous and take data in, returning data out.

pub mod command;
pub mod config;
pub mod error;
pub mod interpolate;
pub mod platform;
pub mod state;

pub use config::{HostConfig, ProvisionerConfig, RawConfig};
pub use error::{ConfigError, ProvisionError};
pub use interpolate::InterpolationContext;
pub use platform::{Os, Platform};
pub use state::ProvisionState;
