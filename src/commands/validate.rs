//! `mitamae-provisioner validate` — prepare the configuration without
//! touching any target.

use anyhow::{Context, Result};
use clap::Args;

use crate::commands::ConfigArgs;
use crate::domain::ProvisionerConfig;
use crate::output::OutputContext;

/// Arguments for the validate command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Merge, render and validate the settings, then print the result.
///
/// # Errors
///
/// Returns an error if a settings file cannot be loaded or the merged
/// configuration is invalid.
pub fn run(ctx: &OutputContext, args: &ValidateArgs, json: bool) -> Result<()> {
    let config = ProvisionerConfig::prepare(
        &args.config.raw_configs()?,
        &args.config.interpolation_context(),
    )?;

    if json {
        let out = serde_json::to_string_pretty(&config).context("cannot serialize config")?;
        println!("{out}");
        return Ok(());
    }

    ctx.header("Configuration");
    ctx.kv("mitamae_version:", &config.mitamae_version);
    ctx.kv("bin_dir:", &config.bin_dir);
    ctx.kv("recipe_path:", &config.recipe_path);
    ctx.kv("option:", &config.option);
    if let Some(build_name) = &config.host.build_name {
        ctx.kv("build:", build_name);
    }
    ctx.success("configuration is valid");
    Ok(())
}
