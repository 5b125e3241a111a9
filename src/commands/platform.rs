//! `mitamae-provisioner platform` — detect the target platform and show
//! which release artifact would be installed.

use anyhow::{Context, Result};
use clap::Args;

use crate::application::detect_platform;
use crate::commands::TargetArgs;
use crate::domain::command::download_url;
use crate::domain::config::DEFAULT_MITAMAE_VERSION;
use crate::output::OutputContext;

/// Arguments for the platform command.
#[derive(Args, Debug)]
pub struct PlatformArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Release tag used to build the download URL
    #[arg(long, value_name = "TAG", default_value = DEFAULT_MITAMAE_VERSION)]
    pub mitamae_version: String,
}

/// Run platform detection only.
///
/// # Errors
///
/// Returns an error if detection fails or the platform is unsupported.
pub async fn run(ctx: &OutputContext, args: &PlatformArgs, json: bool) -> Result<()> {
    let channel = args.target.channel()?;
    let platform = detect_platform(&channel).await?;
    let artifact = platform.artifact_name();
    let url = download_url(&args.mitamae_version, &artifact);

    if json {
        let out = serde_json::json!({
            "arch": platform.arch,
            "os": platform.os,
            "artifact": artifact,
            "url": url,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("cannot serialize platform")?
        );
        return Ok(());
    }

    ctx.kv("platform:", &platform.to_string());
    ctx.kv("artifact:", &artifact);
    ctx.kv("url:", &url);
    Ok(())
}
