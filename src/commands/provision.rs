//! `mitamae-provisioner provision` — install mitamae on the target and apply
//! the recipe.

use anyhow::Result;
use clap::Args;

use crate::application::ports::{RemoteShell, Terminator, Ui};
use crate::application::Provisioner;
use crate::commands::{ConfigArgs, TargetArgs};
use crate::domain::ProvisionError;
use crate::infra::terminator::ProcessExit;
use crate::output::{OutputContext, TerminalUi};

/// Arguments for the provision command.
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub target: TargetArgs,
}

/// Prepare the provisioner and run it against the selected target.
/// Ctrl-C cancels the run.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or any provisioning
/// step fails.
pub async fn run(ctx: &OutputContext, args: &ProvisionArgs) -> Result<()> {
    let mut provisioner = Provisioner::new(ProcessExit::default());
    provisioner.prepare(
        &args.config.raw_configs()?,
        &args.config.interpolation_context(),
    )?;

    let channel = args.target.channel()?;
    ctx.header(&format!("Provisioning {} with mitamae", channel.transport()));

    let ui = TerminalUi::new(ctx);
    provision_until_interrupted(&provisioner, &ui, &channel, ctrl_c()).await?;
    ctx.success("provisioning complete");
    Ok(())
}

/// Run the provisioner, cancelling it if `interrupt` resolves first.
///
/// # Errors
///
/// Returns the provisioner's error, or `Cancelled` after an interrupt.
pub async fn provision_until_interrupted<T: Terminator>(
    provisioner: &Provisioner<T>,
    ui: &impl Ui,
    channel: &impl RemoteShell,
    interrupt: impl Future<Output = ()>,
) -> Result<(), ProvisionError> {
    tokio::select! {
        result = provisioner.provision(ui, channel) => result,
        () = interrupt => {
            provisioner.cancel();
            Err(ProvisionError::Cancelled)
        }
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("cannot listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}
