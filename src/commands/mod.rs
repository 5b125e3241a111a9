//! Command implementations and the argument groups they share.

pub mod platform;
pub mod provision;
pub mod validate;
pub mod version;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::domain::{InterpolationContext, RawConfig};
use crate::infra::channel::{CommandChannel, SshTarget, Transport};
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::config::{assignments_to_raw, load_raw_config, parse_assignment, process_env};

/// Where provisioner settings come from.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Settings file (JSON, or YAML for .yaml/.yml); repeat to merge in order
    #[arg(
        short,
        long = "config",
        value_name = "FILE",
        env = "MITAMAE_PROVISIONER_CONFIG"
    )]
    pub config: Vec<PathBuf>,

    /// Override a setting, e.g. --set recipe_path=recipes/base.rb
    #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,

    /// Define a user variable for {{ user `name` }} templates
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub var: Vec<(String, String)>,
}

impl ConfigArgs {
    /// Raw maps in merge order: files first, then `--set` overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed.
    pub fn raw_configs(&self) -> Result<Vec<RawConfig>> {
        let mut raws = self
            .config
            .iter()
            .map(|path| load_raw_config(path))
            .collect::<Result<Vec<_>>>()?;
        if !self.set.is_empty() {
            raws.push(assignments_to_raw(&self.set));
        }
        Ok(raws)
    }

    /// Template context over the current environment and `--var` values.
    #[must_use]
    pub fn interpolation_context(&self) -> InterpolationContext {
        let mut ctx = InterpolationContext::with_env(process_env());
        ctx.user_variables.extend(self.var.iter().cloned());
        ctx
    }
}

/// Exactly one way of reaching the target.
#[derive(Args, Debug)]
#[group(id = "target", required = true, multiple = false)]
pub struct TargetSelector {
    /// Reach the target over ssh, e.g. ubuntu@10.0.0.5
    #[arg(long, value_name = "[USER@]HOST")]
    pub ssh: Option<String>,

    /// Reach a Multipass instance with `multipass exec`
    #[arg(long, value_name = "INSTANCE")]
    pub multipass: Option<String>,

    /// Run commands on this machine
    #[arg(long)]
    pub local: bool,
}

/// Target selection plus transport tuning.
#[derive(Args, Debug)]
pub struct TargetArgs {
    #[command(flatten)]
    pub selector: TargetSelector,

    /// SSH port
    #[arg(long, value_name = "PORT", requires = "ssh")]
    pub ssh_port: Option<u16>,

    /// SSH private key
    #[arg(long, value_name = "FILE", requires = "ssh")]
    pub ssh_identity: Option<PathBuf>,

    /// Extra ssh -o option, e.g. StrictHostKeyChecking=no
    #[arg(long = "ssh-option", value_name = "OPTION", requires = "ssh")]
    pub ssh_options: Vec<String>,

    /// Kill a remote command that runs longer than this many seconds
    #[arg(long, value_name = "SECS")]
    pub command_timeout: Option<u64>,
}

impl TargetArgs {
    /// The selected transport.
    ///
    /// # Errors
    ///
    /// Returns an error if no target was selected.
    pub fn transport(&self) -> Result<Transport> {
        let TargetSelector {
            ssh,
            multipass,
            local,
        } = &self.selector;
        match (ssh, multipass, local) {
            (Some(destination), _, _) => Ok(Transport::Ssh(SshTarget {
                destination: destination.clone(),
                port: self.ssh_port,
                identity: self.ssh_identity.clone(),
                options: self.ssh_options.clone(),
            })),
            (None, Some(instance), _) => Ok(Transport::Multipass {
                instance: instance.clone(),
            }),
            (None, None, true) => Ok(Transport::Local),
            (None, None, false) => anyhow::bail!("no target selected: use --ssh, --multipass or --local"),
        }
    }

    /// A production channel for the selected transport.
    ///
    /// # Errors
    ///
    /// Returns an error if no target was selected.
    pub fn channel(&self) -> Result<CommandChannel<TokioCommandRunner>> {
        Ok(CommandChannel::default_runner(
            self.transport()?,
            self.command_timeout.map(Duration::from_secs),
        ))
    }
}
