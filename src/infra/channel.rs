//! Infrastructure implementation of the `RemoteShell` port.
//!
//! `CommandChannel<R>` turns a shell command string into a structured argv
//! for the selected transport (ssh, `multipass exec`, or a local `sh -c`)
//! and routes it through a `CommandRunner`.

use std::fmt;
use std::path::PathBuf;
use std::process::{ExitStatus, Output};
use std::time::Duration;

use anyhow::{Context, Result};

use crate::application::ports::{CommandRunner, RemoteShell, Ui};
use crate::infra::command_runner::TokioCommandRunner;

/// SSH connection parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshTarget {
    /// `host` or `user@host`.
    pub destination: String,
    pub port: Option<u16>,
    pub identity: Option<PathBuf>,
    /// Extra `-o` options, e.g. `StrictHostKeyChecking=no`.
    pub options: Vec<String>,
}

/// How commands reach the target machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    Ssh(SshTarget),
    Multipass { instance: String },
    Local,
}

impl Transport {
    /// Program and arguments that run `command` on the target.
    #[must_use]
    pub fn argv(&self, command: &str) -> (&'static str, Vec<String>) {
        match self {
            Self::Ssh(target) => {
                // BatchMode: never prompt; LogLevel=ERROR: keep host-key
                // notices off stderr, which is treated as command failure.
                let mut args = vec![
                    "-o".to_string(),
                    "BatchMode=yes".to_string(),
                    "-o".to_string(),
                    "LogLevel=ERROR".to_string(),
                ];
                if let Some(port) = target.port {
                    args.push("-p".to_string());
                    args.push(port.to_string());
                }
                if let Some(identity) = &target.identity {
                    args.push("-i".to_string());
                    args.push(identity.display().to_string());
                }
                for option in &target.options {
                    args.push("-o".to_string());
                    args.push(option.clone());
                }
                args.push(target.destination.clone());
                args.push("--".to_string());
                args.push(command.to_string());
                ("ssh", args)
            }
            Self::Multipass { instance } => (
                "multipass",
                vec![
                    "exec".to_string(),
                    instance.clone(),
                    "--".to_string(),
                    "sh".to_string(),
                    "-c".to_string(),
                    command.to_string(),
                ],
            ),
            Self::Local => ("sh", vec!["-c".to_string(), command.to_string()]),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssh(SshTarget {
                destination,
                port: Some(port),
                ..
            }) => write!(f, "ssh://{destination}:{port}"),
            Self::Ssh(target) => write!(f, "ssh://{}", target.destination),
            Self::Multipass { instance } => write!(f, "multipass://{instance}"),
            Self::Local => f.write_str("local"),
        }
    }
}

/// `RemoteShell` backed by a local transport program.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct CommandChannel<R: CommandRunner> {
    runner: R,
    transport: Transport,
}

impl<R: CommandRunner> CommandChannel<R> {
    pub fn new(runner: R, transport: Transport) -> Self {
        Self { runner, transport }
    }

    #[must_use]
    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

impl CommandChannel<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner(transport: Transport, timeout: Option<Duration>) -> Self {
        Self::new(TokioCommandRunner::new(timeout), transport)
    }
}

impl<R: CommandRunner> RemoteShell for CommandChannel<R> {
    async fn run(&self, command: &str) -> Result<Output> {
        let (program, args) = self.transport.argv(command);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        tracing::debug!(transport = %self.transport, command, "remote command");
        self.runner
            .run(program, &args)
            .await
            .with_context(|| format!("cannot run command on {}", self.transport))
    }

    async fn run_streaming(&self, command: &str, ui: &dyn Ui) -> Result<ExitStatus> {
        let (program, args) = self.transport.argv(command);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        tracing::debug!(transport = %self.transport, command, "remote command (streaming)");
        self.runner
            .run_streaming(program, &args, ui)
            .await
            .with_context(|| format!("cannot run command on {}", self.transport))
    }
}
