//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`,
//! `crate::commands`, or `crate::output`.

use std::process::{ExitStatus, Output};

use anyhow::Result;

// ── Output Sink Port ──────────────────────────────────────────────────────────

/// Human-facing output sink handed to the provisioner by its host.
/// Sync trait — no async needed.
pub trait Ui {
    /// Emit a progress line, e.g. the download announcement.
    fn say(&self, message: &str);
    /// Emit a line of regular output from the remote tool.
    fn message(&self, message: &str);
    /// Emit a line of error output from the remote tool.
    fn error(&self, message: &str);
}

// ── Remote Channel Port ───────────────────────────────────────────────────────

/// Shell command execution on the target machine.
///
/// Each call blocks (asynchronously) until the remote command has finished.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    /// Run `command` through the target's shell and capture its output.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be started or waited on.
    async fn run(&self, command: &str) -> Result<Output>;

    /// Run `command` while forwarding each stdout line to `ui.message` and
    /// each stderr line to `ui.error` as they arrive.
    ///
    /// # Errors
    ///
    /// Returns an error if the command could not be started or waited on.
    async fn run_streaming(&self, command: &str, ui: &dyn Ui) -> Result<ExitStatus>;
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts local process execution so transports can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
    /// Run a program, streaming its stdout/stderr lines to `ui`.
    async fn run_streaming(&self, program: &str, args: &[&str], ui: &dyn Ui)
    -> Result<ExitStatus>;
}

impl<R: CommandRunner> CommandRunner for &R {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        (**self).run(program, args).await
    }

    async fn run_streaming(
        &self,
        program: &str,
        args: &[&str],
        ui: &dyn Ui,
    ) -> Result<ExitStatus> {
        (**self).run_streaming(program, args, ui).await
    }
}

// ── Abort Port ────────────────────────────────────────────────────────────────

/// Unconditional abort path taken when a run is cancelled.
pub trait Terminator {
    /// Stop everything now. Production implementations do not return.
    fn terminate(&self);
}
