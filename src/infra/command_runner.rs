//! Infrastructure implementation of the `CommandRunner` port.
//!
//! `TokioCommandRunner` is the production implementation that uses tokio
//! for async process execution, with an optional timeout that kills the
//! child when it fires.

use std::process::{ExitStatus, Output, Stdio};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};

use crate::application::ports::{CommandRunner, Ui};

/// Production `CommandRunner`.
///
/// `tokio::time::timeout` around `.output().await` does NOT kill the child
/// on Windows when the timeout fires. This implementation uses
/// `tokio::select!` with an explicit `child.kill()` instead. Children are
/// also spawned with `kill_on_drop`, so abandoning a run (cancellation)
/// terminates the transport process.
pub struct TokioCommandRunner {
    timeout: Option<Duration>,
}

impl TokioCommandRunner {
    /// `None` lets commands run for as long as they need.
    #[must_use]
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout }
    }

    async fn deadline(&self) {
        match self.timeout {
            Some(timeout) => tokio::time::sleep(timeout).await,
            None => std::future::pending().await,
        }
    }

    fn timeout_secs(&self) -> u64 {
        self.timeout.map_or(0, |t| t.as_secs())
    }
}

impl CommandRunner for TokioCommandRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        tracing::debug!(program, ?args, "spawning");
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let mut stdout_handle = child.stdout.take();
        let mut stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, stdout, stderr) = tokio::join!(
                    child.wait(),
                    read_all(stdout_handle.as_mut()),
                    read_all(stderr_handle.as_mut()),
                );
                Ok(Output {
                    status: status.with_context(|| format!("waiting for {program}"))?,
                    stdout,
                    stderr,
                })
            } => result,
            () = self.deadline() => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", self.timeout_secs())
            }
        }
    }

    async fn run_streaming(
        &self,
        program: &str,
        args: &[&str],
        ui: &dyn Ui,
    ) -> Result<ExitStatus> {
        tracing::debug!(program, ?args, "spawning (streaming)");
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("failed to spawn {program}"))?;

        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();

        tokio::select! {
            result = async {
                let (status, (), ()) = tokio::join!(
                    child.wait(),
                    forward_lines(stdout_handle, |line| ui.message(line)),
                    forward_lines(stderr_handle, |line| ui.error(line)),
                );
                status.with_context(|| format!("waiting for {program}"))
            } => result,
            () = self.deadline() => {
                let _ = child.kill().await;
                anyhow::bail!("{program} timed out after {}s", self.timeout_secs())
            }
        }
    }
}

async fn read_all<R: AsyncRead + Unpin>(handle: Option<&mut R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(h) = handle {
        let _ = h.read_to_end(&mut buf).await;
    }
    buf
}

/// Forward each line to `emit` until EOF. Bytes that are not UTF-8 are
/// replaced rather than ending the stream, so the pipe stays drained.
async fn forward_lines<R: AsyncRead + Unpin>(handle: Option<R>, emit: impl Fn(&str)) {
    let Some(handle) = handle else { return };
    let mut reader = BufReader::new(handle);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = buf.strip_suffix(b"\n").unwrap_or(&buf);
                let line = line.strip_suffix(b"\r").unwrap_or(line);
                emit(&String::from_utf8_lossy(line));
            }
        }
    }
}
