//! Shared test helpers: a recording `CommandRunner`, a recording `Ui`, and
//! output constructors.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::process::{ExitStatus, Output};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::Result;
use mitamae_provisioner::application::ports::{CommandRunner, Terminator, Ui};

// ── Cross-platform ExitStatus construction ───────────────────────────────────

/// Build an `ExitStatus` from a logical exit code (0 = success, non-zero = failure).
///
/// On Unix the raw wait-status encodes the exit code in bits 8–15, so we shift.
/// On Windows `ExitStatusExt::from_raw` takes the exit code directly.
#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    #[allow(clippy::cast_sign_loss)]
    ExitStatus::from_raw(code as u32)
}

// ── Output constructors ──────────────────────────────────────────────────────

pub fn ok_output(stdout: &[u8]) -> Output {
    Output {
        status: exit_status(0),
        stdout: stdout.to_vec(),
        stderr: Vec::new(),
    }
}

pub fn err_output(code: i32, stderr: &[u8]) -> Output {
    Output {
        status: exit_status(code),
        stdout: Vec::new(),
        stderr: stderr.to_vec(),
    }
}

// ── RecordingRunner ──────────────────────────────────────────────────────────

/// One recorded invocation: program followed by its arguments.
pub type Invocation = Vec<String>;

/// `CommandRunner` that records every invocation and replays queued outputs.
/// Streaming calls print `stream_lines` to the UI and exit with `stream_code`.
#[derive(Default)]
pub struct RecordingRunner {
    pub(crate) outputs: Mutex<VecDeque<Output>>,
    pub(crate) calls: Mutex<Vec<Invocation>>,
    pub stream_lines: Vec<String>,
    pub stream_code: i32,
}

impl RecordingRunner {
    pub fn with_outputs(outputs: Vec<Output>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, program: &str, args: &[&str]) {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().map(ToString::to_string));
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output> {
        self.record(program, args);
        self.outputs
            .lock()
            .ok()
            .and_then(|mut o| o.pop_front())
            .ok_or_else(|| anyhow::anyhow!("not expected: {program} {args:?}"))
    }

    async fn run_streaming(&self, program: &str, args: &[&str], ui: &dyn Ui) -> Result<ExitStatus> {
        self.record(program, args);
        for line in &self.stream_lines {
            ui.message(line);
        }
        Ok(exit_status(self.stream_code))
    }
}

// ── RecordingUi ──────────────────────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingUi {
    pub lines: Mutex<Vec<String>>,
}

impl RecordingUi {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl Ui for RecordingUi {
    fn say(&self, message: &str) {
        self.push(format!("say: {message}"));
    }
    fn message(&self, message: &str) {
        self.push(format!("out: {message}"));
    }
    fn error(&self, message: &str) {
        self.push(format!("err: {message}"));
    }
}

// ── FlagTerminator ───────────────────────────────────────────────────────────

/// `Terminator` that raises a shared flag; clone it to observe the call.
#[derive(Default, Clone)]
pub struct FlagTerminator(Arc<AtomicBool>);

impl FlagTerminator {
    pub fn called(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

impl Terminator for FlagTerminator {
    fn terminate(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
}
