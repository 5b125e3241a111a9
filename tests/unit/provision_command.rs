//! Unit tests for the provision flow wired through the infrastructure
//! channel, and for interrupt handling in `provision_until_interrupted`.

#![allow(clippy::expect_used)]

use std::process::{ExitStatus, Output};

use mitamae_provisioner::application::Provisioner;
use mitamae_provisioner::application::ports::{RemoteShell, Ui};
use mitamae_provisioner::commands::provision::provision_until_interrupted;
use mitamae_provisioner::domain::{InterpolationContext, ProvisionError, ProvisionState};
use mitamae_provisioner::infra::channel::{CommandChannel, Transport};
use mitamae_provisioner::infra::config::assignments_to_raw;

use crate::helpers::{FlagTerminator, RecordingRunner, RecordingUi, err_output, ok_output};

fn provisioner(settings: &[(&str, &str)]) -> Provisioner<FlagTerminator> {
    provisioner_with(FlagTerminator::default(), settings)
}

fn provisioner_with(
    terminator: FlagTerminator,
    settings: &[(&str, &str)],
) -> Provisioner<FlagTerminator> {
    let pairs: Vec<(String, String)> = settings
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    let mut p = Provisioner::new(terminator);
    p.prepare(&[assignments_to_raw(&pairs)], &InterpolationContext::default())
        .expect("valid settings");
    p
}

#[tokio::test]
async fn test_local_transport_runs_three_shell_commands() {
    let runner = RecordingRunner {
        stream_lines: vec!["INFO : Recipe: /tmp/base.rb".to_string()],
        ..RecordingRunner::with_outputs(vec![ok_output(b"x86_64-linux"), ok_output(b"")])
    };
    let channel = CommandChannel::new(&runner, Transport::Local);
    let ui = RecordingUi::default();
    let p = provisioner(&[("recipe_path", "/tmp/base.rb"), ("bin_dir", "/tmp/bin")]);

    p.provision(&ui, &channel).await.expect("provision succeeds");

    let calls = runner.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c[0] == "sh" && c[1] == "-c"));
    assert!(calls[0][2].starts_with("uname -s -m"));
    assert!(calls[1][2].starts_with("wget -q -O /tmp/bin/mitamae-x86_64-linux "));
    assert!(calls[1][2].ends_with("&& chmod +x /tmp/bin/mitamae-x86_64-linux"));
    assert_eq!(calls[2][2], "/tmp/bin/mitamae-x86_64-linux local  /tmp/base.rb");

    let lines = ui.lines();
    assert!(lines[0].starts_with("say: Downloading mitamae from https://github.com/"));
    assert!(lines.contains(&"out: INFO : Recipe: /tmp/base.rb".to_string()));
    assert_eq!(p.state(), ProvisionState::Done);
}

#[tokio::test]
async fn test_download_error_output_stops_before_recipe() {
    let runner = RecordingRunner::with_outputs(vec![
        ok_output(b"x86_64-linux"),
        err_output(0, b"/usr/local/bin/mitamae-x86_64-linux: Permission denied"),
    ]);
    let channel = CommandChannel::new(&runner, Transport::Local);
    let p = provisioner(&[("recipe_path", "base.rb")]);

    let err = p
        .provision(&RecordingUi::default(), &channel)
        .await
        .expect_err("download must fail");

    assert!(matches!(err, ProvisionError::Download { .. }), "got: {err:?}");
    assert_eq!(runner.calls().len(), 2);
}

#[tokio::test]
async fn test_recipe_failure_exit_code_is_reported() {
    let runner = RecordingRunner {
        stream_code: 2,
        ..RecordingRunner::with_outputs(vec![ok_output(b"arm64-darwin"), ok_output(b"")])
    };
    let channel = CommandChannel::new(&runner, Transport::Local);
    let p = provisioner(&[("recipe_path", "base.rb")]);

    let err = p
        .provision(&RecordingUi::default(), &channel)
        .await
        .expect_err("recipe must fail");

    assert!(matches!(err, ProvisionError::RecipeExecution { .. }));
    assert!(err.to_string().contains("status 2"), "got: {err}");
}

/// `RemoteShell` whose commands never finish.
struct HangingShell;

impl RemoteShell for HangingShell {
    async fn run(&self, _: &str) -> anyhow::Result<Output> {
        std::future::pending().await
    }

    async fn run_streaming(&self, _: &str, _: &dyn Ui) -> anyhow::Result<ExitStatus> {
        std::future::pending().await
    }
}

#[tokio::test]
async fn test_cancelled_provisioner_runs_no_steps() {
    let runner = RecordingRunner::default();
    let channel = CommandChannel::new(&runner, Transport::Local);
    let terminator = FlagTerminator::default();
    let p = provisioner_with(terminator.clone(), &[("recipe_path", "base.rb")]);
    p.cancel();

    let err = provision_until_interrupted(&p, &RecordingUi::default(), &channel, async {})
        .await
        .expect_err("cancelled");

    assert!(matches!(err, ProvisionError::Cancelled));
    assert!(runner.calls().is_empty(), "no step may run after cancel");
    assert!(terminator.called());
    assert_eq!(p.state(), ProvisionState::Cancelled);
}

#[tokio::test]
async fn test_interrupt_during_run_cancels_and_terminates() {
    let terminator = FlagTerminator::default();
    let p = provisioner_with(terminator.clone(), &[("recipe_path", "base.rb")]);

    let err = provision_until_interrupted(
        &p,
        &RecordingUi::default(),
        &HangingShell,
        tokio::time::sleep(std::time::Duration::from_millis(20)),
    )
    .await
    .expect_err("interrupted");

    assert!(matches!(err, ProvisionError::Cancelled));
    assert!(p.is_cancelled());
    assert!(terminator.called());
}
