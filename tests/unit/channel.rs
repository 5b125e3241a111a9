//! Unit tests for `CommandChannel` routing through a `CommandRunner`.

#![allow(clippy::expect_used)]

use mitamae_provisioner::application::ports::RemoteShell;
use mitamae_provisioner::infra::channel::{CommandChannel, SshTarget, Transport};

use crate::helpers::{RecordingRunner, RecordingUi, ok_output};

#[tokio::test]
async fn test_ssh_channel_runs_ssh_with_command_last() {
    let runner = RecordingRunner::with_outputs(vec![ok_output(b"x86_64-linux")]);
    let channel = CommandChannel::new(
        &runner,
        Transport::Ssh(SshTarget {
            destination: "ec2-user@build-host".to_string(),
            ..SshTarget::default()
        }),
    );

    let out = channel.run("uname -s -m").await.expect("run succeeds");

    assert_eq!(out.stdout, b"x86_64-linux");
    let calls = runner.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0][0], "ssh");
    assert_eq!(calls[0].last().map(String::as_str), Some("uname -s -m"));
    assert!(calls[0].contains(&"ec2-user@build-host".to_string()));
}

#[tokio::test]
async fn test_multipass_channel_streams_through_runner() {
    let runner = RecordingRunner {
        stream_lines: vec!["INFO : done".to_string()],
        ..RecordingRunner::default()
    };
    let channel = CommandChannel::new(
        &runner,
        Transport::Multipass {
            instance: "image-build".to_string(),
        },
    );
    let ui = RecordingUi::default();

    let status = channel
        .run_streaming("/usr/local/bin/mitamae-x86_64-linux local  base.rb", &ui)
        .await
        .expect("run succeeds");

    assert!(status.success());
    assert_eq!(ui.lines(), vec!["out: INFO : done"]);
    assert_eq!(
        runner.calls()[0][..6],
        ["multipass", "exec", "image-build", "--", "sh", "-c"]
    );
}

#[tokio::test]
async fn test_runner_failure_names_transport() {
    let channel = CommandChannel::new(RecordingRunner::default(), Transport::Local);

    let err = channel.run("true").await.expect_err("no output queued");

    let msg = format!("{err:#}");
    assert!(msg.contains("cannot run command on local"), "got: {msg}");
}
