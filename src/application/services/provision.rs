//! Application service — the mitamae provisioning run.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.
//! All I/O is routed through injected port traits.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::sync::watch;

use crate::application::ports::{RemoteShell, Terminator, Ui};
use crate::domain::command::{download_command, download_url, install_path, recipe_command};
use crate::domain::platform::DETECT_PLATFORM_COMMAND;
use crate::domain::{
    ConfigError, InterpolationContext, Platform, ProvisionError, ProvisionState,
    ProvisionerConfig, RawConfig,
};

/// Detect the target platform through `channel`.
///
/// # Errors
///
/// Returns `RemoteExecution` if the detection command cannot run, writes to
/// stderr or exits non-zero, and `UnsupportedPlatform` for an OS other than
/// linux or darwin.
pub async fn detect_platform(channel: &impl RemoteShell) -> Result<Platform, ProvisionError> {
    let output = channel
        .run(DETECT_PLATFORM_COMMAND)
        .await
        .map_err(|e| ProvisionError::RemoteExecution {
            reason: format!("{e:#}"),
        })?;
    if !output.stderr.is_empty() {
        return Err(ProvisionError::RemoteExecution {
            reason: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    if !output.status.success() {
        return Err(ProvisionError::RemoteExecution {
            reason: format!("detection command exited with {}", output.status),
        });
    }
    let platform = Platform::parse(&String::from_utf8_lossy(&output.stdout))?;
    tracing::info!(%platform, "detected target platform");
    Ok(platform)
}

/// Installs mitamae on a target and applies a recipe with it.
///
/// Call [`Provisioner::prepare`] once, then [`Provisioner::provision`] per
/// run. [`Provisioner::cancel`] may be called from another task while a run
/// is in flight.
pub struct Provisioner<T: Terminator> {
    config: Option<ProvisionerConfig>,
    terminator: T,
    cancel: watch::Sender<bool>,
    state: Mutex<ProvisionState>,
}

impl<T: Terminator> Provisioner<T> {
    /// Create an unconfigured provisioner.
    pub fn new(terminator: T) -> Self {
        Self {
            config: None,
            terminator,
            cancel: watch::Sender::new(false),
            state: Mutex::new(ProvisionState::Unconfigured),
        }
    }

    /// Validate and store the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::Configuration` when the raw maps do not
    /// describe a valid configuration; the provisioner stays unconfigured.
    pub fn prepare(
        &mut self,
        raws: &[RawConfig],
        ctx: &InterpolationContext,
    ) -> Result<&ProvisionerConfig, ProvisionError> {
        let config = ProvisionerConfig::prepare(raws, ctx)?;
        tracing::debug!(?config, "configuration prepared");
        self.set_state(ProvisionState::Configured);
        Ok(self.config.insert(config))
    }

    /// The prepared configuration, if any.
    #[must_use]
    pub fn config(&self) -> Option<&ProvisionerConfig> {
        self.config.as_ref()
    }

    /// Current state of the latest run.
    #[must_use]
    pub fn state(&self) -> ProvisionState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// `true` once [`Provisioner::cancel`] has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Detect the platform, install the matching mitamae binary and run the
    /// recipe with it. The first failing step ends the run.
    ///
    /// # Errors
    ///
    /// Returns the error of the failing step, `ConfigError::NotPrepared` if
    /// `prepare` has not succeeded, or `Cancelled` after [`Provisioner::cancel`].
    pub async fn provision(
        &self,
        ui: &impl Ui,
        channel: &impl RemoteShell,
    ) -> Result<(), ProvisionError> {
        let config = self.config.as_ref().ok_or(ConfigError::NotPrepared)?;
        self.set_state(ProvisionState::Configured);

        let result = self.run_steps(config, ui, channel).await;
        match &result {
            Ok(()) => {
                tracing::info!("provisioning finished");
                self.set_state(ProvisionState::Done);
            }
            Err(ProvisionError::Cancelled) => self.set_state(ProvisionState::Cancelled),
            Err(e) => {
                tracing::warn!(kind = e.kind(), "provisioning failed: {e}");
                self.set_state(ProvisionState::Failed);
            }
        }
        result
    }

    /// Stop the run now: signal in-flight and pending steps, then take the
    /// unconditional abort path.
    pub fn cancel(&self) {
        tracing::warn!(state = %self.state(), "cancel requested");
        self.cancel.send_replace(true);
        self.set_state(ProvisionState::Cancelled);
        self.terminator.terminate();
    }

    async fn run_steps(
        &self,
        config: &ProvisionerConfig,
        ui: &impl Ui,
        channel: &impl RemoteShell,
    ) -> Result<(), ProvisionError> {
        self.set_state(ProvisionState::DetectingPlatform);
        let platform = self.guarded(detect_platform(channel)).await?;

        self.set_state(ProvisionState::Downloading);
        let binary = self.guarded(install(config, &platform, ui, channel)).await?;

        self.set_state(ProvisionState::Executing);
        self.guarded(execute_recipe(config, &binary, ui, channel))
            .await
    }

    /// Run `step` unless cancelled, and abandon it if cancel arrives while
    /// it is in flight.
    async fn guarded<R>(
        &self,
        step: impl Future<Output = Result<R, ProvisionError>>,
    ) -> Result<R, ProvisionError> {
        if self.is_cancelled() {
            return Err(ProvisionError::Cancelled);
        }
        let mut cancelled = self.cancel.subscribe();
        tokio::select! {
            biased;
            _ = cancelled.wait_for(|c| *c) => Err(ProvisionError::Cancelled),
            result = step => result,
        }
    }

    fn set_state(&self, next: ProvisionState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let previous = *state;
        if previous != next {
            tracing::debug!(from = %previous, to = %next, "provisioner state");
            *state = next;
        }
    }
}

async fn install(
    config: &ProvisionerConfig,
    platform: &Platform,
    ui: &impl Ui,
    channel: &impl RemoteShell,
) -> Result<String, ProvisionError> {
    let artifact = platform.artifact_name();
    let url = download_url(&config.mitamae_version, &artifact);
    let path = install_path(&config.bin_dir, &artifact);

    ui.say(&format!("Downloading mitamae from {url} to {path}"));

    let failed = |reason: String| ProvisionError::Download {
        url: url.clone(),
        reason,
    };
    let output = channel
        .run(&download_command(&url, &path))
        .await
        .map_err(|e| failed(format!("{e:#}")))?;
    if !output.stderr.is_empty() {
        return Err(failed(
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    if !output.status.success() {
        return Err(failed(format!("download command exited with {}", output.status)));
    }
    tracing::info!(%path, "mitamae installed");
    Ok(path)
}

async fn execute_recipe(
    config: &ProvisionerConfig,
    binary: &str,
    ui: &impl Ui,
    channel: &impl RemoteShell,
) -> Result<(), ProvisionError> {
    let command = recipe_command(binary, &config.option, &config.recipe_path);
    ui.say(&format!("Applying recipe {}", config.recipe_path));
    tracing::info!(%command, "running recipe");

    let status = channel
        .run_streaming(&command, ui)
        .await
        .map_err(|e| ProvisionError::RecipeExecution {
            reason: format!("{e:#}"),
        })?;
    if status.success() {
        return Ok(());
    }
    let reason = match status.code() {
        Some(code) => format!("mitamae exited with status {code}"),
        None => "mitamae was terminated by a signal".to_string(),
    };
    Err(ProvisionError::RecipeExecution { reason })
}
