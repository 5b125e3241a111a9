//! Run state of a provisioner.

use std::fmt;

/// Where a provisioner is in its lifecycle.
///
/// `Unconfigured → Configured → DetectingPlatform → Downloading → Executing → Done`;
/// any step may move to `Failed` or `Cancelled` instead. Every run starts again
/// from `Configured`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionState {
    Unconfigured,
    Configured,
    DetectingPlatform,
    Downloading,
    Executing,
    Done,
    Failed,
    Cancelled,
}

impl fmt::Display for ProvisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unconfigured => "unconfigured",
            Self::Configured => "configured",
            Self::DetectingPlatform => "detecting platform",
            Self::Downloading => "downloading",
            Self::Executing => "executing recipe",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}
