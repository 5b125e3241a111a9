//! Target platform detection output parsing and artifact naming.

use std::fmt;

use serde::Serialize;

use crate::domain::error::ProvisionError;

/// Name of the configuration-management tool and of its release artifacts.
pub const TOOL_NAME: &str = "mitamae";

/// Remote command printing `<arch>-<lowercase kernel name>`, e.g. `x86_64-linux`.
pub const DETECT_PLATFORM_COMMAND: &str =
    r#"uname -s -m | awk '{printf("%s-%s",$2,tolower($1))}'"#;

/// Operating systems mitamae publishes release binaries for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Linux,
    Darwin,
}

impl Os {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Darwin => "darwin",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Architecture and OS of the target, as reported by the detection command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub arch: String,
    pub os: Os,
}

impl Platform {
    /// Parse the detection command's output.
    ///
    /// The OS is everything after the first hyphen; the architecture is
    /// kept exactly as reported.
    ///
    /// # Errors
    ///
    /// Returns `ProvisionError::UnsupportedPlatform` carrying the whole
    /// platform string when the OS is not `linux` or `darwin`.
    pub fn parse(detected: &str) -> Result<Self, ProvisionError> {
        let platform = detected.trim();
        let unsupported = || ProvisionError::UnsupportedPlatform {
            platform: platform.to_string(),
        };
        let (arch, os) = platform.split_once('-').ok_or_else(unsupported)?;
        let os = match os {
            "linux" => Os::Linux,
            "darwin" => Os::Darwin,
            _ => return Err(unsupported()),
        };
        if arch.is_empty() {
            return Err(unsupported());
        }
        Ok(Self {
            arch: arch.to_string(),
            os,
        })
    }

    /// Release artifact file name: `mitamae-<arch>-<os>`.
    #[must_use]
    pub fn artifact_name(&self) -> String {
        format!("{TOOL_NAME}-{}-{}", self.arch, self.os)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.arch, self.os)
    }
}
