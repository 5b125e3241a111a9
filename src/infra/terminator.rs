//! Production `Terminator`: exits the process.

use crate::application::ports::Terminator;

/// Exit status used when a run is cancelled (128 + SIGINT).
pub const CANCELLED_EXIT_CODE: i32 = 130;

/// Ends the whole process without cleanup.
pub struct ProcessExit {
    code: i32,
}

impl ProcessExit {
    #[must_use]
    pub fn new(code: i32) -> Self {
        Self { code }
    }
}

impl Default for ProcessExit {
    fn default() -> Self {
        Self::new(CANCELLED_EXIT_CODE)
    }
}

impl Terminator for ProcessExit {
    fn terminate(&self) {
        tracing::warn!(code = self.code, "terminating process");
        std::process::exit(self.code);
    }
}
