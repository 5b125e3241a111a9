//! `TerminalUi` — Presentation-layer implementation of the `Ui` port.
//!
//! Wraps `&OutputContext` so the provisioner can report progress and stream
//! remote output without depending on any presentation type directly.

use owo_colors::OwoColorize as _;

use crate::application::ports::Ui;
use crate::output::OutputContext;

/// Terminal output sink.
///
/// - `say()` prints `"  → {message}"` (suppressed when `ctx.quiet`)
/// - `message()` prints `"    {message}"` (suppressed when `ctx.quiet`)
/// - `error()` prints `"    {message}"` in red to stderr (never suppressed)
pub struct TerminalUi<'a> {
    ctx: &'a OutputContext,
}

impl<'a> TerminalUi<'a> {
    #[must_use]
    pub fn new(ctx: &'a OutputContext) -> Self {
        Self { ctx }
    }
}

impl Ui for TerminalUi<'_> {
    fn say(&self, message: &str) {
        if !self.ctx.quiet {
            println!("  {} {message}", "→".style(self.ctx.styles.step));
        }
    }

    fn message(&self, message: &str) {
        if !self.ctx.quiet {
            println!("    {message}");
        }
    }

    fn error(&self, message: &str) {
        eprintln!("    {}", message.style(self.ctx.styles.error));
    }
}
