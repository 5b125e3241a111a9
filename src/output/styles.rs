//! Output styles using owo-colors stylesheet pattern

use owo_colors::Style;

/// Centralized stylesheet for CLI output colors.
#[derive(Default, Clone)]
pub struct Styles {
    /// Success messages (green)
    pub success: Style,
    /// Error messages (red)
    pub error: Style,
    /// Progress arrows (cyan)
    pub step: Style,
    /// Dimmed/secondary text
    pub dim: Style,
    /// Headers/section titles
    pub header: Style,
}

impl Styles {
    /// Apply colors to the stylesheet.
    pub fn colorize(&mut self) {
        self.success = Style::new().green();
        self.error = Style::new().red();
        self.step = Style::new().cyan();
        self.dim = Style::new().dimmed();
        self.header = Style::new().bold().cyan();
    }
}
