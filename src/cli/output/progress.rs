//! Spinners for long-running commands.

use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate operations.
///
/// In JSON mode the spinner is hidden so stdout stays parseable.
pub fn create_spinner(message: impl Into<String>, json_mode: bool) -> ProgressBar {
    if json_mode {
        return ProgressBar::hidden();
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        spinner.set_style(spinner_style.tick_chars(SPINNER_CHARS));
    }
    spinner.set_message(message.into());
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Extension trait for ProgressBar to add common finishing styles
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", style("✓").green(), message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("{} {}", style("✗").red(), message.into()));
    }
}
