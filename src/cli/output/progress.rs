//! Spinner shown on stderr while a long step runs
//!
//! stdout carries only command output, so the spinner always draws to stderr.
//! indicatif hides it automatically when stderr is not a terminal.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
const TICK_INTERVAL: Duration = Duration::from_millis(80);

/// Create a spinner with `message`, ticking on stderr
///
/// # Example
/// ```
/// use rag_review::cli::output::progress::{create_spinner, SpinnerExt};
///
/// let spinner = create_spinner("Generating review");
/// // long running work
/// spinner.finish_success("Review generated");
/// ```
pub fn create_spinner(message: impl Into<String>) -> ProgressBar {
    spinner_with_target(message, ProgressDrawTarget::stderr())
}

/// A spinner that draws nothing, used in JSON mode
pub fn hidden_spinner() -> ProgressBar {
    spinner_with_target("", ProgressDrawTarget::hidden())
}

fn spinner_with_target(message: impl Into<String>, target: ProgressDrawTarget) -> ProgressBar {
    let spinner = ProgressBar::with_draw_target(None, target);
    // The template is a constant; fall back to the default style if it ever
    // stops parsing
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    spinner.set_style(style);
    spinner.set_message(message.into());
    spinner.enable_steady_tick(TICK_INTERVAL);
    spinner
}

/// Finishing helpers for spinners
pub trait SpinnerExt {
    /// Finish with a success message (green check)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);
}

impl SpinnerExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✗ {}", message.into()));
    }
}
