//! Progress display using indicatif
//!
//! One spinner per running task, finished with a check mark and the artifact
//! path once the task completes.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

use crate::domain::models::{TaskOutput, TaskStep};
use crate::services::StepObserver;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate operations
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE) {
        spinner.set_style(style.tick_chars(SPINNER_CHARS));
    }
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (green checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (red X)
    fn finish_error(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✗ {}", message.into()));
    }
}

/// Step observer that renders a spinner per task
pub struct StepProgress {
    current: Mutex<Option<ProgressBar>>,
    hidden: bool,
}

impl StepProgress {
    pub fn new() -> Self {
        Self {
            current: Mutex::new(None),
            hidden: false,
        }
    }

    /// Progress that draws nothing (JSON mode)
    pub fn hidden() -> Self {
        Self {
            current: Mutex::new(None),
            hidden: true,
        }
    }

    /// Mark the running task as failed, if any.
    pub fn fail(&self, message: impl Into<String>) {
        if let Some(spinner) = self.take() {
            spinner.finish_error(message);
        }
    }

    fn take(&self) -> Option<ProgressBar> {
        self.current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
    }
}

impl Default for StepProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl StepObserver for StepProgress {
    fn on_step_started(&self, index: usize, total: usize, step: &TaskStep) {
        let spinner = create_spinner();
        if self.hidden {
            spinner.set_draw_target(ProgressDrawTarget::hidden());
        }
        spinner.set_message(format!(
            "[{}/{}] {} ({})",
            index + 1,
            total,
            step.id,
            step.agent
        ));

        let mut current = self
            .current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(previous) = current.replace(spinner) {
            previous.finish_and_clear();
        }
    }

    fn on_step_completed(&self, index: usize, total: usize, output: &TaskOutput) {
        if let Some(spinner) = self.take() {
            spinner.finish_success(format!(
                "[{}/{}] {} -> {}",
                index + 1,
                total,
                output.task_id,
                output.output_file
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_progress_lifecycle() {
        let progress = StepProgress::hidden();
        let step = TaskStep::new("outline", "d", "e", "writer");
        progress.on_step_started(0, 2, &step);
        assert!(progress.current.lock().unwrap().is_some());

        let output = TaskOutput::new("outline", "writer", "text", "outline.md");
        progress.on_step_completed(0, 2, &output);
        assert!(progress.current.lock().unwrap().is_none());

        progress.on_step_started(1, 2, &step);
        progress.fail("boom");
        assert!(progress.current.lock().unwrap().is_none());
    }
}
