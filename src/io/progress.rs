//! Progress display for the registration stages of a run

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix:>10}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// One bar per stage, stacked in start order
///
/// Bars draw to stderr, so they never mix with the report on stdout.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    stages: Vec<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressManager {
    /// Create a manager with no stages
    pub fn new() -> Self {
        Self {
            multi_progress: MultiProgress::new(),
            stages: Vec::new(),
        }
    }

    /// Add a bar for a stage of `total` steps, returning its handle
    pub fn start_stage(&mut self, label: &str, total: usize) -> usize {
        let bar = ProgressBar::new(total as u64);
        bar.set_style(STAGE_STYLE.clone());
        bar.set_prefix(label.to_string());
        self.stages.push(self.multi_progress.add(bar));
        self.stages.len() - 1
    }

    /// Record one completed step
    pub fn advance(&self, stage: usize, message: &str) {
        if let Some(bar) = self.stages.get(stage) {
            bar.set_message(message.to_string());
            bar.inc(1);
        }
    }

    /// Steps completed so far in a stage
    pub fn position(&self, stage: usize) -> Option<u64> {
        self.stages.get(stage).map(ProgressBar::position)
    }

    /// Mark a stage complete
    pub fn finish_stage(&self, stage: usize) {
        if let Some(bar) = self.stages.get(stage) {
            bar.finish_with_message("done");
        }
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        let _ = self.multi_progress.clear();
    }
}
