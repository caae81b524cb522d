//! Stage progress reporting for pipeline runs

use crate::io::configuration::{PIPELINE_STAGES, PROGRESS_BAR_WIDTH};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Single progress bar over the fixed pipeline stages
///
/// Quiet mode collapses to no output at all; every reporting call becomes a
/// no-op so callers never branch on verbosity.
pub struct StageProgress {
    bar: Option<ProgressBar>,
}

impl StageProgress {
    /// Create a progress display, suppressed entirely when `quiet`
    pub fn new(quiet: bool) -> Self {
        let bar = (!quiet).then(|| {
            let bar = ProgressBar::new(PIPELINE_STAGES as u64);
            bar.set_style(STAGE_STYLE.clone());
            bar
        });

        Self { bar }
    }

    /// Report that a named stage has started
    pub fn stage(&self, message: &'static str) {
        if let Some(ref bar) = self.bar {
            bar.set_message(message);
            bar.inc(1);
        }
    }

    /// Print a warning above the bar without disturbing it
    ///
    /// Quiet runs drop warnings along with the bar.
    pub fn warn(&self, message: &str) {
        if let Some(ref bar) = self.bar {
            bar.println(format!("warning: {message}"));
        }
    }

    /// Complete and clear the display
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.finish_with_message("done");
        }
    }
}
