//! Progress spinner using indicatif.

use indicatif::{ProgressBar, ProgressStyle};

/// A progress reporter that wraps an indicatif spinner.
pub struct RunProgress {
    bar: ProgressBar,
}

impl RunProgress {
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(std::time::Duration::from_millis(100));
        Self { bar }
    }

    /// Print a line above the spinner without corrupting it.
    pub fn println(&self, line: impl AsRef<str>) {
        self.bar.println(line);
    }

    /// Finish and clear the spinner.
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    /// Callback closure for `run_engine_bench`.
    pub fn callback(&self) -> impl Fn(&str) + '_ {
        move |msg: &str| {
            self.bar.set_message(msg.to_string());
        }
    }
}
