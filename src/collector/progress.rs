//! Per-row progress reporting for a collection session

use super::parse::{Reading, Value};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};

/// How a session reports progress
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressMode {
    /// Progress bar with elapsed time and a sample counter
    #[default]
    Bar,
    /// Print every row as it arrives
    Echo,
    /// Report nothing
    Quiet,
}

pub struct SessionProgress {
    mode: ProgressMode,
    bar: ProgressBar,
}

impl SessionProgress {
    pub fn new(mode: ProgressMode, total: usize) -> Self {
        let bar = match mode {
            ProgressMode::Bar => ProgressBar::new(total as u64),
            ProgressMode::Echo | ProgressMode::Quiet => ProgressBar::hidden(),
        };
        bar.set_style(
            ProgressStyle::with_template(
                "{prefix:.bold} [{elapsed_precise}] [ {bar:40.green/dim} ] Sample {pos:>3}/{len:3} ({percent}%)",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
        );
        bar.set_prefix("Collecting");

        Self { mode, bar }
    }

    /// Progress that prints nothing
    pub fn hidden() -> Self {
        Self::new(ProgressMode::Quiet, 0)
    }

    pub fn header(&self, columns: &[String]) {
        if self.mode == ProgressMode::Echo {
            println!("{}", columns.join(", "));
        }
    }

    pub fn row(&self, reading: &Reading) {
        if self.mode == ProgressMode::Echo {
            let text: Vec<String> = reading.values.iter().map(Value::to_string).collect();
            println!("{}", text.join(", "));
        }
        self.bar.inc(1);
    }

    /// Run `f` with the bar cleared so log output does not tear it
    pub fn suspend<F: FnOnce() -> R, R>(&self, f: F) -> R {
        self.bar.suspend(f)
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_mode_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            progress: ProgressMode,
        }

        let parsed: Wrapper = toml::from_str("progress = \"echo\"").unwrap();
        assert_eq!(parsed.progress, ProgressMode::Echo);
        assert_eq!(ProgressMode::default(), ProgressMode::Bar);
    }

    #[test]
    fn test_hidden_progress_counts_rows() {
        let progress = SessionProgress::hidden();
        progress.row(&Reading::new(vec![Value::Integer(1)]));
        progress.row(&Reading::new(vec![Value::Integer(2)]));
        assert_eq!(progress.position(), 2);
        progress.finish();
    }
}
