use serde::{Deserialize, Serialize};

use super::UnroutablePolicy;

/// checkpoint interval used when none is configured
pub const DEFAULT_CHECKPOINT_INTERVAL: usize = 10;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct EvaluationConfig {
    /// trips between checkpoints. when 0, checkpoints are still reported every
    /// [`DEFAULT_CHECKPOINT_INTERVAL`] trips but no log file is written.
    #[serde(default)]
    pub log_interval: usize,
    #[serde(default = "default_log_directory")]
    pub log_directory: String,
    #[serde(default)]
    pub unroutable_policy: UnroutablePolicy,
    /// worker threads. 1 evaluates sequentially.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

impl EvaluationConfig {
    pub fn checkpoint_interval(&self) -> usize {
        match self.log_interval {
            0 => DEFAULT_CHECKPOINT_INTERVAL,
            k => k,
        }
    }

    pub fn writes_log_file(&self) -> bool {
        self.log_interval > 0
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        EvaluationConfig {
            log_interval: 0,
            log_directory: default_log_directory(),
            unroutable_policy: UnroutablePolicy::default(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_log_directory() -> String {
    String::from("logs/crossboro")
}

fn default_parallelism() -> usize {
    1
}
