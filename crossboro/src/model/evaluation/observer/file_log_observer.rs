use std::{
    fs::{self, OpenOptions},
    io::Write,
    path::{Path, PathBuf},
};

use crate::model::evaluation::{
    fmt_rmse, Checkpoint, EvaluationError, EvaluationSummary,
};

use super::EvaluationObserver;

/// appends checkpoints to a text log. any log left over from an earlier run
/// with the same name is replaced when the run starts.
#[derive(Clone, Debug)]
pub struct FileLogObserver {
    path: PathBuf,
    header: Vec<String>,
}

impl FileLogObserver {
    /// `header` lines are written once at the top of the log, followed by a blank line
    pub fn new(path: &Path, header: Vec<String>) -> FileLogObserver {
        FileLogObserver {
            path: path.to_path_buf(),
            header,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, lines: &[String]) -> Result<(), EvaluationError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_error(e))?;
        for line in lines.iter() {
            writeln!(file, "{line}").map_err(|e| self.io_error(e))?;
        }
        Ok(())
    }

    fn io_error(&self, e: std::io::Error) -> EvaluationError {
        EvaluationError::ObserverIo {
            path: self.path.clone(),
            message: e.to_string(),
        }
    }
}

impl EvaluationObserver for FileLogObserver {
    fn on_start(&mut self, _total: usize) -> Result<(), EvaluationError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        match fs::remove_file(&self.path) {
            Ok(_) => log::debug!("removed stale log '{}'", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(self.io_error(e)),
        }
        log::info!("logging evaluation to '{}'", self.path.display());
        let mut lines = self.header.clone();
        lines.push(String::new());
        self.append(&lines)
    }

    fn on_checkpoint(&mut self, checkpoint: &Checkpoint) -> Result<(), EvaluationError> {
        self.append(&[format!(
            "idx {}: {}",
            checkpoint.index,
            fmt_rmse(checkpoint.rmse)
        )])
    }

    fn on_complete(&mut self, summary: &EvaluationSummary) -> Result<(), EvaluationError> {
        self.append(&[String::new(), format!("final {summary}")])
    }
}
