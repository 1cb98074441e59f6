//! Append-only uptime log.
//!
//! Every line is written to the log file and echoed to the console through
//! `tracing`.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// File-backed uptime log.
#[derive(Debug, Clone)]
pub struct LogSink {
    path: PathBuf,
}

impl LogSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Append one newline-terminated line, creating the parent directory if needed.
    pub fn append(&self, line: &str) -> Result<(), SinkError> {
        tracing::info!("{}", line);
        self.write_line(line).map_err(|source| SinkError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn write_line(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        writeln!(file, "{}", line)
    }
}
