// 💾 Report Export - Client-side "download" of generated text files
//
// A sink either writes the file somewhere the user can pick it up or
// refuses. A refusal never fails the caller: `deliver_or_skip` logs a
// warning and reports the skip.

use crate::error::ExportError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub trait ReportSink {
    fn deliver(&self, file_name: &str, contents: &str) -> Result<PathBuf, ExportError>;
}

/// Writes reports into a directory that must already exist
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        DirectorySink { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for DirectorySink {
    fn deliver(&self, file_name: &str, contents: &str) -> Result<PathBuf, ExportError> {
        if !self.dir.is_dir() {
            return Err(ExportError::Unavailable(format!(
                "export directory {} does not exist",
                self.dir.display()
            )));
        }

        let path = self.dir.join(file_name);
        fs::write(&path, contents)?;
        Ok(path)
    }
}

/// Sink for environments without a download target
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSink;

impl ReportSink for DisabledSink {
    fn deliver(&self, _file_name: &str, _contents: &str) -> Result<PathBuf, ExportError> {
        Err(ExportError::Unavailable("downloads are disabled".to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Saved(PathBuf),
    Skipped { reason: String },
}

impl Delivery {
    pub fn is_saved(&self) -> bool {
        matches!(self, Delivery::Saved(_))
    }
}

pub fn deliver_or_skip(sink: &dyn ReportSink, file_name: &str, contents: &str) -> Delivery {
    match sink.deliver(file_name, contents) {
        Ok(path) => {
            info!(path = %path.display(), bytes = contents.len(), "report saved");
            Delivery::Saved(path)
        }
        Err(e) => {
            warn!(file = file_name, error = %e, "report download unavailable, skipping");
            Delivery::Skipped {
                reason: e.to_string(),
            }
        }
    }
}
