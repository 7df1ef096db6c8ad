use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// File name of the output document, written at the top of the chosen root.
/// Any walked file with this exact name is excluded from the run.
pub const OUTPUT_FILE_NAME: &str = "output.txt";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProgressEvent {
    Added { path: PathBuf },
    Skipped { path: PathBuf, reason: String },
    Completed { output_path: PathBuf },
}

impl ProgressEvent {
    pub fn path(&self) -> &Path {
        match self {
            ProgressEvent::Added { path } | ProgressEvent::Skipped { path, .. } => path,
            ProgressEvent::Completed { output_path } => output_path,
        }
    }

    /// Log line in the form the progress view shows it.
    pub fn log_line(&self) -> String {
        match self {
            ProgressEvent::Added { path } => format!("Added: {}", path.display()),
            ProgressEvent::Skipped { path, reason } => {
                format!("Skipped {}: {}", path.display(), reason)
            }
            ProgressEvent::Completed { output_path } => {
                format!("All files combined into: {}", output_path.display())
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombineSummary {
    pub root: PathBuf,
    pub output_path: PathBuf,
    pub generated_at: String,
    #[serde(default)]
    pub added_files: u64,
    #[serde(default)]
    pub skipped_files: u64,
    #[serde(default)]
    pub walk_errors: u64,
    #[serde(default)]
    pub bytes_written: u64,
    #[serde(default)]
    pub elapsed_ms: u64,
}
