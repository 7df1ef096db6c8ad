use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures that abort a whole run. Per-file read errors are never fatal;
/// they surface as `Skipped` progress events instead.
#[derive(Debug, Error)]
pub enum CombineError {
    #[error("failed to open output document {}", .path.display())]
    OpenOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write output document {}", .path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T, E = CombineError> = std::result::Result<T, E>;
