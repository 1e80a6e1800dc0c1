//! Scan error types

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while enumerating or reading the source tree.
///
/// Any of these aborts the whole scan; no partial graph is produced.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("failed to walk source directory {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("failed to read source file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type ScanResult<T> = Result<T, ScanError>;
