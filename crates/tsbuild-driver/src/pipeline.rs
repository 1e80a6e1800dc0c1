//! Build pipeline: scan → resolve → compile → parse

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};
use tsbuild_deps::{ResolverSession, ScanError};
use tsbuild_diag::DiagnosticRecord;

use crate::compiler::Compiler;
use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error("failed to run compiler: {0}")]
    Spawn(#[source] io::Error),
}

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildReport {
    /// No source files; the compiler was not run
    Skipped,
    /// The compiler wrote nothing to stderr
    Succeeded { files: Vec<PathBuf> },
    /// The compiler wrote to stderr. `diagnostics` holds the lines that
    /// could be parsed and may be empty.
    Failed {
        files: Vec<PathBuf>,
        diagnostics: Vec<DiagnosticRecord>,
    },
}

impl BuildReport {
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// One-line status text
    pub fn status(&self) -> &'static str {
        match self {
            Self::Skipped => "Build skipped",
            Self::Succeeded { .. } => "Build succeeded",
            Self::Failed { .. } => "Build failed",
        }
    }

    /// Files handed to the compiler, in compile order
    pub fn files(&self) -> &[PathBuf] {
        match self {
            Self::Skipped => &[],
            Self::Succeeded { files } | Self::Failed { files, .. } => files,
        }
    }
}

/// Run one full build of the project at `root`
pub fn run_build(root: &Path, settings: &Settings, compiler: &dyn Compiler) -> Result<BuildReport, BuildError> {
    let mut session = ResolverSession::new(settings.src_dir(root));

    if session.files()?.is_empty() {
        debug!(src = %session.src_root().display(), "no source files, nothing to build");
        return Ok(BuildReport::Skipped);
    }

    info!("resolving dependencies");
    let files = session.build_order()?;

    info!(files = files.len(), "compiling sources");
    let output = compiler
        .compile(&files, &settings.out_file(root))
        .map_err(BuildError::Spawn)?;

    if output.failed() {
        let diagnostics = tsbuild_diag::parse_bytes(&output.stderr);
        info!(diagnostics = diagnostics.len(), "build failed");
        Ok(BuildReport::Failed { files, diagnostics })
    } else {
        info!("build succeeded");
        Ok(BuildReport::Succeeded { files })
    }
}
