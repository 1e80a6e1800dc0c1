//! External TypeScript compiler invocation

use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

/// Captured output of one compiler run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CompilerOutput {
    /// Any stderr output means the build failed
    pub fn failed(&self) -> bool {
        !self.stderr.is_empty()
    }
}

/// Compiles an ordered list of files into one output file.
///
/// Runs synchronously: returns once the compiler has finished and all of
/// its output is captured.
pub trait Compiler: Send {
    fn compile(&self, files: &[PathBuf], output: &Path) -> io::Result<CompilerOutput>;
}

/// `tsc` run through node: `<node> <tsc> --out <output> <files...>`
#[derive(Debug, Clone)]
pub struct TscCompiler {
    node: String,
    tsc: String,
}

impl TscCompiler {
    pub fn new(node: impl Into<String>, tsc: impl Into<String>) -> Self {
        Self {
            node: node.into(),
            tsc: tsc.into(),
        }
    }

    /// The command that would compile `files`
    pub fn command(&self, files: &[PathBuf], output: &Path) -> Command {
        let mut cmd = Command::new(&self.node);
        cmd.arg(&self.tsc).arg("--out").arg(output).args(files);
        cmd
    }
}

impl Compiler for TscCompiler {
    fn compile(&self, files: &[PathBuf], output: &Path) -> io::Result<CompilerOutput> {
        debug!(
            node = %self.node,
            tsc = %self.tsc,
            output = %output.display(),
            files = files.len(),
            "running compiler"
        );

        let result = self.command(files, output).output()?;
        debug!(status = %result.status, stderr_bytes = result.stderr.len(), "compiler finished");

        Ok(CompilerOutput {
            stdout: result.stdout,
            stderr: result.stderr,
        })
    }
}
