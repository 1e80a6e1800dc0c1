//! tsbuild Driver Library
//!
//! Build pipeline for a TypeScript project compiled by an external `tsc`:
//! settings, dependency-ordered compiler invocation, diagnostic parsing,
//! and the background worker that runs builds off the caller's thread.

pub mod settings;
pub mod compiler;
pub mod pipeline;
pub mod worker;

pub use compiler::{Compiler, CompilerOutput, TscCompiler};
pub use pipeline::{run_build, BuildError, BuildReport};
pub use settings::{Settings, SettingsError, SETTINGS_FILE};
pub use worker::{BuildNotice, BuildWorker, Trigger};
