//! # tsbuild diagnostics
//!
//! Turns the textual diagnostic output of the TypeScript compiler into
//! structured records. The accepted line format is a fixed external
//! contract:
//!
//! ```text
//! <file-path>(<line>,<column>): <message>
//! ```
//!
//! where `<file-path>` contains no parentheses and `<line>`/`<column>` are
//! 1-based decimal integers.

mod parser;
mod record;

pub use parser::{parse, parse_bytes};
pub use record::{files_with_diagnostics, DiagnosticRecord};
