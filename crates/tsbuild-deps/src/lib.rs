//! tsbuild dependency resolution
//!
//! Determines a single-pass compilation order for a tree of TypeScript
//! sources. Declarations are found by line scanning, dependencies are
//! inferred from textual occurrence of declared type names, and the
//! order is produced by a cycle-tolerant depth-first traversal
//! (scan → extract → resolve).

pub mod error;
pub mod scan;
pub mod extract;
pub mod graph;
pub mod session;

pub use error::ScanError;
pub use extract::{build_graph, file_dependencies};
pub use graph::{DependencyGraph, FileDependencyEdge};
pub use scan::{SourceFile, TypeDeclaration};
pub use session::ResolverSession;
