//! Resolver session
//!
//! A session owns the dependency graph of one source tree. The tree is
//! scanned the first time the graph is needed and reused by every later
//! resolution; a new session is the only way to pick up changes.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::ScanResult;
use crate::extract::build_graph;
use crate::graph::DependencyGraph;
use crate::scan::{collect_files, read_sources};

/// Scan-once resolver over a source directory
pub struct ResolverSession {
    /// Root of the source tree
    src_root: PathBuf,
    /// Source files in walk order, once collected
    files: Option<Vec<PathBuf>>,
    /// Dependency graph, once built
    graph: Option<DependencyGraph>,
}

impl ResolverSession {
    /// Create a session; nothing is read until the first query
    pub fn new(src_root: impl Into<PathBuf>) -> Self {
        Self {
            src_root: src_root.into(),
            files: None,
            graph: None,
        }
    }

    pub fn src_root(&self) -> &Path {
        &self.src_root
    }

    /// Source files in walk order, enumerated at most once
    pub fn files(&mut self) -> ScanResult<&[PathBuf]> {
        if self.files.is_none() {
            self.files = Some(collect_files(&self.src_root)?);
        }
        Ok(self.files.as_deref().unwrap_or_default())
    }

    /// The dependency graph, built at most once
    pub fn graph(&mut self) -> ScanResult<&DependencyGraph> {
        if self.graph.is_none() {
            let files = self.files()?.to_vec();
            let sources = read_sources(&files)?;
            let graph = build_graph(&sources);
            info!(
                root = %self.src_root.display(),
                files = graph.len(),
                "dependency graph built"
            );
            self.graph = Some(graph);
        }
        Ok(self.graph.get_or_insert_with(DependencyGraph::new))
    }

    /// Compile order rooted at `file`, see [`DependencyGraph::resolve`]
    pub fn resolve(&mut self, file: &Path) -> ScanResult<Vec<PathBuf>> {
        Ok(self.graph()?.resolve(file))
    }

    /// Deduplicated concatenation of every file's compile order
    pub fn build_order(&mut self) -> ScanResult<Vec<PathBuf>> {
        Ok(self.graph()?.build_order())
    }
}
