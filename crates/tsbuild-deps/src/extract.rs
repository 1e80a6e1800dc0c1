//! Dependency extraction
//!
//! A file depends on another file when the text of the first contains the
//! name of a type declared in the second. Matching is plain substring
//! search, so comments and longer identifiers produce dependencies too;
//! build order relies on exactly this behavior.

use tracing::debug;

use crate::graph::{DependencyGraph, FileDependencyEdge};
use crate::scan::{SourceFile, TypeDeclaration};

/// Collect the files `source` depends on.
///
/// Declarations are tested in the order given; each owning file is added
/// the first time one of its declarations matches.
pub fn file_dependencies(source: &SourceFile, declarations: &[TypeDeclaration]) -> FileDependencyEdge {
    let mut edge = FileDependencyEdge::new(source.path.clone());

    for decl in declarations {
        if decl.source_file == source.path {
            continue;
        }
        if edge.depends_on.contains(&decl.source_file) {
            continue;
        }
        if source.text.contains(decl.type_name.as_str()) {
            edge.add(&decl.source_file);
        }
    }

    edge
}

/// Build the full graph: declarations from every file, then one edge per file
pub fn build_graph(sources: &[SourceFile]) -> DependencyGraph {
    let declarations: Vec<TypeDeclaration> =
        sources.iter().flat_map(SourceFile::declarations).collect();
    debug!(
        files = sources.len(),
        declarations = declarations.len(),
        "collected declarations"
    );

    let mut graph = DependencyGraph::new();
    for source in sources {
        let edge = file_dependencies(source, &declarations);
        debug!(
            file = %source.path.display(),
            dependencies = edge.depends_on.len(),
            "extracted dependencies"
        );
        graph.add_edge(edge);
    }
    graph
}
