//! Dependency graph and compile-order resolution

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

/// Files one source file depends on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDependencyEdge {
    /// Path to the source file
    pub source_file: PathBuf,
    /// Files whose declared types appear in this file, in discovery order.
    /// Never contains `source_file` and never repeats a path.
    pub depends_on: Vec<PathBuf>,
}

impl FileDependencyEdge {
    pub fn new(source_file: PathBuf) -> Self {
        Self {
            source_file,
            depends_on: Vec::new(),
        }
    }

    /// Record a dependency, ignoring self references and repeats
    pub fn add(&mut self, dep: &Path) -> bool {
        if dep == self.source_file || self.depends_on.iter().any(|d| d == dep) {
            return false;
        }
        self.depends_on.push(dep.to_path_buf());
        true
    }
}

/// Traversal mark for one file during a single resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    /// Entered but not yet placed; reaching it again closes a cycle
    InProgress,
    /// Already in the output
    Placed,
}

/// One pending visit on the explicit traversal stack
struct Frame<'g> {
    file: &'g Path,
    deps: &'g [PathBuf],
    next: usize,
}

/// Dependency graph for a source tree
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Source files in walk order
    files: Vec<PathBuf>,
    /// Map from file path to its edge
    edges: HashMap<PathBuf, FileDependencyEdge>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file's edge. Re-adding a file replaces its edge but keeps its
    /// original position in the file order.
    pub fn add_edge(&mut self, edge: FileDependencyEdge) {
        if !self.edges.contains_key(&edge.source_file) {
            self.files.push(edge.source_file.clone());
        }
        self.edges.insert(edge.source_file.clone(), edge);
    }

    /// Get a file's edge
    pub fn edge(&self, path: &Path) -> Option<&FileDependencyEdge> {
        self.edges.get(path)
    }

    /// Dependencies of a file; empty for files outside the graph
    pub fn dependencies(&self, path: &Path) -> &[PathBuf] {
        self.edges
            .get(path)
            .map(|edge| edge.depends_on.as_slice())
            .unwrap_or(&[])
    }

    /// All source files in walk order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Compute a compile order rooted at `file`: every dependency that is
    /// not already being visited comes before its dependent, and `file`
    /// itself comes last.
    ///
    /// Depth-first, post-order, following each edge's discovery order.
    /// Reaching a file that is still in progress breaks the cycle there: that
    /// occurrence is dropped and the file is placed when its own visit ends.
    /// A file with no edge is treated as a leaf.
    pub fn resolve(&self, file: &Path) -> Vec<PathBuf> {
        let mut marks: HashMap<&Path, Mark> = HashMap::new();
        let mut order = Vec::new();
        self.visit(file, &mut marks, &mut order);
        order
    }

    fn visit<'g>(
        &'g self,
        root: &'g Path,
        marks: &mut HashMap<&'g Path, Mark>,
        order: &mut Vec<PathBuf>,
    ) {
        if marks.contains_key(root) {
            return;
        }

        marks.insert(root, Mark::InProgress);
        let mut stack = vec![Frame {
            file: root,
            deps: self.dependencies(root),
            next: 0,
        }];

        while let Some(frame) = stack.last_mut() {
            let deps = frame.deps;
            if let Some(dep) = deps.get(frame.next) {
                frame.next += 1;
                match marks.get(dep.as_path()).copied() {
                    Some(Mark::Placed) => {}
                    Some(Mark::InProgress) => {
                        debug!(
                            from = %frame.file.display(),
                            to = %dep.display(),
                            "dependency cycle broken"
                        );
                    }
                    None => {
                        marks.insert(dep.as_path(), Mark::InProgress);
                        stack.push(Frame {
                            file: dep,
                            deps: self.dependencies(dep),
                            next: 0,
                        });
                    }
                }
                continue;
            }

            let file = frame.file;
            stack.pop();
            marks.insert(file, Mark::Placed);
            trace!(file = %file.display(), position = order.len(), "placed");
            order.push(file.to_path_buf());
        }
    }

    /// Resolve every source file in walk order and concatenate the results,
    /// skipping files that are already present.
    pub fn build_order(&self) -> Vec<PathBuf> {
        let mut placed: HashSet<PathBuf> = HashSet::new();
        let mut order: Vec<PathBuf> = Vec::new();
        for file in &self.files {
            for resolved in self.resolve(file) {
                if placed.insert(resolved.clone()) {
                    order.push(resolved);
                }
            }
        }
        order
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(file: &str, deps: &[&str]) -> FileDependencyEdge {
        let mut edge = FileDependencyEdge::new(PathBuf::from(file));
        for dep in deps {
            edge.add(Path::new(dep));
        }
        edge
    }

    fn graph(edges: Vec<(&str, Vec<&str>)>) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for (file, deps) in edges {
            graph.add_edge(edge(file, &deps));
        }
        graph
    }

    fn paths(names: &[&str]) -> Vec<PathBuf> {
        names.iter().map(PathBuf::from).collect()
    }

    fn position(order: &[PathBuf], name: &str) -> usize {
        order.iter().position(|p| p == Path::new(name)).unwrap()
    }

    #[test]
    fn test_edge_rejects_self_and_repeats() {
        let mut e = FileDependencyEdge::new(PathBuf::from("a.ts"));
        assert!(!e.add(Path::new("a.ts")));
        assert!(e.add(Path::new("b.ts")));
        assert!(!e.add(Path::new("b.ts")));
        assert!(e.add(Path::new("c.ts")));
        assert_eq!(e.depends_on, paths(&["b.ts", "c.ts"]));
    }

    #[test]
    fn test_simple_chain() {
        // c uses b, b uses a
        let g = graph(vec![("a.ts", vec![]), ("b.ts", vec!["a.ts"]), ("c.ts", vec!["b.ts"])]);
        assert_eq!(g.resolve(Path::new("c.ts")), paths(&["a.ts", "b.ts", "c.ts"]));
    }

    #[test]
    fn test_leaf_resolves_to_itself() {
        let g = graph(vec![("a.ts", vec![]), ("b.ts", vec!["a.ts"])]);
        assert_eq!(g.resolve(Path::new("a.ts")), paths(&["a.ts"]));
    }

    #[test]
    fn test_diamond_dependency() {
        // Diamond: d -> b,c; b,c -> a
        let g = graph(vec![
            ("a.ts", vec![]),
            ("b.ts", vec!["a.ts"]),
            ("c.ts", vec!["a.ts"]),
            ("d.ts", vec!["b.ts", "c.ts"]),
        ]);

        let order = g.resolve(Path::new("d.ts"));
        assert_eq!(order, paths(&["a.ts", "b.ts", "c.ts", "d.ts"]));
    }

    #[test]
    fn test_dependency_order_follows_edge_order() {
        let g = graph(vec![("a.ts", vec![]), ("b.ts", vec![]), ("c.ts", vec!["b.ts", "a.ts"])]);
        assert_eq!(g.resolve(Path::new("c.ts")), paths(&["b.ts", "a.ts", "c.ts"]));
    }

    #[test]
    fn test_mutual_cycle_terminates() {
        // a uses b, b uses a
        let g = graph(vec![("a.ts", vec!["b.ts"]), ("b.ts", vec!["a.ts"])]);

        assert_eq!(g.resolve(Path::new("a.ts")), paths(&["b.ts", "a.ts"]));
        assert_eq!(g.resolve(Path::new("b.ts")), paths(&["a.ts", "b.ts"]));
    }

    #[test]
    fn test_longer_cycle_with_tail() {
        // a -> b -> c -> a, c -> d
        let g = graph(vec![
            ("a.ts", vec!["b.ts"]),
            ("b.ts", vec!["c.ts"]),
            ("c.ts", vec!["a.ts", "d.ts"]),
            ("d.ts", vec![]),
        ]);

        let order = g.resolve(Path::new("a.ts"));
        assert_eq!(order, paths(&["d.ts", "c.ts", "b.ts", "a.ts"]));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let g = graph(vec![
            ("a.ts", vec!["b.ts"]),
            ("b.ts", vec!["a.ts", "c.ts"]),
            ("c.ts", vec![]),
        ]);

        let first = g.resolve(Path::new("a.ts"));
        let second = g.resolve(Path::new("a.ts"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_duplicates_and_soundness() {
        let g = graph(vec![
            ("a.ts", vec![]),
            ("b.ts", vec!["a.ts"]),
            ("c.ts", vec!["a.ts", "b.ts"]),
            ("d.ts", vec!["c.ts", "b.ts", "a.ts"]),
            ("e.ts", vec!["d.ts", "a.ts"]),
        ]);

        let order = g.resolve(Path::new("e.ts"));
        assert_eq!(order.len(), 5);
        for file in g.files() {
            let file_idx = position(&order, file.to_str().unwrap());
            for dep in g.dependencies(file) {
                assert!(position(&order, dep.to_str().unwrap()) < file_idx);
            }
        }
    }

    #[test]
    fn test_unknown_file_is_a_leaf() {
        let g = graph(vec![("a.ts", vec![])]);
        assert_eq!(g.resolve(Path::new("other.ts")), paths(&["other.ts"]));
    }

    #[test]
    fn test_build_order_unions_per_file_orders() {
        let g = graph(vec![
            ("main.ts", vec!["shape.ts"]),
            ("shape.ts", vec![]),
            ("circle.ts", vec!["shape.ts"]),
            ("util.ts", vec![]),
        ]);

        assert_eq!(
            g.build_order(),
            paths(&["shape.ts", "main.ts", "circle.ts", "util.ts"])
        );
    }

    #[test]
    fn test_build_order_with_cycle_contains_each_file_once() {
        let g = graph(vec![("a.ts", vec!["b.ts"]), ("b.ts", vec!["a.ts"]), ("c.ts", vec!["a.ts"])]);
        assert_eq!(g.build_order(), paths(&["b.ts", "a.ts", "c.ts"]));
    }

    #[test]
    fn test_add_edge_replaces_in_place() {
        let mut g = graph(vec![("a.ts", vec![]), ("b.ts", vec![])]);
        g.add_edge(edge("a.ts", &["b.ts"]));

        assert_eq!(g.files(), paths(&["a.ts", "b.ts"]).as_slice());
        assert_eq!(g.dependencies(Path::new("a.ts")), paths(&["b.ts"]).as_slice());
        assert_eq!(g.len(), 2);
    }

    #[test]
    fn test_build_order_long_chain() {
        // f0 <- f1 <- ... <- f499, listed dependents first
        let names: Vec<String> = (0..500).map(|i| format!("f{}.ts", i)).collect();
        let mut g = DependencyGraph::new();
        for i in (0..names.len()).rev() {
            let deps: Vec<&str> = if i == 0 { vec![] } else { vec![names[i - 1].as_str()] };
            g.add_edge(edge(&names[i], &deps));
        }

        let order = g.build_order();

        let expected: Vec<PathBuf> = names.iter().map(PathBuf::from).collect();
        assert_eq!(order, expected);
    }
}
