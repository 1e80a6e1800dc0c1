//! Declaration scanner
//!
//! Walks a source directory and extracts type declarations line by line.
//! This is a deliberately shallow scanner: it recognizes `interface Name`
//! and `class Name` anywhere on a line and nothing else.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use ignore::WalkBuilder;
use regex::Regex;
use tracing::debug;

use crate::error::{ScanError, ScanResult};

/// Source file suffix picked up by the walk.
pub const SOURCE_SUFFIX: &str = ".ts";

/// `interface <Name>` or `class <Name>`, where the name is ASCII letters and
/// digits only (no underscores, no generics). Unanchored, so `subclass Foo`
/// matches as well.
static DECLARATION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(interface|class)\s+([a-zA-Z0-9]+)")
        .expect("DECLARATION_PATTERN regex should compile")
});

/// A named type construct found in a source file
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TypeDeclaration {
    pub type_name: String,
    pub source_file: PathBuf,
}

impl TypeDeclaration {
    pub fn new(type_name: impl Into<String>, source_file: impl Into<PathBuf>) -> Self {
        Self {
            type_name: type_name.into(),
            source_file: source_file.into(),
        }
    }
}

/// A source file loaded into memory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    pub text: String,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    /// Declarations found in this file, in line order
    pub fn declarations(&self) -> Vec<TypeDeclaration> {
        scan_declarations(&self.path, &self.text)
    }
}

/// Enumerate every source file below `root`, depth first, in walk order.
///
/// No filtering besides the suffix: hidden files and ignore files are not
/// honored, and symlinks are not followed. A root that does not exist yields
/// an empty list; any other walk failure aborts the scan.
pub fn collect_files(root: &Path) -> ScanResult<Vec<PathBuf>> {
    if !root.is_dir() {
        debug!(root = %root.display(), "source directory does not exist");
        return Ok(Vec::new());
    }

    let walker = WalkBuilder::new(root)
        .standard_filters(false)
        .follow_links(false)
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| ScanError::Walk {
            root: root.to_path_buf(),
            source,
        })?;

        let is_file = entry.file_type().is_some_and(|t| t.is_file());
        if is_file && has_source_suffix(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    debug!(root = %root.display(), count = files.len(), "collected source files");
    Ok(files)
}

fn has_source_suffix(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(SOURCE_SUFFIX))
}

/// Read every file as UTF-8, stopping at the first failure
pub fn read_sources(files: &[PathBuf]) -> ScanResult<Vec<SourceFile>> {
    files
        .iter()
        .map(|path| {
            fs::read_to_string(path)
                .map(|text| SourceFile::new(path.clone(), text))
                .map_err(|source| ScanError::Read {
                    path: path.clone(),
                    source,
                })
        })
        .collect()
}

/// Extract one declaration per matching line of `text`
pub fn scan_declarations(path: &Path, text: &str) -> Vec<TypeDeclaration> {
    text.lines()
        .filter_map(|line| DECLARATION_PATTERN.captures(line))
        .map(|caps| TypeDeclaration::new(&caps[2], path))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(text: &str) -> Vec<String> {
        scan_declarations(Path::new("a.ts"), text)
            .into_iter()
            .map(|d| d.type_name)
            .collect()
    }

    #[test]
    fn test_interface_and_class() {
        let text = "export interface Shape {\n}\nexport class Circle implements Shape {\n}\n";
        assert_eq!(names(text), vec!["Shape", "Circle"]);
    }

    #[test]
    fn test_one_declaration_per_line() {
        assert_eq!(names("class A {} class B {}"), vec!["A"]);
    }

    #[test]
    fn test_identifier_stops_at_underscore_and_generics() {
        assert_eq!(names("class My_Type {}"), vec!["My"]);
        assert_eq!(names("interface Box<T> {}"), vec!["Box"]);
    }

    #[test]
    fn test_unanchored_match() {
        assert_eq!(names("// a subclass Widget lives here"), vec!["Widget"]);
    }

    #[test]
    fn test_keyword_needs_whitespace_and_name() {
        assert!(names("classify(x);").is_empty());
        assert!(names("class {").is_empty());
        assert!(names("let x = 1;").is_empty());
    }

    #[test]
    fn test_declaration_bound_to_file() {
        let decls = scan_declarations(Path::new("src/shape.ts"), "interface Shape {}");
        assert_eq!(decls, vec![TypeDeclaration::new("Shape", "src/shape.ts")]);
    }

    #[test]
    fn test_collect_files_recurses_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("models").join("deep");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join("main.ts"), "").unwrap();
        fs::write(nested.join("shape.ts"), "").unwrap();
        fs::write(dir.path().join("notes.md"), "").unwrap();
        fs::write(dir.path().join("main.js"), "").unwrap();

        let mut files = collect_files(dir.path()).unwrap();
        files.sort();

        assert_eq!(files, vec![dir.path().join("main.ts"), nested.join("shape.ts")]);
    }

    #[test]
    fn test_collect_files_missing_root_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = collect_files(&dir.path().join("nope")).unwrap();
        assert!(files.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_collect_files_skips_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let target = outside.path().join("shared.ts");
        fs::write(&target, "class Shared {}").unwrap();
        fs::write(dir.path().join("main.ts"), "").unwrap();
        std::os::unix::fs::symlink(&target, dir.path().join("linked.ts")).unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("vendor")).unwrap();

        let files = collect_files(dir.path()).unwrap();

        assert_eq!(files, vec![dir.path().join("main.ts")]);
    }

    #[test]
    fn test_read_sources_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.ts");
        fs::write(&good, "class Good {}").unwrap();
        let missing = dir.path().join("missing.ts");

        let err = read_sources(&[good, missing.clone()]).unwrap_err();
        match err {
            ScanError::Read { path, .. } => assert_eq!(path, missing),
            other => panic!("Expected Read error, got {:?}", other),
        }
    }

    #[test]
    fn test_read_sources_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("bad.ts");
        fs::write(&bad, [0xff, 0xfe, 0x00]).unwrap();

        assert!(matches!(read_sources(&[bad]), Err(ScanError::Read { .. })));
    }
}
