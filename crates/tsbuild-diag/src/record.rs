//! Diagnostic record types

use std::fmt;

/// One compiler-reported issue
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiagnosticRecord {
    /// File path exactly as reported; may carry surrounding whitespace
    pub source_file: String,
    pub message: String,
    /// 1-based line
    pub line: u32,
    /// 1-based column
    pub column: u32,
}

impl DiagnosticRecord {
    pub fn new(source_file: impl Into<String>, message: impl Into<String>, line: u32, column: u32) -> Self {
        Self {
            source_file: source_file.into(),
            message: message.into(),
            line,
            column,
        }
    }

    /// Reported path with surrounding whitespace removed, for file lookups
    pub fn file_path(&self) -> &str {
        self.source_file.trim()
    }

    /// Short `file: line` label for summary lists
    pub fn location(&self) -> String {
        format!("{}: {}", self.source_file, self.line)
    }

    /// Character offset of this record's position within `text`.
    ///
    /// Returns `None` when the line does not exist. A column past the end
    /// of the line is clamped to the end of the line.
    pub fn char_offset_in(&self, text: &str) -> Option<usize> {
        let line_index = usize::try_from(self.line).ok()?.checked_sub(1)?;
        let column_index = usize::try_from(self.column.max(1)).ok()? - 1;

        let mut offset = 0;
        for (index, line) in text.split_inclusive('\n').enumerate() {
            if index == line_index {
                let content = line.trim_end_matches(['\n', '\r']);
                return Some(offset + column_index.min(content.chars().count()));
            }
            offset += line.chars().count();
        }
        None
    }
}

impl fmt::Display for DiagnosticRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({},{}): {}",
            self.file_path(),
            self.line,
            self.column,
            self.message
        )
    }
}

/// Distinct files named by `records`, trimmed, in first-seen order
pub fn files_with_diagnostics(records: &[DiagnosticRecord]) -> Vec<&str> {
    let mut files: Vec<&str> = Vec::new();
    for record in records {
        let file = record.file_path();
        if !files.contains(&file) {
            files.push(file);
        }
    }
    files
}
