//! Diagnostic line parser

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{trace, warn};

use crate::record::DiagnosticRecord;

/// `<file>(<line>,<column>): <message>`
///
/// 1. file: everything up to the first `(`, untrimmed
/// 2. line: ASCII digits
/// 3. column: ASCII digits
/// 4. message: after at least one whitespace character, trailing whitespace excluded
///
/// The search is unanchored, so text before a parenthesis that is not
/// followed by a position is skipped. Trailing whitespace, `\r` included,
/// is never part of the message, so CRLF output gives the same records as
/// LF output.
static DIAGNOSTIC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([^(]*)\(([0-9]+),([0-9]+)\):\s+(.*?)\s*$")
        .expect("DIAGNOSTIC_PATTERN regex should compile")
});

/// Parse raw compiler output into records, one per matching line.
///
/// Lines identical to an earlier line are skipped. Lines that do not
/// match, or whose position does not fit in a `u32`, are dropped without
/// error, so unrecognized output yields an empty list.
pub fn parse(raw: &str) -> Vec<DiagnosticRecord> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut records = Vec::new();

    for line in raw.split('\n') {
        if !seen.insert(line) {
            trace!(line, "duplicate diagnostic line skipped");
            continue;
        }
        if let Some(record) = parse_line(line) {
            records.push(record);
        }
    }

    records
}

/// Parse compiler output bytes, replacing invalid UTF-8
pub fn parse_bytes(raw: &[u8]) -> Vec<DiagnosticRecord> {
    let text = String::from_utf8_lossy(raw);
    if matches!(text, std::borrow::Cow::Owned(_)) {
        warn!("compiler output is not valid UTF-8; invalid sequences replaced");
    }
    parse(&text)
}

fn parse_line(line: &str) -> Option<DiagnosticRecord> {
    let caps = DIAGNOSTIC_PATTERN.captures(line)?;
    let line_number = caps[2].parse().ok()?;
    let column = caps[3].parse().ok()?;
    Some(DiagnosticRecord::new(&caps[1], &caps[4], line_number, column))
}
