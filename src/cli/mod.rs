//! CLI utilities for ferro-myvariant
//!
//! This module provides testable functions used by the CLI binary.
//! Formatting and input handling live in the library so they can be unit
//! tested without spawning the binary.

pub mod format;

pub use format::{
    flatten_hit, output_error, write_hits, write_json, write_outcome, write_results, write_table,
    OutputFormat, TableMode,
};

use std::io::BufRead;

use crate::error::FerroError;

/// UTF-8 BOM (Byte Order Mark) constant
const UTF8_BOM: &str = "\u{feff}";

/// Strip UTF-8 BOM from the beginning of a string if present.
///
/// # Examples
///
/// ```
/// use ferro_myvariant::cli::strip_bom;
///
/// assert_eq!(strip_bom("\u{feff}rs58991260"), "rs58991260");
/// assert_eq!(strip_bom("rs58991260"), "rs58991260");
/// ```
pub fn strip_bom(s: &str) -> &str {
    s.strip_prefix(UTF8_BOM).unwrap_or(s)
}

/// Strip an inline `#` comment and surrounding whitespace.
///
/// # Examples
///
/// ```
/// use ferro_myvariant::cli::strip_inline_comment;
///
/// assert_eq!(strip_inline_comment("chr1:g.35366C>T  # my note"), "chr1:g.35366C>T");
/// assert_eq!(strip_inline_comment("# full line comment"), "");
/// ```
pub fn strip_inline_comment(s: &str) -> &str {
    match s.find('#') {
        Some(pos) => s[..pos].trim(),
        None => s.trim(),
    }
}

/// Clean one line of an id/term list.
///
/// Returns None if the line is empty or comment-only. The BOM is only
/// looked for on the first line.
///
/// ```
/// use ferro_myvariant::cli::process_input_line;
///
/// assert_eq!(process_input_line("\u{feff}rs2500 # x", true), Some("rs2500"));
/// assert_eq!(process_input_line("   ", false), None);
/// ```
pub fn process_input_line(line: &str, is_first_line: bool) -> Option<&str> {
    let line = line.trim();
    let line = if is_first_line { strip_bom(line) } else { line };
    let line = strip_inline_comment(line);

    if line.is_empty() {
        None
    } else {
        Some(line)
    }
}

/// Lazily read ids or query terms, one per line.
pub fn read_terms<R: BufRead>(reader: R) -> impl Iterator<Item = Result<String, FerroError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| match line {
            Ok(line) => process_input_line(&line, index == 0).map(|t| Ok(t.to_string())),
            Err(e) => Some(Err(FerroError::from(e))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_strip_inline_comment() {
        assert_eq!(strip_inline_comment("rs1  # comment"), "rs1");
        assert_eq!(strip_inline_comment("rs1#comment"), "rs1");
        assert_eq!(strip_inline_comment("  rs1  "), "rs1");
    }

    #[test]
    fn test_process_input_line_bom_only_on_first_line() {
        assert_eq!(process_input_line("\u{feff}rs1", true), Some("rs1"));
        assert_eq!(
            process_input_line("\u{feff}rs1", false),
            Some("\u{feff}rs1")
        );
    }

    #[test]
    fn test_read_terms() {
        let input = "\u{feff}rs58991260\n\n# header\nrs2500 # dup\nrs1433078\n";
        let terms: Vec<String> = read_terms(Cursor::new(input))
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(terms, vec!["rs58991260", "rs2500", "rs1433078"]);
    }
}
