//! Indentation checks for template lines
//!
//! Depth is the number of indentation units in front of a line. A unit is
//! one tab, or the number of spaces in front of the first indented line.
//! A later line indented by a proper fraction of that unit shows the first
//! indented line skipped levels, and is reported as a jump there.

use crate::common::{Span, TranslateError, TranslateResult};
use crate::frontend::parser::RawLine;

fn describe(c: char) -> &'static str {
    if c == '\t' {
        "tabs"
    } else {
        "spaces"
    }
}

/// Tracks the indentation unit while lines are read in order
#[derive(Debug, Default)]
pub struct IndentTracker {
    /// Indentation character and the number of them making one level
    unit: Option<(char, usize)>,
    /// Line number and indent span of the line the unit was taken from
    unit_origin: Option<(usize, Span)>,
    previous: Option<usize>,
}

impl IndentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Depth of the next line
    pub fn depth(&mut self, raw: &RawLine) -> TranslateResult<usize> {
        let indent = raw.indent.as_str();
        let at = |offset: usize| Span::new(raw.indent_span.start + offset, raw.indent_span.end);

        let Some(previous) = self.previous else {
            if !indent.is_empty() {
                return Err(TranslateError::MalformedIndentation {
                    message: "the first line must not be indented".to_string(),
                    line: raw.line,
                    column: 1,
                    span: at(0),
                });
            }
            self.previous = Some(0);
            return Ok(0);
        };

        let Some(first) = indent.chars().next() else {
            self.previous = Some(0);
            return Ok(0);
        };

        if let Some(offset) = indent.find(|c| c != first) {
            return Err(TranslateError::MixedIndentation {
                message: "tabs and spaces in the same indentation".to_string(),
                line: raw.line,
                column: offset + 1,
                span: at(offset),
            });
        }

        let (unit_char, unit_len) = match self.unit {
            Some(unit) => unit,
            None => {
                let unit = (first, if first == '\t' { 1 } else { indent.len() });
                self.unit = Some(unit);
                self.unit_origin = Some((raw.line, raw.indent_span));
                unit
            }
        };
        if unit_char != first {
            return Err(TranslateError::MixedIndentation {
                message: format!(
                    "indented with {}, but earlier lines use {}",
                    describe(first),
                    describe(unit_char)
                ),
                line: raw.line,
                column: 1,
                span: at(0),
            });
        }

        if indent.len() % unit_len != 0 {
            if let Some(jump) = self.jump_at_unit_origin(indent.len(), unit_len) {
                return Err(jump);
            }
            return Err(TranslateError::MalformedIndentation {
                message: format!(
                    "{} spaces is not a multiple of the {}-space unit",
                    indent.len(),
                    unit_len
                ),
                line: raw.line,
                column: 1,
                span: at(0),
            });
        }

        let depth = indent.len() / unit_len;
        if depth > previous + 1 {
            return Err(TranslateError::IllegalIndentJump {
                depth,
                parent_depth: previous,
                line: raw.line,
                column: (previous + 1) * unit_len + 1,
                span: at((previous + 1) * unit_len),
            });
        }
        self.previous = Some(depth);
        Ok(depth)
    }

    /// The first indented line seen as a jump, when `len` spaces divide its unit
    fn jump_at_unit_origin(&self, len: usize, unit_len: usize) -> Option<TranslateError> {
        let (line, span) = self.unit_origin?;
        if len == 0 || len >= unit_len || unit_len % len != 0 {
            return None;
        }
        Some(TranslateError::IllegalIndentJump {
            depth: unit_len / len,
            parent_depth: 0,
            line,
            column: len + 1,
            span: Span::new(span.start + len, span.end),
        })
    }
}

/// Depth of every line, or the first indentation error
pub fn line_depths(lines: &[RawLine]) -> TranslateResult<Vec<usize>> {
    let mut tracker = IndentTracker::new();
    lines.iter().map(|raw| tracker.depth(raw)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::parser::scan_lines;

    fn depths(source: &str) -> TranslateResult<Vec<usize>> {
        line_depths(&scan_lines(source))
    }

    #[test]
    fn test_tab_depths() {
        assert_eq!(depths("a\n\tb\n\t\tc\n\td\ne").unwrap(), vec![0, 1, 2, 1, 0]);
    }

    #[test]
    fn test_space_unit_from_first_indented_line() {
        assert_eq!(depths("a\n    b\n        c\n    d").unwrap(), vec![0, 1, 2, 1]);
        assert_eq!(depths("a\n  b\n    c").unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_first_line_indented() {
        assert!(matches!(
            depths("\ta\nb"),
            Err(TranslateError::MalformedIndentation { line: 1, column: 1, .. })
        ));
    }

    #[test]
    fn test_mixed_within_indent() {
        assert!(matches!(
            depths("a\n\t  b"),
            Err(TranslateError::MixedIndentation { line: 2, column: 2, .. })
        ));
        assert!(matches!(
            depths("a\n  \tb"),
            Err(TranslateError::MixedIndentation { line: 2, column: 3, .. })
        ));
    }

    #[test]
    fn test_switching_indent_character() {
        assert!(matches!(
            depths("a\n\tb\nc\n  d"),
            Err(TranslateError::MixedIndentation { line: 4, .. })
        ));
    }

    #[test]
    fn test_partial_unit() {
        assert!(matches!(
            depths("a\n    b\n      c"),
            Err(TranslateError::MalformedIndentation { line: 3, .. })
        ));
    }

    #[test]
    fn test_jump_found_through_a_smaller_unit() {
        assert!(matches!(
            depths("a\n        b\n    c"),
            Err(TranslateError::IllegalIndentJump { depth: 2, parent_depth: 0, line: 2, column: 5, .. })
        ));
        assert!(matches!(
            depths("a\n      b\nc\n  d"),
            Err(TranslateError::IllegalIndentJump { depth: 3, parent_depth: 0, line: 2, column: 3, .. })
        ));
        // Not a fraction of the unit
        assert!(matches!(
            depths("a\n        b\n   c"),
            Err(TranslateError::MalformedIndentation { line: 3, .. })
        ));
    }

    #[test]
    fn test_jump() {
        assert!(matches!(
            depths("a\n\t\tb"),
            Err(TranslateError::IllegalIndentJump { depth: 2, parent_depth: 0, line: 2, .. })
        ));
        assert!(matches!(
            depths("a\n  b\n      c"),
            Err(TranslateError::IllegalIndentJump { depth: 3, parent_depth: 1, .. })
        ));
    }

    #[test]
    fn test_blank_and_comment_lines_are_ignored() {
        assert_eq!(depths("a\n\n   \n// note\n\tb").unwrap(), vec![0, 1]);
    }
}
