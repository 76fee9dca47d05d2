//! EFX parsers: expressions and template lines

mod expr;
mod template;

pub use expr::{parse_expression, ExprParser};
pub use template::{parse_expression_input, parse_line, scan_lines, RawLine};
