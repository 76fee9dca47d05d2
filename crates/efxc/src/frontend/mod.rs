//! EFX front end
//!
//! - `lexer`, `parser`: expression tokens and AST, template line scanning
//! - `sema`: scopes, type rules and the function table
//! - `translate`: lowering of expressions, labels and template blocks

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod sema;
pub mod translate;

pub use translate::{ExpressionTranslator, LabelResolver, TemplateBlockBuilder};
