//! EFX AST definitions

mod expr;
mod template;

pub use expr::*;
pub use template::*;
