//! EFX expression lexer

mod scanner;
mod token;

pub use scanner::Lexer;
pub use token::{Token, TokenKind};
