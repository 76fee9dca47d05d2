//! EFX expression tokens using logos

use crate::common::Span;
use logos::Logos;
use std::fmt;

/// An EFX token with its kind and source location
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }
}

/// EFX token kinds
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum TokenKind {
    // Keywords - Logic
    #[token("and")]
    And,
    #[token("or")]
    Or,
    #[token("not")]
    Not,

    // Keywords - Predicates
    #[token("is")]
    Is,
    #[token("present")]
    Present,
    #[token("empty")]
    Empty,
    #[token("in")]
    In,
    #[token("like")]
    Like,

    // Keywords - Control
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("for")]
    For,
    #[token("some")]
    Some,
    #[token("every")]
    Every,
    #[token("return")]
    Return,
    #[token("satisfies")]
    Satisfies,

    // Boolean literals, any case
    #[token("true", ignore(ascii_case))]
    True,
    #[token("false", ignore(ascii_case))]
    False,

    // Identifiers of SDK assets
    #[regex(r"(BT|OPP|OPT|OPA|OPE)-[0-9]+(\([a-z]\))?(-[A-Za-z0-9_]+)+", callback = |lex| lex.slice().to_string())]
    FieldId(String),
    #[regex(r"(BT|OPP|OPT|OPA|OPE)-[0-9]+", callback = |lex| lex.slice().to_string())]
    BtId(String),
    #[regex(r"ND-[A-Za-z0-9_-]+", callback = |lex| lex.slice().to_string())]
    NodeId(String),

    // Variables, without the leading `$`
    #[regex(r"\$[A-Za-z_][A-Za-z0-9_]*", callback = |lex| lex.slice()[1..].to_string())]
    Variable(String),

    // Function names, type hints, codelist ids
    #[regex(r"[a-z][a-z0-9]*(-[a-z0-9]+)*", priority = 1, callback = |lex| lex.slice().to_string())]
    Identifier(String),

    // Literals, string contents without the quotes
    #[regex(r"'[^']*'", callback = |lex| unquote(lex.slice()))]
    #[regex(r#""[^"]*""#, callback = |lex| unquote(lex.slice()))]
    StringLiteral(String),
    #[regex(r"[0-9]+(\.[0-9]+)?", callback = |lex| lex.slice().to_string())]
    NumberLiteral(String),
    #[regex(r"[0-9]{4}-[0-9]{2}-[0-9]{2}(Z|[+-][0-9]{2}:[0-9]{2})?", callback = |lex| lex.slice().to_string())]
    DateLiteral(String),
    #[regex(r"[0-9]{2}:[0-9]{2}:[0-9]{2}(Z|[+-][0-9]{2}:[0-9]{2})?", callback = |lex| lex.slice().to_string())]
    TimeLiteral(String),
    #[regex(r"P[0-9]+[YMWD]([0-9]+[YMWD])*(T([0-9]+[HMS])+)?", callback = |lex| lex.slice().to_string())]
    #[regex(r"PT([0-9]+[HMS])+", callback = |lex| lex.slice().to_string())]
    DurationLiteral(String),

    // Operators (longer first)
    #[token("::")]
    ColonColon,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("=")]
    Eq,
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // Delimiters
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    // Punctuation
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // Special
    Eof,
}

fn unquote(slice: &str) -> String {
    slice[1..slice.len() - 1].to_string()
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::And => write!(f, "and"),
            TokenKind::Or => write!(f, "or"),
            TokenKind::Not => write!(f, "not"),
            TokenKind::Is => write!(f, "is"),
            TokenKind::Present => write!(f, "present"),
            TokenKind::Empty => write!(f, "empty"),
            TokenKind::In => write!(f, "in"),
            TokenKind::Like => write!(f, "like"),
            TokenKind::If => write!(f, "if"),
            TokenKind::Then => write!(f, "then"),
            TokenKind::Else => write!(f, "else"),
            TokenKind::For => write!(f, "for"),
            TokenKind::Some => write!(f, "some"),
            TokenKind::Every => write!(f, "every"),
            TokenKind::Return => write!(f, "return"),
            TokenKind::Satisfies => write!(f, "satisfies"),
            TokenKind::True => write!(f, "TRUE"),
            TokenKind::False => write!(f, "FALSE"),

            TokenKind::FieldId(s)
            | TokenKind::BtId(s)
            | TokenKind::NodeId(s)
            | TokenKind::Identifier(s)
            | TokenKind::NumberLiteral(s)
            | TokenKind::DateLiteral(s)
            | TokenKind::TimeLiteral(s)
            | TokenKind::DurationLiteral(s) => write!(f, "{}", s),
            TokenKind::Variable(s) => write!(f, "${}", s),
            TokenKind::StringLiteral(s) => write!(f, "'{}'", s),

            TokenKind::ColonColon => write!(f, "::"),
            TokenKind::EqEq => write!(f, "=="),
            TokenKind::NotEq => write!(f, "!="),
            TokenKind::LtEq => write!(f, "<="),
            TokenKind::GtEq => write!(f, ">="),
            TokenKind::Lt => write!(f, "<"),
            TokenKind::Gt => write!(f, ">"),
            TokenKind::Eq => write!(f, "="),
            TokenKind::Plus => write!(f, "+"),
            TokenKind::Minus => write!(f, "-"),
            TokenKind::Star => write!(f, "*"),
            TokenKind::Slash => write!(f, "/"),
            TokenKind::Percent => write!(f, "%"),

            TokenKind::LParen => write!(f, "("),
            TokenKind::RParen => write!(f, ")"),
            TokenKind::LBracket => write!(f, "["),
            TokenKind::RBracket => write!(f, "]"),

            TokenKind::Comma => write!(f, ","),
            TokenKind::Colon => write!(f, ":"),

            TokenKind::Eof => write!(f, "end of expression"),
        }
    }
}
