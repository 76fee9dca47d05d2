//! EFX template AST nodes

use super::Expr;
use crate::common::Span;

/// One logical template line, after continuation lines have been joined
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLine {
    /// 1-based number of the first physical line
    pub line: usize,
    pub depth: usize,
    pub outline: Option<OutlineOverride>,
    pub context: Option<ContextDecl>,
    pub content: Vec<ContentItem>,
    pub span: Span,
}

/// Explicit outline number written before the context: `2{...}`, `0{...}`, `4.2{...}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineOverride {
    /// `0`: hide this line's annotation
    Suppressed,
    /// Dotted number segments, never empty
    Number(Vec<u32>),
}

/// `{BT-00-Text, text:$x = expr}`
#[derive(Debug, Clone, PartialEq)]
pub struct ContextDecl {
    pub reference: Expr,
    pub variables: Vec<VariableDecl>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariableDecl {
    pub hint: String,
    pub name: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContentItem {
    Text(String),
    /// Whitespace directly after a placeholder
    Whitespace(String),
    /// `${expr}`
    Expression(Expr),
    /// `#{...}` or `#value`
    Label(LabelRef),
    /// `$value`
    ContextValue(Span),
}

/// Label shorthand, split on `|`
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRef {
    pub parts: Vec<LabelPart>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LabelPart {
    Text { value: String, span: Span },
    Expression(Expr),
}

impl LabelPart {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LabelPart::Text { value, .. } => Some(value),
            LabelPart::Expression(_) => None,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            LabelPart::Text { span, .. } => *span,
            LabelPart::Expression(expr) => expr.span,
        }
    }
}
