//! EFX expression AST nodes

use std::fmt;

use crate::common::Span;

/// An EFX expression
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// The reference this expression consists of, if it is nothing else
    pub fn as_reference(&self) -> Option<&Reference> {
        match &self.kind {
            ExprKind::Reference(reference) => Some(reference),
            ExprKind::Paren(inner) => inner.as_reference(),
            _ => None,
        }
    }
}

/// Expression kinds
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),

    /// Field or node reference: BT-00-Text, /ND-Root, ND-Root::BT-00-Code[pred]
    Reference(Reference),
    /// Variable: $x
    Variable(String),

    /// Binary operation: a == b, a + b, a and b
    Binary {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// Unary minus: -x
    Negate(Box<Expr>),
    /// Logical negation: not(x)
    Not(Box<Expr>),

    /// X is [not] present
    Presence { operand: Box<Expr>, negated: bool },
    /// X is [not] empty
    Emptiness { operand: Box<Expr>, negated: bool },
    /// X [not] in (...)
    Membership {
        operand: Box<Expr>,
        list: ListSource,
        negated: bool,
    },
    /// X [not] like 'regex'
    Like {
        operand: Box<Expr>,
        pattern: String,
        negated: bool,
    },

    /// if c then a else b
    Conditional {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    /// for / some / every with one or more iterators
    Iteration {
        kind: IterationKind,
        iterators: Vec<IteratorDecl>,
        body: Box<Expr>,
    },

    /// Function call: count(x)
    Call { name: String, args: Vec<Expr> },

    /// Sequence: ('a', 'b')
    Sequence(Vec<Expr>),
    /// Parenthesized expression: (a)
    Paren(Box<Expr>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Number(String),
    Boolean(bool),
    Date(String),
    Time(String),
    Duration(String),
}

/// Reference to a field or node
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub target: AssetRef,
    /// Anchored at the document root: /BT-00-Text
    pub absolute: bool,
    /// Context override: ND-Root::BT-00-Text
    pub context: Option<AssetRef>,
    pub predicate: Option<Box<Expr>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetRef {
    pub kind: AssetKind,
    pub id: String,
    pub span: Span,
}

impl AssetRef {
    pub fn field(id: impl Into<String>, span: Span) -> Self {
        Self { kind: AssetKind::Field, id: id.into(), span }
    }

    pub fn node(id: impl Into<String>, span: Span) -> Self {
        Self { kind: AssetKind::Node, id: id.into(), span }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Field,
    Node,
}

/// Right-hand side of a membership test
#[derive(Debug, Clone, PartialEq)]
pub enum ListSource {
    Values(Vec<Expr>),
    Codelist { id: String, span: Span },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterationKind {
    For,
    Some,
    Every,
}

impl IterationKind {
    pub fn keyword(self) -> &'static str {
        match self {
            IterationKind::For => "for",
            IterationKind::Some => "some",
            IterationKind::Every => "every",
        }
    }

    pub fn body_keyword(self) -> &'static str {
        match self {
            IterationKind::For => "return",
            IterationKind::Some | IterationKind::Every => "satisfies",
        }
    }
}

/// Iterator binding: text:$x in BT-00-Text
#[derive(Debug, Clone, PartialEq)]
pub struct IteratorDecl {
    pub hint: String,
    pub name: String,
    pub source: Expr,
    pub span: Span,
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, BinOp::Or | BinOp::And)
    }
}

impl fmt::Display for BinOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            BinOp::Or => "or",
            BinOp::And => "and",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Lt => "<",
            BinOp::LtEq => "<=",
            BinOp::Gt => ">",
            BinOp::GtEq => ">=",
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
        };
        write!(f, "{}", symbol)
    }
}
