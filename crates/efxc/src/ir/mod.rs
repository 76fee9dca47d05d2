//! Template IR
//!
//! The block builder lowers a template into a [`ScriptModule`]: a flat list
//! of named blocks in depth-first order plus the top-level dispatches. The
//! IR is independent of the target surface syntax; renderers in
//! [`crate::backend`] turn it into text.

use crate::types::TypeHint;

/// A translated template
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScriptModule {
    /// Block declarations in depth-first source order
    pub blocks: Vec<TemplateBlock>,
    /// Dispatches of the top-level blocks, in source order
    pub dispatches: Vec<Dispatch>,
}

impl ScriptModule {
    pub fn block(&self, id: &str) -> Option<&TemplateBlock> {
        self.blocks.iter().find(|block| block.id == id)
    }
}

/// One template line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateBlock {
    /// `block01`, `block0102`, ...
    pub id: String,
    /// Source line the block was built from
    pub line: usize,
    /// Dotted outline number, `None` when not shown
    pub outline: Option<String>,
    pub params: Vec<Param>,
    pub body: Vec<Emission>,
    /// Dispatches to the child blocks
    pub children: Vec<Dispatch>,
}

/// Formal parameter of a block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub hint: TypeHint,
}

/// "For each element at `path`, call `block`"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub path: String,
    pub block: String,
    /// One argument per parameter of the called block, in parameter order
    pub args: Vec<Argument>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    pub name: String,
    pub value: ArgValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// A variable declared by the called block, bound to this expression
    Expression(String),
    /// A variable received from an ancestor and passed on unchanged
    Passthrough,
}

/// One piece of block content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emission {
    /// Literal text, unescaped
    Text(String),
    /// A value expression
    Eval(String),
    /// A label key expression
    Label(String),
}
