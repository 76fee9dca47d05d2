//! Translation of parsed EFX into the template IR

pub mod block;
pub mod datetime;
pub mod expr;
pub mod indent;
pub mod label;
pub mod path;

pub use block::TemplateBlockBuilder;
pub use expr::ExpressionTranslator;
pub use label::LabelResolver;

use crate::common::Span;
use crate::types::ValueType;

/// A translated expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translated {
    pub script: String,
    pub ty: ValueType,
    /// Whether the expression may produce more than one value
    pub multi: bool,
}

impl Translated {
    pub fn new(script: impl Into<String>, ty: ValueType) -> Self {
        Self {
            script: script.into(),
            ty,
            multi: false,
        }
    }
}

/// A reference to a variable declared by a template block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableUse {
    pub name: String,
    /// Index of the declaring block
    pub owner: usize,
    pub span: Span,
}

/// Quote a string for the target language; `'` is doubled
pub fn string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
