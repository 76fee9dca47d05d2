//! Function table
//!
//! Most EFX functions exist under the same name in the target language.
//! The rest are expanded into a composed target expression.

use crate::types::ValueType;

/// How a call is written in the target language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Same arguments, possibly under another name
    Direct(&'static str),
    /// Value constructor: `date(x)` becomes `xs:date(x)`
    Constructor(&'static str),
    /// `format-number(x[, pattern])` with the profile's separators
    FormatNumber,
}

/// Result type of a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Returns {
    Fixed(ValueType),
    /// Same type as the first argument
    FirstArgument,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub target: Target,
    pub min_args: usize,
    /// `None` for variadic functions
    pub max_args: Option<usize>,
    pub returns: Returns,
    /// Whether the result keeps the cardinality of the first argument
    pub keeps_cardinality: bool,
}

const fn direct(name: &'static str, min: usize, max: Option<usize>, returns: Returns) -> FunctionSpec {
    FunctionSpec {
        name,
        target: Target::Direct(name),
        min_args: min,
        max_args: max,
        returns,
        keeps_cardinality: false,
    }
}

const STRING: Returns = Returns::Fixed(ValueType::String);
const NUMBER: Returns = Returns::Fixed(ValueType::Number);
const BOOLEAN: Returns = Returns::Fixed(ValueType::Boolean);

pub static FUNCTIONS: &[FunctionSpec] = &[
    direct("count", 1, Some(1), NUMBER),
    direct("sum", 1, Some(1), NUMBER),
    direct("min", 1, Some(1), Returns::FirstArgument),
    direct("max", 1, Some(1), Returns::FirstArgument),
    direct("string-length", 1, Some(1), NUMBER),
    direct("contains", 2, Some(2), BOOLEAN),
    direct("starts-with", 2, Some(2), BOOLEAN),
    direct("ends-with", 2, Some(2), BOOLEAN),
    direct("substring", 2, Some(3), STRING),
    direct("concat", 1, None, STRING),
    direct("upper-case", 1, Some(1), STRING),
    direct("lower-case", 1, Some(1), STRING),
    direct("string", 1, Some(1), STRING),
    direct("number", 1, Some(1), NUMBER),
    FunctionSpec {
        keeps_cardinality: true,
        ..direct("distinct-values", 1, Some(1), Returns::FirstArgument)
    },
    FunctionSpec {
        target: Target::Constructor("xs:date"),
        ..direct("date", 1, Some(1), Returns::Fixed(ValueType::Date))
    },
    FunctionSpec {
        target: Target::Constructor("xs:time"),
        ..direct("time", 1, Some(1), Returns::Fixed(ValueType::Time))
    },
    FunctionSpec {
        target: Target::Direct("year-from-date"),
        ..direct("year", 1, Some(1), NUMBER)
    },
    FunctionSpec {
        target: Target::Direct("month-from-date"),
        ..direct("month", 1, Some(1), NUMBER)
    },
    FunctionSpec {
        target: Target::Direct("day-from-date"),
        ..direct("day", 1, Some(1), NUMBER)
    },
    FunctionSpec {
        target: Target::FormatNumber,
        ..direct("format-number", 1, Some(2), STRING)
    },
];

pub fn lookup(name: &str) -> Option<&'static FunctionSpec> {
    FUNCTIONS.iter().find(|f| f.name == name)
}

impl FunctionSpec {
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.min_args && self.max_args.is_none_or(|max| count <= max)
    }
}
