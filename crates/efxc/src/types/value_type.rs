//! Expression value types and source-level type hints

use std::fmt;

use efx_sdk::FieldType;

/// Type of a translated expression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    String,
    Boolean,
    Number,
    Date,
    Time,
    Duration,
    /// A node reference, navigable but without a value of its own
    Node,
}

impl ValueType {
    /// Type of the value read from a field of the given type
    pub fn of_field(field_type: FieldType) -> Self {
        match field_type {
            FieldType::Text | FieldType::Code | FieldType::InternalCode | FieldType::Attribute => {
                ValueType::String
            }
            FieldType::Indicator => ValueType::Boolean,
            FieldType::Number => ValueType::Number,
            FieldType::Date => ValueType::Date,
            FieldType::Time => ValueType::Time,
        }
    }

    /// Whether values of both types can be compared with each other
    pub fn is_comparable_with(self, other: ValueType) -> bool {
        self == other && self != ValueType::Node
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, ValueType::Date | ValueType::Time)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::String => write!(f, "string"),
            ValueType::Boolean => write!(f, "boolean"),
            ValueType::Number => write!(f, "number"),
            ValueType::Date => write!(f, "date"),
            ValueType::Time => write!(f, "time"),
            ValueType::Duration => write!(f, "duration"),
            ValueType::Node => write!(f, "node"),
        }
    }
}

/// Type annotation written on a variable declaration (`text:$x`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeHint {
    Text,
    Code,
    Indicator,
    Number,
    Date,
    Time,
    Duration,
}

impl TypeHint {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "text" => Some(TypeHint::Text),
            "code" => Some(TypeHint::Code),
            "indicator" => Some(TypeHint::Indicator),
            "number" => Some(TypeHint::Number),
            "date" => Some(TypeHint::Date),
            "time" => Some(TypeHint::Time),
            "duration" => Some(TypeHint::Duration),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TypeHint::Text => "text",
            TypeHint::Code => "code",
            TypeHint::Indicator => "indicator",
            TypeHint::Number => "number",
            TypeHint::Date => "date",
            TypeHint::Time => "time",
            TypeHint::Duration => "duration",
        }
    }

    pub fn value_type(self) -> ValueType {
        match self {
            TypeHint::Text | TypeHint::Code => ValueType::String,
            TypeHint::Indicator => ValueType::Boolean,
            TypeHint::Number => ValueType::Number,
            TypeHint::Date => ValueType::Date,
            TypeHint::Time => ValueType::Time,
            TypeHint::Duration => ValueType::Duration,
        }
    }

    /// Hint matching a value type, used for implicit bindings
    pub fn for_value(ty: ValueType) -> Self {
        match ty {
            ValueType::String | ValueType::Node => TypeHint::Text,
            ValueType::Boolean => TypeHint::Indicator,
            ValueType::Number => TypeHint::Number,
            ValueType::Date => TypeHint::Date,
            ValueType::Time => TypeHint::Time,
            ValueType::Duration => TypeHint::Duration,
        }
    }
}

impl fmt::Display for TypeHint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_types() {
        assert_eq!(ValueType::of_field(FieldType::InternalCode), ValueType::String);
        assert_eq!(ValueType::of_field(FieldType::Indicator), ValueType::Boolean);
        assert_eq!(ValueType::of_field(FieldType::Time), ValueType::Time);
    }

    #[test]
    fn test_hint_names() {
        for name in ["text", "code", "indicator", "number", "date", "time", "duration"] {
            let hint = TypeHint::from_name(name).unwrap();
            assert_eq!(hint.name(), name);
        }
        assert_eq!(TypeHint::from_name("measure"), None);
    }

    #[test]
    fn test_code_hint_is_string() {
        assert_eq!(TypeHint::Code.value_type(), ValueType::String);
        assert!(ValueType::Date.is_comparable_with(ValueType::Date));
        assert!(!ValueType::Node.is_comparable_with(ValueType::Node));
        assert!(!ValueType::Number.is_comparable_with(ValueType::String));
    }
}
