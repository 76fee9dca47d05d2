//! Field and node metadata

use std::fmt;

use serde::Deserialize;

/// Value type of a field as declared by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    Text,
    Code,
    InternalCode,
    Indicator,
    #[serde(alias = "integer", alias = "amount")]
    Number,
    Date,
    Time,
    Attribute,
}

impl FieldType {
    /// Fields whose value is a code taken from a codelist
    pub fn is_code(self) -> bool {
        matches!(self, FieldType::Code | FieldType::InternalCode)
    }

    /// Fields whose value is compared and rendered as a string
    pub fn is_textual(self) -> bool {
        matches!(
            self,
            FieldType::Text | FieldType::Code | FieldType::InternalCode | FieldType::Attribute
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Text => "text",
            FieldType::Code => "code",
            FieldType::InternalCode => "internal-code",
            FieldType::Indicator => "indicator",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Time => "time",
            FieldType::Attribute => "attribute",
        };
        write!(f, "{}", name)
    }
}

/// How many values a reference can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    #[default]
    Single,
    Multi,
}

impl Cardinality {
    pub fn from_repeatable(repeatable: bool) -> Self {
        if repeatable {
            Cardinality::Multi
        } else {
            Cardinality::Single
        }
    }

    pub fn is_multi(self) -> bool {
        self == Cardinality::Multi
    }
}

/// Metadata for a single field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct FieldInfo {
    pub id: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Absolute navigation path, e.g. `/*/PathNode/TextField`
    pub xpath: String,
    #[serde(default)]
    pub parent_node: Option<String>,
    #[serde(default)]
    pub repeatable: bool,
    /// Attribute name when the value lives in an attribute
    #[serde(default)]
    pub attribute: Option<String>,
    /// Codelist id for code fields
    #[serde(default)]
    pub codelist: Option<String>,
    /// Display pattern for date and time fields, e.g. `dd/MM/yyyy`
    #[serde(default)]
    pub display_pattern: Option<String>,
}

impl FieldInfo {
    pub fn new(id: impl Into<String>, field_type: FieldType, xpath: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            field_type,
            xpath: xpath.into(),
            parent_node: None,
            repeatable: false,
            attribute: None,
            codelist: None,
            display_pattern: None,
        }
    }

    pub fn with_parent_node(mut self, node: impl Into<String>) -> Self {
        self.parent_node = Some(node.into());
        self
    }

    pub fn with_codelist(mut self, codelist: impl Into<String>) -> Self {
        self.codelist = Some(codelist.into());
        self
    }

    pub fn with_display_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.display_pattern = Some(pattern.into());
        self
    }

    pub fn repeatable(mut self, repeatable: bool) -> Self {
        self.repeatable = repeatable;
        self
    }

    pub fn cardinality(&self) -> Cardinality {
        Cardinality::from_repeatable(self.repeatable)
    }

    /// Attribute name, declared or taken from a trailing `@name` step
    pub fn attribute_name(&self) -> Option<&str> {
        if let Some(name) = self.attribute.as_deref() {
            return Some(name);
        }
        let last = self.xpath.rsplit('/').next()?;
        last.strip_prefix('@')
    }

    /// Path of the element that owns the value
    ///
    /// For attribute-valued fields this is the path without the attribute
    /// step, otherwise the field path itself.
    pub fn element_xpath(&self) -> &str {
        match self.attribute_name() {
            Some(name) => self
                .xpath
                .strip_suffix(name)
                .and_then(|p| p.strip_suffix("/@"))
                .unwrap_or(&self.xpath),
            None => &self.xpath,
        }
    }
}

/// Metadata for a node (a repeatable or structural element group)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeInfo {
    pub id: String,
    pub xpath: String,
    #[serde(default)]
    pub parent_node: Option<String>,
    #[serde(default)]
    pub repeatable: bool,
}

impl NodeInfo {
    pub fn new(id: impl Into<String>, xpath: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            xpath: xpath.into(),
            parent_node: None,
            repeatable: false,
        }
    }

    pub fn with_parent_node(mut self, node: impl Into<String>) -> Self {
        self.parent_node = Some(node.into());
        self
    }

    pub fn cardinality(&self) -> Cardinality {
        Cardinality::from_repeatable(self.repeatable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_from_xpath() {
        let field = FieldInfo::new("BT-00-CodeAttribute", FieldType::Code, "/*/PathNode/CodeField/@attribute");
        assert_eq!(field.attribute_name(), Some("attribute"));
        assert_eq!(field.element_xpath(), "/*/PathNode/CodeField");
    }

    #[test]
    fn test_element_field_has_no_attribute() {
        let field = FieldInfo::new("BT-00-Text", FieldType::Text, "/*/PathNode/TextField");
        assert_eq!(field.attribute_name(), None);
        assert_eq!(field.element_xpath(), "/*/PathNode/TextField");
    }

    #[test]
    fn test_cardinality() {
        let field = FieldInfo::new("BT-00-Text", FieldType::Text, "/*/A").repeatable(true);
        assert!(field.cardinality().is_multi());
        assert!(!NodeInfo::new("ND-Root", "/*").cardinality().is_multi());
    }

    #[test]
    fn test_field_type_groups() {
        assert!(FieldType::InternalCode.is_code());
        assert!(FieldType::Attribute.is_textual());
        assert!(!FieldType::Indicator.is_textual());
        assert_eq!(FieldType::InternalCode.to_string(), "internal-code");
    }
}
