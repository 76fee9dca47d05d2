//! Symbol resolution against SDK metadata
//!
//! The translator only ever talks to [`SymbolResolver`]. [`SymbolTable`] is
//! the in-memory implementation, filled programmatically or from TOML.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::codelist::Codelist;
use crate::error::{IdentifierKind, SdkError, SdkResult};
use crate::metadata::{FieldInfo, NodeInfo};
use crate::version::SdkVersion;

/// Read-only access to the metadata of one SDK version
///
/// Implementations must be safe to share between translations running on
/// separate threads.
pub trait SymbolResolver: Send + Sync {
    /// The SDK version this metadata describes
    fn sdk_version(&self) -> SdkVersion;

    fn field(&self, id: &str) -> SdkResult<&FieldInfo>;

    fn node(&self, id: &str) -> SdkResult<&NodeInfo>;

    fn codelist(&self, id: &str) -> SdkResult<&Codelist>;

    /// Whether `id` names a known field
    fn is_field(&self, id: &str) -> bool {
        self.field(id).is_ok()
    }

    /// Whether `id` names a known node
    fn is_node(&self, id: &str) -> bool {
        self.node(id).is_ok()
    }
}

/// In-memory symbol table
#[derive(Debug, Clone)]
pub struct SymbolTable {
    sdk: SdkVersion,
    fields: HashMap<String, FieldInfo>,
    nodes: HashMap<String, NodeInfo>,
    codelists: HashMap<String, Codelist>,
}

/// TOML structure for deserializing symbol tables
#[derive(Deserialize)]
#[serde(rename_all = "kebab-case")]
struct TomlSymbolTable {
    sdk_version: String,
    #[serde(default)]
    nodes: Vec<NodeInfo>,
    #[serde(default)]
    fields: Vec<FieldInfo>,
    #[serde(default)]
    codelists: Vec<TomlCodelist>,
}

#[derive(Deserialize)]
struct TomlCodelist {
    id: String,
    #[serde(default)]
    version: String,
    codes: Vec<String>,
}

impl SymbolTable {
    pub fn new(sdk: SdkVersion) -> Self {
        Self {
            sdk,
            fields: HashMap::new(),
            nodes: HashMap::new(),
            codelists: HashMap::new(),
        }
    }

    /// Parse a symbol table from a TOML string
    pub fn from_toml_str(source: &str) -> SdkResult<Self> {
        let raw: TomlSymbolTable = toml::from_str(source)?;
        let sdk = SdkVersion::parse(&raw.sdk_version)?;
        let mut table = Self::new(sdk);

        for node in raw.nodes {
            table.add_node(node)?;
        }
        for field in raw.fields {
            table.add_field(field)?;
        }
        for codelist in raw.codelists {
            table.add_codelist(Codelist::new(codelist.id, codelist.version, sdk, codelist.codes))?;
        }

        table.validate()?;
        Ok(table)
    }

    /// Load a symbol table from a TOML file
    pub fn load(path: impl AsRef<Path>) -> SdkResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn add_field(&mut self, field: FieldInfo) -> SdkResult<()> {
        if !field.xpath.starts_with('/') {
            return Err(SdkError::invalid(&field.id, "field xpath must be absolute"));
        }
        if self.fields.contains_key(&field.id) {
            return Err(SdkError::invalid(&field.id, "field defined twice"));
        }
        self.fields.insert(field.id.clone(), field);
        Ok(())
    }

    pub fn add_node(&mut self, node: NodeInfo) -> SdkResult<()> {
        if !node.xpath.starts_with('/') {
            return Err(SdkError::invalid(&node.id, "node xpath must be absolute"));
        }
        if self.nodes.contains_key(&node.id) {
            return Err(SdkError::invalid(&node.id, "node defined twice"));
        }
        self.nodes.insert(node.id.clone(), node);
        Ok(())
    }

    pub fn add_codelist(&mut self, codelist: Codelist) -> SdkResult<()> {
        if self.codelists.contains_key(&codelist.id) {
            return Err(SdkError::invalid(&codelist.id, "codelist defined twice"));
        }
        self.codelists.insert(codelist.id.clone(), codelist);
        Ok(())
    }

    /// Builder-style variant of [`SymbolTable::add_field`]
    pub fn with_field(mut self, field: FieldInfo) -> SdkResult<Self> {
        self.add_field(field)?;
        Ok(self)
    }

    /// Builder-style variant of [`SymbolTable::add_node`]
    pub fn with_node(mut self, node: NodeInfo) -> SdkResult<Self> {
        self.add_node(node)?;
        Ok(self)
    }

    /// Builder-style variant of [`SymbolTable::add_codelist`]
    pub fn with_codelist(mut self, codelist: Codelist) -> SdkResult<Self> {
        self.add_codelist(codelist)?;
        Ok(self)
    }

    /// Check cross references between fields, nodes and codelists
    pub fn validate(&self) -> SdkResult<()> {
        for field in self.fields.values() {
            if let Some(parent) = &field.parent_node {
                if !self.nodes.contains_key(parent) {
                    return Err(SdkError::invalid(
                        &field.id,
                        format!("parent node '{}' is not defined", parent),
                    ));
                }
            }
            if field.codelist.is_some() && !field.field_type.is_code() {
                return Err(SdkError::invalid(
                    &field.id,
                    "only code fields may reference a codelist",
                ));
            }
        }
        for node in self.nodes.values() {
            if let Some(parent) = &node.parent_node {
                if !self.nodes.contains_key(parent) {
                    return Err(SdkError::invalid(
                        &node.id,
                        format!("parent node '{}' is not defined", parent),
                    ));
                }
            }
        }
        Ok(())
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl SymbolResolver for SymbolTable {
    fn sdk_version(&self) -> SdkVersion {
        self.sdk
    }

    fn field(&self, id: &str) -> SdkResult<&FieldInfo> {
        self.fields
            .get(id)
            .ok_or_else(|| SdkError::unknown(IdentifierKind::Field, id))
    }

    fn node(&self, id: &str) -> SdkResult<&NodeInfo> {
        self.nodes
            .get(id)
            .ok_or_else(|| SdkError::unknown(IdentifierKind::Node, id))
    }

    fn codelist(&self, id: &str) -> SdkResult<&Codelist> {
        self.codelists
            .get(id)
            .ok_or_else(|| SdkError::unknown(IdentifierKind::Codelist, id))
    }
}
