//! # EFX SDK - eForms metadata for the EFX translator
//!
//! Structural metadata that EFX identifiers resolve against, for one SDK
//! version at a time.
//!
//! ## Features
//!
//! - **Versions**: parsing of SDK version strings (`eforms-sdk-1.0`, `0.7`)
//! - **Fields and nodes**: navigation paths, value types and cardinality
//! - **Codelists**: version-tagged ordered code lists
//! - **Symbols**: the [`SymbolResolver`] capability and an in-memory
//!   [`SymbolTable`] that can be loaded from TOML
//!
//! ## Quick Start
//!
//! ```
//! use efx_sdk::prelude::*;
//!
//! let table = SymbolTable::from_toml_str(r#"
//!     sdk-version = "eforms-sdk-1.0"
//!
//!     [[nodes]]
//!     id = "ND-Root"
//!     xpath = "/*"
//!
//!     [[fields]]
//!     id = "BT-00-Text"
//!     type = "text"
//!     xpath = "/*/PathNode/TextField"
//!     parent-node = "ND-Root"
//! "#).unwrap();
//!
//! let field = table.field("BT-00-Text").unwrap();
//! assert_eq!(field.field_type, FieldType::Text);
//! assert_eq!(field.xpath, "/*/PathNode/TextField");
//! ```

pub mod codelist;
pub mod error;
pub mod metadata;
pub mod symbols;
pub mod version;

pub use codelist::Codelist;
pub use error::{IdentifierKind, SdkError, SdkResult};
pub use metadata::{Cardinality, FieldInfo, FieldType, NodeInfo};
pub use symbols::{SymbolResolver, SymbolTable};
pub use version::SdkVersion;

/// Convenient re-exports for common usage
///
/// ```
/// use efx_sdk::prelude::*;
/// ```
pub mod prelude {
    pub use crate::codelist::Codelist;
    pub use crate::error::{IdentifierKind, SdkError, SdkResult};
    pub use crate::metadata::{Cardinality, FieldInfo, FieldType, NodeInfo};
    pub use crate::symbols::{SymbolResolver, SymbolTable};
    pub use crate::version::SdkVersion;
}
