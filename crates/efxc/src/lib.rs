//! EFX Compiler - EFX expression and template translator
//!
//! This library translates EFX expressions and templates into XPath-based
//! scripts, for SDK 0.7 and every SDK 1.x release.
//!
//! ## Architecture
//!
//! The translator is organized into:
//! - **Frontend** (`frontend/`): lexing, parsing, scopes and lowering of
//!   expressions, labels and template blocks
//! - **IR** (`ir/`): named blocks and dispatches, independent of the target syntax
//! - **Backends** (`backend/`): renderers and per-version rule sets
//! - **Driver** (`driver/`): component selection by SDK version and the pipeline
//! - **Common** (`common/`): shared infrastructure (errors, spans, error sinks)
//! - **Types** (`types/`): value types and type hints
//!
//! ## Example
//!
//! ```
//! use efx_compiler::{ComponentRegistry, FailFast, Translator, TranslatorOptions};
//! use efx_sdk::{FieldInfo, FieldType, NodeInfo, SdkVersion, SymbolTable};
//!
//! let symbols = SymbolTable::new(SdkVersion::new(1, 0))
//!     .with_node(NodeInfo::new("ND-Root", "/*"))?
//!     .with_field(FieldInfo::new("BT-00-Text", FieldType::Text, "/*/PathNode/TextField"))?;
//!
//! let registry = ComponentRegistry::with_defaults();
//! let translator = Translator::new(&symbols, &registry, TranslatorOptions::default())?;
//! let script = translator.translate_template("{BT-00-Text} foo", &mut FailFast)?;
//! assert_eq!(
//!     script,
//!     "let block01() -> { text('foo') }\nfor-each(/*/PathNode/TextField).call(block01())"
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod backend;
pub mod common;
pub mod config;
pub mod driver;
pub mod frontend;
pub mod ir;
pub mod types;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use backend::{CodelistModel, LabelRules, ScriptRenderer, ValueAccess};
pub use common::{
    CollectErrors, DiagnosticReporter, ErrorSink, FailFast, Span, TranslateError, TranslateResult,
};
pub use config::{ConfigError, ErrorMode, NumberFormat, TranslatorOptions};
pub use driver::{ComponentBundle, ComponentRegistry, Translator};
pub use ir::ScriptModule;
