//! Renderers and versioned rule sets
//!
//! The front end lowers templates into the shared IR. Everything that
//! differs between SDK generations lives here:
//! 1. the surface syntax of the generated script ([`ScriptRenderer`])
//! 2. how indirect labels are iterated ([`LabelRules`])
//! 3. how codelists are written ([`CodelistModel`])
//! 4. how iterated field values are read ([`ValueAccess`])

pub mod legacy;
pub mod v1;

use efx_sdk::{Codelist, FieldInfo, SdkVersion};

use crate::common::{TranslateError, TranslateResult};
use crate::frontend::translate::expr::field_value;
use crate::frontend::translate::string_literal;
use crate::ir::{Emission, ScriptModule, TemplateBlock};

pub use legacy::{LegacyLabelRules, LegacyRenderer};
pub use v1::{V1LabelRules, V1Renderer};

/// Trait for script renderers
///
/// A renderer turns a [`ScriptModule`] into the text of one surface syntax.
pub trait ScriptRenderer: Send + Sync {
    /// The name of this renderer (e.g., "v1", "legacy")
    fn name(&self) -> &'static str;

    /// Render the whole module: declarations first, then top-level dispatches
    fn render(&self, module: &ScriptModule) -> String;
}

/// Versioned rules for label resolution
pub trait LabelRules: Send + Sync {
    /// Wrap a `for $item in ... return concat(...)` label expression
    fn wrap_iteration(&self, iteration: String) -> String;

    /// Whether a multi-valued asset id expands into one key per value
    fn supports_asset_id_iteration(&self) -> bool;
}

/// How field values are read where they are iterated over: iterator
/// sources, indirect labels and `$value`
///
/// Values used in comparisons and functions always go through the typed
/// accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueAccess {
    /// Through the typed accessor, e.g. `CodeField/normalize-space(text())`
    #[default]
    Typed,
    /// The node itself, e.g. `CodeField`
    Bare,
}

impl ValueAccess {
    pub fn read(self, path: &str, field: &FieldInfo) -> String {
        match self {
            ValueAccess::Typed => field_value(path, field),
            ValueAccess::Bare => path.to_string(),
        }
    }
}

/// How codelist values are written for one SDK generation
#[derive(Debug, Clone, Copy)]
pub struct CodelistModel {
    /// SDK major version codelists must have been loaded for
    pub sdk_major: u16,
    write: fn(&Codelist) -> String,
}

impl CodelistModel {
    pub const fn new(sdk_major: u16, write: fn(&Codelist) -> String) -> Self {
        Self { sdk_major, write }
    }

    /// SDK 1.x: a parenthesized sequence of quoted codes
    pub const fn v1() -> Self {
        Self::new(1, sequence)
    }

    /// SDK 0.7 writes the same sequence
    pub const fn legacy() -> Self {
        Self::new(0, sequence)
    }

    pub fn supports(&self, version: SdkVersion) -> bool {
        version.major == self.sdk_major
    }

    /// Write a codelist as a sequence of values
    pub fn render(&self, codelist: &Codelist) -> TranslateResult<String> {
        if !self.supports(codelist.sdk) {
            return Err(TranslateError::Metadata {
                message: format!(
                    "codelist '{}' was loaded for SDK {}, expected SDK {}.x",
                    codelist, codelist.sdk, self.sdk_major
                ),
            });
        }
        Ok((self.write)(codelist))
    }
}

fn sequence(codelist: &Codelist) -> String {
    let codes: Vec<String> = codelist.codes.iter().map(|code| string_literal(code)).collect();
    format!("({})", codes.join(", "))
}

/// Emissions of a block, concatenated
pub(crate) fn render_emissions(block: &TemplateBlock) -> String {
    block
        .body
        .iter()
        .map(|emission| match emission {
            Emission::Text(text) => format!("text({})", string_literal(text)),
            Emission::Eval(script) => format!("eval({})", script),
            Emission::Label(key) => format!("label({})", key),
        })
        .collect()
}

/// `{ <head><emissions>\n<dispatch>... }`, or `{ }` for an empty block
pub(crate) fn render_body(head: &str, emissions: &str, dispatches: &[String]) -> String {
    let mut inner = format!("{}{}", head, emissions);
    for dispatch in dispatches {
        if !inner.is_empty() {
            inner.push('\n');
        }
        inner.push_str(dispatch);
    }
    if inner.is_empty() {
        "{ }".to_string()
    } else {
        format!("{{ {} }}", inner)
    }
}
