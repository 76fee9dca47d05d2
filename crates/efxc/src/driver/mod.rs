//! Translation pipeline
//!
//! [`Translator`] ties the pieces together for one SDK version: it picks the
//! versioned components from a [`ComponentRegistry`] and runs the front end
//! and the renderer over a source text.

pub mod registry;

pub use registry::{Capability, ComponentBundle, ComponentRegistry, VersionKey};

use efx_sdk::SymbolResolver;
use tracing::{debug, warn};

use crate::common::{CollectErrors, ErrorSink, FailFast, TranslateError, TranslateResult};
use crate::config::{ErrorMode, TranslatorOptions};
use crate::frontend::parser::parse_expression_input;
use crate::frontend::sema::{Context, ScopeManager};
use crate::frontend::translate::{ExpressionTranslator, LabelResolver, TemplateBlockBuilder};
use crate::ir::ScriptModule;

/// Translator for one SDK version and one set of symbols
pub struct Translator<'a> {
    symbols: &'a dyn SymbolResolver,
    bundle: ComponentBundle,
    options: TranslatorOptions,
}

impl<'a> Translator<'a> {
    /// Select the components for `options.sdk_version`
    pub fn new(
        symbols: &'a dyn SymbolResolver,
        registry: &ComponentRegistry,
        options: TranslatorOptions,
    ) -> TranslateResult<Self> {
        let bundle = registry.bundle(&options.sdk_version)?;
        let loaded = symbols.sdk_version();
        if loaded.major != bundle.version.major {
            warn!(
                requested = %bundle.version,
                symbols = %loaded,
                "symbol table was loaded for a different SDK generation"
            );
        }
        debug!(sdk = %bundle.version, renderer = bundle.renderer.name(), "selected components");
        Ok(Self {
            symbols,
            bundle,
            options,
        })
    }

    pub fn bundle(&self) -> &ComponentBundle {
        &self.bundle
    }

    pub fn options(&self) -> &TranslatorOptions {
        &self.options
    }

    /// An error sink matching the configured error mode
    pub fn error_sink(&self) -> Box<dyn ErrorSink> {
        match self.options.error_mode {
            ErrorMode::FailFast => Box::new(FailFast),
            ErrorMode::Permissive => Box::new(CollectErrors::new()),
        }
    }

    /// Translate `{context} ${expression}` into one target expression
    pub fn translate_expression(&self, source: &str) -> TranslateResult<String> {
        let (context, expr) = parse_expression_input(source)?;
        let mut translator = self.expression_translator();

        let mut scope = ScopeManager::new(Context::root());
        if let Some(decl) = context {
            if let Some(variable) = decl.variables.first() {
                return Err(TranslateError::syntax(
                    "variables can only be declared in templates",
                    variable.span,
                ));
            }
            let (_, context) = translator.translate_context(&decl.reference, &mut scope, true)?;
            scope = ScopeManager::new(context);
        }

        let translated = translator.translate(&expr, &mut scope)?;
        debug!(ty = ?translated.ty, "translated expression");
        Ok(translated.script)
    }

    /// Build the block IR of a template
    pub fn build_template(
        &self,
        source: &str,
        sink: &mut dyn ErrorSink,
    ) -> TranslateResult<ScriptModule> {
        let labels = LabelResolver::new(self.symbols, self.bundle.label_rules.as_ref());
        TemplateBlockBuilder::new(self.expression_translator(), labels).build(source, sink)
    }

    /// Translate a template into script text
    pub fn translate_template(
        &self,
        source: &str,
        sink: &mut dyn ErrorSink,
    ) -> TranslateResult<String> {
        let module = self.build_template(source, sink)?;
        Ok(self.render(&module))
    }

    pub fn render(&self, module: &ScriptModule) -> String {
        self.bundle.renderer.render(module)
    }

    fn expression_translator(&self) -> ExpressionTranslator<'_> {
        ExpressionTranslator::new(self.symbols, &self.bundle.codelists, &self.options)
            .with_value_access(self.bundle.value_access)
    }
}
