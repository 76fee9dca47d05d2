//! Label shorthand resolution
//!
//! A label reference names a translation key made of an asset type, a label
//! type and an asset id, joined with `|`. The resolver fills in whatever the
//! shorthand leaves out from the symbol metadata and the current context,
//! and produces the key-building expression passed to `label(...)`.
//!
//! Codes and indicators are labelled through their value: the key is built
//! once per value the field holds, which makes those labels indirect.

use efx_sdk::{FieldInfo, FieldType, IdentifierKind, SymbolResolver};

use super::expr::ExpressionTranslator;
use super::{path, string_literal};
use crate::backend::{LabelRules, ValueAccess};
use crate::common::{Span, TranslateError, TranslateResult};
use crate::frontend::ast::{LabelPart, LabelRef};
use crate::frontend::sema::{ContextOrigin, ScopeManager};

pub const ASSET_TYPES: [&str; 6] = [
    "field",
    "node",
    "code",
    "indicator",
    "business-term",
    "auxiliary",
];

pub const LABEL_TYPES: [&str; 7] = [
    "name",
    "description",
    "hint",
    "value",
    "when-true",
    "when-false",
    "text",
];

/// Label type standing for "the value of the context field"
const VALUE: &str = "value";

/// `BT-00`, `OPP-123`: a business term rather than a field
pub fn is_business_term(id: &str) -> bool {
    let Some((prefix, digits)) = id.split_once('-') else {
        return false;
    };
    matches!(prefix, "BT" | "OPP" | "OPT" | "OPA" | "OPE")
        && !digits.is_empty()
        && digits.bytes().all(|b| b.is_ascii_digit())
}

/// A piece of a label key
enum KeyPart {
    Literal(String),
    Expression(String),
}

fn literal(value: &str) -> KeyPart {
    KeyPart::Literal(value.to_string())
}

fn concat(parts: &[KeyPart]) -> String {
    let args: Vec<String> = parts
        .iter()
        .map(|part| match part {
            KeyPart::Literal(value) => string_literal(value),
            KeyPart::Expression(script) => script.clone(),
        })
        .collect();
    format!("concat({})", args.join(", "))
}

fn direct_key(asset_type: &str, label_type: &str, asset_id: &str) -> String {
    concat(&[
        literal(asset_type),
        literal("|"),
        literal(label_type),
        literal("|"),
        literal(asset_id),
    ])
}

pub struct LabelResolver<'a> {
    symbols: &'a dyn SymbolResolver,
    rules: &'a dyn LabelRules,
}

impl<'a> LabelResolver<'a> {
    pub fn new(symbols: &'a dyn SymbolResolver, rules: &'a dyn LabelRules) -> Self {
        Self { symbols, rules }
    }

    /// Build the key expression of a label reference
    pub fn resolve(
        &self,
        label: &LabelRef,
        translator: &mut ExpressionTranslator<'_>,
        scope: &mut ScopeManager,
    ) -> TranslateResult<String> {
        match label.parts.as_slice() {
            [asset_type, label_type, asset_id] => {
                let asset_type = self.text_part(asset_type)?;
                let label_type = self.text_part(label_type)?;
                self.qualified(asset_type, label_type, asset_id, translator, scope)
            }
            [label_type, asset_id] => {
                let label_type = self.text_part(label_type)?;
                let asset_id = self.text_part(asset_id)?;
                self.shorthand(label_type, asset_id)
            }
            [only] => {
                let only = self.text_part(only)?;
                self.implicit(only, label.span, translator.value_access(), scope)
            }
            _ => Err(TranslateError::syntax(
                format!("a label has at most three parts, found {}", label.parts.len()),
                label.span,
            )),
        }
    }

    fn text_part<'p>(&self, part: &'p LabelPart) -> TranslateResult<(&'p str, Span)> {
        match part {
            LabelPart::Text { value, span } => Ok((value.as_str(), *span)),
            LabelPart::Expression(expr) => Err(TranslateError::syntax(
                "only the asset id of a label may be an expression",
                expr.span,
            )),
        }
    }

    // ==================== Rule 1: asset|label|id ====================

    fn qualified(
        &self,
        (asset_type, asset_span): (&str, Span),
        (label_type, label_span): (&str, Span),
        asset_id: &LabelPart,
        translator: &mut ExpressionTranslator<'_>,
        scope: &mut ScopeManager,
    ) -> TranslateResult<String> {
        if !ASSET_TYPES.contains(&asset_type) {
            return Err(TranslateError::unsupported_label(
                asset_type,
                "unknown asset type",
                asset_span,
            ));
        }
        check_label_type(label_type, label_span)?;

        let expr = match asset_id {
            LabelPart::Text { value, .. } => {
                return Ok(direct_key(asset_type, label_type, value));
            }
            LabelPart::Expression(expr) => expr,
        };

        let id = translator.translate(expr, scope)?;
        let key = |id: String| {
            concat(&[
                literal(asset_type),
                literal("|"),
                literal(label_type),
                literal("|"),
                KeyPart::Expression(id),
            ])
        };

        if !id.multi {
            return Ok(key(id.script));
        }
        if !self.rules.supports_asset_id_iteration() {
            return Err(TranslateError::unsupported_label(
                asset_type,
                "the asset id must be a single value",
                expr.span,
            ));
        }
        Ok(self.rules.wrap_iteration(format!(
            "for $item in {} return {}",
            id.script,
            key("$item".to_string())
        )))
    }

    // ==================== Rules 2 and 3: label|id ====================

    fn shorthand(
        &self,
        (label_type, label_span): (&str, Span),
        (asset_id, asset_span): (&str, Span),
    ) -> TranslateResult<String> {
        check_label_type(label_type, label_span)?;

        if is_business_term(asset_id) {
            Ok(direct_key("business-term", label_type, asset_id))
        } else if self.symbols.is_field(asset_id) {
            Ok(direct_key("field", label_type, asset_id))
        } else if self.symbols.is_node(asset_id) {
            Ok(direct_key("node", label_type, asset_id))
        } else {
            Err(TranslateError::unknown(IdentifierKind::Field, asset_id, asset_span))
        }
    }

    // ==================== Rule 4: implicit ====================

    fn implicit(
        &self,
        (text, text_span): (&str, Span),
        span: Span,
        access: ValueAccess,
        scope: &ScopeManager,
    ) -> TranslateResult<String> {
        if text == VALUE {
            return self.context_value_label(span, access, scope);
        }

        if let Ok(field) = self.symbols.field(text) {
            return self.field_value_label(field, span, access, scope);
        }
        if self.symbols.is_node(text) {
            return Ok(direct_key("node", "name", text));
        }
        if is_business_term(text) {
            return Err(TranslateError::ambiguous_label(
                text,
                "a business term needs a label type, as in #{name|BT-00}",
                text_span,
            ));
        }

        if LABEL_TYPES.contains(&text) {
            return match &scope.context().origin {
                ContextOrigin::Field(id) => Ok(direct_key("field", text, id)),
                ContextOrigin::Node(id) => Ok(direct_key("node", text, id)),
                ContextOrigin::Root => Err(TranslateError::ambiguous_label(
                    text,
                    "there is no field or node context to label",
                    span,
                )),
            };
        }

        Err(TranslateError::unsupported_label(
            text,
            "not a label type, field, or node",
            text_span,
        ))
    }

    /// `#value`: label of the context field's value
    fn context_value_label(
        &self,
        span: Span,
        access: ValueAccess,
        scope: &ScopeManager,
    ) -> TranslateResult<String> {
        let id = match &scope.context().origin {
            ContextOrigin::Field(id) => id,
            ContextOrigin::Node(id) => {
                return Err(TranslateError::ambiguous_label(
                    VALUE,
                    format!("node '{}' has no value", id),
                    span,
                ));
            }
            ContextOrigin::Root => {
                return Err(TranslateError::ambiguous_label(VALUE, "there is no context field", span));
            }
        };
        let field = self
            .symbols
            .field(id)
            .map_err(|e| TranslateError::from_sdk(e, span))?;

        match field.field_type {
            FieldType::Code | FieldType::InternalCode | FieldType::Indicator => {
                self.indirect(field, access, scope)
            }
            other => Err(TranslateError::unsupported_label(
                VALUE,
                format!("a {} field has no value label", other),
                span,
            )),
        }
    }

    /// `#{BT-00-Code}`: label of a field chosen by its type
    fn field_value_label(
        &self,
        field: &FieldInfo,
        span: Span,
        access: ValueAccess,
        scope: &ScopeManager,
    ) -> TranslateResult<String> {
        match field.field_type {
            FieldType::Code | FieldType::InternalCode | FieldType::Indicator => {
                self.indirect(field, access, scope)
            }
            FieldType::Text => Ok(direct_key("field", "name", &field.id)),
            other => Err(TranslateError::unsupported_label(
                &field.id,
                format!("cannot pick a label for a {} field", other),
                span,
            )),
        }
    }

    /// One key per value of `field`
    fn indirect(
        &self,
        field: &FieldInfo,
        access: ValueAccess,
        scope: &ScopeManager,
    ) -> TranslateResult<String> {
        let values = access.read(&value_path(&scope.context().path, field), field);
        let item = KeyPart::Expression("$item".to_string());

        let key = if field.field_type == FieldType::Indicator {
            concat(&[
                literal("indicator"),
                literal("|"),
                literal("when"),
                literal("-"),
                item,
                literal("|"),
                literal(&field.id),
            ])
        } else {
            let codelist = field.codelist.as_deref().ok_or_else(|| TranslateError::Metadata {
                message: format!("code field '{}' has no codelist", field.id),
            })?;
            concat(&[
                literal("code"),
                literal("|"),
                literal("name"),
                literal("|"),
                literal(codelist),
                literal("."),
                item,
            ])
        };

        Ok(self
            .rules
            .wrap_iteration(format!("for $item in {} return {}", values, key)))
    }
}

fn check_label_type(label_type: &str, span: Span) -> TranslateResult<()> {
    if LABEL_TYPES.contains(&label_type) {
        Ok(())
    } else {
        Err(TranslateError::unsupported_label(
            label_type,
            "unknown label type",
            span,
        ))
    }
}

/// Path to `field` from `context`, staying on the attribute axis when the
/// context is the owning element or one of its attributes
fn value_path(context: &str, field: &FieldInfo) -> String {
    if let Some(attribute) = field.attribute_name() {
        let element = field.element_xpath();
        if context == element {
            return format!("./@{}", attribute);
        }
        if context
            .strip_prefix(element)
            .is_some_and(|rest| rest.starts_with("/@"))
        {
            return format!("../@{}", attribute);
        }
    }
    path::relative_path(context, &field.xpath)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::legacy::LegacyLabelRules;
    use crate::backend::v1::V1LabelRules;
    use crate::backend::CodelistModel;
    use crate::config::TranslatorOptions;
    use crate::frontend::parser::{parse_line, scan_lines};
    use crate::frontend::ast::ContentItem;
    use crate::frontend::sema::Context;
    use crate::test_support::fixture_symbols;
    use pretty_assertions::assert_eq;

    /// Resolve the first label of a one-line template
    fn resolve_with(rules: &dyn LabelRules, source: &str) -> TranslateResult<String> {
        let symbols = fixture_symbols();
        let codelists = CodelistModel::v1();
        let options = TranslatorOptions::default();
        let mut translator = ExpressionTranslator::new(&symbols, &codelists, &options);
        let resolver = LabelResolver::new(&symbols, rules);

        let raw = scan_lines(source).remove(0);
        let line = parse_line(&raw, 0)?;
        let mut scope = ScopeManager::new(Context::root());
        if let Some(context) = &line.context {
            let (_, context) = translator.translate_context(&context.reference, &mut scope, true)?;
            scope.push(context);
        }
        let label = line
            .content
            .iter()
            .find_map(|item| match item {
                ContentItem::Label(label) => Some(label),
                _ => None,
            })
            .unwrap();
        resolver.resolve(label, &mut translator, &mut scope)
    }

    fn resolve(source: &str) -> TranslateResult<String> {
        resolve_with(&V1LabelRules, source)
    }

    fn test(source: &str) -> String {
        resolve(source).unwrap()
    }

    #[test]
    fn test_business_term_ids() {
        assert!(is_business_term("BT-00"));
        assert!(is_business_term("OPP-123"));
        assert!(!is_business_term("BT-00-Text"));
        assert!(!is_business_term("BT-"));
        assert!(!is_business_term("ND-Root"));
    }

    #[test]
    fn test_fully_qualified() {
        assert_eq!(
            test("{BT-00-Text} #{field|name|BT-00-Text}"),
            "concat('field', '|', 'name', '|', 'BT-00-Text')"
        );
        assert_eq!(
            test("{BT-00-Text} #{auxiliary|text|value}"),
            "concat('auxiliary', '|', 'text', '|', 'value')"
        );
    }

    #[test]
    fn test_asset_id_expression() {
        assert_eq!(
            test("{BT-00-Text} #{field|name|${BT-00-Text}}"),
            "concat('field', '|', 'name', '|', ./normalize-space(text()))"
        );
        assert_eq!(
            test("{BT-00-Text} #{field|name|${for text:$t in BT-00-Text return $t}}"),
            "distinct-values(for $item in for $t in ./normalize-space(text()) return $t return concat('field', '|', 'name', '|', $item))"
        );
    }

    #[test]
    fn test_legacy_rejects_multi_valued_asset_id() {
        assert!(matches!(
            resolve_with(
                &LegacyLabelRules,
                "{BT-00-Text} #{field|name|${for text:$t in BT-00-Text return $t}}"
            ),
            Err(TranslateError::UnsupportedLabelType { .. })
        ));
        assert_eq!(
            resolve_with(&LegacyLabelRules, "{BT-00-Text} #{field|name|${BT-00-Text}}").unwrap(),
            "concat('field', '|', 'name', '|', ./normalize-space(text()))"
        );
    }

    #[test]
    fn test_shorthand_forms() {
        assert_eq!(
            test("{BT-00-Text} #{name|BT-00}"),
            "concat('business-term', '|', 'name', '|', 'BT-00')"
        );
        assert_eq!(
            test("{BT-00-Text} #{name|BT-00-Text}"),
            "concat('field', '|', 'name', '|', 'BT-00-Text')"
        );
        assert_eq!(
            test("{BT-00-Text} #{description|ND-Root}"),
            "concat('node', '|', 'description', '|', 'ND-Root')"
        );
        assert!(matches!(
            resolve("{BT-00-Text} #{name|BT-99-Missing}"),
            Err(TranslateError::UnknownIdentifier { .. })
        ));
        assert!(matches!(
            resolve("{BT-00-Text} #{colour|BT-00-Text}"),
            Err(TranslateError::UnsupportedLabelType { .. })
        ));
    }

    #[test]
    fn test_bare_business_term_is_ambiguous() {
        assert!(matches!(
            resolve("{BT-00-Text} #{BT-01}"),
            Err(TranslateError::AmbiguousLabel { .. })
        ));
    }

    #[test]
    fn test_indirect_labels() {
        assert_eq!(
            test("{BT-00-Text} #{BT-00-Indicator}"),
            "distinct-values(for $item in ../IndicatorField return concat('indicator', '|', 'when', '-', $item, '|', 'BT-00-Indicator'))"
        );
        assert_eq!(
            test("{BT-00-Text} #{BT-00-Code}"),
            "distinct-values(for $item in ../CodeField/normalize-space(text()) return concat('code', '|', 'name', '|', 'main-activity', '.', $item))"
        );
        assert_eq!(
            test("{BT-00-Text} #{BT-00-Internal-Code}"),
            "distinct-values(for $item in ../InternalCodeField/normalize-space(text()) return concat('code', '|', 'name', '|', 'main-activity', '.', $item))"
        );
    }

    #[test]
    fn test_legacy_indirect_label_is_not_deduplicated() {
        assert_eq!(
            resolve_with(&LegacyLabelRules, "{BT-00-Text} #{BT-00-Indicator}").unwrap(),
            "for $item in ../IndicatorField return concat('indicator', '|', 'when', '-', $item, '|', 'BT-00-Indicator')"
        );
    }

    #[test]
    fn test_bare_value_access_in_indirect_labels() {
        let symbols = fixture_symbols();
        let codelists = CodelistModel::legacy();
        let options = TranslatorOptions::default();
        let mut translator = ExpressionTranslator::new(&symbols, &codelists, &options)
            .with_value_access(ValueAccess::Bare);
        let resolver = LabelResolver::new(&symbols, &LegacyLabelRules);

        let raw = scan_lines("{BT-00-Text} #{BT-00-Code}").remove(0);
        let line = parse_line(&raw, 0).unwrap();
        let mut scope = ScopeManager::new(Context::root());
        let context = &line.context.as_ref().unwrap().reference;
        let (_, context) = translator.translate_context(context, &mut scope, true).unwrap();
        scope.push(context);
        let Some(ContentItem::Label(label)) = line.content.first() else {
            panic!("expected a label");
        };
        assert_eq!(
            resolver.resolve(label, &mut translator, &mut scope).unwrap(),
            "for $item in ../CodeField return concat('code', '|', 'name', '|', 'main-activity', '.', $item)"
        );
    }

    #[test]
    fn test_attribute_paths_collapse() {
        let expected = |path: &str| {
            format!(
                "distinct-values(for $item in {} return concat('code', '|', 'name', '|', 'main-activity', '.', $item))",
                path
            )
        };
        assert_eq!(test("{BT-00-Text} #{BT-00-CodeAttribute}"), expected("../CodeField/@attribute"));
        assert_eq!(test("{BT-00-CodeAttribute} #{BT-00-CodeAttribute}"), expected("../@attribute"));
        assert_eq!(test("{BT-00-Code} #{BT-00-CodeAttribute}"), expected("./@attribute"));
    }

    #[test]
    fn test_unsupported_field_types() {
        assert!(matches!(
            resolve("{BT-00-Text} #{BT-00-Attribute}"),
            Err(TranslateError::UnsupportedLabelType { .. })
        ));
        assert!(matches!(
            resolve("{BT-00-Text} #{BT-00-Number}"),
            Err(TranslateError::UnsupportedLabelType { .. })
        ));
    }

    #[test]
    fn test_explicit_text_target_is_a_field_label() {
        assert_eq!(
            test("{BT-00-Text} #{BT-00-Text}"),
            "concat('field', '|', 'name', '|', 'BT-00-Text')"
        );
    }

    #[test]
    fn test_label_type_on_context() {
        assert_eq!(
            test("{BT-00-Indicator} #{name}"),
            "concat('field', '|', 'name', '|', 'BT-00-Indicator')"
        );
        assert_eq!(test("{ND-Root} #{name}"), "concat('node', '|', 'name', '|', 'ND-Root')");
        assert!(matches!(
            resolve("{BT-00-Text} #{whatever}"),
            Err(TranslateError::UnsupportedLabelType { .. })
        ));
    }

    #[test]
    fn test_value_shorthand() {
        assert_eq!(
            test("{BT-00-Code} #value"),
            "distinct-values(for $item in ./normalize-space(text()) return concat('code', '|', 'name', '|', 'main-activity', '.', $item))"
        );
        assert!(matches!(
            resolve("{BT-00-Text} #{value}"),
            Err(TranslateError::UnsupportedLabelType { .. })
        ));
        assert!(matches!(
            resolve("{ND-Root} #value"),
            Err(TranslateError::AmbiguousLabel { .. })
        ));
    }

    #[test]
    fn test_expression_outside_asset_id() {
        assert!(matches!(
            resolve("{BT-00-Text} #{${BT-00-Text}|name|value}"),
            Err(TranslateError::Syntax { .. })
        ));
        assert!(matches!(
            resolve("{BT-00-Text} #{a|b|c|d}"),
            Err(TranslateError::Syntax { .. })
        ));
    }
}
