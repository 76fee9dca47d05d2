//! Expression translation
//!
//! Walks an expression AST and produces the target expression together with
//! its value type and cardinality. Field and node references are turned into
//! navigation paths relative to the innermost scope frame.

use efx_sdk::{FieldInfo, FieldType, IdentifierKind, SymbolResolver};

use super::{datetime, path, string_literal, Translated, VariableUse};
use crate::backend::{CodelistModel, ValueAccess};
use crate::common::{Span, TranslateError, TranslateResult};
use crate::config::TranslatorOptions;
use crate::frontend::ast::*;
use crate::frontend::sema::functions::{self, Returns, Target};
use crate::frontend::sema::types::{arithmetic_result, check_boolean, check_comparison, expect_type};
use crate::frontend::sema::{Binding, Context, ContextOrigin, ScopeManager};
use crate::types::{TypeHint, ValueType};

/// Where a field or node lives
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    pub id: &'a str,
    pub xpath: &'a str,
    pub field: Option<&'a FieldInfo>,
    pub multi: bool,
}

impl Located<'_> {
    pub fn context(&self) -> Context {
        match self.field {
            Some(_) => Context::field(self.id, self.xpath),
            None => Context::node(self.id, self.xpath),
        }
    }
}

/// A reference resolved against the current scope
#[derive(Debug, Clone)]
pub struct ResolvedPath<'a> {
    /// Navigation path including predicates, without a value accessor
    pub path: String,
    pub target: Located<'a>,
}

/// Step that reads the value of a field, `None` when the path itself is the value
pub fn value_accessor(field: &FieldInfo) -> Option<&'static str> {
    if field.attribute_name().is_some() {
        return None;
    }
    match field.field_type {
        FieldType::Text | FieldType::Code | FieldType::InternalCode => {
            Some("normalize-space(text())")
        }
        FieldType::Number => Some("number()"),
        FieldType::Date => Some("xs:date(text())"),
        FieldType::Time => Some("xs:time(text())"),
        FieldType::Indicator | FieldType::Attribute => None,
    }
}

/// Append the value accessor of `field` to `path`
pub fn field_value(path: &str, field: &FieldInfo) -> String {
    match value_accessor(field) {
        Some(accessor) => format!("{}/{}", path, accessor),
        None => path.to_string(),
    }
}

pub struct ExpressionTranslator<'a> {
    symbols: &'a dyn SymbolResolver,
    codelists: &'a CodelistModel,
    options: &'a TranslatorOptions,
    value_access: ValueAccess,
    uses: Vec<VariableUse>,
}

impl<'a> ExpressionTranslator<'a> {
    pub fn new(
        symbols: &'a dyn SymbolResolver,
        codelists: &'a CodelistModel,
        options: &'a TranslatorOptions,
    ) -> Self {
        Self {
            symbols,
            codelists,
            options,
            value_access: ValueAccess::default(),
            uses: Vec::new(),
        }
    }

    /// Read iterated field values with `access`
    pub fn with_value_access(mut self, access: ValueAccess) -> Self {
        self.value_access = access;
        self
    }

    pub fn value_access(&self) -> ValueAccess {
        self.value_access
    }

    pub fn symbols(&self) -> &'a dyn SymbolResolver {
        self.symbols
    }

    /// Variables owned by template blocks that were referenced since the last call
    pub fn take_uses(&mut self) -> Vec<VariableUse> {
        std::mem::take(&mut self.uses)
    }

    /// Forget uses recorded by a translation that failed
    pub fn discard_uses(&mut self) {
        self.uses.clear();
    }

    // ==================== Entry points ====================

    /// Translate an expression in the current scope
    pub fn translate(&mut self, expr: &Expr, scope: &mut ScopeManager) -> TranslateResult<Translated> {
        match &expr.kind {
            ExprKind::Literal(literal) => literal_script(literal, expr.span),
            ExprKind::Reference(reference) => {
                self.translate_reference(reference, ValueAccess::Typed, scope)
            }
            ExprKind::Variable(name) => self.translate_variable(name, expr.span, scope),
            ExprKind::Binary { op, left, right } => {
                self.translate_binary(*op, left, right, expr.span, scope)
            }
            ExprKind::Negate(operand) => {
                let operand = self.translate(operand, scope)?;
                if !matches!(operand.ty, ValueType::Number | ValueType::Duration) {
                    return Err(TranslateError::type_mismatch(
                        format!("cannot negate a {}", operand.ty),
                        expr.span,
                    ));
                }
                Ok(Translated::new(format!("-{}", operand.script), operand.ty))
            }
            ExprKind::Not(operand) => {
                let operand = self.translate(operand, scope)?;
                check_boolean(operand.ty, "not", expr.span)?;
                Ok(Translated::new(format!("not({})", operand.script), ValueType::Boolean))
            }
            ExprKind::Presence { operand, negated } => {
                let Some(reference) = operand.as_reference() else {
                    return Err(TranslateError::type_mismatch(
                        "only field and node references can be tested for presence",
                        operand.span,
                    ));
                };
                let resolved = self.resolve_path(reference, scope)?;
                let script = if *negated {
                    format!("not({})", resolved.path)
                } else {
                    resolved.path
                };
                Ok(Translated::new(script, ValueType::Boolean))
            }
            ExprKind::Emptiness { operand, negated } => {
                let operand = self.translate(operand, scope)?;
                expect_type(ValueType::String, operand.ty, "an emptiness test", expr.span)?;
                let op = if *negated { "!=" } else { "=" };
                Ok(Translated::new(
                    format!("{} {} ''", operand.script, op),
                    ValueType::Boolean,
                ))
            }
            ExprKind::Membership {
                operand,
                list,
                negated,
            } => self.translate_membership(operand, list, *negated, expr.span, scope),
            ExprKind::Like {
                operand,
                pattern,
                negated,
            } => {
                let operand = self.translate(operand, scope)?;
                expect_type(ValueType::String, operand.ty, "a pattern match", expr.span)?;
                let script = format!("matches({}, {})", operand.script, string_literal(pattern));
                Ok(Translated::new(negate_if(script, *negated), ValueType::Boolean))
            }
            ExprKind::Conditional {
                condition,
                then_branch,
                else_branch,
            } => {
                let condition_span = condition.span;
                let condition = self.translate(condition, scope)?;
                check_boolean(condition.ty, "a condition", condition_span)?;
                let then_branch = self.translate(then_branch, scope)?;
                let else_branch = self.translate(else_branch, scope)?;
                if then_branch.ty != else_branch.ty {
                    return Err(TranslateError::type_mismatch(
                        format!(
                            "conditional branches differ: {} and {}",
                            then_branch.ty, else_branch.ty
                        ),
                        expr.span,
                    ));
                }
                Ok(Translated {
                    script: format!(
                        "(if ({}) then {} else {})",
                        condition.script, then_branch.script, else_branch.script
                    ),
                    ty: then_branch.ty,
                    multi: then_branch.multi || else_branch.multi,
                })
            }
            ExprKind::Iteration {
                kind,
                iterators,
                body,
            } => {
                // The frame must go even when the body fails
                let context = scope.context().clone();
                scope.push(context);
                let result = self.translate_iteration(*kind, iterators, body, scope);
                scope.pop();
                result
            }
            ExprKind::Call { name, args } => self.translate_call(name, args, expr.span, scope),
            ExprKind::Sequence(items) => self.translate_sequence(items, scope),
            ExprKind::Paren(inner) => {
                let inner = self.translate(inner, scope)?;
                Ok(Translated {
                    script: format!("({})", inner.script),
                    ..inner
                })
            }
        }
    }

    /// Translate an expression that is rendered as a value
    ///
    /// A lone reference to a repeatable field is deduplicated, and a lone
    /// date or time reference is formatted with its display pattern.
    pub fn translate_value(
        &mut self,
        expr: &Expr,
        scope: &mut ScopeManager,
    ) -> TranslateResult<Translated> {
        let translated = self.translate(expr, scope)?;
        let field = match expr.as_reference() {
            Some(reference) if reference.target.kind == AssetKind::Field => self
                .symbols
                .field(&reference.target.id)
                .map_err(|e| TranslateError::from_sdk(e, reference.target.span))?,
            _ => return Ok(translated),
        };
        self.render_value(translated, field)
    }

    /// `$value`: the value of the context field
    pub fn context_value(&mut self, scope: &ScopeManager, span: Span) -> TranslateResult<Translated> {
        let field = self.context_field(scope, span)?;
        Ok(Translated::new(
            self.value_access.read(".", field),
            ValueType::of_field(field.field_type),
        ))
    }

    /// `$value` rendered as content
    pub fn context_value_rendered(
        &mut self,
        scope: &ScopeManager,
        span: Span,
    ) -> TranslateResult<Translated> {
        let field = self.context_field(scope, span)?;
        let value = self.context_value(scope, span)?;
        // The context is a single element, whatever the field cardinality
        self.render_value(value, field)
    }

    fn context_field(&self, scope: &ScopeManager, span: Span) -> TranslateResult<&'a FieldInfo> {
        match &scope.context().origin {
            ContextOrigin::Field(id) => self
                .symbols
                .field(id)
                .map_err(|e| TranslateError::from_sdk(e, span)),
            ContextOrigin::Node(id) => Err(TranslateError::type_mismatch(
                format!("$value needs a field context, but the context is node '{}'", id),
                span,
            )),
            ContextOrigin::Root => Err(TranslateError::type_mismatch(
                "$value needs a field context",
                span,
            )),
        }
    }

    fn render_value(&self, value: Translated, field: &FieldInfo) -> TranslateResult<Translated> {
        let mut value = value;
        if value.multi {
            value.script = format!("distinct-values({})", value.script);
        }

        let (function, pattern) = match field.field_type {
            FieldType::Date => ("format-date", &self.options.date_pattern),
            FieldType::Time => ("format-time", &self.options.time_pattern),
            _ => return Ok(value),
        };
        let pattern = field.display_pattern.as_ref().unwrap_or(pattern);
        let picture = datetime::picture_string(pattern)?;
        Ok(Translated {
            script: format!(
                "for $item in {} return {}($item, {})",
                value.script,
                function,
                string_literal(&picture)
            ),
            ty: ValueType::String,
            multi: value.multi,
        })
    }

    /// Resolve the context declaration of a template line
    ///
    /// Returns the dispatch path (relative to the current context, or
    /// absolute when `absolute` is set) and the new context.
    pub fn translate_context(
        &mut self,
        expr: &Expr,
        scope: &mut ScopeManager,
        absolute: bool,
    ) -> TranslateResult<(String, Context)> {
        let Some(reference) = expr.as_reference() else {
            return Err(TranslateError::syntax(
                "a context must be a field or node reference",
                expr.span,
            ));
        };

        let resolved = if absolute && !reference.absolute && reference.context.is_none() {
            let anchored = Reference {
                absolute: true,
                ..reference.clone()
            };
            self.resolve_path(&anchored, scope)?
        } else {
            self.resolve_path(reference, scope)?
        };
        let context = resolved.target.context();
        Ok((resolved.path, context))
    }

    // ==================== References ====================

    /// Look up a field or node
    pub fn locate(&self, asset: &AssetRef) -> TranslateResult<Located<'a>> {
        match asset.kind {
            AssetKind::Field => {
                let field = self
                    .symbols
                    .field(&asset.id)
                    .map_err(|e| TranslateError::from_sdk(e, asset.span))?;
                Ok(Located {
                    id: &field.id,
                    xpath: &field.xpath,
                    field: Some(field),
                    multi: field.cardinality().is_multi(),
                })
            }
            AssetKind::Node => {
                let node = self
                    .symbols
                    .node(&asset.id)
                    .map_err(|e| TranslateError::from_sdk(e, asset.span))?;
                Ok(Located {
                    id: &node.id,
                    xpath: &node.xpath,
                    field: None,
                    multi: node.cardinality().is_multi(),
                })
            }
        }
    }

    /// Navigation path of a reference, predicates included
    pub fn resolve_path(
        &mut self,
        reference: &Reference,
        scope: &mut ScopeManager,
    ) -> TranslateResult<ResolvedPath<'a>> {
        let target = self.locate(&reference.target)?;

        let mut path = if reference.absolute {
            target.xpath.to_string()
        } else if let Some(context) = &reference.context {
            let context = self.locate(context)?;
            let prefix = path::relative_path(&scope.context().path, context.xpath);
            path::join(&prefix, &path::relative_path(context.xpath, target.xpath))
        } else {
            path::relative_path(&scope.context().path, target.xpath)
        };

        if let Some(predicate) = &reference.predicate {
            // Inside the brackets the context is the referenced element
            scope.push(target.context());
            let result = self.translate(predicate, scope);
            scope.pop();
            path.push_str(&format!("[{}]", result?.script));
        }

        Ok(ResolvedPath { path, target })
    }

    fn translate_reference(
        &mut self,
        reference: &Reference,
        access: ValueAccess,
        scope: &mut ScopeManager,
    ) -> TranslateResult<Translated> {
        let resolved = self.resolve_path(reference, scope)?;
        let target = resolved.target;
        Ok(match target.field {
            Some(field) => Translated {
                script: access.read(&resolved.path, field),
                ty: ValueType::of_field(field.field_type),
                multi: target.multi,
            },
            None => Translated {
                script: resolved.path,
                ty: ValueType::Node,
                multi: target.multi,
            },
        })
    }

    fn translate_variable(
        &mut self,
        name: &str,
        span: Span,
        scope: &mut ScopeManager,
    ) -> TranslateResult<Translated> {
        if name == "value" {
            return self.context_value(scope, span);
        }
        let resolution = scope.resolve(name, span)?;
        if let Some(owner) = resolution.owner {
            self.uses.push(VariableUse {
                name: name.to_string(),
                owner,
                span,
            });
        }
        Ok(Translated {
            script: format!("${}", name),
            ty: resolution.binding.hint.value_type(),
            multi: resolution.binding.multi,
        })
    }

    // ==================== Operators ====================

    fn translate_binary(
        &mut self,
        op: BinOp,
        left: &Expr,
        right: &Expr,
        span: Span,
        scope: &mut ScopeManager,
    ) -> TranslateResult<Translated> {
        let left_span = left.span;
        let right_span = right.span;
        let left = self.translate(left, scope)?;
        let right = self.translate(right, scope)?;

        let (symbol, ty) = match op {
            BinOp::Or | BinOp::And => {
                check_boolean(left.ty, &op.to_string(), left_span)?;
                check_boolean(right.ty, &op.to_string(), right_span)?;
                (if op == BinOp::Or { "or" } else { "and" }, ValueType::Boolean)
            }
            BinOp::Eq | BinOp::NotEq | BinOp::Lt | BinOp::LtEq | BinOp::Gt | BinOp::GtEq => {
                check_comparison(op, left.ty, right.ty, span)?;
                (comparison_symbol(op), ValueType::Boolean)
            }
            BinOp::Add | BinOp::Sub | BinOp::Mul | BinOp::Div | BinOp::Mod => {
                let ty = arithmetic_result(op, left.ty, right.ty, span)?;
                (arithmetic_symbol(op), ty)
            }
        };

        Ok(Translated::new(
            format!("{} {} {}", left.script, symbol, right.script),
            ty,
        ))
    }

    fn translate_membership(
        &mut self,
        operand: &Expr,
        list: &ListSource,
        negated: bool,
        span: Span,
        scope: &mut ScopeManager,
    ) -> TranslateResult<Translated> {
        let operand = self.translate(operand, scope)?;
        let values = match list {
            ListSource::Values(values) => {
                let mut scripts = Vec::with_capacity(values.len());
                for value in values {
                    let translated = self.translate(value, scope)?;
                    check_comparison(BinOp::Eq, operand.ty, translated.ty, value.span)?;
                    scripts.push(translated.script);
                }
                format!("({})", scripts.join(", "))
            }
            ListSource::Codelist { id, span: list_span } => {
                expect_type(ValueType::String, operand.ty, "a codelist test", span)?;
                let codelist = self
                    .symbols
                    .codelist(id)
                    .map_err(|e| TranslateError::from_sdk(e, *list_span))?;
                self.codelists.render(codelist)?
            }
        };
        let script = format!("{} = {}", operand.script, values);
        Ok(Translated::new(negate_if(script, negated), ValueType::Boolean))
    }

    fn translate_iteration(
        &mut self,
        kind: IterationKind,
        iterators: &[IteratorDecl],
        body: &Expr,
        scope: &mut ScopeManager,
    ) -> TranslateResult<Translated> {
        let mut clauses = Vec::with_capacity(iterators.len());
        for iterator in iterators {
            let hint = TypeHint::from_name(&iterator.hint).ok_or_else(|| {
                TranslateError::syntax(format!("unknown type '{}'", iterator.hint), iterator.span)
            })?;
            let source = match iterator.source.as_reference() {
                Some(reference) => self.translate_reference(reference, self.value_access, scope)?,
                None => self.translate(&iterator.source, scope)?,
            };
            expect_type(hint.value_type(), source.ty, "the iterator", iterator.source.span)?;
            let binding = Binding {
                hint,
                source: source.script.clone(),
                multi: false,
            };
            scope.declare(&iterator.name, binding, iterator.span)?;
            clauses.push(format!("${} in {}", iterator.name, source.script));
        }

        let body_span = body.span;
        let body = self.translate(body, scope)?;
        let (ty, multi) = match kind {
            IterationKind::For => (body.ty, true),
            IterationKind::Some | IterationKind::Every => {
                check_boolean(body.ty, kind.body_keyword(), body_span)?;
                (ValueType::Boolean, false)
            }
        };

        Ok(Translated {
            script: format!(
                "{} {} {} {}",
                kind.keyword(),
                clauses.join(", "),
                kind.body_keyword(),
                body.script
            ),
            ty,
            multi,
        })
    }

    fn translate_sequence(
        &mut self,
        items: &[Expr],
        scope: &mut ScopeManager,
    ) -> TranslateResult<Translated> {
        let mut scripts = Vec::with_capacity(items.len());
        let mut ty = None;
        for item in items {
            let translated = self.translate(item, scope)?;
            match ty {
                None => ty = Some(translated.ty),
                Some(expected) => expect_type(expected, translated.ty, "a sequence item", item.span)?,
            }
            scripts.push(translated.script);
        }
        Ok(Translated {
            script: format!("({})", scripts.join(", ")),
            ty: ty.unwrap_or(ValueType::String),
            multi: true,
        })
    }

    fn translate_call(
        &mut self,
        name: &str,
        args: &[Expr],
        span: Span,
        scope: &mut ScopeManager,
    ) -> TranslateResult<Translated> {
        let spec = functions::lookup(name)
            .ok_or_else(|| TranslateError::unsupported_operator(name, span))?;
        if !spec.accepts(args.len()) {
            return Err(TranslateError::syntax(
                format!("wrong number of arguments for '{}'", name),
                span,
            ));
        }

        // format-number takes its pattern as a literal
        if spec.target == Target::FormatNumber {
            return self.translate_format_number(args, scope);
        }

        let mut translated = Vec::with_capacity(args.len());
        for arg in args {
            translated.push(self.translate(arg, scope)?);
        }
        let first = &translated[0];
        let ty = match spec.returns {
            Returns::Fixed(ty) => ty,
            Returns::FirstArgument => first.ty,
        };
        let multi = spec.keeps_cardinality && first.multi;

        let scripts: Vec<&str> = translated.iter().map(|t| t.script.as_str()).collect();
        let script = match spec.target {
            Target::Direct(target) => {
                if target.ends_with("-from-date") {
                    expect_type(ValueType::Date, first.ty, name, args[0].span)?;
                }
                format!("{}({})", target, scripts.join(", "))
            }
            Target::Constructor(constructor) => {
                format!("{}({})", constructor, scripts[0])
            }
            Target::FormatNumber => format!("format-number({})", scripts.join(", ")),
        };
        Ok(Translated { script, ty, multi })
    }

    fn translate_format_number(
        &mut self,
        args: &[Expr],
        scope: &mut ScopeManager,
    ) -> TranslateResult<Translated> {
        let value = self.translate(&args[0], scope)?;
        expect_type(ValueType::Number, value.ty, "format-number", args[0].span)?;

        let format = &self.options.number_format;
        let pattern = match args.get(1) {
            None => format.default_pattern.clone(),
            Some(Expr {
                kind: ExprKind::Literal(Literal::String(pattern)),
                ..
            }) => pattern.clone(),
            Some(other) => {
                return Err(TranslateError::syntax(
                    "the format-number pattern must be a string literal",
                    other.span,
                ));
            }
        };
        Ok(Translated::new(
            format!(
                "format-number({}, {})",
                value.script,
                string_literal(&format.localize(&pattern))
            ),
            ValueType::String,
        ))
    }
}

fn negate_if(script: String, negated: bool) -> String {
    if negated {
        format!("not({})", script)
    } else {
        script
    }
}

fn comparison_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Eq => "=",
        BinOp::NotEq => "!=",
        BinOp::Lt => "<",
        BinOp::LtEq => "<=",
        BinOp::Gt => ">",
        _ => ">=",
    }
}

fn arithmetic_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "div",
        _ => "mod",
    }
}

fn literal_script(literal: &Literal, span: Span) -> TranslateResult<Translated> {
    Ok(match literal {
        Literal::String(value) => Translated::new(string_literal(value), ValueType::String),
        Literal::Number(value) => Translated::new(value.clone(), ValueType::Number),
        Literal::Boolean(true) => Translated::new("true()", ValueType::Boolean),
        Literal::Boolean(false) => Translated::new("false()", ValueType::Boolean),
        Literal::Date(value) => Translated::new(format!("xs:date('{}')", value), ValueType::Date),
        Literal::Time(value) => Translated::new(format!("xs:time('{}')", value), ValueType::Time),
        Literal::Duration(value) => Translated::new(duration_script(value, span)?, ValueType::Duration),
    })
}

/// `P2W` becomes `xs:dayTimeDuration('P14D')`, `P1Y` `xs:yearMonthDuration('P1Y')`
fn duration_script(text: &str, span: Span) -> TranslateResult<String> {
    let body = text.strip_prefix('P').unwrap_or(text);
    let (date_part, time_part) = match body.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (body, None),
    };

    let (mut years, mut months, mut days) = (None::<u64>, None::<u64>, None::<u64>);
    let mut digits = String::new();
    for c in date_part.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
            continue;
        }
        let n: u64 = digits
            .parse()
            .map_err(|_| TranslateError::syntax(format!("invalid duration '{}'", text), span))?;
        digits.clear();
        let slot = match c {
            'Y' => &mut years,
            'M' => &mut months,
            _ => &mut days,
        };
        let n = if c == 'W' { n * 7 } else { n };
        *slot = Some(slot.unwrap_or(0) + n);
    }

    let mut normalized = String::from("P");
    for (value, unit) in [(years, 'Y'), (months, 'M'), (days, 'D')] {
        if let Some(value) = value {
            normalized.push_str(&format!("{}{}", value, unit));
        }
    }
    if let Some(time) = time_part {
        normalized.push('T');
        normalized.push_str(time);
    }

    let year_month = years.is_some() || months.is_some();
    let day_time = days.is_some() || time_part.is_some();
    let constructor = match (year_month, day_time) {
        (true, false) => "xs:yearMonthDuration",
        (false, true) => "xs:dayTimeDuration",
        _ => "xs:duration",
    };
    Ok(format!("{}('{}')", constructor, normalized))
}

/// Field of a reference that is known to point at a field
pub fn expect_field<'a>(
    symbols: &'a dyn SymbolResolver,
    asset: &AssetRef,
) -> TranslateResult<&'a FieldInfo> {
    if asset.kind != AssetKind::Field {
        return Err(TranslateError::unknown(IdentifierKind::Field, &asset.id, asset.span));
    }
    symbols
        .field(&asset.id)
        .map_err(|e| TranslateError::from_sdk(e, asset.span))
}
