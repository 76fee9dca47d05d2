//! Template block assembly
//!
//! Every template line becomes a named block. Indentation decides which
//! block a line belongs under; the parent dispatches to its children by
//! navigating from its own context to theirs.
//!
//! Building happens in three passes over the lines, which are already in
//! depth-first order:
//!
//! 1. depth check and tree assembly with an explicit stack, assigning block
//!    ids and outline numbers
//! 2. compilation of each line in a scope stack that mirrors the ancestors
//!    of the line, recording every use of a block variable
//! 3. parameter threading: a variable used below its declaring block becomes
//!    a parameter of every block on the way down

use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use super::indent::IndentTracker;
use super::{ExpressionTranslator, LabelResolver, VariableUse};
use crate::common::{ErrorSink, Span, TranslateError, TranslateResult};
use crate::frontend::ast::{ContentItem, OutlineOverride, TemplateLine};
use crate::frontend::parser::{parse_line, scan_lines};
use crate::frontend::sema::{Binding, Context, ScopeManager};
use crate::frontend::sema::types::expect_type;
use crate::ir::{ArgValue, Argument, Dispatch, Emission, Param, ScriptModule, TemplateBlock};
use crate::types::TypeHint;

const ROOT_PREFIX: &str = "block";

/// A line in the block tree
struct BlockNode {
    /// `None` when the line failed to parse
    line: Option<TemplateLine>,
    line_number: usize,
    depth: usize,
    parent: Option<usize>,
    children: Vec<usize>,
    id: String,
    /// Annotation shown on this block
    outline: Option<String>,
    /// Dotted prefix handed to the children's numbers
    prefix: Option<String>,
    /// Next auto number for the children, past `u32::MAX` once exhausted
    counter: u64,
}

/// A variable declared on a line, kept once its block frame is popped
struct Declared {
    name: String,
    hint: TypeHint,
    script: String,
}

/// Result of compiling one line
struct Compiled {
    path: String,
    body: Vec<Emission>,
    declared: Vec<Declared>,
}

pub struct TemplateBlockBuilder<'a> {
    translator: ExpressionTranslator<'a>,
    labels: LabelResolver<'a>,
}

impl<'a> TemplateBlockBuilder<'a> {
    pub fn new(translator: ExpressionTranslator<'a>, labels: LabelResolver<'a>) -> Self {
        Self { translator, labels }
    }

    /// Build the blocks of a template
    ///
    /// Indentation errors always abort. Any other error is handed to `sink`;
    /// when the sink lets translation go on, the failing line and everything
    /// under it are left out of the result.
    pub fn build(&mut self, source: &str, sink: &mut dyn ErrorSink) -> TranslateResult<ScriptModule> {
        let nodes = self.assemble(source, sink)?;
        debug!(lines = nodes.len(), "assembled template tree");

        let mut scope = ScopeManager::new(Context::root());
        let mut compiled: Vec<Option<Compiled>> = Vec::with_capacity(nodes.len());
        let mut uses: Vec<(usize, VariableUse)> = Vec::new();

        for index in 0..nodes.len() {
            let node = &nodes[index];
            let parent_failed = node.parent.is_some_and(|parent| compiled[parent].is_none());
            let Some(line) = node.line.as_ref().filter(|_| !parent_failed) else {
                compiled.push(None);
                continue;
            };

            scope.truncate(1 + node.depth);
            match self.compile(index, node.parent, line, &mut scope) {
                Ok((result, line_uses)) => {
                    trace!(block = %node.id, line = node.line_number, "compiled block");
                    uses.extend(line_uses);
                    compiled.push(Some(result));
                }
                Err(error) => {
                    self.translator.discard_uses();
                    scope.truncate(1 + node.depth);
                    warn!(block = %node.id, line = node.line_number, %error, "skipping template line");
                    sink.report(error)?;
                    compiled.push(None);
                }
            }
        }

        let params = thread_parameters(&nodes, &compiled, &uses);
        let module = emit(&nodes, &compiled, &params);
        debug!(blocks = module.blocks.len(), "built template blocks");
        Ok(module)
    }

    // ==================== Tree assembly ====================

    fn assemble(&self, source: &str, sink: &mut dyn ErrorSink) -> TranslateResult<Vec<BlockNode>> {
        let mut tracker = IndentTracker::new();
        let mut nodes: Vec<BlockNode> = Vec::new();
        let mut roots = 0usize;
        let mut root_counter = 1u64;
        let mut open: Vec<usize> = Vec::new();

        for raw in scan_lines(source) {
            let depth = tracker.depth(&raw)?;
            let mut line = match parse_line(&raw, depth) {
                Ok(line) => Some(line),
                Err(error) => {
                    warn!(line = raw.line, %error, "skipping template line");
                    sink.report(error)?;
                    None
                }
            };

            open.truncate(depth);
            let parent = open.last().copied();
            let index = nodes.len();

            let (id, prefix, counter) = match parent {
                Some(parent) => {
                    let node = &mut nodes[parent];
                    node.children.push(index);
                    let id = format!("{}{:02}", node.id, node.children.len());
                    (id, node.prefix.clone(), &mut node.counter)
                }
                None => {
                    roots += 1;
                    let id = format!("{}{:02}", ROOT_PREFIX, roots);
                    (id, None, &mut root_counter)
                }
            };

            let outline_override = line.as_ref().and_then(|line| line.outline.as_ref());
            let span = line.as_ref().map_or_else(|| raw.text_span(), |line| line.span);
            let (outline, own_prefix) =
                match number(outline_override, prefix.as_deref(), counter, span) {
                    Ok(numbered) => numbered,
                    Err(error) => {
                        warn!(line = raw.line, %error, "skipping template line");
                        sink.report(error)?;
                        line = None;
                        (None, prefix)
                    }
                };

            nodes.push(BlockNode {
                line,
                line_number: raw.line,
                depth,
                parent,
                children: Vec::new(),
                id,
                outline,
                prefix: own_prefix,
                counter: 1,
            });
            open.push(index);
        }

        // Only blocks with children are annotated
        for node in &mut nodes {
            if node.children.is_empty() {
                node.outline = None;
            }
        }
        Ok(nodes)
    }

    // ==================== Compilation ====================

    fn compile(
        &mut self,
        index: usize,
        parent: Option<usize>,
        line: &TemplateLine,
        scope: &mut ScopeManager,
    ) -> TranslateResult<(Compiled, Vec<(usize, VariableUse)>)> {
        let top_level = line.depth == 0;
        let (path, context) = match &line.context {
            Some(decl) => self
                .translator
                .translate_context(&decl.reference, scope, top_level)?,
            None => {
                let path = if top_level { Context::root().path } else { ".".to_string() };
                (path, scope.context().clone())
            }
        };

        scope.push_block(context, index);

        // Declarations are evaluated by the parent's dispatch
        let mut declared = Vec::new();
        if let Some(decl) = &line.context {
            let mut bindings = Vec::with_capacity(decl.variables.len());
            for variable in &decl.variables {
                let hint = TypeHint::from_name(&variable.hint).ok_or_else(|| {
                    TranslateError::syntax(format!("unknown type '{}'", variable.hint), variable.span)
                })?;
                let value = self.translator.translate(&variable.value, scope)?;
                expect_type(hint.value_type(), value.ty, "the variable", variable.value.span)?;
                let binding = Binding {
                    hint,
                    source: value.script,
                    multi: value.multi,
                };
                declared.push(Declared {
                    name: variable.name.clone(),
                    hint,
                    script: binding.source.clone(),
                });
                bindings.push((variable, binding));
            }
            for (variable, binding) in bindings {
                scope.declare(&variable.name, binding, variable.span)?;
            }
        }
        let parent_uses = self.translator.take_uses();

        let mut body = Vec::with_capacity(line.content.len());
        for item in &line.content {
            body.push(self.emission(item, scope)?);
        }
        let own_uses = self.translator.take_uses();

        let mut uses = Vec::with_capacity(parent_uses.len() + own_uses.len());
        if let Some(parent) = parent {
            uses.extend(parent_uses.into_iter().map(|u| (parent, u)));
        }
        uses.extend(own_uses.into_iter().map(|u| (index, u)));

        Ok((
            Compiled {
                path,
                body,
                declared,
            },
            uses,
        ))
    }

    fn emission(&mut self, item: &ContentItem, scope: &mut ScopeManager) -> TranslateResult<Emission> {
        Ok(match item {
            ContentItem::Text(text) | ContentItem::Whitespace(text) => Emission::Text(text.clone()),
            ContentItem::Expression(expr) => {
                Emission::Eval(self.translator.translate_value(expr, scope)?.script)
            }
            ContentItem::Label(label) => {
                Emission::Label(self.labels.resolve(label, &mut self.translator, scope)?)
            }
            ContentItem::ContextValue(span) => {
                Emission::Eval(self.translator.context_value_rendered(scope, *span)?.script)
            }
        })
    }
}

/// Outline annotation of a line and the prefix it hands to its children
fn number(
    outline: Option<&OutlineOverride>,
    prefix: Option<&str>,
    counter: &mut u64,
    span: Span,
) -> TranslateResult<(Option<String>, Option<String>)> {
    let dotted = |n: u32| match prefix {
        Some(prefix) => format!("{}.{}", prefix, n),
        None => n.to_string(),
    };

    match outline {
        None => {
            let n = u32::try_from(*counter).map_err(|_| {
                TranslateError::syntax(
                    format!("outline number {} is too large", counter),
                    span,
                )
            })?;
            *counter += 1;
            let annotation = dotted(n);
            Ok((Some(annotation.clone()), Some(annotation)))
        }
        Some(OutlineOverride::Suppressed) => {
            *counter += 1;
            Ok((None, prefix.map(str::to_string)))
        }
        Some(OutlineOverride::Number(segments)) => {
            let last = segments.last().copied().unwrap_or(0);
            *counter = u64::from(last) + 1;
            let annotation = if segments.len() == 1 {
                dotted(last)
            } else {
                segments
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(".")
            };
            Ok((Some(annotation.clone()), Some(annotation)))
        }
    }
}

/// (declaring block, position of the declaration) for every parameter of every block
fn thread_parameters(
    nodes: &[BlockNode],
    compiled: &[Option<Compiled>],
    uses: &[(usize, VariableUse)],
) -> Vec<BTreeSet<(usize, usize)>> {
    let mut params: Vec<BTreeSet<(usize, usize)>> = vec![BTreeSet::new(); nodes.len()];

    for (index, result) in compiled.iter().enumerate() {
        if let Some(result) = result {
            params[index].extend((0..result.declared.len()).map(|position| (index, position)));
        }
    }

    for (user, variable) in uses {
        let Some(declared) = compiled[variable.owner].as_ref() else {
            continue;
        };
        let Some(position) = declared
            .declared
            .iter()
            .position(|d| d.name == variable.name)
        else {
            continue;
        };

        let mut cursor = Some(*user);
        while let Some(block) = cursor {
            if block == variable.owner {
                break;
            }
            params[block].insert((variable.owner, position));
            cursor = nodes[block].parent;
        }
    }
    params
}

/// Lower the compiled lines into the IR
fn emit(
    nodes: &[BlockNode],
    compiled: &[Option<Compiled>],
    params: &[BTreeSet<(usize, usize)>],
) -> ScriptModule {
    let declared = |owner: usize, position: usize| -> Option<&Declared> {
        compiled[owner].as_ref()?.declared.get(position)
    };

    let dispatch = |child: usize| -> Option<Dispatch> {
        let path = compiled[child].as_ref()?.path.clone();
        let args = params[child]
            .iter()
            .filter_map(|&(owner, position)| {
                let variable = declared(owner, position)?;
                let value = if owner == child {
                    ArgValue::Expression(variable.script.clone())
                } else {
                    ArgValue::Passthrough
                };
                Some(Argument {
                    name: variable.name.clone(),
                    value,
                })
            })
            .collect();
        Some(Dispatch {
            path,
            block: nodes[child].id.clone(),
            args,
        })
    };

    let mut module = ScriptModule::default();
    for (index, node) in nodes.iter().enumerate() {
        let Some(result) = &compiled[index] else {
            continue;
        };
        if node.parent.is_none() {
            module.dispatches.extend(dispatch(index));
        }
        module.blocks.push(TemplateBlock {
            id: node.id.clone(),
            line: node.line_number,
            outline: node.outline.clone(),
            params: params[index]
                .iter()
                .filter_map(|&(owner, position)| declared(owner, position))
                .map(|variable| Param {
                    name: variable.name.clone(),
                    hint: variable.hint,
                })
                .collect(),
            body: result.body.clone(),
            children: node.children.iter().filter_map(|&child| dispatch(child)).collect(),
        });
    }
    module
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::v1::V1LabelRules;
    use crate::backend::CodelistModel;
    use crate::common::{CollectErrors, FailFast};
    use crate::config::TranslatorOptions;
    use crate::test_support::fixture_symbols;
    use pretty_assertions::assert_eq;

    fn build_with(source: &str, sink: &mut dyn ErrorSink) -> TranslateResult<ScriptModule> {
        let symbols = fixture_symbols();
        let codelists = CodelistModel::v1();
        let options = TranslatorOptions::default();
        let translator = ExpressionTranslator::new(&symbols, &codelists, &options);
        let labels = LabelResolver::new(&symbols, &V1LabelRules);
        TemplateBlockBuilder::new(translator, labels).build(source, sink)
    }

    fn build(source: &str) -> TranslateResult<ScriptModule> {
        build_with(source, &mut FailFast)
    }

    fn outlines(module: &ScriptModule) -> Vec<(&str, Option<&str>)> {
        module
            .blocks
            .iter()
            .map(|b| (b.id.as_str(), b.outline.as_deref()))
            .collect()
    }

    fn param_names(module: &ScriptModule, id: &str) -> Vec<String> {
        module
            .block(id)
            .unwrap()
            .params
            .iter()
            .map(|p| p.name.clone())
            .collect()
    }

    fn passthrough(name: &str) -> Argument {
        Argument {
            name: name.to_string(),
            value: ArgValue::Passthrough,
        }
    }

    fn expression(name: &str, script: &str) -> Argument {
        Argument {
            name: name.to_string(),
            value: ArgValue::Expression(script.to_string()),
        }
    }

    #[test]
    fn test_single_line() {
        let module = build("{BT-00-Text} foo").unwrap();
        assert_eq!(
            module,
            ScriptModule {
                blocks: vec![TemplateBlock {
                    id: "block01".to_string(),
                    line: 1,
                    outline: None,
                    params: vec![],
                    body: vec![Emission::Text("foo".to_string())],
                    children: vec![],
                }],
                dispatches: vec![Dispatch {
                    path: "/*/PathNode/TextField".to_string(),
                    block: "block01".to_string(),
                    args: vec![],
                }],
            }
        );
    }

    #[test]
    fn test_nested_contexts() {
        let module = build("{BT-00-Text} foo\n\t{ND-Root} bar\n\t\t{BT-00-Number} foo").unwrap();
        assert_eq!(
            outlines(&module),
            vec![("block01", Some("1")), ("block0101", Some("1.1")), ("block010101", None)]
        );
        assert_eq!(module.block("block01").unwrap().children[0].path, "../..");
        assert_eq!(module.block("block0101").unwrap().children[0].path, "PathNode/NumberField");
        assert_eq!(module.dispatches.len(), 1);
    }

    #[test]
    fn test_flat_siblings_number_by_position() {
        let module = build(
            "{ND-Root} a\n\t{BT-00-Text} x\n{ND-Root} b\n\t{BT-00-Text} y\n{ND-Root} c\n\t{BT-00-Text} z",
        )
        .unwrap();
        assert_eq!(
            outlines(&module),
            vec![
                ("block01", Some("1")),
                ("block0101", None),
                ("block02", Some("2")),
                ("block0201", None),
                ("block03", Some("3")),
                ("block0301", None),
            ]
        );
    }

    #[test]
    fn test_missing_context_inherits_parent() {
        let module = build("{BT-00-Text} a\n\tb\nc").unwrap();
        assert_eq!(module.block("block01").unwrap().children[0].path, ".");
        assert_eq!(module.dispatches[1].path, "/*");
    }

    #[test]
    fn test_same_context_child_and_new_top_level_block() {
        let module = build("{BT-00-Text} a\n\t{BT-00-Text} b\n{BT-00-Code} c").unwrap();
        assert_eq!(module.block("block01").unwrap().children[0].path, ".");
        assert_eq!(module.dispatches[1].block, "block02");
        assert_eq!(module.dispatches[1].path, "/*/PathNode/CodeField");
    }

    #[test]
    fn test_outline_overrides() {
        let template = |a: &str, b: &str| {
            format!("{}{{BT-00-Text}} foo\n\t{}{{ND-Root}} bar\n\t\t{{BT-00-Number}} foo", a, b)
        };
        let annotations = |a: &str, b: &str| {
            let module = build(&template(a, b)).unwrap();
            outlines(&module)
                .into_iter()
                .map(|(_, o)| o.map(str::to_string))
                .collect::<Vec<_>>()
        };
        let some = |s: &str| Some(s.to_string());

        assert_eq!(annotations("2", "3"), vec![some("2"), some("2.3"), None]);
        assert_eq!(annotations("2", ""), vec![some("2"), some("2.1"), None]);
        assert_eq!(annotations("2", "0"), vec![some("2"), None, None]);
        assert_eq!(annotations("0", ""), vec![None, some("1"), None]);
    }

    #[test]
    fn test_suppressed_line_consumes_its_slot() {
        let module = build(
            "{ND-Root} a\n\t{BT-00-Text} x\n0{ND-Root} b\n\t{BT-00-Text} y\n{ND-Root} c\n\t{BT-00-Text} z",
        )
        .unwrap();
        assert_eq!(module.block("block01").unwrap().outline.as_deref(), Some("1"));
        assert_eq!(module.block("block02").unwrap().outline, None);
        assert_eq!(module.block("block03").unwrap().outline.as_deref(), Some("3"));
    }

    #[test]
    fn test_explicit_number_rebases_counter() {
        let module = build(
            "5{ND-Root} a\n\t{BT-00-Text} x\n{ND-Root} b\n\t4.2{BT-00-Text} y\n\t\tz\n\t{BT-00-Text} w\n\t\tv",
        )
        .unwrap();
        assert_eq!(
            outlines(&module),
            vec![
                ("block01", Some("5")),
                ("block0101", None),
                ("block02", Some("6")),
                ("block0201", Some("4.2")),
                ("block020101", None),
                ("block0202", Some("6.3")),
                ("block020201", None),
            ]
        );
    }

    #[test]
    fn test_outline_number_at_the_limit() {
        let module = build("4294967295{ND-Root} a\n\t{BT-00-Text} b").unwrap();
        assert_eq!(
            outlines(&module),
            vec![("block01", Some("4294967295")), ("block0101", None)]
        );

        assert!(matches!(
            build("4294967294{ND-Root} a\n\tx\n{ND-Root} b\n\ty\n{ND-Root} c\n\tz"),
            Err(TranslateError::Syntax { .. })
        ));
        assert!(matches!(
            build("{ND-Root} a\n\t4294967295{BT-00-Text} b\n\t{BT-00-Text} c"),
            Err(TranslateError::Syntax { .. })
        ));
    }

    #[test]
    fn test_outline_overflow_skips_line_when_permissive() {
        let mut sink = CollectErrors::new();
        let module = build_with(
            "4294967295{ND-Root} a\n{ND-Root} b\n\t{BT-00-Text} c\n1{ND-Root} d",
            &mut sink,
        )
        .unwrap();
        assert_eq!(sink.errors().len(), 1);
        assert!(matches!(sink.errors()[0], TranslateError::Syntax { .. }));
        let ids: Vec<&str> = module.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["block01", "block03"]);
    }

    #[test]
    fn test_outline_ignores_whitespace_edits() {
        let tabs = build("{ND-Root} a\n\t{BT-00-Text} b\n\t\t{BT-00-Text} c\n{ND-Root} d").unwrap();
        let spaces =
            build("{ND-Root}   a\n\n    {BT-00-Text} b  \n        {BT-00-Text} c\n// note\n{ND-Root} d")
                .unwrap();
        assert_eq!(outlines(&tabs), outlines(&spaces));
    }

    #[test]
    fn test_deterministic() {
        let source = "{ND-Root, text:$a = BT-00-Text} a\n\t{BT-00-Code} ${$a} #value\n\t{BT-00-Text} b";
        assert_eq!(build(source).unwrap(), build(source).unwrap());
    }

    #[test]
    fn test_declared_variables_become_parameters() {
        let source = "\
{ND-Root, text:$a = BT-00-Text, number:$b = BT-00-Number} root
\t{BT-00-Text} ${$a} ${$b}
\t{BT-00-Number} ${$b} ${$a}
\t{BT-00-Code, text:$c = BT-00-Code} ${$a} ${$b} ${$c}";
        let module = build(source).unwrap();

        assert_eq!(param_names(&module, "block01"), vec!["a", "b"]);
        assert_eq!(param_names(&module, "block0101"), vec!["a", "b"]);
        assert_eq!(param_names(&module, "block0102"), vec!["a", "b"]);
        assert_eq!(param_names(&module, "block0103"), vec!["a", "b", "c"]);

        assert_eq!(
            module.dispatches[0].args,
            vec![
                expression("a", "PathNode/TextField/normalize-space(text())"),
                expression("b", "PathNode/NumberField/number()"),
            ]
        );
        let children = &module.block("block01").unwrap().children;
        assert_eq!(children[0].args, vec![passthrough("a"), passthrough("b")]);
        assert_eq!(
            children[2].args,
            vec![
                passthrough("a"),
                passthrough("b"),
                expression("c", "./normalize-space(text())"),
            ]
        );
        assert_eq!(
            module.block("block0101").unwrap().params[1],
            Param {
                name: "b".to_string(),
                hint: TypeHint::Number,
            }
        );
    }

    #[test]
    fn test_variables_thread_through_intermediate_blocks() {
        let module = build("{ND-Root, text:$a = BT-00-Text} x\n\t{BT-00-Text} y\n\t\t{BT-00-Text} ${$a}\n\t{BT-00-Text} z")
            .unwrap();
        assert_eq!(param_names(&module, "block0101"), vec!["a"]);
        assert_eq!(param_names(&module, "block010101"), vec!["a"]);
        assert!(param_names(&module, "block0102").is_empty());
        assert_eq!(
            module.block("block0101").unwrap().children[0].args,
            vec![passthrough("a")]
        );
    }

    #[test]
    fn test_variable_used_in_child_declaration() {
        let module =
            build("{ND-Root, text:$a = BT-00-Text} x\n\t{BT-00-Text} y\n\t\t{BT-00-Text, text:$b = $a} ${$b}")
                .unwrap();
        // $a is read by block0101 when it dispatches to block010101
        assert_eq!(param_names(&module, "block0101"), vec!["a"]);
        assert_eq!(param_names(&module, "block010101"), vec!["b"]);
        assert_eq!(
            module.block("block0101").unwrap().children[0].args,
            vec![expression("b", "$a")]
        );
    }

    #[test]
    fn test_siblings_do_not_share_declarations() {
        let result = build("{ND-Root} a\n\t{BT-00-Text, text:$x = BT-00-Text} b\n\t{BT-00-Text} ${$x}");
        assert!(matches!(
            result,
            Err(TranslateError::UndefinedVariable { ref name, .. }) if name == "x"
        ));
    }

    #[test]
    fn test_reserved_variable_names() {
        assert!(matches!(
            build("{ND-Root, text:$value = BT-00-Text} a"),
            Err(TranslateError::DuplicateVariable { .. })
        ));
        assert!(matches!(
            build("{ND-Root, text:$item = BT-00-Text} a"),
            Err(TranslateError::DuplicateVariable { .. })
        ));
    }

    #[test]
    fn test_declaration_type_must_match() {
        assert!(matches!(
            build("{ND-Root, number:$n = BT-00-Text} a"),
            Err(TranslateError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_permissive_mode_skips_failed_subtree() {
        let source = "{ND-Root} a\n\t{BT-99-Missing} b\n\t\t{BT-00-Text} c\n\t{BT-00-Text} ${1 +}\n\t{BT-00-Text} d";
        let mut sink = CollectErrors::new();
        let module = build_with(source, &mut sink).unwrap();

        let ids: Vec<&str> = module.blocks.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["block01", "block0103"]);
        let children: Vec<&str> = module.blocks[0]
            .children
            .iter()
            .map(|d| d.block.as_str())
            .collect();
        assert_eq!(children, vec!["block0103"]);

        let errors = sink.into_errors();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], TranslateError::Syntax { .. }));
        assert!(matches!(errors[1], TranslateError::UnknownIdentifier { .. }));
    }

    #[test]
    fn test_fail_fast_stops_at_first_error() {
        assert!(matches!(
            build("{ND-Root} a\n\t{BT-99-Missing} b\n\t{BT-00-Text} d"),
            Err(TranslateError::UnknownIdentifier { .. })
        ));
    }

    #[test]
    fn test_indentation_errors_abort_in_permissive_mode() {
        let mut sink = CollectErrors::new();
        assert!(matches!(
            build_with("{ND-Root} a\n\t\t{BT-00-Text} b", &mut sink),
            Err(TranslateError::IllegalIndentJump { .. })
        ));
        assert!(matches!(
            build_with("\t{ND-Root} a", &mut CollectErrors::new()),
            Err(TranslateError::MalformedIndentation { .. })
        ));
    }
}
