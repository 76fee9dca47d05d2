//! Renderer for SDK 0.7 scripts
//!
//! ```text
//! declare block01($x) = { outline('1') text('foo')
//! for-each(../..).call(block0101($x = $x)) }
//! ```

use super::{render_body, render_emissions, LabelRules, ScriptRenderer};
use crate::ir::{ArgValue, Dispatch, ScriptModule, TemplateBlock};

pub struct LegacyRenderer;

impl LegacyRenderer {
    pub fn new() -> Self {
        Self
    }

    fn block(&self, block: &TemplateBlock) -> String {
        let signature = if block.params.is_empty() {
            block.id.clone()
        } else {
            let params: Vec<String> = block
                .params
                .iter()
                .map(|param| format!("${}", param.name))
                .collect();
            format!("{}({})", block.id, params.join(", "))
        };
        let head = block
            .outline
            .as_ref()
            .map(|outline| format!("outline('{}') ", outline))
            .unwrap_or_default();
        let children: Vec<String> = block.children.iter().map(|d| self.dispatch(d)).collect();
        format!(
            "declare {} = {}",
            signature,
            render_body(&head, &render_emissions(block), &children)
        )
    }

    fn dispatch(&self, dispatch: &Dispatch) -> String {
        if dispatch.args.is_empty() {
            return format!("for-each({}).call({})", dispatch.path, dispatch.block);
        }
        let args: Vec<String> = dispatch
            .args
            .iter()
            .map(|arg| match &arg.value {
                ArgValue::Expression(script) => format!("${} = {}", arg.name, script),
                ArgValue::Passthrough => format!("${} = ${}", arg.name, arg.name),
            })
            .collect();
        format!(
            "for-each({}).call({}({}))",
            dispatch.path,
            dispatch.block,
            args.join(", ")
        )
    }
}

impl Default for LegacyRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRenderer for LegacyRenderer {
    fn name(&self) -> &'static str {
        "legacy"
    }

    fn render(&self, module: &ScriptModule) -> String {
        let mut lines: Vec<String> = module.blocks.iter().map(|b| self.block(b)).collect();
        lines.extend(module.dispatches.iter().map(|d| self.dispatch(d)));
        lines.join("\n")
    }
}

/// Indirect labels are left as they are; asset ids are never iterated
pub struct LegacyLabelRules;

impl LabelRules for LegacyLabelRules {
    fn wrap_iteration(&self, iteration: String) -> String {
        iteration
    }

    fn supports_asset_id_iteration(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Argument, Emission, Param};
    use crate::types::TypeHint;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_blocks_without_params() {
        let module = ScriptModule {
            blocks: vec![
                TemplateBlock {
                    id: "block01".to_string(),
                    line: 1,
                    outline: Some("1".to_string()),
                    params: vec![],
                    body: vec![Emission::Text("foo".to_string())],
                    children: vec![Dispatch {
                        path: "../..".to_string(),
                        block: "block0101".to_string(),
                        args: vec![],
                    }],
                },
                TemplateBlock {
                    id: "block0101".to_string(),
                    line: 2,
                    outline: None,
                    params: vec![],
                    body: vec![],
                    children: vec![],
                },
            ],
            dispatches: vec![Dispatch {
                path: "/*/PathNode/TextField".to_string(),
                block: "block01".to_string(),
                args: vec![],
            }],
        };
        assert_eq!(
            LegacyRenderer::new().render(&module),
            "declare block01 = { outline('1') text('foo')\n\
             for-each(../..).call(block0101) }\n\
             declare block0101 = { }\n\
             for-each(/*/PathNode/TextField).call(block01)"
        );
    }

    #[test]
    fn test_render_params() {
        let module = ScriptModule {
            blocks: vec![TemplateBlock {
                id: "block0101".to_string(),
                line: 2,
                outline: None,
                params: vec![
                    Param {
                        name: "x".to_string(),
                        hint: TypeHint::Text,
                    },
                    Param {
                        name: "y".to_string(),
                        hint: TypeHint::Number,
                    },
                ],
                body: vec![Emission::Eval("$y".to_string())],
                children: vec![],
            }],
            dispatches: vec![Dispatch {
                path: "/*".to_string(),
                block: "block0101".to_string(),
                args: vec![
                    Argument {
                        name: "x".to_string(),
                        value: ArgValue::Passthrough,
                    },
                    Argument {
                        name: "y".to_string(),
                        value: ArgValue::Expression("1".to_string()),
                    },
                ],
            }],
        };
        assert_eq!(
            LegacyRenderer::new().render(&module),
            "declare block0101($x, $y) = { eval($y) }\n\
             for-each(/*).call(block0101($x = $x, $y = 1))"
        );
    }

    #[test]
    fn test_label_rules() {
        assert_eq!(LegacyLabelRules.wrap_iteration("for".to_string()), "for");
        assert!(!LegacyLabelRules.supports_asset_id_iteration());
    }
}
