//! Renderer for SDK 1.x scripts
//!
//! ```text
//! let block01(text:$x) -> { #1: text('foo')
//! for-each(../..).call(block0101(x:$x)) }
//! ```

use super::{render_body, render_emissions, LabelRules, ScriptRenderer};
use crate::ir::{ArgValue, Dispatch, ScriptModule, TemplateBlock};

pub struct V1Renderer;

impl V1Renderer {
    pub fn new() -> Self {
        Self
    }

    fn block(&self, block: &TemplateBlock) -> String {
        let params: Vec<String> = block
            .params
            .iter()
            .map(|param| format!("{}:${}", param.hint, param.name))
            .collect();
        let head = block
            .outline
            .as_ref()
            .map(|outline| format!("#{}: ", outline))
            .unwrap_or_default();
        let children: Vec<String> = block.children.iter().map(|d| self.dispatch(d)).collect();
        format!(
            "let {}({}) -> {}",
            block.id,
            params.join(", "),
            render_body(&head, &render_emissions(block), &children)
        )
    }

    fn dispatch(&self, dispatch: &Dispatch) -> String {
        let args: Vec<String> = dispatch
            .args
            .iter()
            .map(|arg| match &arg.value {
                ArgValue::Expression(script) => format!("{}:{}", arg.name, script),
                ArgValue::Passthrough => format!("{}:${}", arg.name, arg.name),
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

impl Default for V1Renderer {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRenderer for V1Renderer {
    fn name(&self) -> &'static str {
        "v1"
    }

    fn render(&self, module: &ScriptModule) -> String {
        let mut lines: Vec<String> = module.blocks.iter().map(|b| self.block(b)).collect();
        lines.extend(module.dispatches.iter().map(|d| self.dispatch(d)));
        lines.join("\n")
    }
}

/// Indirect labels are deduplicated; multi-valued asset ids are iterated
pub struct V1LabelRules;

impl LabelRules for V1LabelRules {
    fn wrap_iteration(&self, iteration: String) -> String {
        format!("distinct-values({})", iteration)
    }

    fn supports_asset_id_iteration(&self) -> bool {
        true
    }
}
