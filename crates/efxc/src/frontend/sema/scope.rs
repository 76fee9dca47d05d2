//! Lexical scopes for EFX translation
//!
//! Frames live in an arena and point to their parent by index. Block frames
//! remember which template block declared them, so a variable lookup can
//! tell the builder which block has to receive the variable as a parameter.

use std::collections::HashMap;

use string_interner::{DefaultStringInterner, DefaultSymbol};

use crate::common::{Span, TranslateError, TranslateResult};
use crate::types::TypeHint;

/// Names the translator binds itself; user code may not declare them
pub const RESERVED_NAMES: [&str; 2] = ["value", "item"];

/// Index of a frame in the arena
pub type FrameId = usize;

/// What the current context is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextOrigin {
    /// The document root, used when nothing else is declared
    Root,
    Field(String),
    Node(String),
}

/// Navigation context of a frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Context {
    /// Absolute path without predicates
    pub path: String,
    pub origin: ContextOrigin,
}

impl Context {
    pub fn root() -> Self {
        Self {
            path: "/*".to_string(),
            origin: ContextOrigin::Root,
        }
    }

    pub fn field(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            origin: ContextOrigin::Field(id.into()),
        }
    }

    pub fn node(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            origin: ContextOrigin::Node(id.into()),
        }
    }
}

/// A variable: its declared type and the expression it is bound to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub hint: TypeHint,
    /// Target script of the bound expression, evaluated where it is declared
    pub source: String,
    /// Whether the bound expression may produce several values
    pub multi: bool,
}

/// Result of a successful lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub binding: Binding,
    /// Frame the variable was found in
    pub frame: FrameId,
    /// Number of frames between the current one and `frame`
    pub distance: usize,
    /// Template block that declared the variable, `None` for transient frames
    pub owner: Option<usize>,
}

#[derive(Debug)]
struct Frame {
    context: Context,
    variables: HashMap<DefaultSymbol, Binding>,
    parent: Option<FrameId>,
    owner: Option<usize>,
}

/// Stack of lexical frames; never empty
pub struct ScopeManager {
    interner: DefaultStringInterner,
    frames: Vec<Frame>,
}

impl ScopeManager {
    pub fn new(root: Context) -> Self {
        Self {
            interner: DefaultStringInterner::new(),
            frames: vec![Frame {
                context: root,
                variables: HashMap::new(),
                parent: None,
                owner: None,
            }],
        }
    }

    fn current_id(&self) -> FrameId {
        self.frames.len() - 1
    }

    fn current(&self) -> &Frame {
        &self.frames[self.current_id()]
    }

    /// Push a transient frame (iteration, predicate)
    pub fn push(&mut self, context: Context) -> FrameId {
        self.push_frame(context, None)
    }

    /// Push the frame of a template block
    pub fn push_block(&mut self, context: Context, owner: usize) -> FrameId {
        self.push_frame(context, Some(owner))
    }

    /// Push a transient frame pre-filled with bindings
    pub fn push_with(
        &mut self,
        context: Context,
        bindings: &[(&str, Binding)],
        span: Span,
    ) -> TranslateResult<FrameId> {
        let id = self.push(context);
        for (name, binding) in bindings {
            if let Err(error) = self.declare(name, binding.clone(), span) {
                self.pop();
                return Err(error);
            }
        }
        Ok(id)
    }

    fn push_frame(&mut self, context: Context, owner: Option<usize>) -> FrameId {
        let parent = Some(self.current_id());
        self.frames.push(Frame {
            context,
            variables: HashMap::new(),
            parent,
            owner,
        });
        self.current_id()
    }

    /// Declare a variable in the current frame
    pub fn declare(&mut self, name: &str, binding: Binding, span: Span) -> TranslateResult<()> {
        if RESERVED_NAMES.contains(&name) {
            return Err(TranslateError::duplicate_variable(name, span));
        }
        let symbol = self.interner.get_or_intern(name);
        let id = self.current_id();
        let frame = &mut self.frames[id];
        if frame.variables.contains_key(&symbol) {
            return Err(TranslateError::duplicate_variable(name, span));
        }
        frame.variables.insert(symbol, binding);
        Ok(())
    }

    /// Look a variable up, innermost frame first
    pub fn resolve(&self, name: &str, span: Span) -> TranslateResult<Resolution> {
        let undefined = || TranslateError::undefined_variable(name, span);
        let symbol = self.interner.get(name).ok_or_else(undefined)?;

        let mut distance = 0;
        let mut cursor = Some(self.current_id());
        while let Some(id) = cursor {
            let frame = &self.frames[id];
            if let Some(binding) = frame.variables.get(&symbol) {
                return Ok(Resolution {
                    binding: binding.clone(),
                    frame: id,
                    distance,
                    owner: frame.owner,
                });
            }
            cursor = frame.parent;
            distance += 1;
        }
        Err(undefined())
    }

    /// Discard the current frame; the root frame is never popped
    pub fn pop(&mut self) -> bool {
        if self.frames.len() > 1 {
            self.frames.pop();
            true
        } else {
            false
        }
    }

    /// Number of frames on the stack
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Pop frames until `depth` remain (at least the root)
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth.max(1));
    }

    pub fn context(&self) -> &Context {
        &self.current().context
    }

    /// Block owning the innermost block frame
    pub fn current_block(&self) -> Option<usize> {
        self.frames.iter().rev().find_map(|frame| frame.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text() -> Binding {
        Binding {
            hint: TypeHint::Text,
            source: "'a'".to_string(),
            multi: false,
        }
    }

    #[test]
    fn test_resolve_walks_outwards() {
        let mut scope = ScopeManager::new(Context::root());
        scope.push_block(Context::field("BT-00-Text", "/*/PathNode/TextField"), 0);
        scope.declare("x", text(), Span::default()).unwrap();
        scope.push(Context::node("ND-Root", "/*"));

        let found = scope.resolve("x", Span::default()).unwrap();
        assert_eq!(found.binding, text());
        assert_eq!(found.frame, 1);
        assert_eq!(found.distance, 1);
        assert_eq!(found.owner, Some(0));
        assert_eq!(scope.context().path, "/*");
        assert_eq!(scope.current_block(), Some(0));
    }

    #[test]
    fn test_duplicate_in_same_frame() {
        let mut scope = ScopeManager::new(Context::root());
        scope.declare("x", text(), Span::default()).unwrap();
        assert!(matches!(
            scope.declare("x", text(), Span::new(4, 6)),
            Err(TranslateError::DuplicateVariable { ref name, .. }) if name == "x"
        ));
    }

    #[test]
    fn test_shadowing_in_nested_frame() {
        let mut scope = ScopeManager::new(Context::root());
        scope.declare("x", text(), Span::default()).unwrap();
        scope.push(Context::root());
        assert!(scope.declare("x", text(), Span::default()).is_ok());
    }

    #[test]
    fn test_reserved_names() {
        let mut scope = ScopeManager::new(Context::root());
        for name in RESERVED_NAMES {
            assert!(matches!(
                scope.declare(name, text(), Span::default()),
                Err(TranslateError::DuplicateVariable { .. })
            ));
        }
    }

    #[test]
    fn test_pop_hides_bindings() {
        let mut scope = ScopeManager::new(Context::root());
        scope.push(Context::root());
        scope.declare("x", text(), Span::default()).unwrap();
        assert!(scope.pop());
        assert!(matches!(
            scope.resolve("x", Span::default()),
            Err(TranslateError::UndefinedVariable { .. })
        ));
        assert!(!scope.pop());
        assert_eq!(scope.depth(), 1);
    }

    #[test]
    fn test_truncate_keeps_root() {
        let mut scope = ScopeManager::new(Context::root());
        scope.push_block(Context::root(), 0);
        scope.push_block(Context::root(), 1);
        scope.truncate(2);
        assert_eq!(scope.depth(), 2);
        scope.truncate(0);
        assert_eq!(scope.depth(), 1);
    }

    #[test]
    fn test_push_with_rolls_back_on_error() {
        let mut scope = ScopeManager::new(Context::root());
        let result = scope.push_with(
            Context::root(),
            &[("a", text()), ("a", text())],
            Span::default(),
        );
        assert!(result.is_err());
        assert_eq!(scope.depth(), 1);
    }
}
