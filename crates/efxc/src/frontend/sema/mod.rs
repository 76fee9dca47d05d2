//! Semantic analysis support: scopes, type rules and the function table

pub mod functions;
pub mod scope;
pub mod types;

pub use scope::{Binding, Context, ContextOrigin, FrameId, Resolution, ScopeManager};
