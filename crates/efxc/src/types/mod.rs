//! Value types of translated expressions
//!
//! The target script is untyped, so types only exist during translation to
//! reject ill-typed operators and to pick value accessors.

mod value_type;

pub use value_type::{TypeHint, ValueType};
