//! Common infrastructure shared by the front end, the IR and the renderers

mod error;
mod sink;
mod span;

pub use error::{DiagnosticReporter, TranslateError, TranslateResult};
pub use sink::{CollectErrors, ErrorSink, FailFast};
pub use span::Span;
