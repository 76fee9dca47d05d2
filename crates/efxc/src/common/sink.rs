//! Error sinks for statement-level failures
//!
//! The template builder hands every statement-level error to an
//! [`ErrorSink`]. The sink decides whether translation stops or carries on
//! with the next independent statement.

use super::error::{TranslateError, TranslateResult};

pub trait ErrorSink {
    /// Accept an error. Returning `Err` aborts the translation.
    fn report(&mut self, error: TranslateError) -> TranslateResult<()>;

    /// Errors accepted so far without aborting
    fn errors(&self) -> &[TranslateError] {
        &[]
    }
}

/// Stops at the first error
#[derive(Debug, Default)]
pub struct FailFast;

impl ErrorSink for FailFast {
    fn report(&mut self, error: TranslateError) -> TranslateResult<()> {
        Err(error)
    }
}

/// Records every error and lets translation continue
#[derive(Debug, Default)]
pub struct CollectErrors {
    errors: Vec<TranslateError>,
}

impl CollectErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> Vec<TranslateError> {
        self.errors
    }
}

impl ErrorSink for CollectErrors {
    fn report(&mut self, error: TranslateError) -> TranslateResult<()> {
        // Structural problems make the rest of the tree meaningless
        if error.is_structural() {
            return Err(error);
        }
        self.errors.push(error);
        Ok(())
    }

    fn errors(&self) -> &[TranslateError] {
        &self.errors
    }
}
