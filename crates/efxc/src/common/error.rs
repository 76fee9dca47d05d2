//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{Buffer, ColorChoice, StandardStream};
use efx_sdk::{IdentifierKind, SdkError};
use thiserror::Error;

use super::Span;

/// Translation error with source location
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslateError {
    #[error("malformed indentation at line {line}, column {column}: {message}")]
    MalformedIndentation {
        message: String,
        line: usize,
        column: usize,
        span: Span,
    },

    #[error("illegal indentation jump at line {line}, column {column}: depth {depth} under a line of depth {parent_depth}")]
    IllegalIndentJump {
        depth: usize,
        parent_depth: usize,
        line: usize,
        column: usize,
        span: Span,
    },

    #[error("mixed indentation at line {line}, column {column}: {message}")]
    MixedIndentation {
        message: String,
        line: usize,
        column: usize,
        span: Span,
    },

    #[error("syntax error at {span:?}: {message}")]
    Syntax { message: String, span: Span },

    #[error("unknown {kind} '{id}'")]
    UnknownIdentifier {
        kind: IdentifierKind,
        id: String,
        span: Span,
    },

    #[error("variable '${name}' is already declared in this scope")]
    DuplicateVariable { name: String, span: Span },

    #[error("undefined variable '${name}'")]
    UndefinedVariable { name: String, span: Span },

    #[error("ambiguous label '{label}': {reason}")]
    AmbiguousLabel {
        label: String,
        reason: String,
        span: Span,
    },

    #[error("unsupported label '{label}': {reason}")]
    UnsupportedLabelType {
        label: String,
        reason: String,
        span: Span,
    },

    #[error("type mismatch: {message}")]
    TypeMismatch { message: String, span: Span },

    #[error("unsupported operator '{operator}'")]
    UnsupportedOperator { operator: String, span: Span },

    #[error("unsupported SDK version '{version}'")]
    UnsupportedSdkVersion { version: String },

    #[error("invalid SDK metadata: {message}")]
    Metadata { message: String },
}

impl TranslateError {
    pub fn syntax(message: impl Into<String>, span: Span) -> Self {
        Self::Syntax {
            message: message.into(),
            span,
        }
    }

    pub fn unknown(kind: IdentifierKind, id: impl Into<String>, span: Span) -> Self {
        Self::UnknownIdentifier {
            kind,
            id: id.into(),
            span,
        }
    }

    pub fn duplicate_variable(name: impl Into<String>, span: Span) -> Self {
        Self::DuplicateVariable {
            name: name.into(),
            span,
        }
    }

    pub fn undefined_variable(name: impl Into<String>, span: Span) -> Self {
        Self::UndefinedVariable {
            name: name.into(),
            span,
        }
    }

    pub fn ambiguous_label(label: impl Into<String>, reason: impl Into<String>, span: Span) -> Self {
        Self::AmbiguousLabel {
            label: label.into(),
            reason: reason.into(),
            span,
        }
    }

    pub fn unsupported_label(
        label: impl Into<String>,
        reason: impl Into<String>,
        span: Span,
    ) -> Self {
        Self::UnsupportedLabelType {
            label: label.into(),
            reason: reason.into(),
            span,
        }
    }

    pub fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        Self::TypeMismatch {
            message: message.into(),
            span,
        }
    }

    pub fn unsupported_operator(operator: impl Into<String>, span: Span) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
            span,
        }
    }

    /// Convert an SDK lookup failure, attaching the location of the reference
    pub fn from_sdk(error: SdkError, span: Span) -> Self {
        match error {
            SdkError::UnknownIdentifier { kind, id } => Self::UnknownIdentifier { kind, id, span },
            SdkError::UnsupportedVersion(version) => Self::UnsupportedSdkVersion { version },
            other => Self::Metadata {
                message: other.to_string(),
            },
        }
    }

    /// Structural errors abort the whole template regardless of error mode
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            TranslateError::MalformedIndentation { .. }
                | TranslateError::IllegalIndentJump { .. }
                | TranslateError::MixedIndentation { .. }
        )
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            TranslateError::MalformedIndentation { span, .. }
            | TranslateError::IllegalIndentJump { span, .. }
            | TranslateError::MixedIndentation { span, .. }
            | TranslateError::Syntax { span, .. }
            | TranslateError::UnknownIdentifier { span, .. }
            | TranslateError::DuplicateVariable { span, .. }
            | TranslateError::UndefinedVariable { span, .. }
            | TranslateError::AmbiguousLabel { span, .. }
            | TranslateError::UnsupportedLabelType { span, .. }
            | TranslateError::TypeMismatch { span, .. }
            | TranslateError::UnsupportedOperator { span, .. } => Some(*span),
            TranslateError::UnsupportedSdkVersion { .. } | TranslateError::Metadata { .. } => None,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            TranslateError::MalformedIndentation { .. }
            | TranslateError::IllegalIndentJump { .. }
            | TranslateError::MixedIndentation { .. } => "Indentation error",
            TranslateError::Syntax { .. } => "Syntax error",
            TranslateError::UnknownIdentifier { .. } => "Unknown identifier",
            TranslateError::DuplicateVariable { .. } | TranslateError::UndefinedVariable { .. } => {
                "Variable error"
            }
            TranslateError::AmbiguousLabel { .. } | TranslateError::UnsupportedLabelType { .. } => {
                "Label error"
            }
            TranslateError::TypeMismatch { .. } => "Type error",
            TranslateError::UnsupportedOperator { .. } => "Unsupported operator",
            TranslateError::UnsupportedSdkVersion { .. } | TranslateError::Metadata { .. } => {
                "SDK error"
            }
        }
    }
}

pub type TranslateResult<T> = Result<T, TranslateError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    fn diagnostic(&self, file_id: usize, error: &TranslateError) -> Diagnostic<usize> {
        let diagnostic = Diagnostic::error().with_message(error.title());
        match error.span() {
            Some(span) => diagnostic.with_labels(vec![
                Label::primary(file_id, span.start..span.end).with_message(error.to_string()),
            ]),
            None => diagnostic.with_notes(vec![error.to_string()]),
        }
    }

    /// Print the error to stderr
    pub fn report_error(&self, file_id: usize, error: &TranslateError) {
        let writer = StandardStream::stderr(ColorChoice::Auto);
        let diagnostic = self.diagnostic(file_id, error);
        let _ = term::emit(&mut writer.lock(), &self.config, &self.files, &diagnostic);
    }

    /// Render the error without colors
    pub fn format_error(&self, file_id: usize, error: &TranslateError) -> String {
        let mut buffer = Buffer::no_color();
        let diagnostic = self.diagnostic(file_id, error);
        if term::emit(&mut buffer, &self.config, &self.files, &diagnostic).is_err() {
            return error.to_string();
        }
        String::from_utf8_lossy(buffer.as_slice()).into_owned()
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structural_classification() {
        let error = TranslateError::MixedIndentation {
            message: "tab after spaces".into(),
            line: 2,
            column: 3,
            span: Span::new(20, 23),
        };
        assert!(error.is_structural());
        assert!(!TranslateError::undefined_variable("x", Span::default()).is_structural());
    }

    #[test]
    fn test_from_sdk_keeps_identifier() {
        let error = TranslateError::from_sdk(
            SdkError::unknown(IdentifierKind::Field, "BT-99-Nope"),
            Span::new(4, 14),
        );
        assert!(matches!(
            &error,
            TranslateError::UnknownIdentifier { kind: IdentifierKind::Field, id, span }
                if id == "BT-99-Nope" && *span == Span::new(4, 14)
        ));
        assert_eq!(error.to_string(), "unknown field 'BT-99-Nope'");
    }

    #[test]
    fn test_format_error_points_at_span() {
        let mut reporter = DiagnosticReporter::new();
        let file_id = reporter.add_file("form.efx", "{BT-00-Text} ${$missing}\n");
        let error = TranslateError::undefined_variable("missing", Span::new(15, 23));
        let output = reporter.format_error(file_id, &error);
        assert!(output.contains("Variable error"));
        assert!(output.contains("undefined variable '$missing'"));
        assert!(output.contains("form.efx"));
    }
}
