//! SDK error types

use std::fmt;
use thiserror::Error;

/// Kind of identifier that failed to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Field,
    Node,
    Codelist,
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentifierKind::Field => write!(f, "field"),
            IdentifierKind::Node => write!(f, "node"),
            IdentifierKind::Codelist => write!(f, "codelist"),
        }
    }
}

/// Errors raised while loading or querying SDK metadata
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("unknown {kind} '{id}'")]
    UnknownIdentifier { kind: IdentifierKind, id: String },

    #[error("unsupported SDK version '{0}'")]
    UnsupportedVersion(String),

    #[error("invalid metadata for '{id}': {message}")]
    InvalidMetadata { id: String, message: String },

    #[error("failed to read symbol table: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse symbol table TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

impl SdkError {
    pub fn unknown(kind: IdentifierKind, id: impl Into<String>) -> Self {
        Self::UnknownIdentifier {
            kind,
            id: id.into(),
        }
    }

    pub fn invalid(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidMetadata {
            id: id.into(),
            message: message.into(),
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
