//! SDK version parsing
//!
//! Version strings come in several spellings: `eforms-sdk-1.0`, `1.0.2`,
//! `0.7`. Only major and minor take part in component selection.

use std::fmt;

use crate::error::{SdkError, SdkResult};

/// Prefix used by SDK distribution names
pub const SDK_PREFIX: &str = "eforms-sdk-";

/// A parsed SDK version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SdkVersion {
    pub major: u16,
    pub minor: u16,
    pub patch: Option<u16>,
}

impl SdkVersion {
    pub const fn new(major: u16, minor: u16) -> Self {
        Self {
            major,
            minor,
            patch: None,
        }
    }

    /// Parse a version string, with or without the `eforms-sdk-` prefix
    pub fn parse(input: &str) -> SdkResult<Self> {
        let trimmed = input.trim();
        let raw = trimmed.strip_prefix(SDK_PREFIX).unwrap_or(trimmed);
        let raw = raw.strip_prefix('v').unwrap_or(raw);

        let mut parts = raw.split('.');
        let major = parse_component(parts.next(), input)?;
        let minor = match parts.next() {
            Some(part) => parse_component(Some(part), input)?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(part) => Some(parse_component(Some(part), input)?),
            None => None,
        };
        if parts.next().is_some() {
            return Err(SdkError::UnsupportedVersion(input.to_string()));
        }

        Ok(Self {
            major,
            minor,
            patch,
        })
    }

    /// The version without its patch component
    pub fn without_patch(self) -> Self {
        Self::new(self.major, self.minor)
    }
}

fn parse_component(part: Option<&str>, input: &str) -> SdkResult<u16> {
    part.filter(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|p| p.parse().ok())
        .ok_or_else(|| SdkError::UnsupportedVersion(input.to_string()))
}

impl fmt::Display for SdkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.patch {
            Some(patch) => write!(f, "{}.{}.{}", self.major, self.minor, patch),
            None => write!(f, "{}.{}", self.major, self.minor),
        }
    }
}
