//! Translator configuration
//!
//! Options are read from an `efxc.toml` file. Every key is optional:
//!
//! ```toml
//! sdk-version = "eforms-sdk-1.0"
//! error-mode = "permissive"
//! date-pattern = "dd/MM/yyyy"
//! time-pattern = "HH:mm Z"
//!
//! [number-format]
//! decimal-separator = ","
//! grouping-separator = "."
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// How statement-level errors are handled in template mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorMode {
    /// Abort on the first error
    #[default]
    FailFast,
    /// Report each failed statement and keep translating its siblings
    Permissive,
}

/// Numeric formatting profile used by `format-number`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub grouping_separator: char,
    pub default_pattern: String,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
            default_pattern: "#,##0.##########".to_string(),
        }
    }
}

impl NumberFormat {
    /// Rewrite a pattern written with `.` and `,` to this profile's separators
    pub fn localize(&self, pattern: &str) -> String {
        pattern
            .chars()
            .map(|c| match c {
                '.' => self.decimal_separator,
                ',' => self.grouping_separator,
                other => other,
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct TranslatorOptions {
    pub sdk_version: String,
    pub error_mode: ErrorMode,
    pub date_pattern: String,
    pub time_pattern: String,
    pub number_format: NumberFormat,
}

impl Default for TranslatorOptions {
    fn default() -> Self {
        Self {
            sdk_version: "eforms-sdk-1.0".to_string(),
            error_mode: ErrorMode::FailFast,
            date_pattern: "dd/MM/yyyy".to_string(),
            time_pattern: "HH:mm Z".to_string(),
            number_format: NumberFormat::default(),
        }
    }
}

impl TranslatorOptions {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn with_sdk_version(mut self, version: impl Into<String>) -> Self {
        self.sdk_version = version.into();
        self
    }

    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }
}
