//! Version-tagged codelists

use std::fmt;

use crate::version::SdkVersion;

/// An ordered list of codes, tagged with the SDK version it was loaded for
///
/// The codelist version is the version of the codelist file itself, which is
/// unrelated to the SDK version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Codelist {
    pub id: String,
    pub version: String,
    pub sdk: SdkVersion,
    pub codes: Vec<String>,
}

impl Codelist {
    pub fn new(
        id: impl Into<String>,
        version: impl Into<String>,
        sdk: SdkVersion,
        codes: Vec<String>,
    ) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
            sdk,
            codes,
        }
    }

    /// Join the codes, each wrapped in `quote`, between `prefix` and `suffix`
    pub fn join(&self, delimiter: &str, prefix: &str, suffix: &str, quote: char) -> String {
        let mut out = String::from(prefix);
        for (i, code) in self.codes.iter().enumerate() {
            if i > 0 {
                out.push_str(delimiter);
            }
            out.push(quote);
            out.push_str(code);
            out.push(quote);
        }
        out.push_str(suffix);
        out
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.iter().any(|c| c == code)
    }
}

impl fmt::Display for Codelist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.id, self.version)
    }
}
