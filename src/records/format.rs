//! Output format selection for `/record/{id}?f=`.

use std::fmt;
use std::str::FromStr;

use crate::records::RecordError;

/// How a record is re-served to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordFormat {
    /// Whole document converted to JSON.
    Structured,
    /// Upstream XML, headers and body untouched.
    Raw,
    /// Summary record rendered as an HTML fragment.
    #[default]
    Page,
}

impl RecordFormat {
    /// Resolve the `f` query parameter; absent means [`RecordFormat::Page`].
    pub fn from_param(param: Option<&str>) -> Result<Self, RecordError> {
        match param {
            None => Ok(Self::default()),
            Some(value) => value.parse(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordFormat::Structured => "structured",
            RecordFormat::Raw => "raw",
            RecordFormat::Page => "page",
        }
    }
}

impl FromStr for RecordFormat {
    type Err = RecordError;

    /// Accepts the format names and the legacy `json`/`xml`/`html` aliases.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "structured" | "json" => Ok(Self::Structured),
            "raw" | "xml" => Ok(Self::Raw),
            "page" | "html" => Ok(Self::Page),
            other => Err(RecordError::InvalidFormat(other.to_string())),
        }
    }
}

impl fmt::Display for RecordFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
