//! Record version tokens.
//!
//! A version is a monotonic revision counter serialized as a decimal string.
//! It only ever advances; a rolled-back record keeps counting from where it
//! was, so a token is never reused. Compare-and-swap updates compare the
//! caller's token against the stored one.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Monotonic record revision, serialized as a string (e.g. `"3"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct RecordVersion(u64);

impl RecordVersion {
    /// Version assigned to a freshly created record.
    pub fn initial() -> Self {
        RecordVersion(1)
    }

    /// The next version token. Strictly greater than `self`.
    pub fn next(self) -> Self {
        RecordVersion(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl Display for RecordVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl From<RecordVersion> for String {
    fn from(v: RecordVersion) -> String {
        v.0.to_string()
    }
}

impl TryFrom<String> for RecordVersion {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl FromStr for RecordVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(RecordVersion)
            .map_err(|e| format!("Invalid version token '{}': {}", s, e))
    }
}
