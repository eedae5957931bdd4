use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Granularity at which a term text was observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Study,
    Series,
}

impl Level {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Study => "study",
            Level::Series => "series",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "study" => Ok(Level::Study),
            "series" => Ok(Level::Series),
            other => Err(Error::InvalidInput(format!("unknown level: {other}"))),
        }
    }
}

/// A normalized observation ready for embedding and aggregation.
///
/// `(text, level, modality)` is the composite identity the store aggregates
/// on; `date` only feeds the `last_seen_date` merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedTerm {
    pub text: String,
    pub level: Level,
    pub modality: Option<String>,
    pub date: Option<String>,
}

impl NormalizedTerm {
    #[must_use]
    pub fn new(text: impl Into<String>, level: Level) -> Self {
        Self {
            text: text.into(),
            level,
            modality: None,
            date: None,
        }
    }

    #[must_use]
    pub fn with_modality(mut self, modality: impl Into<String>) -> Self {
        self.modality = Some(modality.into());
        self
    }

    #[must_use]
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }
}

/// A persisted term row with its aggregate statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermRecord {
    pub text: String,
    pub level: Level,
    pub modality: Option<String>,
    pub count: u64,
    pub last_seen_date: Option<String>,
}
