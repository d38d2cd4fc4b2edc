use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::SelectionLevel;

/// Category the engine attached to a line of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogCategory {
    Text,
    Debug,
    Error,
    Verbose,
    Warning,
}

impl fmt::Display for LogCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogCategory::Text => "text",
            LogCategory::Debug => "debug",
            LogCategory::Error => "error",
            LogCategory::Verbose => "verbose",
            LogCategory::Warning => "warning",
        };
        f.write_str(s)
    }
}

/// One piece of engine output, as handed to a log sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub category: LogCategory,
    pub text: String,
    /// `false` for raw writes that did not end the line.
    pub terminated: bool,
}

/// Progress report for one engine activity.
///
/// `percent` is always within `0..=100`; the host clamps whatever the engine
/// reports. Monotonicity is up to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressEvent {
    pub source_id: i64,
    pub percent: u8,
    pub activity: Option<String>,
}

/// Which selection levels the cascade walks.
///
/// - `Full`: product, architecture, language, media, edition.
/// - `Simple`: product, architecture, language (deployments without media
///   or edition choice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CascadeLayout {
    #[default]
    Full,
    Simple,
}

impl CascadeLayout {
    pub fn levels(self) -> &'static [SelectionLevel] {
        match self {
            CascadeLayout::Full => &SelectionLevel::ALL,
            CascadeLayout::Simple => &[
                SelectionLevel::Product,
                SelectionLevel::Architecture,
                SelectionLevel::Language,
            ],
        }
    }
}

impl FromStr for CascadeLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(CascadeLayout::Full),
            "simple" => Ok(CascadeLayout::Simple),
            other => Err(format!(
                "invalid cascade layout: {other} (expected \"full\" or \"simple\")"
            )),
        }
    }
}
