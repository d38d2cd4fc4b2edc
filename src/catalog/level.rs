// src/catalog/level.rs

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One axis of the catalog, in dependency order.
///
/// Ordering matters: a level's valid options depend on every level before it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum SelectionLevel {
    Product,
    Architecture,
    Language,
    Media,
    Edition,
}

impl SelectionLevel {
    pub const ALL: [SelectionLevel; 5] = [
        SelectionLevel::Product,
        SelectionLevel::Architecture,
        SelectionLevel::Language,
        SelectionLevel::Media,
        SelectionLevel::Edition,
    ];

    /// Name of the engine parameter carrying this level's value.
    pub fn param_name(self) -> &'static str {
        match self {
            SelectionLevel::Product => "Product",
            SelectionLevel::Architecture => "Architecture",
            SelectionLevel::Language => "Language",
            SelectionLevel::Media => "Media",
            SelectionLevel::Edition => "Edition",
        }
    }

    /// Row field shown to the user and used for sorting.
    pub fn display_field(self) -> &'static str {
        match self {
            SelectionLevel::Product => "Version",
            other => other.param_name(),
        }
    }
}

impl fmt::Display for SelectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.param_name())
    }
}

impl FromStr for SelectionLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SelectionLevel::ALL
            .into_iter()
            .find(|l| l.param_name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown selection level: {s}"))
    }
}

/// Chosen upstream values, keyed by level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters(BTreeMap<SelectionLevel, String>);

impl Filters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, level: SelectionLevel, value: impl Into<String>) -> Self {
        self.set(level, value);
        self
    }

    pub fn set(&mut self, level: SelectionLevel, value: impl Into<String>) {
        self.0.insert(level, value.into());
    }

    pub fn get(&self, level: SelectionLevel) -> Option<&str> {
        self.0.get(&level).map(String::as_str)
    }

    /// Only the entries strictly upstream of `level`.
    pub fn upstream_of(&self, level: SelectionLevel) -> Filters {
        Filters(
            self.0
                .iter()
                .filter(|(l, _)| **l < level)
                .map(|(l, v)| (*l, v.clone()))
                .collect(),
        )
    }

    /// Entries in level order.
    pub fn iter(&self) -> impl Iterator<Item = (SelectionLevel, &str)> {
        self.0.iter().map(|(l, v)| (*l, v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A chosen value at one level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Choice {
    Value(String),
    /// Every option. Only meaningful for [`SelectionLevel::Edition`].
    All,
}

impl Choice {
    pub const ALL_LABEL: &'static str = "(All)";

    pub fn value(v: impl Into<String>) -> Self {
        Choice::Value(v.into())
    }

    /// `"all"` (any case) and `"(All)"` parse as [`Choice::All`].
    pub fn parse(s: &str) -> Self {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") || s.eq_ignore_ascii_case(Self::ALL_LABEL) {
            Choice::All
        } else {
            Choice::Value(s.to_string())
        }
    }

    pub fn as_value(&self) -> Option<&str> {
        match self {
            Choice::Value(v) => Some(v),
            Choice::All => None,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Choice::All)
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Value(v) => f.write_str(v),
            Choice::All => f.write_str(Self::ALL_LABEL),
        }
    }
}

/// Fully resolved values handed to the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub product: String,
    pub architecture: String,
    pub language: String,
    /// `None` in the simple layout.
    pub media: Option<String>,
    /// `Choice::All` in the simple layout.
    pub edition: Choice,
}
