// src/exec/command.rs

//! Engine commands and the rows they return.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Value bound to a named parameter.
///
/// A parameter that should be absent is simply never added; there is no
/// "false" switch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamValue {
    Text(String),
    Switch,
}

/// An invocation request against the engine: a verb plus ordered, named
/// parameters. Built once through [`CommandBuilder`] and not mutated after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    verb: String,
    params: Vec<(String, ParamValue)>,
}

impl Command {
    pub fn builder(verb: impl Into<String>) -> CommandBuilder {
        CommandBuilder {
            verb: verb.into(),
            params: Vec::new(),
        }
    }

    pub fn verb(&self) -> &str {
        &self.verb
    }

    pub fn params(&self) -> &[(String, ParamValue)] {
        &self.params
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Text value of `name`, if it is present and not a switch.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(ParamValue::Text(s)) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.verb)?;
        for (name, value) in &self.params {
            match value {
                ParamValue::Text(s) => write!(f, " -{name} {s:?}")?,
                ParamValue::Switch => write!(f, " -{name}")?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct CommandBuilder {
    verb: String,
    params: Vec<(String, ParamValue)>,
}

impl CommandBuilder {
    /// Set `name`. Setting the same name again replaces the earlier value in
    /// place, keeping its position.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name.into(), ParamValue::Text(value.into()));
        self
    }

    pub fn param_opt(self, name: impl Into<String>, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.param(name, v),
            None => self,
        }
    }

    pub fn switch(mut self, name: impl Into<String>) -> Self {
        self.set(name.into(), ParamValue::Switch);
        self
    }

    pub fn switch_if(self, name: impl Into<String>, on: bool) -> Self {
        if on { self.switch(name) } else { self }
    }

    pub fn build(self) -> Command {
        Command {
            verb: self.verb,
            params: self.params,
        }
    }

    fn set(&mut self, name: String, value: ParamValue) {
        match self.params.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
    }
}

/// One record returned by the engine. Field sets vary per verb; consumers
/// access fields by name, never by position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultRow(BTreeMap<String, Value>);

impl ResultRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Render `field` for display: strings verbatim, null or missing as
    /// `None`, anything else as its JSON text.
    pub fn display(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ResultRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}
