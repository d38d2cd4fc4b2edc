// src/exec/protocol.rs

//! JSON-lines protocol spoken with an engine bridge process.
//!
//! One JSON object per line in each direction. The host writes
//! [`Request`]s to the bridge's stdin and reads [`Record`]s from its stdout
//! until a terminal `done` or `failed` record ends the current request.

use serde::{Deserialize, Serialize};

use crate::exec::command::{Command, ParamValue, ResultRow};
use crate::host::HostCapability;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Request {
    Import { module: String },
    Invoke { verb: String, params: Vec<WireParam> },
    /// Answer to a `prompt` record.
    Reject { capability: HostCapability },
    Exit,
}

/// A parameter on the wire. A missing `value` is a switch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl From<&Command> for Request {
    fn from(cmd: &Command) -> Self {
        let params = cmd
            .params()
            .iter()
            .map(|(name, value)| WireParam {
                name: name.clone(),
                value: match value {
                    ParamValue::Text(s) => Some(s.clone()),
                    ParamValue::Switch => None,
                },
            })
            .collect();
        Request::Invoke {
            verb: cmd.verb().to_string(),
            params,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Record {
    Text { text: String },
    Line { text: String },
    Error { text: String },
    Warning { text: String },
    Verbose { text: String },
    Debug { text: String },
    Progress {
        source_id: i64,
        percent: i32,
        #[serde(default)]
        activity: Option<String>,
    },
    Row { fields: ResultRow },
    Prompt { capability: HostCapability },
    Done,
    Failed { message: String },
}

impl Request {
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl Record {
    pub fn parse(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}
