// src/host/mod.rs

//! Host side of the automation engine.
//!
//! The engine reports everything it wants to show (text, warnings, verbose
//! chatter, progress) through a host. This module provides that host:
//!
//! - [`adapter`] holds [`HostAdapter`], the callback surface handed to engine
//!   backends. It tags output, clamps progress and refuses every interactive
//!   capability.
//! - [`sink`] defines where the adapter posts to. Sinks are injected at
//!   construction; posting never waits on the presentation side.

pub mod adapter;
pub mod sink;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use adapter::{Credential, HostAdapter};
pub use sink::{ChannelSink, HostEvent, LogSink, ProgressSink};

/// Interactive capabilities an engine may ask its host for.
///
/// None are supported: engine contexts always run with prompting disabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostCapability {
    Prompt,
    PromptForChoice,
    PromptForCredential,
    ReadLine,
    ReadLineAsSecureString,
    NestedPrompt,
}

impl fmt::Display for HostCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            HostCapability::Prompt => "prompt",
            HostCapability::PromptForChoice => "prompt_for_choice",
            HostCapability::PromptForCredential => "prompt_for_credential",
            HostCapability::ReadLine => "read_line",
            HostCapability::ReadLineAsSecureString => "read_line_as_secure_string",
            HostCapability::NestedPrompt => "nested_prompt",
        };
        f.write_str(s)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Hard stop: the engine must not retry an interactive request.
    #[error("host capability unsupported: {capability}")]
    UnsupportedCapability { capability: HostCapability },
}
