// src/launcher.rs

//! The terminal "build artifact" command.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::catalog::{Selection, SelectionLevel};
use crate::errors::Result;
use crate::exec::{Command, ExecutionPool, ResultRow};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Sent as `NoPrompt`.
    pub skip_confirmation: bool,
    pub recompress: bool,
}

/// Where the artifact goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// ISO output directory.
    Folder(PathBuf),
    /// Removable drive, by letter (`"E"` or `"E:"`).
    Drive(String),
}

impl Destination {
    /// Value of the `Destination` parameter. Drives are always rendered as
    /// `<letter>:`.
    pub fn as_param(&self) -> String {
        match self {
            Destination::Folder(path) => path.display().to_string(),
            Destination::Drive(letter) => {
                format!("{}:", letter.trim().trim_end_matches(':'))
            }
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Folder(_) => write!(f, "folder {}", self.as_param()),
            Destination::Drive(_) => write!(f, "drive {}", self.as_param()),
        }
    }
}

/// Build the launch command.
///
/// Parameter order: product, architecture, language, media (if any),
/// destination, the option switches that are on, edition (omitted for
/// [`Choice::All`](crate::catalog::Choice::All)), then `Verbose`.
pub fn build_launch_command(
    verb: &str,
    selection: &Selection,
    destination: &Destination,
    options: LaunchOptions,
) -> Command {
    Command::builder(verb)
        .param(SelectionLevel::Product.param_name(), &selection.product)
        .param(SelectionLevel::Architecture.param_name(), &selection.architecture)
        .param(SelectionLevel::Language.param_name(), &selection.language)
        .param_opt(SelectionLevel::Media.param_name(), selection.media.as_deref())
        .param("Destination", destination.as_param())
        .switch_if("NoPrompt", options.skip_confirmation)
        .switch_if("Recompress", options.recompress)
        .param_opt(SelectionLevel::Edition.param_name(), selection.edition.as_value())
        .switch("Verbose")
        .build()
}

#[derive(Debug, Clone)]
pub struct Launcher {
    pool: Arc<ExecutionPool>,
    verb: String,
}

impl Launcher {
    pub fn new(pool: Arc<ExecutionPool>, verb: impl Into<String>) -> Self {
        Self {
            pool,
            verb: verb.into(),
        }
    }

    /// Submit the build. Long-running and not cancellable once submitted.
    pub async fn launch(
        &self,
        selection: &Selection,
        destination: &Destination,
        options: LaunchOptions,
    ) -> Result<Vec<ResultRow>> {
        let command = build_launch_command(&self.verb, selection, destination, options);
        info!(
            product = %selection.product,
            architecture = %selection.architecture,
            language = %selection.language,
            media = selection.media.as_deref().unwrap_or("-"),
            edition = %selection.edition,
            %destination,
            "launching media build"
        );
        self.pool.submit(command).await
    }
}
