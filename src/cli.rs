// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::catalog::{Choice, SelectionLevel};
use crate::launcher::{Destination, LaunchOptions};

/// Command-line arguments for `isoforge`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "isoforge",
    version,
    about = "Resolve an installation media selection and build it through the automation engine.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Isoforge.toml` in the current working directory if present,
    /// otherwise built-in defaults.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `ISOFORGE_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    #[arg(long, value_name = "VERSION")]
    pub product: Option<String>,

    #[arg(long, value_name = "ARCH")]
    pub architecture: Option<String>,

    #[arg(long, value_name = "LANG")]
    pub language: Option<String>,

    #[arg(long, value_name = "MEDIA")]
    pub media: Option<String>,

    /// Edition to build, or `all` for every edition.
    #[arg(long, value_name = "EDITION")]
    pub edition: Option<String>,

    /// Write an ISO into this directory.
    #[arg(long, value_name = "DIR", conflicts_with = "usb")]
    pub iso_dir: Option<PathBuf>,

    /// Write to this removable drive (e.g. `E` or `E:`).
    #[arg(long, value_name = "DRIVE")]
    pub usb: Option<String>,

    /// Do not ask the engine to confirm destructive steps.
    #[arg(long)]
    pub no_prompt: bool,

    /// Recompress the install image.
    #[arg(long)]
    pub recompress: bool,

    /// Only print the resolved levels and removable targets; never launch.
    #[arg(long)]
    pub list: bool,

    /// Validate the config and print it with the module candidates, without
    /// starting the engine.
    #[arg(long)]
    pub dry_run: bool,
}

impl CliArgs {
    /// Requested choices in level order.
    pub fn choices(&self) -> Vec<(SelectionLevel, Choice)> {
        [
            (SelectionLevel::Product, &self.product),
            (SelectionLevel::Architecture, &self.architecture),
            (SelectionLevel::Language, &self.language),
            (SelectionLevel::Media, &self.media),
            (SelectionLevel::Edition, &self.edition),
        ]
        .into_iter()
        .filter_map(|(level, value)| {
            let value = value.as_deref()?;
            let choice = if level == SelectionLevel::Edition {
                Choice::parse(value)
            } else {
                Choice::value(value)
            };
            Some((level, choice))
        })
        .collect()
    }

    pub fn destination(&self) -> Option<Destination> {
        match (&self.iso_dir, &self.usb) {
            (Some(dir), _) => Some(Destination::Folder(dir.clone())),
            (None, Some(drive)) => Some(Destination::Drive(drive.clone())),
            (None, None) => None,
        }
    }

    pub fn launch_options(&self) -> LaunchOptions {
        LaunchOptions {
            skip_confirmation: self.no_prompt,
            recompress: self.recompress,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
