// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::errors::Result;
use crate::exec::{ModuleLocator, PoolOptions};
use crate::types::CascadeLayout;

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [engine]
/// program = "pwsh"
/// module_name = "MediaTool"
/// module_dirs = ["C:/Tools/Modules"]
///
/// [pool]
/// queue_length = 32
///
/// [cascade]
/// layout = "simple"
///
/// [verbs]
/// build_artifact = "New-MediaToolMedia"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub engine: EngineSection,

    #[serde(default)]
    pub pool: PoolSection,

    #[serde(default)]
    pub cascade: CascadeSection,

    #[serde(default)]
    pub verbs: EngineVerbs,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub engine: EngineSection,
    pub pool: PoolSection,
    pub cascade: CascadeSection,
    pub verbs: EngineVerbs,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            engine: raw.engine,
            pool: raw.pool,
            cascade: raw.cascade,
            verbs: raw.verbs,
        }
    }

    pub fn pool_options(&self) -> PoolOptions {
        PoolOptions {
            queue_length: self.pool.queue_length,
        }
    }

    /// Configured module directories, or the built-in candidates next to the
    /// running executable when none are configured.
    pub fn module_locator(&self) -> Result<ModuleLocator> {
        if self.engine.module_dirs.is_empty() {
            ModuleLocator::beside_current_exe(&self.engine.module_name)
        } else {
            Ok(ModuleLocator::new(
                self.engine.module_dirs.clone(),
                &self.engine.module_name,
            ))
        }
    }
}

/// `[engine]` section: how to start the engine and where its module lives.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Interpreter hosting the engine bridge.
    #[serde(default = "default_program")]
    pub program: String,

    #[serde(default = "default_args")]
    pub args: Vec<String>,

    /// Directory name of the engine module inside a module directory.
    #[serde(default = "default_module_name")]
    pub module_name: String,

    /// Directories searched for the module, in order. Empty means the
    /// built-in candidates next to the executable.
    #[serde(default)]
    pub module_dirs: Vec<PathBuf>,
}

fn default_program() -> String {
    "pwsh".to_string()
}

fn default_args() -> Vec<String> {
    [
        "-NoLogo",
        "-NoProfile",
        "-NonInteractive",
        "-ExecutionPolicy",
        "Bypass",
        "-File",
        "engine-bridge.ps1",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_module_name() -> String {
    "MediaTool".to_string()
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            program: default_program(),
            args: default_args(),
            module_name: default_module_name(),
            module_dirs: Vec::new(),
        }
    }
}

/// `[pool]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolSection {
    /// Depth of the job queue in front of the single engine worker.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,
}

fn default_queue_length() -> usize {
    32
}

impl Default for PoolSection {
    fn default() -> Self {
        Self {
            queue_length: default_queue_length(),
        }
    }
}

/// `[cascade]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CascadeSection {
    /// `"full"` (default) or `"simple"`.
    #[serde(default)]
    pub layout: CascadeLayout,
}

/// `[verbs]` section: engine command names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EngineVerbs {
    #[serde(default = "default_initialize")]
    pub initialize: String,

    #[serde(default = "default_list_catalog")]
    pub list_catalog: String,

    #[serde(default = "default_list_targets")]
    pub list_targets: String,

    #[serde(default = "default_build_artifact")]
    pub build_artifact: String,
}

fn default_initialize() -> String {
    "Initialize-MediaTool".to_string()
}

fn default_list_catalog() -> String {
    "Get-MediaToolList".to_string()
}

fn default_list_targets() -> String {
    "Get-MediaToolUSB".to_string()
}

fn default_build_artifact() -> String {
    "New-MediaToolMedia".to_string()
}

impl Default for EngineVerbs {
    fn default() -> Self {
        Self {
            initialize: default_initialize(),
            list_catalog: default_list_catalog(),
            list_targets: default_list_targets(),
            build_artifact: default_build_artifact(),
        }
    }
}

impl EngineVerbs {
    /// `(key, value)` pairs, for validation and display.
    pub fn entries(&self) -> [(&'static str, &str); 4] {
        [
            ("initialize", self.initialize.as_str()),
            ("list_catalog", self.list_catalog.as_str()),
            ("list_targets", self.list_targets.as_str()),
            ("build_artifact", self.build_artifact.as_str()),
        ]
    }
}
