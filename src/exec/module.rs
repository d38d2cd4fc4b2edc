// src/exec/module.rs

//! Locating the engine's extension module on disk.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::errors::{ForgeError, Result};
use crate::fs::FileSystem;

/// Ordered list of directories to search for the engine module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleLocator {
    candidates: Vec<PathBuf>,
    module_name: String,
}

impl ModuleLocator {
    pub fn new(candidates: Vec<PathBuf>, module_name: impl Into<String>) -> Self {
        Self {
            candidates,
            module_name: module_name.into(),
        }
    }

    /// `<base>/Modules`, then the development tree `<base>/../../Modules`.
    pub fn default_candidates(base_dir: &Path) -> Vec<PathBuf> {
        let mut out = vec![base_dir.join("Modules")];
        if let Some(root) = base_dir.ancestors().nth(2) {
            out.push(root.join("Modules"));
        }
        out
    }

    /// Candidates next to the running executable.
    pub fn beside_current_exe(module_name: impl Into<String>) -> Result<Self> {
        let exe = std::env::current_exe()?;
        let base = exe.parent().unwrap_or_else(|| Path::new("."));
        Ok(Self::new(Self::default_candidates(base), module_name))
    }

    pub fn candidates(&self) -> &[PathBuf] {
        &self.candidates
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// First existing candidate directory joined with the module name.
    pub fn resolve(&self, fs: &dyn FileSystem) -> Result<PathBuf> {
        for dir in &self.candidates {
            if fs.is_dir(dir) {
                let path = dir.join(&self.module_name);
                debug!(candidate = %dir.display(), module = %path.display(), "module directory found");
                return Ok(path);
            }
            debug!(candidate = %dir.display(), "module directory missing");
        }

        let searched = self
            .candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(ForgeError::Initialization(format!(
            "engine module '{}' not found; searched: [{searched}]",
            self.module_name
        )))
    }
}

