// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ForgeError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ForgeError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_engine(cfg)?;
    validate_pool(cfg)?;
    validate_verbs(cfg)?;
    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    if cfg.engine.program.trim().is_empty() {
        return Err(ForgeError::ConfigError(
            "[engine].program must not be empty".to_string(),
        ));
    }
    if cfg.engine.module_name.trim().is_empty() {
        return Err(ForgeError::ConfigError(
            "[engine].module_name must not be empty".to_string(),
        ));
    }
    if cfg.engine.module_dirs.iter().any(|d| d.as_os_str().is_empty()) {
        return Err(ForgeError::ConfigError(
            "[engine].module_dirs must not contain empty paths".to_string(),
        ));
    }
    Ok(())
}

fn validate_pool(cfg: &RawConfigFile) -> Result<()> {
    if cfg.pool.queue_length == 0 {
        return Err(ForgeError::ConfigError(
            "[pool].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn validate_verbs(cfg: &RawConfigFile) -> Result<()> {
    for (key, verb) in cfg.verbs.entries() {
        if verb.is_empty() {
            return Err(ForgeError::ConfigError(format!(
                "[verbs].{key} must not be empty"
            )));
        }
        if verb.chars().any(char::is_whitespace) {
            return Err(ForgeError::ConfigError(format!(
                "[verbs].{key} must be a single command name (got '{verb}')"
            )));
        }
    }
    Ok(())
}
