// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CmdrunError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::CmdrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.engine, raw.env))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_engine(cfg)?;
    validate_env(cfg)?;
    Ok(())
}

fn validate_engine(cfg: &RawConfigFile) -> Result<()> {
    // Duration syntax is checked during deserialization; only the ranges
    // are left to check here.
    if cfg.engine.default_timeout.as_duration().is_zero() {
        return Err(CmdrunError::ConfigError(
            "[engine].default_timeout must be greater than zero".to_string(),
        ));
    }

    if cfg.engine.kill_grace.as_duration().is_zero() {
        return Err(CmdrunError::ConfigError(
            "[engine].kill_grace must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_env(cfg: &RawConfigFile) -> Result<()> {
    for (key, value) in cfg.env.iter() {
        if key.is_empty() {
            return Err(CmdrunError::ConfigError(
                "[env] contains an empty variable name".to_string(),
            ));
        }
        if key.contains('=') || key.contains('\0') {
            return Err(CmdrunError::ConfigError(format!(
                "[env] variable name '{}' must not contain '=' or NUL",
                key.escape_default()
            )));
        }
        if value.contains('\0') {
            return Err(CmdrunError::ConfigError(format!(
                "[env] value of '{}' must not contain NUL",
                key
            )));
        }
    }
    Ok(())
}
