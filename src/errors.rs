// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! The engine itself never hands these to its callers: every failure on the
//! execution path is folded into an [`ExecutionResult`](crate::exec::ExecutionResult).
//! They surface only from config loading, argument parsing and the binary.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CmdrunError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Invalid duration '{input}': {reason}")]
    InvalidDuration { input: String, reason: String },

    #[error("Invalid argument string: {0}")]
    ArgParse(String),

    #[error("Working directory {path:?} is not usable: {reason}")]
    WorkingDirectory { path: PathBuf, reason: String },

    #[error("Invalid timeout: {0}")]
    InvalidTimeout(String),

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Child process has no {0} pipe")]
    MissingPipe(&'static str),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, CmdrunError>;
