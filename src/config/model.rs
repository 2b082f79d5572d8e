// src/config/model.rs

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::exec::engine::{DEFAULT_KILL_GRACE, DEFAULT_TIMEOUT, EngineConfig};
use crate::types::HumanDuration;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [engine]
/// default_timeout = "2m"
/// kill_grace = "500ms"
/// kill_process_tree = true
///
/// [env]
/// GIT_TERMINAL_PROMPT = "0"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfigFile {
    /// Engine behaviour from `[engine]`.
    #[serde(default)]
    pub engine: EngineSection,

    /// Extra environment variables for every child, from `[env]`.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

/// `[engine]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Timeout for invocations that don't set their own.
    #[serde(default = "default_timeout")]
    pub default_timeout: HumanDuration,

    /// How long to keep draining output after a kill.
    #[serde(default = "default_kill_grace")]
    pub kill_grace: HumanDuration,

    /// Kill the child's whole process group on timeout.
    #[serde(default = "default_kill_process_tree")]
    pub kill_process_tree: bool,
}

fn default_timeout() -> HumanDuration {
    HumanDuration(DEFAULT_TIMEOUT)
}

fn default_kill_grace() -> HumanDuration {
    HumanDuration(DEFAULT_KILL_GRACE)
}

fn default_kill_process_tree() -> bool {
    true
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            default_timeout: default_timeout(),
            kill_grace: default_kill_grace(),
            kill_process_tree: default_kill_process_tree(),
        }
    }
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)` or
/// [`load_and_validate`](crate::config::load_and_validate).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    engine: EngineSection,
    env: BTreeMap<String, String>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(engine: EngineSection, env: BTreeMap<String, String>) -> Self {
        Self { engine, env }
    }

    /// Settings for [`CommandEngine::new`](crate::exec::CommandEngine::new).
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            default_timeout: self.engine.default_timeout.as_duration(),
            kill_grace: self.engine.kill_grace.as_duration(),
            kill_process_tree: self.engine.kill_process_tree,
            env: self.env.clone(),
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(EngineSection::default(), BTreeMap::new())
    }
}
