#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use cmdrun::config::{ConfigFile, EngineSection, RawConfigFile};
use cmdrun::exec::{ArgList, Invocation};
use cmdrun::types::HumanDuration;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                engine: EngineSection::default(),
                env: BTreeMap::new(),
            },
        }
    }

    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.config.engine.default_timeout = HumanDuration(timeout);
        self
    }

    pub fn kill_grace(mut self, grace: Duration) -> Self {
        self.config.engine.kill_grace = HumanDuration(grace);
        self
    }

    pub fn kill_process_tree(mut self, val: bool) -> Self {
        self.config.engine.kill_process_tree = val;
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.config.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn build_raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// `sh -c <script>` in `dir`, the workhorse of the engine tests.
pub fn sh(script: &str, dir: &Path) -> Invocation {
    Invocation::new("sh", dir).with_args(ArgList::new().arg("-c").arg(script))
}
