//! Test configuration loaders for scenarios covering success and failure paths.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::{OrthoConfig, OrthoError};

use dispatcher_config::Config;

use crate::bootstrap::ConfigLoader;

/// Loader returning a quiet configuration with tweakable fields.
#[derive(Debug, Clone)]
pub struct TestConfigLoader {
    config: Config,
}

impl TestConfigLoader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: Config {
                log_filter: "off".to_owned(),
                ..Config::default()
            },
        }
    }

    /// Overrides the raw partition texts.
    #[must_use]
    pub fn with_partitions(mut self, read: &str, write: &str) -> Self {
        self.config.partition_read = read.to_owned();
        self.config.partition_write = write.to_owned();
        self
    }
}

impl Default for TestConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader for TestConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Loader that intentionally fails by passing a non-numeric wait.
pub struct FailingConfigLoader;

impl ConfigLoader for FailingConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        let args = vec![
            OsString::from("dispatcherd"),
            OsString::from("--read-wait-secs"),
            OsString::from("soon"),
        ];
        Config::load_from_iter(args)
    }
}
