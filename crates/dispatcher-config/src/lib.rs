//! Shared configuration for the SpaceTraders command dispatcher.
//!
//! Configuration is resolved once at startup by [`ortho_config`], layering
//! defaults, an optional TOML file, `DISPATCHER_*` environment variables and
//! command-line flags (later layers win). The resulting [`Config`] is passed
//! by value into the daemon; nothing reads the environment after startup.

mod defaults;
mod options;
mod partition;
mod scalar;
mod token;

use std::sync::Arc;
use std::time::Duration;

use ortho_config::{OrthoConfig, OrthoError};
use serde::{Deserialize, Serialize};

use scalar::scalar_text;

pub use defaults::*;
pub use options::{FailureReporting, LogFormat, StartOffset};
pub use partition::{PartitionIndex, PartitionParseError, PartitionSide};
pub use token::ApiToken;

/// Resolved dispatcher configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, OrthoConfig)]
#[ortho_config(prefix = "DISPATCHER")]
pub struct Config {
    /// Topic holding inbound commands.
    #[ortho_config(default = default_topic_read())]
    #[serde(deserialize_with = "scalar_text")]
    pub topic_read: String,
    /// Topic receiving published results.
    #[ortho_config(default = default_topic_write())]
    #[serde(deserialize_with = "scalar_text")]
    pub topic_write: String,
    /// Broker bootstrap address (`host:port`).
    #[ortho_config(default = default_broker_address())]
    #[serde(deserialize_with = "scalar_text")]
    pub broker_address: String,
    /// Network protocol used to reach the broker.
    #[ortho_config(default = default_broker_protocol())]
    #[serde(deserialize_with = "scalar_text")]
    pub broker_protocol: String,
    /// Raw inbound partition index; parsed by [`Config::read_partition`].
    #[ortho_config(default = default_partition_text())]
    #[serde(deserialize_with = "scalar_text")]
    pub partition_read: String,
    /// Raw outbound partition index; parsed by [`Config::write_partition`].
    #[ortho_config(default = default_partition_text())]
    #[serde(deserialize_with = "scalar_text")]
    pub partition_write: String,
    /// Credential presented to the remote trading API.
    #[ortho_config(default = ApiToken::default())]
    pub user_token: ApiToken,
    /// Root URL of the remote trading API.
    #[ortho_config(default = default_api_base_url())]
    #[serde(deserialize_with = "scalar_text")]
    pub api_base_url: String,
    /// Per-request timeout for remote calls, in seconds.
    #[ortho_config(default = DEFAULT_API_TIMEOUT_SECS)]
    pub api_timeout_secs: u64,
    /// Consumer group used when reading the inbound partition.
    #[ortho_config(default = default_consumer_group())]
    #[serde(deserialize_with = "scalar_text")]
    pub consumer_group: String,
    /// Position of the first read.
    #[ortho_config(default = default_start_offset())]
    pub start_offset: StartOffset,
    /// Long-poll wait for each read, in seconds.
    #[ortho_config(default = DEFAULT_READ_WAIT_SECS)]
    pub read_wait_secs: u64,
    /// Byte budget for a single read.
    #[ortho_config(default = DEFAULT_READ_MAX_BYTES)]
    pub read_max_bytes: u32,
    /// Deadline for publishing one result, in seconds.
    #[ortho_config(default = DEFAULT_WRITE_DEADLINE_SECS)]
    pub write_deadline_secs: u64,
    /// Pause after each iteration and after read failures, in milliseconds.
    #[ortho_config(default = DEFAULT_ITERATION_DELAY_MS)]
    pub iteration_delay_ms: u64,
    /// Whether per-command failures are published downstream.
    #[ortho_config(default = default_failure_reporting())]
    pub failure_reporting: FailureReporting,
    /// `tracing_subscriber::EnvFilter` expression.
    #[ortho_config(default = default_log_filter_string())]
    #[serde(deserialize_with = "scalar_text")]
    pub log_filter: String,
    /// Log output format.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            topic_read: default_topic_read(),
            topic_write: default_topic_write(),
            broker_address: default_broker_address(),
            broker_protocol: default_broker_protocol(),
            partition_read: default_partition_text(),
            partition_write: default_partition_text(),
            user_token: ApiToken::default(),
            api_base_url: default_api_base_url(),
            api_timeout_secs: DEFAULT_API_TIMEOUT_SECS,
            consumer_group: default_consumer_group(),
            start_offset: default_start_offset(),
            read_wait_secs: DEFAULT_READ_WAIT_SECS,
            read_max_bytes: DEFAULT_READ_MAX_BYTES,
            write_deadline_secs: DEFAULT_WRITE_DEADLINE_SECS,
            iteration_delay_ms: DEFAULT_ITERATION_DELAY_MS,
            failure_reporting: default_failure_reporting(),
            log_filter: default_log_filter_string(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the process arguments, environment and files.
    ///
    /// # Errors
    ///
    /// Returns the aggregated loader error when any layer is malformed.
    pub fn load_from_process() -> Result<Self, Arc<OrthoError>> {
        <Self as OrthoConfig>::load()
    }

    /// Parses the inbound partition index.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionParseError`] when the configured text is unusable.
    pub fn read_partition(&self) -> Result<PartitionIndex, PartitionParseError> {
        PartitionIndex::parse(PartitionSide::Read, &self.partition_read)
    }

    /// Parses the outbound partition index.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionParseError`] when the configured text is unusable.
    pub fn write_partition(&self) -> Result<PartitionIndex, PartitionParseError> {
        PartitionIndex::parse(PartitionSide::Write, &self.partition_write)
    }

    /// Long-poll wait applied to each read.
    #[must_use]
    pub fn read_wait(&self) -> Duration {
        Duration::from_secs(self.read_wait_secs)
    }

    /// Deadline applied to each publish.
    #[must_use]
    pub fn write_deadline(&self) -> Duration {
        Duration::from_secs(self.write_deadline_secs)
    }

    /// Pause between iterations.
    #[must_use]
    pub fn iteration_delay(&self) -> Duration {
        Duration::from_millis(self.iteration_delay_ms)
    }

    /// Timeout applied to each remote call.
    #[must_use]
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }

    /// Returns the configured log filter expression.
    #[must_use]
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_str()
    }

    /// Returns the configured log format.
    #[must_use]
    pub fn log_format(&self) -> LogFormat {
        self.log_format
    }
}
