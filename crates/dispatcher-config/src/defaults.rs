use crate::options::{FailureReporting, LogFormat, StartOffset};

/// Topic consumed for inbound commands when none is configured.
pub const DEFAULT_TOPIC_READ: &str = "dispatcher-commands";

/// Topic receiving published results when none is configured.
pub const DEFAULT_TOPIC_WRITE: &str = "dispatcher-results";

/// Broker contacted when no address is configured.
pub const DEFAULT_BROKER_ADDRESS: &str = "localhost:9092";

/// Network protocol label understood by the broker adapters.
pub const DEFAULT_BROKER_PROTOCOL: &str = "tcp";

/// Partition index used on either side when the configured value is unusable.
pub const DEFAULT_PARTITION: i32 = 0;

/// Root of the remote trading API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.spacetraders.io";

/// Per-request timeout applied by the remote API client.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 30;

/// Consumer group recorded against the inbound partition.
pub const DEFAULT_CONSUMER_GROUP: &str = "spacetraders-dispatcher";

/// Upper bound on a single blocking read: one hour.
pub const DEFAULT_READ_WAIT_SECS: u64 = 3600;

/// Byte budget for a single fetch from the inbound partition.
pub const DEFAULT_READ_MAX_BYTES: u32 = 1_000_000;

/// Deadline for publishing one result.
pub const DEFAULT_WRITE_DEADLINE_SECS: u64 = 10;

/// Pause between iterations and after read failures.
pub const DEFAULT_ITERATION_DELAY_MS: u64 = 500;

/// Default log filter expression used by the daemon.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Owned inbound topic default.
pub fn default_topic_read() -> String {
    DEFAULT_TOPIC_READ.to_owned()
}

/// Owned outbound topic default.
pub fn default_topic_write() -> String {
    DEFAULT_TOPIC_WRITE.to_owned()
}

/// Owned broker address default.
pub fn default_broker_address() -> String {
    DEFAULT_BROKER_ADDRESS.to_owned()
}

/// Owned broker protocol default.
pub fn default_broker_protocol() -> String {
    DEFAULT_BROKER_PROTOCOL.to_owned()
}

/// Raw partition text matching [`DEFAULT_PARTITION`].
pub fn default_partition_text() -> String {
    DEFAULT_PARTITION.to_string()
}

/// Owned API base URL default.
pub fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_owned()
}

/// Owned consumer group default.
pub fn default_consumer_group() -> String {
    DEFAULT_CONSUMER_GROUP.to_owned()
}

/// Default log filter expression used by the daemon.
pub fn default_log_filter_string() -> String {
    DEFAULT_LOG_FILTER.to_owned()
}

/// Default logging format for the daemon.
pub fn default_log_format() -> LogFormat {
    LogFormat::Json
}

/// Default position for the first read of the inbound partition.
pub fn default_start_offset() -> StartOffset {
    StartOffset::Beginning
}

/// Default handling of per-command failures.
pub fn default_failure_reporting() -> FailureReporting {
    FailureReporting::Silent
}
