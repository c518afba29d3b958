//! Error types for the broker adapters.

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

use dispatcher_config::PartitionSide;

type BoxedSource = Box<dyn StdError + Send + Sync>;

/// Failure to establish a broker connection. Always fatal at startup.
#[derive(Debug, Error)]
#[error("failed to connect {side} side to broker at {address} (topic '{topic}'): {message}")]
pub struct BrokerError {
    /// Side being connected.
    pub side: PartitionSide,
    /// Broker address used.
    pub address: String,
    /// Topic being bound.
    pub topic: String,
    message: String,
    #[source]
    source: Option<BoxedSource>,
}

impl BrokerError {
    /// Builds a connection error.
    pub fn connect(
        side: PartitionSide,
        address: impl Into<String>,
        topic: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            side,
            address: address.into(),
            topic: topic.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Attaches the underlying cause.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<BoxedSource>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Short description of the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

/// Failure while waiting for the next inbound message.
#[derive(Debug, Error)]
pub enum ReceiveError {
    /// No message arrived within the wait budget.
    #[error("no message received within {}ms", .wait.as_millis())]
    TimedOut {
        /// Wait budget that elapsed.
        wait: Duration,
    },
    /// The broker reported an error.
    #[error("broker read failed: {message}")]
    Broker {
        /// Description of the failure.
        message: String,
        /// Underlying broker error.
        #[source]
        source: Option<BoxedSource>,
    },
}

impl ReceiveError {
    /// Builds a broker-side read error.
    pub fn broker(message: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Self::Broker {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Builds a read error without an underlying cause.
    pub fn message(message: impl Into<String>) -> Self {
        Self::Broker {
            message: message.into(),
            source: None,
        }
    }

    /// Returns `true` when the wait budget elapsed without a message.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }
}

/// Failure while publishing a result. Always fatal to the process.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The message could not be queued for sending.
    #[error("failed to enqueue result for key '{key}': {source}")]
    Enqueue {
        /// Key of the rejected message.
        key: String,
        /// Underlying broker error.
        #[source]
        source: BoxedSource,
    },
    /// Queued messages were not flushed before the deadline.
    #[error("result for key '{key}' not flushed within {}ms", .deadline.as_millis())]
    Flush {
        /// Key of the pending message.
        key: String,
        /// Deadline that elapsed.
        deadline: Duration,
    },
    /// The broker rejected the message after sending.
    #[error("broker rejected result for key '{key}': {message}")]
    Delivery {
        /// Key of the rejected message.
        key: String,
        /// Delivery failure description.
        message: String,
    },
}

impl PublishError {
    /// Builds an enqueue failure.
    pub fn enqueue(key: impl Into<String>, source: impl Into<BoxedSource>) -> Self {
        Self::Enqueue {
            key: key.into(),
            source: source.into(),
        }
    }

    /// Builds a delivery failure.
    pub fn delivery(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Delivery {
            key: key.into(),
            message: message.into(),
        }
    }
}
