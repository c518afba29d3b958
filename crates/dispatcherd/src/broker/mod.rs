//! Message broker seams.
//!
//! The dispatch loop reads through a [`CommandSource`] and writes through a
//! [`ResultSink`]. A [`BrokerConnector`] opens both ends once at startup; the
//! Kafka adapter lives in [`kafka`], and tests plug in in-memory doubles.

mod errors;
pub mod kafka;

use std::time::Duration;

use dispatcher_config::{Config, PartitionIndex, StartOffset};

pub use errors::{BrokerError, PublishError, ReceiveError};

/// Tracing target for broker operations.
pub(crate) const BROKER_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::broker");

/// Message read from the inbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Raw command payload.
    pub payload: Vec<u8>,
    /// Partition the message came from.
    pub partition: i32,
    /// Offset of the message within its partition.
    pub offset: i64,
}

impl InboundMessage {
    /// Builds an inbound message.
    #[must_use]
    pub fn new(payload: impl Into<Vec<u8>>, partition: i32, offset: i64) -> Self {
        Self {
            payload: payload.into(),
            partition,
            offset,
        }
    }
}

/// Message written to the outbound stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Correlation key.
    pub key: String,
    /// Result payload.
    pub payload: Vec<u8>,
}

impl OutboundMessage {
    /// Builds an outbound message.
    #[must_use]
    pub fn new(key: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }
}

/// Topic and partition one side of the dispatcher is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicTarget {
    /// Topic name.
    pub topic: String,
    /// Partition index.
    pub partition: PartitionIndex,
}

impl TopicTarget {
    /// Builds a target.
    #[must_use]
    pub fn new(topic: impl Into<String>, partition: PartitionIndex) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }
}

/// Connection settings shared by both ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerSettings {
    /// Bootstrap address, `host:port`.
    pub address: String,
    /// Transport protocol name.
    pub protocol: String,
    /// Consumer group used for the read side.
    pub consumer_group: String,
    /// Where reading starts when no committed offset applies.
    pub start_offset: StartOffset,
    /// Per-read byte budget.
    pub read_max_bytes: u32,
    /// Bound on a single publish.
    pub write_deadline: Duration,
}

impl BrokerSettings {
    /// Extracts the broker settings from the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            address: config.broker_address.clone(),
            protocol: config.broker_protocol.clone(),
            consumer_group: config.consumer_group.clone(),
            start_offset: config.start_offset,
            read_max_bytes: config.read_max_bytes,
            write_deadline: config.write_deadline(),
        }
    }
}

/// Inbound end of the broker.
pub trait CommandSource: Send {
    /// Blocks for at most `wait` until the next message arrives.
    ///
    /// # Errors
    ///
    /// Returns [`ReceiveError::TimedOut`] when nothing arrived in time, or
    /// [`ReceiveError::Broker`] when the broker reported a failure.
    fn receive(&mut self, wait: Duration) -> Result<InboundMessage, ReceiveError>;
}

/// Outbound end of the broker.
pub trait ResultSink: Send {
    /// Publishes `message`, blocking for at most `deadline`.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when the message was not delivered.
    fn publish(&mut self, message: &OutboundMessage, deadline: Duration)
    -> Result<(), PublishError>;
}

/// Factory opening the two broker ends.
pub trait BrokerConnector {
    /// Inbound end type.
    type Source: CommandSource;
    /// Outbound end type.
    type Sink: ResultSink;

    /// Opens the outbound end.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the broker cannot be reached.
    fn connect_sink(
        &self,
        settings: &BrokerSettings,
        target: &TopicTarget,
    ) -> Result<Self::Sink, BrokerError>;

    /// Opens the inbound end.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError`] when the broker cannot be reached.
    fn connect_source(
        &self,
        settings: &BrokerSettings,
        target: &TopicTarget,
    ) -> Result<Self::Source, BrokerError>;
}

impl<T> CommandSource for Box<T>
where
    T: CommandSource + ?Sized,
{
    fn receive(&mut self, wait: Duration) -> Result<InboundMessage, ReceiveError> {
        (**self).receive(wait)
    }
}

impl<T> ResultSink for Box<T>
where
    T: ResultSink + ?Sized,
{
    fn publish(
        &mut self,
        message: &OutboundMessage,
        deadline: Duration,
    ) -> Result<(), PublishError> {
        (**self).publish(message, deadline)
    }
}
