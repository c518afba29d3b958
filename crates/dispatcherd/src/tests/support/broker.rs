//! In-memory broker double shared by the source, sink and connector roles.
//!
//! Every handle clones the same state, so a scenario can queue commands and
//! inspect published results while the dispatcher owns its own ends.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dispatcher_config::PartitionSide;

use crate::broker::{
    BrokerConnector, BrokerError, BrokerSettings, CommandSource, InboundMessage,
    OutboundMessage, PublishError, ReceiveError, ResultSink, TopicTarget,
};

/// Queued inbound entry.
#[derive(Debug, Clone)]
enum Inbound {
    Payload(Vec<u8>),
    Failure(String),
}

#[derive(Debug, Default)]
struct BrokerState {
    inbound: VecDeque<Inbound>,
    next_offset: i64,
    published: Vec<OutboundMessage>,
    publish_failure: Option<String>,
    connect_failure: Option<PartitionSide>,
    connections: Vec<(PartitionSide, TopicTarget)>,
}

/// Shared in-memory broker.
#[derive(Debug, Clone, Default)]
pub struct MemoryBroker {
    state: Arc<Mutex<BrokerState>>,
}

impl MemoryBroker {
    fn with_state<T>(&self, action: impl FnOnce(&mut BrokerState) -> T) -> T {
        let mut state = self.state.lock().expect("broker state mutex poisoned");
        action(&mut state)
    }

    /// Queues a textual command payload.
    pub fn push_command(&self, text: &str) {
        self.push_payload(text.as_bytes().to_vec());
    }

    /// Queues raw payload bytes.
    pub fn push_payload(&self, payload: Vec<u8>) {
        self.with_state(|state| state.inbound.push_back(Inbound::Payload(payload)));
    }

    /// Queues a broker read failure.
    pub fn push_read_failure(&self, message: &str) {
        self.with_state(|state| {
            state
                .inbound
                .push_back(Inbound::Failure(message.to_owned()));
        });
    }

    /// Makes every subsequent publish fail.
    pub fn fail_publishing(&self, message: &str) {
        self.with_state(|state| state.publish_failure = Some(message.to_owned()));
    }

    /// Makes connecting the given side fail.
    pub fn fail_connecting(&self, side: PartitionSide) {
        self.with_state(|state| state.connect_failure = Some(side));
    }

    /// Number of inbound entries not yet read.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.with_state(|state| state.inbound.len())
    }

    /// Messages published so far.
    #[must_use]
    pub fn published(&self) -> Vec<OutboundMessage> {
        self.with_state(|state| state.published.clone())
    }

    /// Connections opened so far, in order.
    #[must_use]
    pub fn connections(&self) -> Vec<(PartitionSide, TopicTarget)> {
        self.with_state(|state| state.connections.clone())
    }

    /// Inbound handle.
    #[must_use]
    pub fn source(&self) -> MemorySource {
        MemorySource {
            broker: self.clone(),
        }
    }

    /// Outbound handle.
    #[must_use]
    pub fn sink(&self) -> MemorySink {
        MemorySink {
            broker: self.clone(),
        }
    }

    fn connect(&self, side: PartitionSide, target: &TopicTarget) -> Result<(), BrokerError> {
        self.with_state(|state| {
            if state.connect_failure == Some(side) {
                return Err(BrokerError::connect(
                    side,
                    "memory",
                    target.topic.as_str(),
                    "connection refused",
                ));
            }
            state.connections.push((side, target.clone()));
            Ok(())
        })
    }
}

/// Inbound end of [`MemoryBroker`].
#[derive(Debug, Clone)]
pub struct MemorySource {
    broker: MemoryBroker,
}

impl CommandSource for MemorySource {
    fn receive(&mut self, wait: Duration) -> Result<InboundMessage, ReceiveError> {
        self.broker.with_state(|state| match state.inbound.pop_front() {
            Some(Inbound::Payload(payload)) => {
                let offset = state.next_offset;
                state.next_offset += 1;
                Ok(InboundMessage::new(payload, 0, offset))
            }
            Some(Inbound::Failure(message)) => Err(ReceiveError::message(message)),
            None => Err(ReceiveError::TimedOut { wait }),
        })
    }
}

/// Outbound end of [`MemoryBroker`].
#[derive(Debug, Clone)]
pub struct MemorySink {
    broker: MemoryBroker,
}

impl ResultSink for MemorySink {
    fn publish(
        &mut self,
        message: &OutboundMessage,
        _deadline: Duration,
    ) -> Result<(), PublishError> {
        self.broker.with_state(|state| {
            if let Some(reason) = &state.publish_failure {
                return Err(PublishError::delivery(message.key.as_str(), reason.as_str()));
            }
            state.published.push(message.clone());
            Ok(())
        })
    }
}

impl BrokerConnector for MemoryBroker {
    type Source = MemorySource;
    type Sink = MemorySink;

    fn connect_sink(
        &self,
        _settings: &BrokerSettings,
        target: &TopicTarget,
    ) -> Result<MemorySink, BrokerError> {
        self.connect(PartitionSide::Write, target)?;
        Ok(self.sink())
    }

    fn connect_source(
        &self,
        _settings: &BrokerSettings,
        target: &TopicTarget,
    ) -> Result<MemorySource, BrokerError> {
        self.connect(PartitionSide::Read, target)?;
        Ok(self.source())
    }
}
