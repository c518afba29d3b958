//! Test double for [`HealthReporter`] that records structured events for assertions.

use std::sync::Mutex;

use dispatcher_config::{Config, PartitionParseError, PartitionSide};

use crate::bootstrap::BootstrapError;
use crate::broker::{BrokerError, PublishError, ReceiveError, TopicTarget};
use crate::dispatch::DispatchError;
use crate::health::HealthReporter;

/// Structured health events tracked during scenarios.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthEvent {
    /// Bootstrap started.
    BootstrapStarting,
    /// Bootstrap completed successfully.
    BootstrapSucceeded,
    /// Bootstrap failed with an error description.
    BootstrapFailed(String),
    /// A partition index fell back to the default.
    PartitionDefaulted(PartitionSide),
    /// A broker side connected.
    BrokerConnected(PartitionSide),
    /// A broker side failed to connect.
    BrokerFailed(PartitionSide),
    /// A read failed.
    ReadFailed,
    /// A command was dropped; carries the failure kind.
    CommandFailed(&'static str),
    /// A message was published under the given key.
    ResultPublished(String),
    /// The loop stopped; `true` when a publish failure stopped it.
    DispatchStopped(bool),
}

/// Records health events for assertions.
#[derive(Debug, Default)]
pub struct RecordingHealthReporter {
    events: Mutex<Vec<HealthEvent>>,
}

impl RecordingHealthReporter {
    /// Captures a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HealthEvent> {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .clone()
    }

    /// Counts dropped commands of the given kind.
    #[must_use]
    pub fn command_failures(&self, kind: &str) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, HealthEvent::CommandFailed(recorded) if *recorded == kind))
            .count()
    }

    fn record(&self, event: HealthEvent) {
        self.events
            .lock()
            .expect("health reporter mutex poisoned")
            .push(event);
    }
}

impl HealthReporter for RecordingHealthReporter {
    fn bootstrap_starting(&self) {
        self.record(HealthEvent::BootstrapStarting);
    }

    fn bootstrap_succeeded(&self, _config: &Config) {
        self.record(HealthEvent::BootstrapSucceeded);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        self.record(HealthEvent::BootstrapFailed(error.to_string()));
    }

    fn partition_defaulted(&self, error: &PartitionParseError) {
        self.record(HealthEvent::PartitionDefaulted(error.side()));
    }

    fn broker_connected(&self, side: PartitionSide, _target: &TopicTarget) {
        self.record(HealthEvent::BrokerConnected(side));
    }

    fn broker_failed(&self, error: &BrokerError) {
        self.record(HealthEvent::BrokerFailed(error.side));
    }

    fn read_failed(&self, _error: &ReceiveError) {
        self.record(HealthEvent::ReadFailed);
    }

    fn command_failed(&self, error: &DispatchError) {
        self.record(HealthEvent::CommandFailed(error.kind()));
    }

    fn result_published(&self, key: &str) {
        self.record(HealthEvent::ResultPublished(key.to_owned()));
    }

    fn dispatch_stopped(&self, error: Option<&PublishError>) {
        self.record(HealthEvent::DispatchStopped(error.is_some()));
    }
}
