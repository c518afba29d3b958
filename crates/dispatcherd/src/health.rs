//! Structured health reporting for dispatcher lifecycle events.

use std::sync::Arc;

use dispatcher_config::{Config, PartitionParseError, PartitionSide};

use crate::bootstrap::BootstrapError;
use crate::broker::{BrokerError, PublishError, ReceiveError, TopicTarget};
use crate::dispatch::DispatchError;

const HEALTH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::health");

/// Observer trait used to surface lifecycle events to telemetry sinks.
pub trait HealthReporter: Send + Sync {
    /// Invoked before configuration loading begins.
    fn bootstrap_starting(&self);

    /// Invoked after bootstrap completes successfully.
    fn bootstrap_succeeded(&self, config: &Config);

    /// Invoked when bootstrap fails.
    fn bootstrap_failed(&self, error: &BootstrapError);

    /// Invoked when a malformed partition index is replaced by the default.
    fn partition_defaulted(&self, error: &PartitionParseError);

    /// Invoked after one side of the broker is connected.
    fn broker_connected(&self, side: PartitionSide, target: &TopicTarget);

    /// Invoked when a broker connection cannot be established.
    fn broker_failed(&self, error: &BrokerError);

    /// Invoked when a read fails or the read wait elapses without a message.
    fn read_failed(&self, error: &ReceiveError);

    /// Invoked when a command is dropped because it failed.
    fn command_failed(&self, error: &DispatchError);

    /// Invoked after a message is published.
    fn result_published(&self, key: &str);

    /// Invoked when the dispatch loop exits.
    fn dispatch_stopped(&self, error: Option<&PublishError>);
}

impl<T> HealthReporter for Arc<T>
where
    T: HealthReporter + ?Sized,
{
    fn bootstrap_starting(&self) {
        (**self).bootstrap_starting();
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        (**self).bootstrap_succeeded(config);
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        (**self).bootstrap_failed(error);
    }

    fn partition_defaulted(&self, error: &PartitionParseError) {
        (**self).partition_defaulted(error);
    }

    fn broker_connected(&self, side: PartitionSide, target: &TopicTarget) {
        (**self).broker_connected(side, target);
    }

    fn broker_failed(&self, error: &BrokerError) {
        (**self).broker_failed(error);
    }

    fn read_failed(&self, error: &ReceiveError) {
        (**self).read_failed(error);
    }

    fn command_failed(&self, error: &DispatchError) {
        (**self).command_failed(error);
    }

    fn result_published(&self, key: &str) {
        (**self).result_published(key);
    }

    fn dispatch_stopped(&self, error: Option<&PublishError>) {
        (**self).dispatch_stopped(error);
    }
}

/// Default reporter that records lifecycle events using `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuredHealthReporter;

impl StructuredHealthReporter {
    /// Builds a new reporter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl HealthReporter for StructuredHealthReporter {
    fn bootstrap_starting(&self) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_starting",
            "starting dispatcher bootstrap"
        );
    }

    fn bootstrap_succeeded(&self, config: &Config) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "bootstrap_succeeded",
            topic_read = %config.topic_read,
            topic_write = %config.topic_write,
            broker = %config.broker_address,
            failure_reporting = %config.failure_reporting,
            log_filter = %config.log_filter(),
            log_format = ?config.log_format(),
            "dispatcher bootstrap completed"
        );
    }

    fn bootstrap_failed(&self, error: &BootstrapError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "bootstrap_failed",
            error = %error,
            "dispatcher bootstrap failed"
        );
    }

    fn partition_defaulted(&self, error: &PartitionParseError) {
        tracing::warn!(
            target: HEALTH_TARGET,
            event = "partition_defaulted",
            side = %error.side(),
            error = %error,
            "partition index unusable, using 0"
        );
    }

    fn broker_connected(&self, side: PartitionSide, target: &TopicTarget) {
        tracing::info!(
            target: HEALTH_TARGET,
            event = "broker_connected",
            side = %side,
            topic = %target.topic,
            partition = target.partition.get(),
            "broker connection established"
        );
    }

    fn broker_failed(&self, error: &BrokerError) {
        tracing::error!(
            target: HEALTH_TARGET,
            event = "broker_failed",
            side = %error.side,
            address = %error.address,
            reason = %error.message(),
            error = ?error,
            "broker connection failed"
        );
    }

    fn read_failed(&self, error: &ReceiveError) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "read_failed",
            error = %error,
            "inbound read failed"
        );
    }

    fn command_failed(&self, error: &DispatchError) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "command_failed",
            kind = error.kind(),
            "command dropped"
        );
    }

    fn result_published(&self, key: &str) {
        tracing::debug!(
            target: HEALTH_TARGET,
            event = "result_published",
            key,
            "result published"
        );
    }

    fn dispatch_stopped(&self, error: Option<&PublishError>) {
        match error {
            Some(error) => tracing::error!(
                target: HEALTH_TARGET,
                event = "dispatch_stopped",
                error = %error,
                "dispatch loop stopped after a publish failure"
            ),
            None => tracing::info!(
                target: HEALTH_TARGET,
                event = "dispatch_stopped",
                "dispatch loop stopped"
            ),
        }
    }
}
