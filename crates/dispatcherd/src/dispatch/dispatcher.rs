//! The consume, route, publish loop.
//!
//! One command is processed at a time. Failures of a single command are
//! contained within its iteration; only a failed publish escapes, and it
//! stops the loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use dispatcher_config::{Config, FailureReporting};

use crate::broker::{
    CommandSource, InboundMessage, OutboundMessage, PublishError, ReceiveError, ResultSink,
};
use crate::health::HealthReporter;
use crate::remote::RemoteOperations;

use super::command::Command;
use super::correlation::{UNCORRELATED_KEY, correlation_key};
use super::errors::DispatchError;
use super::failure::FailureReport;
use super::pacing::Pacer;
use super::router::{ActionRouter, DISPATCH_TARGET};

/// Longest single poll; the shutdown flag is checked between polls.
pub const POLL_SLICE: Duration = Duration::from_secs(1);

/// Timing and reporting knobs for the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopSettings {
    /// Total wait for one inbound message before the read counts as failed.
    pub read_wait: Duration,
    /// Bound on one publish.
    pub write_deadline: Duration,
    /// Longest single poll within `read_wait`.
    pub poll_slice: Duration,
    /// Whether failed commands produce a failure report.
    pub failure_reporting: FailureReporting,
}

impl LoopSettings {
    /// Extracts the loop settings from the configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            read_wait: config.read_wait(),
            write_deadline: config.write_deadline(),
            poll_slice: POLL_SLICE,
            failure_reporting: config.failure_reporting,
        }
    }
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// What a single iteration did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IterationOutcome {
    /// The read failed or timed out.
    ReadFailed,
    /// Shutdown was requested while waiting for a message.
    Interrupted,
    /// The payload could not be decoded.
    DecodeFailed,
    /// The router refused the command before any remote call.
    Rejected {
        /// Requested action name, verbatim.
        action: String,
    },
    /// The remote call failed.
    RemoteFailed {
        /// Requested action name.
        action: String,
    },
    /// A result was published under `key`.
    Published {
        /// Correlation key of the published message.
        key: String,
    },
}

/// Sequential dispatcher owning both broker ends for its lifetime.
pub struct Dispatcher<S, K, R> {
    source: S,
    sink: K,
    remote: R,
    router: ActionRouter,
    settings: LoopSettings,
    pacer: Box<dyn Pacer>,
    reporter: Arc<dyn HealthReporter>,
}

impl<S, K, R> Dispatcher<S, K, R>
where
    S: CommandSource,
    K: ResultSink,
    R: RemoteOperations,
{
    /// Assembles a dispatcher from its collaborators.
    pub fn new(
        source: S,
        sink: K,
        remote: R,
        settings: LoopSettings,
        pacer: Box<dyn Pacer>,
        reporter: Arc<dyn HealthReporter>,
    ) -> Self {
        Self {
            source,
            sink,
            remote,
            router: ActionRouter::new(),
            settings,
            pacer,
            reporter,
        }
    }

    /// Runs iterations until `shutdown` is raised.
    ///
    /// # Errors
    ///
    /// Returns the [`PublishError`] that stopped the loop.
    pub fn run(&mut self, shutdown: &AtomicBool) -> Result<(), PublishError> {
        info!(target: DISPATCH_TARGET, "dispatch loop started");
        while !shutdown.load(Ordering::SeqCst) {
            if let Err(error) = self.run_once(shutdown) {
                self.reporter.dispatch_stopped(Some(&error));
                return Err(error);
            }
        }
        self.reporter.dispatch_stopped(None);
        Ok(())
    }

    /// Runs a single iteration: read, decode, route, invoke, publish.
    ///
    /// # Errors
    ///
    /// Returns [`PublishError`] when a result or failure report could not be
    /// published. Every other failure is reported through the outcome.
    pub fn run_once(&mut self, shutdown: &AtomicBool) -> Result<IterationOutcome, PublishError> {
        let message = match self.next_message(shutdown) {
            Ok(Some(message)) => message,
            Ok(None) => return Ok(IterationOutcome::Interrupted),
            Err(error) => {
                warn!(target: DISPATCH_TARGET, error = %error, "inbound read failed");
                self.reporter.read_failed(&error);
                self.pacer.after_read_error();
                return Ok(IterationOutcome::ReadFailed);
            }
        };

        let outcome = self.process(&message)?;
        self.pacer.after_iteration();
        Ok(outcome)
    }

    fn next_message(
        &mut self,
        shutdown: &AtomicBool,
    ) -> Result<Option<InboundMessage>, ReceiveError> {
        let started = Instant::now();
        loop {
            if shutdown.load(Ordering::SeqCst) {
                return Ok(None);
            }
            let remaining = self.settings.read_wait.saturating_sub(started.elapsed());
            match self.source.receive(remaining.min(self.settings.poll_slice)) {
                Ok(message) => return Ok(Some(message)),
                Err(error) if error.is_timeout() => {
                    if started.elapsed() >= self.settings.read_wait {
                        return Err(ReceiveError::TimedOut {
                            wait: self.settings.read_wait,
                        });
                    }
                }
                Err(error) => return Err(error),
            }
        }
    }

    fn process(&mut self, message: &InboundMessage) -> Result<IterationOutcome, PublishError> {
        let command = match Command::decode(&message.payload) {
            Ok(command) => command,
            Err(error) => {
                warn!(
                    target: DISPATCH_TARGET,
                    partition = message.partition,
                    offset = message.offset,
                    error = %error,
                    "failed to decode command"
                );
                self.report_failure(&error, UNCORRELATED_KEY, None)?;
                return Ok(IterationOutcome::DecodeFailed);
            }
        };
        debug!(target: DISPATCH_TARGET, command = %command, "command decoded");

        let key = correlation_key(&command).to_owned();
        match self.router.route(&command, &self.remote) {
            Ok(payload) => {
                self.publish(&OutboundMessage::new(key.as_str(), payload))?;
                Ok(IterationOutcome::Published { key })
            }
            Err(error) => {
                let action = command.action().to_owned();
                warn!(
                    target: DISPATCH_TARGET,
                    action = %action,
                    key = %key,
                    kind = error.kind(),
                    error = %error,
                    "command failed"
                );
                self.report_failure(&error, &key, Some(&action))?;
                if error.is_routing() {
                    Ok(IterationOutcome::Rejected { action })
                } else {
                    Ok(IterationOutcome::RemoteFailed { action })
                }
            }
        }
    }

    fn report_failure(
        &mut self,
        failure: &DispatchError,
        key: &str,
        action: Option<&str>,
    ) -> Result<(), PublishError> {
        self.reporter.command_failed(failure);
        if self.settings.failure_reporting != FailureReporting::Publish {
            return Ok(());
        }
        match FailureReport::new(failure, action).into_message(key) {
            Ok(report) => self.publish(&report),
            Err(encode) => {
                warn!(
                    target: DISPATCH_TARGET,
                    key,
                    error = %encode,
                    "failed to encode failure report"
                );
                Ok(())
            }
        }
    }

    fn publish(&mut self, message: &OutboundMessage) -> Result<(), PublishError> {
        match self.sink.publish(message, self.settings.write_deadline) {
            Ok(()) => {
                info!(
                    target: DISPATCH_TARGET,
                    key = %message.key,
                    bytes = message.payload.len(),
                    "result published"
                );
                self.reporter.result_published(&message.key);
                Ok(())
            }
            Err(publish_error) => {
                error!(
                    target: DISPATCH_TARGET,
                    key = %message.key,
                    error = %publish_error,
                    "failed to publish result"
                );
                Err(publish_error)
            }
        }
    }
}
