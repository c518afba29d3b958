//! BDD test worlds: broker, remote, pacer and reporter doubles plus the
//! outcomes observed while stepping the dispatcher.

use std::cell::RefCell;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use dispatcher_config::FailureReporting;

use crate::bootstrap::{BootstrapError, ConfigLoader, Daemon, bootstrap_with};
use crate::broker::PublishError;
use crate::dispatch::{Dispatcher, IterationOutcome, LoopSettings};

use super::broker::{MemoryBroker, MemorySink, MemorySource};
use super::config_loader::{FailingConfigLoader, TestConfigLoader};
use super::pacer::RecordingPacer;
use super::remote::RecordingRemote;
use super::reporter::RecordingHealthReporter;

/// Scenario world for the dispatch loop.
pub struct DispatchWorld {
    pub broker: MemoryBroker,
    pub remote: RecordingRemote,
    pub pacer: RecordingPacer,
    pub reporter: Arc<RecordingHealthReporter>,
    pub settings: LoopSettings,
    outcomes: Vec<IterationOutcome>,
    fatal: Option<PublishError>,
}

impl DispatchWorld {
    #[must_use]
    pub fn new() -> Self {
        Self {
            broker: MemoryBroker::default(),
            remote: RecordingRemote::default(),
            pacer: RecordingPacer::default(),
            reporter: Arc::new(RecordingHealthReporter::default()),
            settings: LoopSettings {
                read_wait: Duration::ZERO,
                ..LoopSettings::default()
            },
            outcomes: Vec::new(),
            fatal: None,
        }
    }

    /// Switches failure reporting mode.
    pub fn set_failure_reporting(&mut self, mode: FailureReporting) {
        self.settings.failure_reporting = mode;
    }

    fn dispatcher(&self) -> Dispatcher<MemorySource, MemorySink, RecordingRemote> {
        Dispatcher::new(
            self.broker.source(),
            self.broker.sink(),
            self.remote.clone(),
            self.settings,
            Box::new(self.pacer.clone()),
            self.reporter.clone(),
        )
    }

    /// Runs iterations until the inbound queue drains or a publish fails.
    pub fn drain(&mut self) {
        let mut dispatcher = self.dispatcher();
        let shutdown = AtomicBool::new(false);
        while self.broker.pending() > 0 {
            match dispatcher.run_once(&shutdown) {
                Ok(outcome) => self.outcomes.push(outcome),
                Err(error) => {
                    self.fatal = Some(error);
                    break;
                }
            }
        }
    }

    /// Outcomes observed so far.
    #[must_use]
    pub fn outcomes(&self) -> &[IterationOutcome] {
        &self.outcomes
    }

    /// Publish failure that stopped the loop, if any.
    #[must_use]
    pub fn fatal(&self) -> Option<&PublishError> {
        self.fatal.as_ref()
    }
}

impl Default for DispatchWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default dispatch world fixture.
#[must_use]
pub fn dispatch_world() -> RefCell<DispatchWorld> {
    RefCell::new(DispatchWorld::new())
}

/// Scenario world for the bootstrap sequence.
pub struct BootstrapWorld {
    loader: Box<dyn ConfigLoader>,
    pub broker: MemoryBroker,
    pub reporter: Arc<RecordingHealthReporter>,
    daemon: Option<Daemon<MemorySource, MemorySink>>,
    bootstrap_error: Option<BootstrapError>,
}

impl BootstrapWorld {
    #[must_use]
    pub fn new() -> Self {
        Self {
            loader: Box::new(TestConfigLoader::new()),
            broker: MemoryBroker::default(),
            reporter: Arc::new(RecordingHealthReporter::default()),
            daemon: None,
            bootstrap_error: None,
        }
    }

    /// Installs a loader that always fails.
    pub fn use_failing_loader(&mut self) {
        self.loader = Box::new(FailingConfigLoader);
    }

    /// Installs a loader with the given raw partition texts.
    pub fn use_partitions(&mut self, read: &str, write: &str) {
        self.loader = Box::new(TestConfigLoader::new().with_partitions(read, write));
    }

    /// Runs the bootstrap sequence once.
    pub fn bootstrap(&mut self) {
        if self.daemon.is_some() || self.bootstrap_error.is_some() {
            return;
        }
        match bootstrap_with(&*self.loader, self.reporter.clone(), &self.broker) {
            Ok(daemon) => self.daemon = Some(daemon),
            Err(error) => self.bootstrap_error = Some(error),
        }
    }

    /// Returns whether bootstrap produced an error.
    #[must_use]
    pub fn bootstrap_error(&self) -> Option<&BootstrapError> {
        self.bootstrap_error.as_ref()
    }

    /// Returns true when the daemon handle is available.
    #[must_use]
    pub fn daemon_started(&self) -> bool {
        self.daemon.is_some()
    }
}

impl Default for BootstrapWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Default bootstrap world fixture.
#[must_use]
pub fn bootstrap_world() -> RefCell<BootstrapWorld> {
    RefCell::new(BootstrapWorld::new())
}
