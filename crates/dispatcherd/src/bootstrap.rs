//! Dispatcher bootstrap orchestration.

use std::sync::Arc;

use ortho_config::OrthoError;
use thiserror::Error;

use dispatcher_config::{Config, PartitionIndex, PartitionParseError, PartitionSide};

use crate::broker::{
    BrokerConnector, BrokerError, BrokerSettings, CommandSource, ResultSink, TopicTarget,
};
use crate::dispatch::{Dispatcher, LoopSettings, Pacer};
use crate::health::HealthReporter;
use crate::remote::RemoteOperations;
use crate::telemetry::{self, TelemetryError};

/// Trait abstracting configuration loading for testability.
pub trait ConfigLoader: Send + Sync {
    /// Loads the dispatcher configuration.
    fn load(&self) -> Result<Config, Arc<OrthoError>>;
}

/// Loader reading CLI arguments, environment and configuration files.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemConfigLoader;

impl ConfigLoader for SystemConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Config::load_from_process()
    }
}

/// Loader that always returns the same configuration.
#[derive(Debug, Clone)]
pub struct StaticConfigLoader {
    config: Config,
}

impl StaticConfigLoader {
    /// Wraps an already resolved configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }
}

impl ConfigLoader for StaticConfigLoader {
    fn load(&self) -> Result<Config, Arc<OrthoError>> {
        Ok(self.config.clone())
    }
}

/// Errors surfaced during bootstrap.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// Configuration failed to load.
    #[error("failed to load configuration: {source}")]
    Configuration {
        /// Underlying loader error.
        #[source]
        source: Arc<OrthoError>,
    },
    /// Telemetry initialisation failed.
    #[error("failed to initialise telemetry: {source}")]
    Telemetry {
        /// Underlying telemetry error.
        #[source]
        source: TelemetryError,
    },
    /// A broker connection could not be established.
    #[error("failed to connect to broker: {source}")]
    Broker {
        /// Underlying connection error.
        #[source]
        source: BrokerError,
    },
}

/// Result of a successful bootstrap: configuration plus both broker ends.
pub struct Daemon<S, K> {
    config: Config,
    source: S,
    sink: K,
    reporter: Arc<dyn HealthReporter>,
}

impl<S, K> Daemon<S, K> {
    /// Accessor for the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<S, K> Daemon<S, K>
where
    S: CommandSource,
    K: ResultSink,
{
    /// Hands the broker ends to a dispatcher calling `remote`.
    pub fn into_dispatcher<R>(self, remote: R, pacer: Box<dyn Pacer>) -> Dispatcher<S, K, R>
    where
        R: RemoteOperations,
    {
        let settings = LoopSettings::from_config(&self.config);
        Dispatcher::new(
            self.source,
            self.sink,
            remote,
            settings,
            pacer,
            self.reporter,
        )
    }
}

/// Parses a partition index, falling back to the default when malformed.
fn resolve_partition(
    parsed: Result<PartitionIndex, PartitionParseError>,
    reporter: &dyn HealthReporter,
) -> PartitionIndex {
    parsed.unwrap_or_else(|error| {
        reporter.partition_defaulted(&error);
        PartitionIndex::default()
    })
}

/// Bootstraps the dispatcher using the supplied collaborators.
///
/// The write side is connected before the read side, so no command is
/// consumed unless its result can be published.
pub fn bootstrap_with<C>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    connector: &C,
) -> Result<Daemon<C::Source, C::Sink>, BootstrapError>
where
    C: BrokerConnector,
{
    reporter.bootstrap_starting();

    let config = match loader.load() {
        Ok(config) => config,
        Err(source) => {
            let error = BootstrapError::Configuration { source };
            reporter.bootstrap_failed(&error);
            return Err(error);
        }
    };

    if let Err(source) = telemetry::initialise(&config) {
        let error = BootstrapError::Telemetry { source };
        reporter.bootstrap_failed(&error);
        return Err(error);
    }

    let settings = BrokerSettings::from_config(&config);
    let write_target = TopicTarget::new(
        config.topic_write.as_str(),
        resolve_partition(config.write_partition(), &*reporter),
    );
    let read_target = TopicTarget::new(
        config.topic_read.as_str(),
        resolve_partition(config.read_partition(), &*reporter),
    );

    let sink = connector
        .connect_sink(&settings, &write_target)
        .map_err(|source| broker_failure(&*reporter, source))?;
    reporter.broker_connected(PartitionSide::Write, &write_target);

    let source = connector
        .connect_source(&settings, &read_target)
        .map_err(|source| broker_failure(&*reporter, source))?;
    reporter.broker_connected(PartitionSide::Read, &read_target);

    reporter.bootstrap_succeeded(&config);
    Ok(Daemon {
        config,
        source,
        sink,
        reporter,
    })
}

fn broker_failure(reporter: &dyn HealthReporter, source: BrokerError) -> BootstrapError {
    reporter.broker_failed(&source);
    let error = BootstrapError::Broker { source };
    reporter.bootstrap_failed(&error);
    error
}
