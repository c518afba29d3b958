//! Process entry point: signal handling, wiring and the blocking run.

use std::io;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

use signal_hook::consts::signal::{SIGHUP, SIGINT, SIGQUIT, SIGTERM};
use signal_hook::flag;
use thiserror::Error;
use tracing::info;

use spacetraders_client::{Client, ClientError};

use crate::bootstrap::{BootstrapError, ConfigLoader, SystemConfigLoader, bootstrap_with};
use crate::broker::kafka::KafkaConnector;
use crate::broker::{BrokerConnector, PublishError};
use crate::dispatch::FixedPacer;
use crate::health::{HealthReporter, StructuredHealthReporter};

const PROCESS_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::process");

/// Signals that request a graceful stop. A second signal exits immediately.
pub const TERMINATION_SIGNALS: [i32; 4] = [SIGTERM, SIGINT, SIGQUIT, SIGHUP];

/// Errors that terminate the dispatcher process.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// Bootstrap failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
    /// Signal handlers could not be installed.
    #[error("failed to install signal handlers: {source}")]
    Signals {
        /// Underlying registration error.
        #[source]
        source: io::Error,
    },
    /// The remote API client could not be constructed.
    #[error("failed to build API client: {source}")]
    Client {
        /// Underlying client error.
        #[source]
        source: ClientError,
    },
    /// Publishing a result failed, which stops the dispatcher.
    #[error("dispatch stopped: {source}")]
    Publish {
        /// Underlying publish error.
        #[source]
        source: PublishError,
    },
}

/// Runs the dispatcher with production collaborators until a termination
/// signal arrives or a publish fails.
///
/// # Errors
///
/// Returns [`LaunchError`] describing why the process must exit non-zero.
pub fn run_dispatcher() -> Result<(), LaunchError> {
    let shutdown = install_shutdown_flag()?;
    let reporter: Arc<dyn HealthReporter> = Arc::new(StructuredHealthReporter::new());
    run_dispatcher_with(
        &SystemConfigLoader,
        reporter,
        &KafkaConnector::new(),
        &shutdown,
    )
}

/// Runs the dispatcher with the supplied collaborators.
///
/// # Errors
///
/// Returns [`LaunchError`] when bootstrap fails, the API client cannot be
/// built, or a publish fails.
pub fn run_dispatcher_with<C>(
    loader: &dyn ConfigLoader,
    reporter: Arc<dyn HealthReporter>,
    connector: &C,
    shutdown: &AtomicBool,
) -> Result<(), LaunchError>
where
    C: BrokerConnector,
{
    let daemon = bootstrap_with(loader, reporter, connector)?;
    let config = daemon.config();
    let client = Client::new(
        &config.api_base_url,
        config.user_token.expose(),
        config.api_timeout(),
    )
    .map_err(|source| LaunchError::Client { source })?;
    info!(
        target: PROCESS_TARGET,
        api = %client.base_url(),
        "remote API client ready"
    );

    let pacer = Box::new(FixedPacer::from_config(config));
    let mut dispatcher = daemon.into_dispatcher(client, pacer);
    dispatcher
        .run(shutdown)
        .map_err(|source| LaunchError::Publish { source })?;

    info!(target: PROCESS_TARGET, "dispatcher exiting");
    Ok(())
}

fn install_shutdown_flag() -> Result<Arc<AtomicBool>, LaunchError> {
    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in TERMINATION_SIGNALS {
        flag::register_conditional_shutdown(signal, 1, Arc::clone(&shutdown))
            .and_then(|_| flag::register(signal, Arc::clone(&shutdown)))
            .map_err(|source| LaunchError::Signals { source })?;
    }
    Ok(shutdown)
}
