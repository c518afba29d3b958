//! Command dispatcher bridging a Kafka topic to the SpaceTraders API.
//!
//! The daemon reads one YAML command at a time from the inbound partition,
//! decodes it into a [`Command`], routes it through the [`ActionRouter`] to a
//! single remote operation and publishes the raw result to the outbound
//! partition keyed by [`correlation_key`].
//!
//! Startup follows the same shape as any long-running service here:
//! configuration is loaded through [`dispatcher_config`], structured telemetry
//! is installed once, malformed partition indices fall back to zero with a
//! warning, and both broker ends are connected before the first read. Health
//! events flow through a [`HealthReporter`] so tests can observe them.
//!
//! Per-command failures (decode, unknown action, bad quantity, remote error)
//! are logged and dropped, or published as a [`FailureReport`] when
//! configured. A failed publish is fatal.

mod bootstrap;
pub mod broker;
pub mod dispatch;
mod health;
mod process;
mod remote;
mod telemetry;

pub use bootstrap::{
    BootstrapError, ConfigLoader, Daemon, StaticConfigLoader, SystemConfigLoader, bootstrap_with,
};
pub use dispatch::{
    Action, ActionRouter, Command, DispatchError, Dispatcher, FailureReport, FixedPacer,
    IterationOutcome, LoopSettings, Pacer, correlation_key,
};
pub use health::{HealthReporter, StructuredHealthReporter};
pub use process::{LaunchError, TERMINATION_SIGNALS, run_dispatcher, run_dispatcher_with};
pub use remote::{RemoteError, RemoteOperations, ResultPayload};
pub use telemetry::TelemetryError;

#[cfg(test)]
mod tests;
