//! Test harness utilities for the dispatcher suites.

mod broker;
mod config_loader;
mod pacer;
mod remote;
mod reporter;
mod world;

pub use broker::{MemoryBroker, MemorySink, MemorySource};
pub use config_loader::{FailingConfigLoader, TestConfigLoader};
pub use pacer::RecordingPacer;
pub use remote::{RecordingRemote, RemoteCall, SHIP_RECORD};
pub use reporter::{HealthEvent, RecordingHealthReporter};
pub use world::{BootstrapWorld, DispatchWorld, bootstrap_world, dispatch_world};
