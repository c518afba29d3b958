//! Command dispatch: decoding, routing, correlation and the loop driving them.
//!
//! Inbound payloads flow through [`Command::decode`], [`ActionRouter`] and
//! [`correlation_key`] before the [`Dispatcher`] publishes the result. Each
//! stage reports failures as [`DispatchError`] values that never outlive the
//! iteration that produced them.

mod command;
mod correlation;
mod dispatcher;
mod errors;
mod failure;
mod pacing;
mod router;

pub use command::{Command, keys};
pub use correlation::{UNCORRELATED_KEY, correlation_key};
pub use dispatcher::{Dispatcher, IterationOutcome, LoopSettings, POLL_SLICE};
pub use errors::{DispatchError, INVALID_ORDER_PAYLOAD};
pub use failure::FailureReport;
pub use pacing::{FixedPacer, Pacer, READ_ERROR_DELAY};
pub use router::{Action, ActionRouter, Invocation, OrderParams};
