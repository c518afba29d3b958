//! Error types for per-command dispatch failures.
//!
//! Every variant is contained within a single loop iteration: the dispatcher
//! reports it, optionally publishes a failure report, and moves on to the next
//! command. None of them terminate the process.

use std::num::ParseIntError;

use thiserror::Error;

use crate::remote::RemoteError;

use super::router::Action;

/// Payload the router synthesises when the action is not recognised.
pub const INVALID_ORDER_PAYLOAD: &[u8] = b"{}";

/// Errors surfaced while decoding, routing or executing one command.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The payload could not be decoded into a command.
    #[error("failed to decode command: {message}")]
    Decode {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The `action` field names no known operation.
    #[error("invalid order: unknown action '{action}'")]
    InvalidAction { action: String },

    /// An order carried a `quantity` that is not an integer.
    #[error("invalid quantity '{value}' for {action}: {source}")]
    InvalidQuantity {
        action: Action,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// The remote operation reported a failure.
    #[error("remote call for {action} failed: {source}")]
    Remote {
        action: Action,
        #[source]
        source: RemoteError,
    },
}

impl DispatchError {
    /// Creates a decode error with a custom message.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a decode error wrapping the parser failure.
    pub fn decode_with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Decode {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Creates an invalid action error.
    pub fn invalid_action(action: impl Into<String>) -> Self {
        Self::InvalidAction {
            action: action.into(),
        }
    }

    /// Creates an invalid quantity error.
    pub fn invalid_quantity(action: Action, value: impl Into<String>, source: ParseIntError) -> Self {
        Self::InvalidQuantity {
            action,
            value: value.into(),
            source,
        }
    }

    /// Creates a remote call error.
    pub fn remote(action: Action, source: RemoteError) -> Self {
        Self::Remote { action, source }
    }

    /// Stable label for the failure stage, used in logs and failure reports.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Decode { .. } => "decode",
            Self::InvalidAction { .. } => "invalid_action",
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::Remote { .. } => "remote",
        }
    }

    /// Returns `true` for failures raised before any remote call was made.
    #[must_use]
    pub fn is_routing(&self) -> bool {
        matches!(
            self,
            Self::InvalidAction { .. } | Self::InvalidQuantity { .. }
        )
    }

    /// Payload synthesised alongside the error, if any.
    ///
    /// Only an unknown action produces one: the empty object `{}`.
    #[must_use]
    pub fn fallback_payload(&self) -> Option<&'static [u8]> {
        match self {
            Self::InvalidAction { .. } => Some(INVALID_ORDER_PAYLOAD),
            _ => None,
        }
    }
}
