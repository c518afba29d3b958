//! Structured failure reports for commands that produced no result.

use serde::{Deserialize, Serialize};

use crate::broker::OutboundMessage;

use super::errors::DispatchError;

/// Body published in place of a result when failure reporting is enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureReport {
    /// Rendered error message.
    pub error: String,
    /// Failure stage, see [`DispatchError::kind`].
    pub kind: String,
    /// Requested action, when the command decoded far enough to name one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl FailureReport {
    /// Describes `error` for the command that requested `action`.
    #[must_use]
    pub fn new(error: &DispatchError, action: Option<&str>) -> Self {
        Self {
            error: error.to_string(),
            kind: error.kind().to_owned(),
            action: action.map(str::to_owned),
        }
    }

    /// Serialises the report into a message keyed by `key`.
    ///
    /// # Errors
    ///
    /// Returns the serialiser error if the report cannot be encoded.
    pub fn into_message(self, key: impl Into<String>) -> Result<OutboundMessage, serde_json::Error> {
        let payload = serde_json::to_vec(&self)?;
        Ok(OutboundMessage::new(key, payload))
    }
}
