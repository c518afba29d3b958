//! Outbound key derivation.

use super::command::{Command, keys};

/// Key used when a command carries neither `shipId` nor `id`.
pub const UNCORRELATED_KEY: &str = "NA";

/// Selects the outbound message key for `command`.
///
/// `shipId` wins over `id`, which wins over [`UNCORRELATED_KEY`]. Presence is
/// what counts: an empty `shipId` still takes priority.
#[must_use]
pub fn correlation_key(command: &Command) -> &str {
    command
        .get(keys::SHIP_ID)
        .or_else(|| command.get(keys::ID))
        .unwrap_or(UNCORRELATED_KEY)
}
