//! Enumerated configuration options shared by the daemon and its tests.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Supported logging output formats.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogFormat {
    /// Structured JSON suitable for ingestion by logging stacks.
    #[default]
    Json,
    /// Human-readable single line output.
    Compact,
}

/// Where the consumer begins reading the inbound partition.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum StartOffset {
    /// Replay the partition from its earliest retained message.
    #[default]
    Beginning,
    /// Skip the backlog and wait for new messages only.
    End,
    /// Resume from the offset committed by the consumer group.
    Stored,
}

/// Treatment of commands that fail to decode, route, or execute.
#[derive(
    Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum FailureReporting {
    /// Log the failure and publish nothing for the command.
    #[default]
    Silent,
    /// Publish a structured failure report on the outbound topic.
    Publish,
}
