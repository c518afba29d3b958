//! Partition index parsing.
//!
//! Partition indices arrive as free text so that a malformed value does not
//! abort configuration loading. The daemon parses them once at startup and
//! falls back to [`crate::DEFAULT_PARTITION`] when parsing fails.

use std::fmt;
use std::num::ParseIntError;

use thiserror::Error;

/// Broker side a partition index applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionSide {
    /// The inbound command partition.
    Read,
    /// The outbound result partition.
    Write,
}

impl fmt::Display for PartitionSide {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(match self {
            Self::Read => "read",
            Self::Write => "write",
        })
    }
}

/// Validated, non-negative partition index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionIndex(i32);

impl PartitionIndex {
    /// Parses a partition index, tolerating surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns [`PartitionParseError`] when the text is not an integer or is
    /// negative.
    pub fn parse(side: PartitionSide, raw: &str) -> Result<Self, PartitionParseError> {
        let value = raw
            .trim()
            .parse::<i32>()
            .map_err(|source| PartitionParseError::NotAnInteger {
                side,
                raw: raw.to_owned(),
                source,
            })?;
        if value < 0 {
            return Err(PartitionParseError::Negative { side, value });
        }
        Ok(Self(value))
    }

    /// Returns the index as the broker client expects it.
    #[must_use]
    pub fn get(self) -> i32 {
        self.0
    }
}

impl Default for PartitionIndex {
    fn default() -> Self {
        Self(crate::DEFAULT_PARTITION)
    }
}

impl fmt::Display for PartitionIndex {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

/// Errors raised while parsing a partition index.
#[derive(Debug, Error)]
pub enum PartitionParseError {
    /// The text could not be parsed as an integer.
    #[error("{side} partition '{raw}' is not an integer: {source}")]
    NotAnInteger {
        side: PartitionSide,
        raw: String,
        #[source]
        source: ParseIntError,
    },
    /// The value parsed but lies below zero.
    #[error("{side} partition {value} is negative")]
    Negative { side: PartitionSide, value: i32 },
}

impl PartitionParseError {
    /// Side whose partition index was rejected.
    #[must_use]
    pub fn side(&self) -> PartitionSide {
        match self {
            Self::NotAnInteger { side, .. } | Self::Negative { side, .. } => *side,
        }
    }
}
