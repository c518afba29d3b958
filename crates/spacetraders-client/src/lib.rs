//! Blocking client for the SpaceTraders trading API.
//!
//! The dispatcher forwards each decoded command to exactly one call on
//! [`Client`]. Every call returns the raw response body so callers can
//! republish it verbatim; the client never interprets the payload beyond the
//! HTTP status code.

mod client;
mod errors;
mod payloads;

pub use client::Client;
pub use errors::ClientError;
