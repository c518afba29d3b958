//! Seam between the dispatch loop and the remote trading API.
//!
//! The loop only ever sees [`RemoteOperations`]; production wiring binds it to
//! [`spacetraders_client::Client`], while tests substitute recording doubles.

use thiserror::Error;

use spacetraders_client::{Client, ClientError};

/// Raw serialised response returned by a remote operation.
pub type ResultPayload = Vec<u8>;

/// Failure reported by a remote operation.
///
/// The dispatcher treats every remote failure alike, so the error carries a
/// message and the original cause without further classification.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct RemoteError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl RemoteError {
    /// Builds an error without an underlying source.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Builds an error that wraps an underlying source.
    #[must_use]
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Human-readable message describing the failure.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

impl From<ClientError> for RemoteError {
    fn from(error: ClientError) -> Self {
        Self::with_source(error.to_string(), error)
    }
}

/// The six remote operations a command can request.
pub trait RemoteOperations {
    /// Looks up a ship by identifier.
    fn ship_details(&self, id: &str) -> Result<ResultPayload, RemoteError>;

    /// Looks up the marketplace at a location.
    fn marketplace_info(&self, location: &str) -> Result<ResultPayload, RemoteError>;

    /// Creates a flight plan moving a ship to a destination.
    fn new_flight_plan(&self, ship_id: &str, destination: &str)
    -> Result<ResultPayload, RemoteError>;

    /// Looks up a flight plan by identifier.
    fn flight_plan_details(&self, plan_id: &str) -> Result<ResultPayload, RemoteError>;

    /// Places a buy order.
    fn buy_order(&self, ship_id: &str, good: &str, quantity: i64)
    -> Result<ResultPayload, RemoteError>;

    /// Places a sell order.
    fn sell_order(
        &self,
        ship_id: &str,
        good: &str,
        quantity: i64,
    ) -> Result<ResultPayload, RemoteError>;
}

impl RemoteOperations for Client {
    fn ship_details(&self, id: &str) -> Result<ResultPayload, RemoteError> {
        Ok(self.ship(id)?)
    }

    fn marketplace_info(&self, location: &str) -> Result<ResultPayload, RemoteError> {
        Ok(self.marketplace(location)?)
    }

    fn new_flight_plan(
        &self,
        ship_id: &str,
        destination: &str,
    ) -> Result<ResultPayload, RemoteError> {
        Ok(self.create_flight_plan(ship_id, destination)?)
    }

    fn flight_plan_details(&self, plan_id: &str) -> Result<ResultPayload, RemoteError> {
        Ok(self.flight_plan(plan_id)?)
    }

    fn buy_order(
        &self,
        ship_id: &str,
        good: &str,
        quantity: i64,
    ) -> Result<ResultPayload, RemoteError> {
        Ok(self.buy(ship_id, good, quantity)?)
    }

    fn sell_order(
        &self,
        ship_id: &str,
        good: &str,
        quantity: i64,
    ) -> Result<ResultPayload, RemoteError> {
        Ok(self.sell(ship_id, good, quantity)?)
    }
}
