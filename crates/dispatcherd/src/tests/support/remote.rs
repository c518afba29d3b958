//! Recording double for [`RemoteOperations`].

use std::sync::{Arc, Mutex};

use crate::remote::{RemoteError, RemoteOperations, ResultPayload};

/// Payload returned by default for every successful call.
pub const SHIP_RECORD: &[u8] = br#"{"ship":{"id":"ship-42","type":"JW-MK-I"}}"#;

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    ShipDetails(String),
    MarketplaceInfo(String),
    NewFlightPlan { ship_id: String, destination: String },
    FlightPlanDetails(String),
    BuyOrder { ship_id: String, good: String, quantity: i64 },
    SellOrder { ship_id: String, good: String, quantity: i64 },
}

#[derive(Debug)]
struct RemoteState {
    calls: Vec<RemoteCall>,
    response: Vec<u8>,
    failure: Option<String>,
}

impl Default for RemoteState {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            response: SHIP_RECORD.to_vec(),
            failure: None,
        }
    }
}

/// Records every call and answers with a canned payload or failure.
#[derive(Debug, Clone, Default)]
pub struct RecordingRemote {
    state: Arc<Mutex<RemoteState>>,
}

impl RecordingRemote {
    fn with_state<T>(&self, action: impl FnOnce(&mut RemoteState) -> T) -> T {
        let mut state = self.state.lock().expect("remote state mutex poisoned");
        action(&mut state)
    }

    /// Makes every call fail with `message`.
    pub fn fail_with(&self, message: &str) {
        self.with_state(|state| state.failure = Some(message.to_owned()));
    }

    /// Recorded calls, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.with_state(|state| state.calls.clone())
    }

    fn answer(&self, call: RemoteCall) -> Result<ResultPayload, RemoteError> {
        self.with_state(|state| {
            state.calls.push(call);
            match &state.failure {
                Some(message) => Err(RemoteError::new(message.as_str())),
                None => Ok(state.response.clone()),
            }
        })
    }
}

impl RemoteOperations for RecordingRemote {
    fn ship_details(&self, id: &str) -> Result<ResultPayload, RemoteError> {
        self.answer(RemoteCall::ShipDetails(id.to_owned()))
    }

    fn marketplace_info(&self, location: &str) -> Result<ResultPayload, RemoteError> {
        self.answer(RemoteCall::MarketplaceInfo(location.to_owned()))
    }

    fn new_flight_plan(
        &self,
        ship_id: &str,
        destination: &str,
    ) -> Result<ResultPayload, RemoteError> {
        self.answer(RemoteCall::NewFlightPlan {
            ship_id: ship_id.to_owned(),
            destination: destination.to_owned(),
        })
    }

    fn flight_plan_details(&self, plan_id: &str) -> Result<ResultPayload, RemoteError> {
        self.answer(RemoteCall::FlightPlanDetails(plan_id.to_owned()))
    }

    fn buy_order(
        &self,
        ship_id: &str,
        good: &str,
        quantity: i64,
    ) -> Result<ResultPayload, RemoteError> {
        self.answer(RemoteCall::BuyOrder {
            ship_id: ship_id.to_owned(),
            good: good.to_owned(),
            quantity,
        })
    }

    fn sell_order(
        &self,
        ship_id: &str,
        good: &str,
        quantity: i64,
    ) -> Result<ResultPayload, RemoteError> {
        self.answer(RemoteCall::SellOrder {
            ship_id: ship_id.to_owned(),
            good: good.to_owned(),
            quantity,
        })
    }
}
