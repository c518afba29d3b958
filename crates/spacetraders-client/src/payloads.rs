//! Request bodies for the POST endpoints.

use serde::Serialize;

/// Body for `POST /my/flight-plans`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct FlightPlanRequest<'a> {
    pub(crate) ship_id: &'a str,
    pub(crate) destination: &'a str,
}

/// Body shared by the purchase and sell order endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OrderRequest<'a> {
    pub(crate) ship_id: &'a str,
    pub(crate) good: &'a str,
    pub(crate) quantity: i64,
}
