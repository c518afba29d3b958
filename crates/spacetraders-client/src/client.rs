//! HTTP client for the six trading operations used by the dispatcher.

use std::time::Duration;

use reqwest::blocking::{Client as HttpClient, RequestBuilder};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::errors::ClientError;
use crate::payloads::{FlightPlanRequest, OrderRequest};

const CLIENT_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::client");
const JSON: &str = "application/json";

/// Authenticated client bound to one API root.
///
/// The session is established once at construction; the bearer token is
/// attached to every request as a default header and never logged.
#[derive(Debug, Clone)]
pub struct Client {
    http: HttpClient,
    base: Url,
}

impl Client {
    /// Builds a client for `base_url`, authenticating with `token`.
    ///
    /// A blank token produces an unauthenticated client, which the API will
    /// reject for the `/my/...` endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the URL is unusable, the token is not a
    /// valid header value, or the HTTP stack fails to initialise.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)
            .map_err(|error| ClientError::invalid_base_url(base_url, error.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::invalid_base_url(
                base_url,
                "URL cannot carry a path",
            ));
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        if !token.trim().is_empty() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.trim()))
                .map_err(|_| ClientError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(ClientError::Build)?;
        Ok(Self { http, base })
    }

    /// Returns the API root this client targets.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Fetches the details of one ship.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub fn ship(&self, ship_id: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint(&["my", "ships", ship_id])?;
        self.send("ship", self.http.get(url))
    }

    /// Fetches the marketplace listing for a location.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub fn marketplace(&self, location: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint(&["locations", location, "marketplace"])?;
        self.send("marketplace", self.http.get(url))
    }

    /// Files a new flight plan for a ship.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub fn create_flight_plan(
        &self,
        ship_id: &str,
        destination: &str,
    ) -> Result<Vec<u8>, ClientError> {
        let body = FlightPlanRequest {
            ship_id,
            destination,
        };
        self.post("create_flight_plan", &["my", "flight-plans"], &body)
    }

    /// Fetches an existing flight plan.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub fn flight_plan(&self, plan_id: &str) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint(&["my", "flight-plans", plan_id])?;
        self.send("flight_plan", self.http.get(url))
    }

    /// Places a purchase order for cargo on a docked ship.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub fn buy(&self, ship_id: &str, good: &str, quantity: i64) -> Result<Vec<u8>, ClientError> {
        let body = OrderRequest {
            ship_id,
            good,
            quantity,
        };
        self.post("buy", &["my", "purchase-orders"], &body)
    }

    /// Places a sell order for cargo on a docked ship.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] on transport failure or a non-success status.
    pub fn sell(&self, ship_id: &str, good: &str, quantity: i64) -> Result<Vec<u8>, ClientError> {
        let body = OrderRequest {
            ship_id,
            good,
            quantity,
        };
        self.post("sell", &["my", "sell-orders"], &body)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|()| {
                ClientError::invalid_base_url(self.base.as_str(), "URL cannot carry a path")
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    fn post<B: Serialize>(
        &self,
        operation: &'static str,
        segments: &[&str],
        body: &B,
    ) -> Result<Vec<u8>, ClientError> {
        let url = self.endpoint(segments)?;
        let encoded = serde_json::to_vec(body)?;
        let request = self
            .http
            .post(url)
            .header(CONTENT_TYPE, JSON)
            .body(encoded);
        self.send(operation, request)
    }

    fn send(&self, operation: &'static str, request: RequestBuilder) -> Result<Vec<u8>, ClientError> {
        let response = request
            .send()
            .map_err(|source| ClientError::transport(operation, source))?;
        let status = response.status();
        let body = response
            .bytes()
            .map_err(|source| ClientError::transport(operation, source))?
            .to_vec();

        debug!(
            target: CLIENT_TARGET,
            operation,
            status = status.as_u16(),
            bytes = body.len(),
            "remote call completed"
        );

        if status.is_success() {
            Ok(body)
        } else {
            Err(ClientError::Status {
                operation,
                status,
                body,
            })
        }
    }
}
