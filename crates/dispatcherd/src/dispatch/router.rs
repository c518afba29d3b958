//! Action routing for decoded commands.
//!
//! Routing is split in two: [`ActionRouter::resolve`] turns a [`Command`] into
//! a typed [`Invocation`] without side effects, and [`ActionRouter::invoke`]
//! performs exactly one remote call for that invocation. Parameter errors
//! therefore surface before the remote client is touched.

use strum::{Display, EnumString, IntoStaticStr};
use tracing::debug;

use crate::remote::{RemoteOperations, ResultPayload};

use super::command::{Command, keys};
use super::errors::DispatchError;

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// Operations a command may request.
///
/// Names are matched exactly, including case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
pub enum Action {
    /// Look up a ship by `id`.
    GetShipDetails,
    /// Look up the marketplace at `location`.
    GetMarketplaceInfo,
    /// File a flight plan for `shipId` towards `destination`.
    PostFlightPlanNew,
    /// Look up the flight plan `planId`.
    GetFlightPlanDetails,
    /// Buy `quantity` units of `good` for `shipId`.
    PostBuyOrderNew,
    /// Sell `quantity` units of `good` from `shipId`.
    PostSellOrderNew,
}

impl Action {
    /// Every known action, in routing-table order.
    pub const ALL: [Self; 6] = [
        Self::GetShipDetails,
        Self::GetMarketplaceInfo,
        Self::PostFlightPlanNew,
        Self::GetFlightPlanDetails,
        Self::PostBuyOrderNew,
        Self::PostSellOrderNew,
    ];

    /// Parses an action name.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidAction` if the value names no known
    /// action.
    pub fn parse(value: &str) -> Result<Self, DispatchError> {
        value
            .parse()
            .map_err(|_| DispatchError::invalid_action(value))
    }

    /// Returns the canonical action name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// Parameters shared by buy and sell orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderParams {
    /// Ship placing the order.
    pub ship_id: String,
    /// Trade good symbol.
    pub good: String,
    /// Number of units.
    pub quantity: i64,
}

/// A fully validated remote call, ready to be made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Ship lookup.
    ShipDetails { id: String },
    /// Marketplace lookup.
    MarketplaceInfo { location: String },
    /// Flight plan creation.
    NewFlightPlan { ship_id: String, destination: String },
    /// Flight plan lookup.
    FlightPlanDetails { plan_id: String },
    /// Buy order.
    BuyOrder(OrderParams),
    /// Sell order.
    SellOrder(OrderParams),
}

impl Invocation {
    /// Action this invocation was resolved from.
    #[must_use]
    pub fn action(&self) -> Action {
        match self {
            Self::ShipDetails { .. } => Action::GetShipDetails,
            Self::MarketplaceInfo { .. } => Action::GetMarketplaceInfo,
            Self::NewFlightPlan { .. } => Action::PostFlightPlanNew,
            Self::FlightPlanDetails { .. } => Action::GetFlightPlanDetails,
            Self::BuyOrder(_) => Action::PostBuyOrderNew,
            Self::SellOrder(_) => Action::PostSellOrderNew,
        }
    }
}

/// Stateless router mapping commands onto remote operations.
#[derive(Debug, Default, Clone, Copy)]
pub struct ActionRouter;

impl ActionRouter {
    /// Builds a router.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Validates a command and converts it into an [`Invocation`].
    ///
    /// Missing string fields resolve to the empty string.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::InvalidAction` for unknown actions and
    /// `DispatchError::InvalidQuantity` when an order's quantity is not an
    /// integer.
    pub fn resolve(&self, command: &Command) -> Result<Invocation, DispatchError> {
        let action = Action::parse(command.action())?;
        let text = |key: &str| command.field(key).to_owned();

        let invocation = match action {
            Action::GetShipDetails => Invocation::ShipDetails { id: text(keys::ID) },
            Action::GetMarketplaceInfo => Invocation::MarketplaceInfo {
                location: text(keys::LOCATION),
            },
            Action::PostFlightPlanNew => Invocation::NewFlightPlan {
                ship_id: text(keys::SHIP_ID),
                destination: text(keys::DESTINATION),
            },
            Action::GetFlightPlanDetails => Invocation::FlightPlanDetails {
                plan_id: text(keys::PLAN_ID),
            },
            Action::PostBuyOrderNew => Invocation::BuyOrder(order_params(action, command)?),
            Action::PostSellOrderNew => Invocation::SellOrder(order_params(action, command)?),
        };
        Ok(invocation)
    }

    /// Performs the single remote call described by `invocation`.
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::Remote` when the remote operation fails.
    pub fn invoke<R>(
        &self,
        invocation: &Invocation,
        remote: &R,
    ) -> Result<ResultPayload, DispatchError>
    where
        R: RemoteOperations + ?Sized,
    {
        let action = invocation.action();
        debug!(target: DISPATCH_TARGET, action = %action, "invoking remote operation");

        let result = match invocation {
            Invocation::ShipDetails { id } => remote.ship_details(id),
            Invocation::MarketplaceInfo { location } => remote.marketplace_info(location),
            Invocation::NewFlightPlan {
                ship_id,
                destination,
            } => remote.new_flight_plan(ship_id, destination),
            Invocation::FlightPlanDetails { plan_id } => remote.flight_plan_details(plan_id),
            Invocation::BuyOrder(order) => {
                remote.buy_order(&order.ship_id, &order.good, order.quantity)
            }
            Invocation::SellOrder(order) => {
                remote.sell_order(&order.ship_id, &order.good, order.quantity)
            }
        };
        result.map_err(|source| DispatchError::remote(action, source))
    }

    /// Resolves and invokes in one step.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`Self::resolve`] and [`Self::invoke`].
    pub fn route<R>(&self, command: &Command, remote: &R) -> Result<ResultPayload, DispatchError>
    where
        R: RemoteOperations + ?Sized,
    {
        let invocation = self.resolve(command)?;
        self.invoke(&invocation, remote)
    }
}

fn order_params(action: Action, command: &Command) -> Result<OrderParams, DispatchError> {
    let raw = command.field(keys::QUANTITY);
    let quantity = raw
        .parse::<i64>()
        .map_err(|source| DispatchError::invalid_quantity(action, raw, source))?;
    Ok(OrderParams {
        ship_id: command.field(keys::SHIP_ID).to_owned(),
        good: command.field(keys::GOOD).to_owned(),
        quantity,
    })
}
