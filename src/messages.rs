//! Inbound order-entry messages.
//!
//! These are the application-layer payloads handed to
//! [`MatchEngine`](crate::engine::MatchEngine) by the session/codec layers.
//! The originating session identity (`source`) travels alongside each
//! message rather than inside it.

use rust_decimal::Decimal;

use crate::types::{OrdType, Side};

/// Request to enter a new order.
///
/// `price` must be present (and positive) for limit orders and is ignored
/// for market orders.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct NewOrderSingle {
    pub cl_ord_id: String,
    pub symbol: String,
    pub side: Side,
    pub ord_type: OrdType,
    pub order_qty: u32,
    #[serde(default)]
    pub price: Option<Decimal>,
}

/// Request to cancel a resting order.
///
/// The order is identified by `(symbol, side, cl_ord_id)` plus the
/// requesting source.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct OrderCancelRequest {
    pub cl_ord_id: String,
    pub symbol: String,
    pub side: Side,
}
