//! Per-order state: identity, quantities, and lifecycle.

use rust_decimal::Decimal;

use crate::error::EngineError;
use crate::messages::NewOrderSingle;
use crate::types::{OrdType, Side};

/// An order accepted by the engine: inbound fields snapshotted at entry plus
/// live fill accounting.
///
/// Mutated only through [`WorkingOrder::execute`] and
/// [`WorkingOrder::close`]; `cum_qty + leaves_qty == order_qty` holds at all
/// times because `leaves_qty` is derived.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WorkingOrder {
    order_id: String,
    cl_ord_id: String,
    source: String,
    symbol: String,
    side: Side,
    ord_type: OrdType,
    price: Option<Decimal>,
    order_qty: u32,
    cum_qty: u32,
    entry_time: u64,
    open: bool,
}

impl WorkingOrder {
    pub(crate) fn new(
        order: &NewOrderSingle,
        source: &str,
        order_id: String,
        entry_time: u64,
    ) -> Self {
        Self {
            order_id,
            cl_ord_id: order.cl_ord_id.clone(),
            source: source.to_string(),
            symbol: order.symbol.clone(),
            side: order.side,
            ord_type: order.ord_type,
            price: order.price,
            order_qty: order.order_qty,
            cum_qty: 0,
            entry_time,
            open: true,
        }
    }

    /// Engine-assigned identifier, `O<n>`.
    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    /// Client-assigned identifier.
    pub fn cl_ord_id(&self) -> &str {
        &self.cl_ord_id
    }

    /// Session identity of the originator.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn ord_type(&self) -> OrdType {
        self.ord_type
    }

    /// Limit price; `None` for market orders.
    pub fn price(&self) -> Option<Decimal> {
        self.price
    }

    pub fn order_qty(&self) -> u32 {
        self.order_qty
    }

    /// Quantity filled so far. Never decreases.
    pub fn cum_qty(&self) -> u32 {
        self.cum_qty
    }

    /// Remaining executable quantity.
    pub fn leaves_qty(&self) -> u32 {
        self.order_qty - self.cum_qty
    }

    /// Entry timestamp from the engine clock, milliseconds UTC.
    pub fn entry_time(&self) -> u64 {
        self.entry_time
    }

    /// False once the order has been canceled or taken out of play.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether this order would trade at a contra level priced `level_px`.
    pub(crate) fn crosses(&self, level_px: Decimal) -> bool {
        match (self.ord_type, self.price) {
            (OrdType::Market, _) => true,
            (OrdType::Limit, Some(own)) => match self.side {
                Side::Buy => level_px <= own,
                Side::Sell => level_px >= own,
            },
            // A limit order without a price never enters the engine.
            (OrdType::Limit, None) => false,
        }
    }

    /// Record a fill of `qty` against this order.
    pub(crate) fn execute(&mut self, qty: u32) -> Result<(), EngineError> {
        if !self.open {
            return Err(EngineError::InvalidState(format!(
                "execute on closed order {}",
                self.order_id
            )));
        }
        if qty == 0 || qty > self.leaves_qty() {
            return Err(EngineError::InvalidState(format!(
                "fill qty {} outside leaves {} on order {}",
                qty,
                self.leaves_qty(),
                self.order_id
            )));
        }
        self.cum_qty += qty;
        Ok(())
    }

    /// Take the order out of play. No executions are permitted afterwards.
    pub(crate) fn close(&mut self) {
        self.open = false;
    }
}
