//! Per-symbol order book: bids and asks in price/time priority.
//!
//! Each side keeps FIFO queues per price level; best bid is the highest
//! price, best ask the lowest. Within a level, earlier entry trades first.
//! The matching sweep lives in [`crate::matching`]; this module owns the
//! containers, booking, and cancel lookup.

use std::cmp::Ordering;
use std::collections::{BTreeMap, VecDeque};

use rust_decimal::Decimal;

use crate::error::EngineError;
use crate::types::Side;
use crate::working_order::WorkingOrder;

/// Price key ordered so that ascending iteration of the level map always
/// starts at the side's best price (asks ascend, bids descend).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LevelKey {
    price: Decimal,
    descending: bool,
}

impl LevelKey {
    fn new(price: Decimal, side: Side) -> Self {
        Self {
            price,
            descending: side == Side::Buy,
        }
    }
}

impl PartialOrd for LevelKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for LevelKey {
    fn cmp(&self, other: &Self) -> Ordering {
        // All keys in one side share the same direction.
        if self.descending {
            other.price.cmp(&self.price)
        } else {
            self.price.cmp(&other.price)
        }
    }
}

/// One side of a book: resting open limit orders in priority order.
#[derive(Clone, Debug)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<LevelKey, VecDeque<WorkingOrder>>,
}

impl BookSide {
    fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Number of resting orders on this side.
    pub fn len(&self) -> usize {
        self.levels.values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Best (most competitive) price on this side, if any order rests.
    pub fn best_price(&self) -> Option<Decimal> {
        self.levels.keys().next().map(|k| k.price)
    }

    /// Resting orders in priority order: best price first, earliest entry
    /// first within a level.
    pub fn orders(&self) -> impl Iterator<Item = &WorkingOrder> {
        self.levels.values().flat_map(|queue| queue.iter())
    }

    /// Rest an order on this side. Only open limit orders with remaining
    /// quantity may rest.
    pub(crate) fn insert(&mut self, order: WorkingOrder) -> Result<(), EngineError> {
        let Some(price) = order.price() else {
            return Err(EngineError::InvalidState(format!(
                "order {} has no price to rest at",
                order.order_id()
            )));
        };
        debug_assert!(order.is_open() && order.leaves_qty() > 0);
        self.levels
            .entry(LevelKey::new(price, self.side))
            .or_default()
            .push_back(order);
        Ok(())
    }

    /// The order at the front of the best level. Mutable so the matching
    /// sweep can fill it in place.
    pub(crate) fn best_order_mut(&mut self) -> Option<&mut WorkingOrder> {
        self.levels.values_mut().next().and_then(VecDeque::front_mut)
    }

    /// Remove and return the order at the front of the best level, dropping
    /// the level when it empties.
    pub(crate) fn pop_best_order(&mut self) -> Option<WorkingOrder> {
        let mut entry = self.levels.first_entry()?;
        let order = entry.get_mut().pop_front();
        if entry.get().is_empty() {
            entry.remove();
        }
        order
    }

    /// Remove the best-priority resting order matching `(cl_ord_id, source)`.
    ///
    /// Clients may reuse a `cl_ord_id`; scanning in priority order makes the
    /// pick deterministic.
    pub(crate) fn remove_client_order(
        &mut self,
        cl_ord_id: &str,
        source: &str,
    ) -> Option<WorkingOrder> {
        let mut found = None;
        for (key, queue) in self.levels.iter() {
            if let Some(ix) = queue
                .iter()
                .position(|o| o.cl_ord_id() == cl_ord_id && o.source() == source)
            {
                found = Some((*key, ix));
                break;
            }
        }
        let (key, ix) = found?;
        let queue = self.levels.get_mut(&key)?;
        let order = queue.remove(ix);
        if queue.is_empty() {
            self.levels.remove(&key);
        }
        order
    }
}

/// Order book for one symbol.
#[derive(Clone, Debug)]
pub struct OrderBook {
    bids: BookSide,
    asks: BookSide,
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
        }
    }

    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    pub(crate) fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Buy => &mut self.bids,
            Side::Sell => &mut self.asks,
        }
    }

    /// Rest a limit order on the side it was entered for.
    pub(crate) fn add_order(&mut self, order: WorkingOrder) -> Result<(), EngineError> {
        self.side_mut(order.side()).insert(order)
    }

    /// Remove the best-priority open order matching `(side, cl_ord_id, source)`.
    pub(crate) fn remove_order(
        &mut self,
        side: Side,
        cl_ord_id: &str,
        source: &str,
    ) -> Option<WorkingOrder> {
        self.side_mut(side).remove_client_order(cl_ord_id, source)
    }

    /// Highest resting bid price.
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    /// Lowest resting ask price.
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}
