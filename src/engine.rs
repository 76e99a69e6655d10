//! Top-level dispatcher: per-symbol books, id sequences, clock.

use std::collections::HashMap;

use log::{debug, warn};
use rust_decimal::Decimal;

use crate::clock::{SystemClock, TimeSource};
use crate::error::EngineError;
use crate::execution::{Response, ResponseBuilder};
use crate::matching::match_incoming;
use crate::messages::{NewOrderSingle, OrderCancelRequest};
use crate::order_book::OrderBook;
use crate::types::{OrdStatus, OrdType};
use crate::working_order::WorkingOrder;

/// Continuous-trading matching engine over any number of symbols.
///
/// Feed inbound messages through [`MatchEngine::on_order`] and
/// [`MatchEngine::on_cancel_request`]; each call runs to completion and
/// returns the full response sequence for that message. Order books are
/// created lazily per symbol and live for the engine's lifetime.
///
/// Not thread-safe. Callers that share an engine across threads must
/// serialize access externally.
pub struct MatchEngine {
    books: HashMap<String, OrderBook>,
    clock: Box<dyn TimeSource>,
    order_sequence: u32,
    responses: ResponseBuilder,
}

impl MatchEngine {
    /// Engine on the system UTC clock.
    pub fn new() -> Self {
        Self::with_clock(Box::new(SystemClock))
    }

    /// Engine with an injected time source, for tests and replay.
    pub fn with_clock(clock: Box<dyn TimeSource>) -> Self {
        Self {
            books: HashMap::new(),
            clock,
            order_sequence: 0,
            responses: ResponseBuilder::default(),
        }
    }

    /// Match a new order against the book for its symbol.
    ///
    /// Emits one trade report per resting counterparty filled, in priority
    /// order, followed by one terminal report for the incoming order: a
    /// booked limit residue reports `New` or `PartiallyFilled`, a market
    /// residue is canceled (immediate-or-cancel), a full fill reports
    /// `Filled`.
    ///
    /// Returns [`EngineError::InvalidOrder`] without touching engine state
    /// when the order has zero quantity or is a limit without a positive
    /// price.
    pub fn on_order(
        &mut self,
        source: &str,
        order: &NewOrderSingle,
    ) -> Result<Vec<Response>, EngineError> {
        validate(order)?;

        self.order_sequence += 1;
        let order_id = format!("O{}", self.order_sequence);
        let entry_time = self.clock.now_millis();
        let mut working = WorkingOrder::new(order, source, order_id, entry_time);
        debug!(
            "accepted {} from {}: {:?} {:?} {} x {} @ {:?}",
            working.order_id(),
            source,
            order.side,
            order.ord_type,
            order.symbol,
            order.order_qty,
            order.price
        );

        let book = self.books.entry(order.symbol.clone()).or_default();
        let matches = match_incoming(book, &mut working)?;

        let mut responses = Vec::with_capacity(matches.len() + 1);
        let mut fill_qtys = Vec::with_capacity(matches.len());
        let mut fill_pxs = Vec::with_capacity(matches.len());
        for m in &matches {
            fill_qtys.push(m.fill_qty);
            fill_pxs.push(m.fill_px);
            let ord_status = if m.resting.leaves_qty() == 0 {
                OrdStatus::Filled
            } else {
                OrdStatus::PartiallyFilled
            };
            let report = self.responses.trade(
                &m.resting,
                std::slice::from_ref(&m.fill_qty),
                std::slice::from_ref(&m.fill_px),
                ord_status,
            );
            responses.push(Response::ExecutionReport(report));
        }

        if working.leaves_qty() > 0 && working.ord_type() == OrdType::Market {
            // Market orders are immediate-or-cancel: the residue never rests.
            working.close();
            let report =
                self.responses
                    .trade(&working, &fill_qtys, &fill_pxs, OrdStatus::Canceled);
            responses.push(Response::ExecutionReport(report));
        } else {
            let ord_status = if working.cum_qty() == 0 {
                OrdStatus::New
            } else if working.leaves_qty() == 0 {
                OrdStatus::Filled
            } else {
                OrdStatus::PartiallyFilled
            };
            let report = self
                .responses
                .trade(&working, &fill_qtys, &fill_pxs, ord_status);
            responses.push(Response::ExecutionReport(report));
            if working.leaves_qty() > 0 {
                book.add_order(working)?;
            }
        }
        Ok(responses)
    }

    /// Handle a cancel request: one canceled execution if a matching open
    /// order rested on the book, otherwise one cancel reject.
    pub fn on_cancel_request(&mut self, source: &str, cancel: &OrderCancelRequest) -> Vec<Response> {
        let removed = self
            .books
            .get_mut(&cancel.symbol)
            .and_then(|book| book.remove_order(cancel.side, &cancel.cl_ord_id, source));
        match removed {
            Some(mut order) => {
                order.close();
                debug!("canceled {} for {}", order.order_id(), source);
                vec![Response::ExecutionReport(self.responses.canceled(source, &order))]
            }
            None => {
                warn!(
                    "cancel from {} matched no open order: {} {:?} {}",
                    source, cancel.symbol, cancel.side, cancel.cl_ord_id
                );
                vec![Response::OrderCancelReject(
                    self.responses.cancel_reject(source, cancel),
                )]
            }
        }
    }

    /// Book for `symbol`, if any order has ever been entered for it.
    pub fn book(&self, symbol: &str) -> Option<&OrderBook> {
        self.books.get(symbol)
    }

    /// All books by symbol, read-only.
    pub fn books(&self) -> &HashMap<String, OrderBook> {
        &self.books
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(order: &NewOrderSingle) -> Result<(), EngineError> {
    if order.order_qty == 0 {
        return Err(EngineError::InvalidOrder(format!(
            "order {} has zero quantity",
            order.cl_ord_id
        )));
    }
    if order.ord_type == OrdType::Limit {
        match order.price {
            None => {
                return Err(EngineError::InvalidOrder(format!(
                    "limit order {} has no price",
                    order.cl_ord_id
                )))
            }
            Some(px) if px <= Decimal::ZERO => {
                return Err(EngineError::InvalidOrder(format!(
                    "limit order {} has non-positive price {}",
                    order.cl_ord_id, px
                )))
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::StepClock;
    use crate::types::Side;

    fn engine() -> MatchEngine {
        MatchEngine::with_clock(Box::new(StepClock::new(1, 1)))
    }

    fn limit(cl_ord_id: &str, symbol: &str, side: Side, price: i64, qty: u32) -> NewOrderSingle {
        NewOrderSingle {
            cl_ord_id: cl_ord_id.into(),
            symbol: symbol.into(),
            side,
            ord_type: OrdType::Limit,
            order_qty: qty,
            price: Some(Decimal::from(price)),
        }
    }

    #[test]
    fn books_are_created_lazily_and_never_dropped() {
        let mut engine = engine();
        assert!(engine.book("ABC").is_none());
        engine
            .on_order("U1", &limit("C1", "ABC", Side::Buy, 100, 10))
            .unwrap();
        assert!(engine.book("ABC").is_some());
        engine.on_cancel_request(
            "U1",
            &OrderCancelRequest {
                cl_ord_id: "C1".into(),
                symbol: "ABC".into(),
                side: Side::Buy,
            },
        );
        assert!(engine.book("ABC").is_some(), "book survives emptying");
        assert_eq!(engine.books().len(), 1);
    }

    #[test]
    fn invalid_order_leaves_sequences_untouched() {
        let mut engine = engine();
        let mut no_price = limit("C1", "ABC", Side::Buy, 100, 10);
        no_price.price = None;
        assert!(matches!(
            engine.on_order("U1", &no_price),
            Err(EngineError::InvalidOrder(_))
        ));
        assert!(matches!(
            engine.on_order("U1", &limit("C2", "ABC", Side::Buy, 100, 0)),
            Err(EngineError::InvalidOrder(_))
        ));
        assert!(matches!(
            engine.on_order("U1", &limit("C3", "ABC", Side::Buy, 0, 10)),
            Err(EngineError::InvalidOrder(_))
        ));

        let responses = engine
            .on_order("U1", &limit("C4", "ABC", Side::Buy, 100, 10))
            .unwrap();
        let report = responses[0].as_execution_report().unwrap();
        assert_eq!(report.order_id, "O1", "rejects consume no order ids");
        assert_eq!(report.exec_id, "E1", "rejects consume no exec ids");
    }

    #[test]
    fn id_sequences_span_symbols() {
        let mut engine = engine();
        let first = engine
            .on_order("U1", &limit("C1", "ABC", Side::Buy, 100, 10))
            .unwrap();
        let second = engine
            .on_order("U2", &limit("C2", "XYZ", Side::Sell, 200, 5))
            .unwrap();
        assert_eq!(first[0].as_execution_report().unwrap().order_id, "O1");
        assert_eq!(second[0].as_execution_report().unwrap().order_id, "O2");
        assert_eq!(second[0].as_execution_report().unwrap().exec_id, "E2");
    }

    #[test]
    fn symbols_do_not_cross_match() {
        let mut engine = engine();
        engine
            .on_order("U1", &limit("C1", "ABC", Side::Sell, 100, 10))
            .unwrap();
        let responses = engine
            .on_order("U2", &limit("C2", "XYZ", Side::Buy, 100, 10))
            .unwrap();
        assert_eq!(responses.len(), 1);
        assert_eq!(
            responses[0].as_execution_report().unwrap().ord_status,
            OrdStatus::New
        );
        assert_eq!(engine.book("ABC").unwrap().side(Side::Sell).len(), 1);
        assert_eq!(engine.book("XYZ").unwrap().side(Side::Buy).len(), 1);
    }
}
