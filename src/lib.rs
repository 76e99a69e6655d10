//! # Kestrel Matching Engine
//!
//! Continuous-trading limit-order matching engine: per-symbol order books
//! under price/time priority, market and limit orders, FIX-style execution
//! reports.
//!
//! ## Entry point
//!
//! [`MatchEngine`] is the single entry point: create one, then feed it
//! [`NewOrderSingle`] and [`OrderCancelRequest`] messages via
//! [`MatchEngine::on_order`] and [`MatchEngine::on_cancel_request`]. Every
//! call returns the complete response sequence for that message: one trade
//! report per resting order filled, then a terminal report for the incoming
//! order; cancels yield one execution or one reject.
//!
//! ## Example
//!
//! ```rust
//! use kestrel_matching_engine::{MatchEngine, NewOrderSingle, OrdType, Response, Side};
//! use rust_decimal::Decimal;
//!
//! let mut engine = MatchEngine::new();
//! let order = NewOrderSingle {
//!     cl_ord_id: "C1".into(),
//!     symbol: "ABC".into(),
//!     side: Side::Buy,
//!     ord_type: OrdType::Limit,
//!     order_qty: 10,
//!     price: Some(Decimal::from(100)),
//! };
//! let responses = engine.on_order("U1", &order).unwrap();
//! assert_eq!(responses.len(), 1);
//! match &responses[0] {
//!     Response::ExecutionReport(report) => assert_eq!(report.order_id, "O1"),
//!     Response::OrderCancelReject(_) => unreachable!(),
//! }
//! ```
//!
//! Market orders are immediate-or-cancel: whatever cannot be filled against
//! the book is canceled. Limit residue rests on the book at its price.

pub mod clock;
pub mod engine;
pub mod error;
pub mod execution;
pub mod market_data_gen;
mod matching;
pub mod messages;
pub mod order_book;
pub mod types;
pub mod working_order;

pub use clock::{StepClock, SystemClock, TimeSource};
pub use engine::MatchEngine;
pub use error::EngineError;
pub use execution::{ExecutionReport, Fill, OrderCancelReject, Response};
pub use messages::{NewOrderSingle, OrderCancelRequest};
pub use order_book::{BookSide, OrderBook};
pub use types::{CxlRejReason, ExecType, OrdStatus, OrdType, Side};
pub use working_order::WorkingOrder;
