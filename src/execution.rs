//! Outbound response messages and their population.
//!
//! [`ResponseBuilder`] owns the execution id sequence and populates
//! [`ExecutionReport`] and [`OrderCancelReject`] values the way the engine
//! emits them: one trade report per resting counterparty filled, one
//! terminal report per inbound order, one cancel execution or reject per
//! cancel request. Every emitted value is freshly constructed and
//! independently owned.

use rust_decimal::Decimal;

use crate::messages::OrderCancelRequest;
use crate::types::{CxlRejReason, ExecType, OrdStatus, Side};
use crate::working_order::WorkingOrder;

/// One fill leg: quantity traded at the resting order's price.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Fill {
    pub fill_px: Decimal,
    pub fill_qty: u32,
}

/// Report of an order state change: entry, trade, or cancel.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExecutionReport {
    pub cl_ord_id: String,
    pub cum_qty: u32,
    pub exec_id: String,
    pub exec_type: ExecType,
    pub leaves_qty: u32,
    pub order_id: String,
    pub ord_status: OrdStatus,
    pub side: Side,
    pub symbol: String,
    pub source: String,
    pub fills: Vec<Fill>,
}

/// Rejection of a cancel request that matched no open order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderCancelReject {
    pub cl_ord_id: String,
    pub cxl_rej_reason: CxlRejReason,
    pub order_id: String,
    pub ord_status: OrdStatus,
    pub source: String,
}

/// Either outbound message kind, in emission order.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Response {
    ExecutionReport(ExecutionReport),
    OrderCancelReject(OrderCancelReject),
}

impl Response {
    /// The execution report inside, if this is one.
    pub fn as_execution_report(&self) -> Option<&ExecutionReport> {
        match self {
            Response::ExecutionReport(report) => Some(report),
            Response::OrderCancelReject(_) => None,
        }
    }

    /// The cancel reject inside, if this is one.
    pub fn as_cancel_reject(&self) -> Option<&OrderCancelReject> {
        match self {
            Response::ExecutionReport(_) => None,
            Response::OrderCancelReject(reject) => Some(reject),
        }
    }
}

impl From<ExecutionReport> for Response {
    fn from(report: ExecutionReport) -> Self {
        Response::ExecutionReport(report)
    }
}

impl From<OrderCancelReject> for Response {
    fn from(reject: OrderCancelReject) -> Self {
        Response::OrderCancelReject(reject)
    }
}

/// Populates outbound responses and assigns `E<n>` execution ids.
#[derive(Clone, Debug, Default)]
pub(crate) struct ResponseBuilder {
    execution_sequence: u32,
}

impl ResponseBuilder {
    fn next_exec_id(&mut self) -> String {
        self.execution_sequence += 1;
        format!("E{}", self.execution_sequence)
    }

    /// Trade-path report: per-fill for a resting order, or terminal for the
    /// incoming order carrying all of its fills. `fill_pxs` and `fill_qtys`
    /// pair up index by index.
    pub(crate) fn trade(
        &mut self,
        order: &WorkingOrder,
        fill_qtys: &[u32],
        fill_pxs: &[Decimal],
        ord_status: OrdStatus,
    ) -> ExecutionReport {
        let fills = fill_pxs
            .iter()
            .zip(fill_qtys)
            .map(|(&fill_px, &fill_qty)| Fill { fill_px, fill_qty })
            .collect();
        ExecutionReport {
            cl_ord_id: order.cl_ord_id().to_string(),
            cum_qty: order.cum_qty(),
            exec_id: self.next_exec_id(),
            exec_type: ExecType::Trade,
            leaves_qty: order.leaves_qty(),
            order_id: order.order_id().to_string(),
            ord_status,
            side: order.side(),
            symbol: order.symbol().to_string(),
            source: order.source().to_string(),
            fills,
        }
    }

    /// Cancel confirmation. `source` is the cancel requester, which is the
    /// party the report goes back to.
    pub(crate) fn canceled(&mut self, source: &str, order: &WorkingOrder) -> ExecutionReport {
        ExecutionReport {
            cl_ord_id: order.cl_ord_id().to_string(),
            cum_qty: order.cum_qty(),
            exec_id: self.next_exec_id(),
            exec_type: ExecType::Canceled,
            leaves_qty: order.leaves_qty(),
            order_id: order.order_id().to_string(),
            ord_status: OrdStatus::Canceled,
            side: order.side(),
            symbol: order.symbol().to_string(),
            source: source.to_string(),
            fills: Vec::new(),
        }
    }

    /// Reject for a cancel that matched no open order. Consumes no
    /// execution id.
    pub(crate) fn cancel_reject(
        &self,
        source: &str,
        cancel: &OrderCancelRequest,
    ) -> OrderCancelReject {
        OrderCancelReject {
            cl_ord_id: cancel.cl_ord_id.clone(),
            cxl_rej_reason: CxlRejReason::UnknownOrder,
            order_id: "None".to_string(),
            ord_status: OrdStatus::Rejected,
            source: source.to_string(),
        }
    }
}
