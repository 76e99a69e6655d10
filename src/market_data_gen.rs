//! Deterministic synthetic order flow for replay tests and benchmarks.
//!
//! Same seed ⇒ same sequence of requests. Cancels target previously
//! generated client order ids, so replays exercise both the cancel
//! execution and the cancel reject paths.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;

use crate::engine::MatchEngine;
use crate::error::EngineError;
use crate::execution::Response;
use crate::messages::{NewOrderSingle, OrderCancelRequest};
use crate::types::{OrdType, Side};

/// Configuration for the synthetic request generator.
/// All ranges are inclusive. Same config + seed produces the same stream.
#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    /// RNG seed. Same seed ⇒ same request stream.
    pub seed: u64,
    /// Symbol for all generated requests.
    pub symbol: String,
    /// Number of requests to generate when collecting the whole stream.
    pub num_requests: usize,
    /// Probability of Buy (0.0..=1.0). Sell otherwise.
    pub buy_ratio: f64,
    /// Probability of Limit order (0.0..=1.0). Market otherwise.
    pub limit_ratio: f64,
    /// Probability that a request is a cancel of an earlier order.
    pub cancel_ratio: f64,
    /// Price range for limit orders.
    pub price_min: i64,
    pub price_max: i64,
    /// Quantity range, whole units.
    pub quantity_min: u32,
    pub quantity_max: u32,
    /// Number of distinct sources (`U1..=U<n>`).
    pub num_sources: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            symbol: "AAA".to_string(),
            num_requests: 1000,
            buy_ratio: 0.5,
            limit_ratio: 0.9,
            cancel_ratio: 0.1,
            price_min: 95,
            price_max: 105,
            quantity_min: 1,
            quantity_max: 100,
            num_sources: 5,
        }
    }
}

/// One generated inbound request with its originating source.
#[derive(Clone, Debug)]
pub enum Request {
    Order {
        source: String,
        order: NewOrderSingle,
    },
    Cancel {
        source: String,
        cancel: OrderCancelRequest,
    },
}

/// Deterministic request stream. Create with [`Generator::new`]; call
/// [`Generator::next_request`] or collect with [`Generator::all_requests`].
pub struct Generator {
    rng: StdRng,
    config: GeneratorConfig,
    next_cl_ord: u64,
    /// `(source, cl_ord_id, side)` of every generated order; cancel targets
    /// are drawn from here (and may repeat, exercising the reject path).
    entered: Vec<(String, String, Side)>,
}

impl Generator {
    /// Builds a generator. Same config (including seed) ⇒ same stream.
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed);
        Self {
            rng,
            config,
            next_cl_ord: 1,
            entered: Vec::new(),
        }
    }

    /// Generates the next request, advancing the RNG and bookkeeping.
    pub fn next_request(&mut self) -> Request {
        if !self.entered.is_empty() && self.rng.gen::<f64>() < self.config.cancel_ratio {
            let ix = self.rng.gen_range(0..self.entered.len());
            let (source, cl_ord_id, side) = self.entered[ix].clone();
            return Request::Cancel {
                source,
                cancel: OrderCancelRequest {
                    cl_ord_id,
                    symbol: self.config.symbol.clone(),
                    side,
                },
            };
        }

        let side = if self.rng.gen::<f64>() < self.config.buy_ratio {
            Side::Buy
        } else {
            Side::Sell
        };
        let is_limit = self.rng.gen::<f64>() < self.config.limit_ratio;
        let price = if is_limit {
            Some(Decimal::from(
                self.rng.gen_range(self.config.price_min..=self.config.price_max),
            ))
        } else {
            None
        };
        let order_qty = self
            .rng
            .gen_range(self.config.quantity_min..=self.config.quantity_max);
        let source = format!("U{}", self.rng.gen_range(1..=self.config.num_sources.max(1)));
        let cl_ord_id = format!("C{}", self.next_cl_ord);
        self.next_cl_ord += 1;
        self.entered.push((source.clone(), cl_ord_id.clone(), side));
        Request::Order {
            source,
            order: NewOrderSingle {
                cl_ord_id,
                symbol: self.config.symbol.clone(),
                side,
                ord_type: if is_limit { OrdType::Limit } else { OrdType::Market },
                order_qty,
                price,
            },
        }
    }

    /// Returns exactly `n` requests, advancing the generator state.
    pub fn take_requests(&mut self, n: usize) -> Vec<Request> {
        (0..n).map(|_| self.next_request()).collect()
    }

    /// Returns the full stream as defined by `config.num_requests`.
    pub fn all_requests(&mut self) -> Vec<Request> {
        self.take_requests(self.config.num_requests)
    }
}

/// Feeds requests into `engine`, collecting every response in order.
/// Stops at the first engine error.
pub fn replay_into_engine(
    engine: &mut MatchEngine,
    requests: impl IntoIterator<Item = Request>,
) -> Result<Vec<Response>, EngineError> {
    let mut responses = Vec::new();
    for request in requests {
        match request {
            Request::Order { source, order } => {
                responses.extend(engine.on_order(&source, &order)?)
            }
            Request::Cancel { source, cancel } => {
                responses.extend(engine.on_cancel_request(&source, &cancel))
            }
        }
    }
    Ok(responses)
}
