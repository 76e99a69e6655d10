//! Price/time priority matching sweep.
//!
//! [`match_incoming`] runs one incoming order against the contra side of its
//! book: best price first, earliest entry first, partial fills, resting
//! orders removed as they drain. Fill prices are always the resting order's
//! price, never the incoming order's.

use log::debug;
use rust_decimal::Decimal;

use crate::error::EngineError;
use crate::order_book::OrderBook;
use crate::working_order::WorkingOrder;

/// One fill against a resting order.
///
/// `resting` is a snapshot of the resting order after this fill was applied;
/// when it was fully filled the live order has already left the book.
#[derive(Clone, Debug)]
pub(crate) struct Match {
    pub resting: WorkingOrder,
    pub fill_qty: u32,
    pub fill_px: Decimal,
}

/// Sweep the contra side for `incoming`, executing fills on both sides.
///
/// Returns the fills in execution order. Stops when the incoming order is
/// filled or the best contra price no longer crosses it.
pub(crate) fn match_incoming(
    book: &mut OrderBook,
    incoming: &mut WorkingOrder,
) -> Result<Vec<Match>, EngineError> {
    let contra = book.side_mut(incoming.side().opposite());
    let mut matches = Vec::new();
    while incoming.leaves_qty() > 0 {
        let Some(resting) = contra.best_order_mut() else {
            break;
        };
        let Some(fill_px) = resting.price() else {
            return Err(EngineError::InvalidState(format!(
                "resting order {} has no price",
                resting.order_id()
            )));
        };
        if !incoming.crosses(fill_px) {
            break;
        }
        let fill_qty = incoming.leaves_qty().min(resting.leaves_qty());
        resting.execute(fill_qty)?;
        incoming.execute(fill_qty)?;
        debug!(
            "{} matched {} for {} at {}",
            incoming.order_id(),
            resting.order_id(),
            fill_qty,
            fill_px
        );
        let drained = resting.leaves_qty() == 0;
        matches.push(Match {
            resting: resting.clone(),
            fill_qty,
            fill_px,
        });
        if drained {
            contra.pop_best_order();
        }
    }
    Ok(matches)
}
