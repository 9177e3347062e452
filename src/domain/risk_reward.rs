//! Realized return as a multiple of initial risk (R-multiple).

use crate::domain::trade::Direction;
use rust_decimal::Decimal;

/// `reward / |entry - stop|`, or `None` when there is no stop or the stop
/// sits on the entry price. A negative result means the trade closed
/// against its direction.
pub fn compute_r_multiple(
    entry_price: Decimal,
    exit_price: Decimal,
    stop_loss: Option<Decimal>,
    direction: Direction,
) -> Option<Decimal> {
    let stop = stop_loss?;
    let risk = (entry_price - stop).abs();
    if risk <= Decimal::ZERO {
        return None;
    }
    let reward = direction.favourable_move(entry_price, exit_price);
    reward.checked_div(risk)
}
