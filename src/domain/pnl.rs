//! Gross and net profit/loss for a closed trade.

use crate::domain::error::JournalError;
use crate::domain::trade::TradeInput;
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PnlBreakdown {
    /// price delta * lot size * multiplier
    pub gross: Decimal,
    /// gross - |commission| + swap
    pub net: Decimal,
}

/// Computes PnL in account currency. Returns `Ok(None)` while the trade is
/// open. No rounding is applied; display precision is the caller's concern.
pub fn compute_pnl(
    input: &TradeInput,
    multiplier: Decimal,
) -> Result<Option<PnlBreakdown>, JournalError> {
    let Some(exit) = input.exit_price else {
        return Ok(None);
    };

    let price_delta = input.direction.favourable_move(input.entry_price, exit);
    let gross = price_delta
        .checked_mul(input.lot_size)
        .and_then(|v| v.checked_mul(multiplier))
        .ok_or_else(|| overflow("gross"))?;

    let net = gross
        .checked_sub(input.commission.abs())
        .and_then(|v| v.checked_add(input.swap))
        .ok_or_else(|| overflow("net"))?;

    Ok(Some(PnlBreakdown { gross, net }))
}

fn overflow(stage: &str) -> JournalError {
    JournalError::invalid_input("pnl", format!("{stage} amount overflows decimal range"))
}
