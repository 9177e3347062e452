//! Win / loss / breakeven classification.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Pending,
    Win,
    Loss,
    Breakeven,
}

impl Outcome {
    /// Exact comparison against zero; decimal PnL needs no epsilon.
    pub fn classify(pnl: Option<Decimal>) -> Self {
        match pnl {
            None => Outcome::Pending,
            Some(v) if v > Decimal::ZERO => Outcome::Win,
            Some(v) if v < Decimal::ZERO => Outcome::Loss,
            Some(_) => Outcome::Breakeven,
        }
    }

    pub fn is_closed(self) -> bool {
        self != Outcome::Pending
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Pending => "pending",
            Outcome::Win => "win",
            Outcome::Loss => "loss",
            Outcome::Breakeven => "breakeven",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
