//! Trade input snapshot and derived metrics.

use crate::domain::error::JournalError;
use crate::domain::outcome::Outcome;
use crate::domain::session::Session;
use crate::domain::timeframe::Alignment;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Price movement in the trade's favour: positive when the position gained.
    pub fn favourable_move(self, entry: Decimal, exit: Decimal) -> Decimal {
        match self {
            Direction::Long => exit - entry,
            Direction::Short => entry - exit,
        }
    }
}

impl FromStr for Direction {
    type Err = JournalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "long" | "buy" => Ok(Direction::Long),
            "short" | "sell" => Ok(Direction::Short),
            other => Err(JournalError::invalid_input(
                "direction",
                format!("expected long or short, got '{other}'"),
            )),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

/// Immutable snapshot of one journal entry as supplied by the caller.
///
/// Dates and times are wall-clock values in the journal's reference
/// timezone. An absent `exit_price` means the trade is still open.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeInput {
    pub symbol: String,
    pub direction: Direction,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub stop_loss: Option<Decimal>,
    pub lot_size: Decimal,
    pub commission: Decimal,
    pub swap: Decimal,
    pub entry_date: NaiveDate,
    pub entry_time: Option<NaiveTime>,
    pub exit_date: Option<NaiveDate>,
    pub exit_time: Option<NaiveTime>,
    pub analysis_timeframe: Option<String>,
    pub entry_timeframe: Option<String>,
}

impl TradeInput {
    /// An open trade with no costs, stop, times or timeframes.
    pub fn new(
        symbol: impl Into<String>,
        direction: Direction,
        entry_price: Decimal,
        lot_size: Decimal,
        entry_date: NaiveDate,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
            entry_price,
            exit_price: None,
            stop_loss: None,
            lot_size,
            commission: Decimal::ZERO,
            swap: Decimal::ZERO,
            entry_date,
            entry_time: None,
            exit_date: None,
            exit_time: None,
            analysis_timeframe: None,
            entry_timeframe: None,
        }
    }

    pub fn with_exit_price(mut self, exit_price: Decimal) -> Self {
        self.exit_price = Some(exit_price);
        self
    }

    pub fn with_stop_loss(mut self, stop_loss: Decimal) -> Self {
        self.stop_loss = Some(stop_loss);
        self
    }

    pub fn with_costs(mut self, commission: Decimal, swap: Decimal) -> Self {
        self.commission = commission;
        self.swap = swap;
        self
    }

    pub fn with_entry_time(mut self, entry_time: NaiveTime) -> Self {
        self.entry_time = Some(entry_time);
        self
    }

    pub fn with_exit_at(mut self, exit_date: NaiveDate, exit_time: Option<NaiveTime>) -> Self {
        self.exit_date = Some(exit_date);
        self.exit_time = exit_time;
        self
    }

    pub fn with_timeframes(
        mut self,
        analysis: impl Into<String>,
        entry: impl Into<String>,
    ) -> Self {
        self.analysis_timeframe = Some(analysis.into());
        self.entry_timeframe = Some(entry.into());
        self
    }

    pub fn is_open(&self) -> bool {
        self.exit_price.is_none()
    }

    pub fn entry_datetime(&self) -> Option<NaiveDateTime> {
        self.entry_time.map(|t| self.entry_date.and_time(t))
    }

    pub fn exit_datetime(&self) -> Option<NaiveDateTime> {
        match (self.exit_date, self.exit_time) {
            (Some(d), Some(t)) => Some(d.and_time(t)),
            _ => None,
        }
    }

    /// Checks the numeric and chronological invariants of the snapshot.
    pub fn validate(&self) -> Result<(), JournalError> {
        if self.symbol.trim().is_empty() {
            return Err(JournalError::invalid_input("symbol", "must not be empty"));
        }
        if self.lot_size <= Decimal::ZERO {
            return Err(JournalError::invalid_input(
                "lot_size",
                format!("must be positive, got {}", self.lot_size),
            ));
        }
        if self.entry_price <= Decimal::ZERO {
            return Err(JournalError::invalid_input(
                "entry_price",
                format!("must be positive, got {}", self.entry_price),
            ));
        }
        if let Some(exit) = self.exit_price {
            if exit <= Decimal::ZERO {
                return Err(JournalError::invalid_input(
                    "exit_price",
                    format!("must be positive, got {exit}"),
                ));
            }
        }
        if let Some(stop) = self.stop_loss {
            if stop <= Decimal::ZERO {
                return Err(JournalError::invalid_input(
                    "stop_loss",
                    format!("must be positive, got {stop}"),
                ));
            }
        }
        if let Some(exit_date) = self.exit_date {
            if exit_date < self.entry_date {
                return Err(JournalError::invalid_input(
                    "exit_date",
                    format!("{exit_date} precedes entry date {}", self.entry_date),
                ));
            }
        }
        if let (Some(entry), Some(exit)) = (self.entry_datetime(), self.exit_datetime()) {
            if exit < entry {
                return Err(JournalError::invalid_input(
                    "exit_time",
                    format!("{exit} precedes entry {entry}"),
                ));
            }
        }
        Ok(())
    }
}

/// A journal row: caller-assigned identifier plus the trade snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub id: String,
    pub input: TradeInput,
}

/// Derived facts about one trade. Always recomputed in full from a
/// [`TradeInput`]; never patched field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeMetrics {
    pub multiplier: Decimal,
    pub gross_pnl: Option<Decimal>,
    pub pnl: Option<Decimal>,
    pub outcome: Outcome,
    pub r_multiple: Option<Decimal>,
    pub session: Option<Session>,
    pub alignment: Option<Alignment>,
    pub holding_minutes: Option<i64>,
}

impl TradeMetrics {
    pub fn timeframe_aligned(&self) -> Option<bool> {
        self.alignment.as_ref().map(|a| a.valid)
    }

    pub fn recommended_max_entry_timeframe(&self) -> Option<&str> {
        self.alignment
            .as_ref()
            .map(|a| a.recommended_max_entry_timeframe.as_str())
    }
}
