#![allow(dead_code)]

use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use std::collections::HashMap;
use tradejournal::domain::error::JournalError;
use tradejournal::domain::journal::AnnotatedTrade;
pub use tradejournal::domain::trade::{Direction, TradeInput, TradeRecord};
use tradejournal::ports::report_port::ReportPort;
use tradejournal::ports::trade_port::TradePort;
use std::cell::RefCell;

pub struct MockTradePort {
    pub trades: Vec<TradeRecord>,
    pub error: Option<String>,
}

impl MockTradePort {
    pub fn new() -> Self {
        Self {
            trades: Vec::new(),
            error: None,
        }
    }

    pub fn with_trade(mut self, id: &str, input: TradeInput) -> Self {
        self.trades.push(TradeRecord {
            id: id.to_string(),
            input,
        });
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl TradePort for MockTradePort {
    fn fetch_trades(&self) -> Result<Vec<TradeRecord>, JournalError> {
        if let Some(reason) = &self.error {
            return Err(JournalError::TradeData {
                reason: reason.clone(),
            });
        }
        Ok(self.trades.clone())
    }
}

/// Records what it was asked to write: id to error text or outcome.
pub struct MockReportPort {
    pub written: RefCell<HashMap<String, String>>,
}

impl MockReportPort {
    pub fn new() -> Self {
        Self {
            written: RefCell::new(HashMap::new()),
        }
    }
}

impl ReportPort for MockReportPort {
    fn write(&self, annotations: &[AnnotatedTrade]) -> Result<(), JournalError> {
        let mut written = self.written.borrow_mut();
        for a in annotations {
            let value = match &a.result {
                Ok(m) => m.outcome.to_string(),
                Err(e) => e.to_string(),
            };
            written.insert(a.id.clone(), value);
        }
        Ok(())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn long(symbol: &str, entry: Decimal, lot: Decimal) -> TradeInput {
    TradeInput::new(symbol, Direction::Long, entry, lot, date(2024, 3, 4))
}

pub fn short(symbol: &str, entry: Decimal, lot: Decimal) -> TradeInput {
    TradeInput::new(symbol, Direction::Short, entry, lot, date(2024, 3, 4))
}

pub const TRADES_HEADER: &str = "id,symbol,direction,entry_price,exit_price,stop_loss,lot_size,commission,swap,entry_date,entry_time,exit_date,exit_time,analysis_timeframe,entry_timeframe";

pub fn trades_csv(rows: &[&str]) -> String {
    let mut s = TRADES_HEADER.to_string();
    for row in rows {
        s.push('\n');
        s.push_str(row);
    }
    s.push('\n');
    s
}
