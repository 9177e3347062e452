//! CSV trade source and annotation report adapters.
//!
//! Empty cells mean "absent". Row numbers in errors count the header as
//! line 1.

use crate::domain::error::JournalError;
use crate::domain::journal::AnnotatedTrade;
use crate::domain::trade::{Direction, TradeInput, TradeRecord};
use crate::ports::report_port::ReportPort;
use crate::ports::trade_port::TradePort;
use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Debug, Deserialize)]
struct TradeRow {
    id: String,
    symbol: String,
    direction: String,
    entry_price: String,
    exit_price: Option<String>,
    stop_loss: Option<String>,
    lot_size: String,
    commission: Option<String>,
    swap: Option<String>,
    entry_date: String,
    entry_time: Option<String>,
    exit_date: Option<String>,
    exit_time: Option<String>,
    analysis_timeframe: Option<String>,
    entry_timeframe: Option<String>,
}

pub struct CsvTradeAdapter {
    path: PathBuf,
}

impl CsvTradeAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl TradePort for CsvTradeAdapter {
    fn fetch_trades(&self) -> Result<Vec<TradeRecord>, JournalError> {
        let content = fs::read_to_string(&self.path).map_err(|e| {
            JournalError::Io(io::Error::new(
                e.kind(),
                format!("failed to read {}: {}", self.path.display(), e),
            ))
        })?;
        parse_trades(&content)
    }
}

/// Parses a full trade CSV document, headers included.
pub fn parse_trades(content: &str) -> Result<Vec<TradeRecord>, JournalError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());
    let mut records = Vec::new();

    for (index, result) in rdr.deserialize::<TradeRow>().enumerate() {
        let line = index + 2;
        let row = result.map_err(|e| JournalError::TradeData {
            reason: format!("line {line}: {e}"),
        })?;
        records.push(row_to_record(row, line)?);
    }

    tracing::debug!(count = records.len(), "trades parsed");
    Ok(records)
}

fn row_to_record(row: TradeRow, line: usize) -> Result<TradeRecord, JournalError> {
    let direction: Direction = row
        .direction
        .parse()
        .map_err(|e: JournalError| row_error(line, "direction", e.to_string()))?;

    let mut input = TradeInput::new(
        row.symbol,
        direction,
        decimal(line, "entry_price", &row.entry_price)?,
        decimal(line, "lot_size", &row.lot_size)?,
        date(line, "entry_date", &row.entry_date)?,
    );
    input.exit_price = optional(row.exit_price, |v| decimal(line, "exit_price", v))?;
    input.stop_loss = optional(row.stop_loss, |v| decimal(line, "stop_loss", v))?;
    input.commission =
        optional(row.commission, |v| decimal(line, "commission", v))?.unwrap_or(Decimal::ZERO);
    input.swap = optional(row.swap, |v| decimal(line, "swap", v))?.unwrap_or(Decimal::ZERO);
    input.entry_time = optional(row.entry_time, |v| time(line, "entry_time", v))?;
    input.exit_date = optional(row.exit_date, |v| date(line, "exit_date", v))?;
    input.exit_time = optional(row.exit_time, |v| time(line, "exit_time", v))?;
    input.analysis_timeframe = row.analysis_timeframe.filter(|s| !s.is_empty());
    input.entry_timeframe = row.entry_timeframe.filter(|s| !s.is_empty());

    Ok(TradeRecord { id: row.id, input })
}

fn row_error(line: usize, field: &str, reason: impl std::fmt::Display) -> JournalError {
    JournalError::TradeData {
        reason: format!("line {line}, column {field}: {reason}"),
    }
}

fn optional<T>(
    cell: Option<String>,
    parse: impl FnOnce(&str) -> Result<T, JournalError>,
) -> Result<Option<T>, JournalError> {
    match cell.as_deref() {
        None | Some("") => Ok(None),
        Some(v) => parse(v).map(Some),
    }
}

fn decimal(line: usize, field: &str, value: &str) -> Result<Decimal, JournalError> {
    value
        .parse()
        .map_err(|_| row_error(line, field, format!("'{value}' is not a decimal number")))
}

fn date(line: usize, field: &str, value: &str) -> Result<NaiveDate, JournalError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| row_error(line, field, format!("'{value}' is not a YYYY-MM-DD date")))
}

fn time(line: usize, field: &str, value: &str) -> Result<NaiveTime, JournalError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| row_error(line, field, format!("'{value}' is not an HH:MM time")))
}

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    id: &'a str,
    multiplier: Option<Decimal>,
    gross_pnl: Option<Decimal>,
    pnl: Option<Decimal>,
    outcome: Option<&'static str>,
    r_multiple: Option<Decimal>,
    session: Option<&'static str>,
    timeframe_aligned: Option<bool>,
    recommended_max_entry_timeframe: Option<&'a str>,
    holding_minutes: Option<i64>,
    error: Option<String>,
}

impl<'a> From<&'a AnnotatedTrade> for ReportRow<'a> {
    fn from(annotated: &'a AnnotatedTrade) -> Self {
        match &annotated.result {
            Ok(m) => ReportRow {
                id: &annotated.id,
                multiplier: Some(m.multiplier.normalize()),
                gross_pnl: m.gross_pnl.map(|d| d.normalize()),
                pnl: m.pnl.map(|d| d.normalize()),
                outcome: Some(m.outcome.as_str()),
                r_multiple: m.r_multiple.map(|d| d.normalize()),
                session: m.session.map(|s| s.as_str()),
                timeframe_aligned: m.timeframe_aligned(),
                recommended_max_entry_timeframe: m.recommended_max_entry_timeframe(),
                holding_minutes: m.holding_minutes,
                error: None,
            },
            Err(e) => ReportRow {
                id: &annotated.id,
                multiplier: None,
                gross_pnl: None,
                pnl: None,
                outcome: None,
                r_multiple: None,
                session: None,
                timeframe_aligned: None,
                recommended_max_entry_timeframe: None,
                holding_minutes: None,
                error: Some(e.to_string()),
            },
        }
    }
}

/// Writes annotations to `output`, or to stdout when no path is given.
pub struct CsvReportAdapter {
    output: Option<PathBuf>,
}

impl CsvReportAdapter {
    pub fn new(output: Option<PathBuf>) -> Self {
        Self { output }
    }
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, annotations: &[AnnotatedTrade]) -> Result<(), JournalError> {
        match &self.output {
            Some(path) => {
                let file = File::create(path)?;
                write_to(file, annotations)?;
                tracing::info!(path = %path.display(), rows = annotations.len(), "report written");
                Ok(())
            }
            None => write_to(io::stdout().lock(), annotations),
        }
    }
}

pub fn write_to<W: Write>(writer: W, annotations: &[AnnotatedTrade]) -> Result<(), JournalError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for annotated in annotations {
        wtr.serialize(ReportRow::from(annotated))
            .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> JournalError {
    match e.into_kind() {
        csv::ErrorKind::Io(io_err) => JournalError::Io(io_err),
        other => JournalError::Io(io::Error::other(format!("{other:?}"))),
    }
}
