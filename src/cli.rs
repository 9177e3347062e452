//! CLI definition and dispatch.

use chrono::NaiveTime;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::{CsvReportAdapter, CsvTradeAdapter};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::asset_registry::normalize_symbol;
use crate::domain::error::JournalError;
use crate::domain::journal::annotate_all;
use crate::domain::reference::{ReferenceStore, ReferenceTables};
use crate::domain::reference_config::load_reference_tables;
use crate::ports::report_port::ReportPort;
use crate::ports::trade_port::TradePort;

#[derive(Parser, Debug)]
#[command(name = "tradejournal", about = "Trade journal analytics")]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Annotate every trade in a CSV journal
    Annotate {
        #[arg(short, long)]
        trades: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Fail on the first trade that cannot be annotated
        #[arg(long)]
        strict: bool,
    },
    /// Classify an entry time into a trading session
    Session {
        #[arg(long)]
        time: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check an analysis/entry timeframe pair
    Align {
        #[arg(long)]
        analysis: String,
        #[arg(long)]
        entry: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show the contract multiplier for a symbol
    Multiplier {
        #[arg(long)]
        symbol: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Validate a reference configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match dispatch(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            (&e).into()
        }
    }
}

/// Runs the selected command; the error carries the exit status.
pub fn dispatch(cli: Cli) -> Result<(), JournalError> {
    match cli.command {
        Command::Annotate {
            trades,
            config,
            output,
            strict,
        } => run_annotate(&trades, config.as_deref(), output, strict),
        Command::Session { time, config } => run_session(&time, config.as_deref()),
        Command::Align {
            analysis,
            entry,
            config,
        } => run_align(&analysis, &entry, config.as_deref()),
        Command::Multiplier { symbol, config } => run_multiplier(&symbol, config.as_deref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, JournalError> {
    FileConfigAdapter::from_file(path).map_err(|e| JournalError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Reference tables from `path`, or the built-in tables when no file is
/// given.
pub fn load_tables(path: Option<&Path>) -> Result<ReferenceTables, JournalError> {
    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "loading reference config");
            load_reference_tables(&load_config(path)?)
        }
        None => Ok(ReferenceTables::default()),
    }
}

fn run_annotate(
    trades_path: &Path,
    config_path: Option<&Path>,
    output: Option<PathBuf>,
    strict: bool,
) -> Result<(), JournalError> {
    let store = ReferenceStore::new(load_tables(config_path)?);

    tracing::info!(path = %trades_path.display(), "reading trades");
    let records = CsvTradeAdapter::new(trades_path.to_path_buf()).fetch_trades()?;

    let mut annotated = annotate_all(&store.aggregator(), &records);

    if strict {
        if let Some(pos) = annotated.iter().position(|a| a.result.is_err()) {
            let failed = annotated.swap_remove(pos);
            tracing::error!(id = %failed.id, "strict mode: report not written");
            return failed.result.map(|_| ());
        }
    }

    CsvReportAdapter::new(output).write(&annotated)
}

fn run_session(time: &str, config_path: Option<&Path>) -> Result<(), JournalError> {
    let tables = load_tables(config_path)?;
    let entry_time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .map_err(|_| JournalError::invalid_input("time", format!("'{time}' is not HH:MM")))?;

    let session = tables.sessions.detect(entry_time, tables.utc_offset);
    println!("{session}");
    Ok(())
}

fn run_align(analysis: &str, entry: &str, config_path: Option<&Path>) -> Result<(), JournalError> {
    let tables = load_tables(config_path)?;
    let alignment = tables.timeframes.validate(analysis, entry)?;
    println!(
        "aligned: {}\nrecommended_max_entry_timeframe: {}",
        alignment.valid, alignment.recommended_max_entry_timeframe
    );
    Ok(())
}

fn run_multiplier(symbol: &str, config_path: Option<&Path>) -> Result<(), JournalError> {
    let tables = load_tables(config_path)?;
    let multiplier = tables.assets.multiplier_for(symbol);
    if !tables.assets.contains(symbol) {
        tracing::warn!(symbol = %normalize_symbol(symbol), "symbol not registered, using fallback");
    }
    println!("{}", multiplier.normalize());
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<(), JournalError> {
    let tables = load_tables(Some(config_path))?;
    println!(
        "Configuration is valid: {} assets, {} timeframes (max entry depth {}), utc offset {}",
        tables.assets.len(),
        tables.timeframes.ranks().len(),
        tables.timeframes.max_entry_depth(),
        tables.utc_offset
    );
    Ok(())
}
