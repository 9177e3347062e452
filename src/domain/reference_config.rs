//! Builds [`ReferenceTables`] from configuration.
//!
//! Sections: `[engine]`, `[assets]`, `[timeframes]`, `[alignment]` and
//! `[sessions]`. Every section is optional; absent values fall back to the
//! built-in tables.

use crate::domain::asset_registry::AssetRegistry;
use crate::domain::error::JournalError;
use crate::domain::reference::ReferenceTables;
use crate::domain::session::{SessionDetector, SessionWindow};
use crate::domain::timeframe::{DEFAULT_MAX_ENTRY_DEPTH, TimeframeAlignmentValidator};
use crate::ports::config_port::ConfigPort;
use chrono::{FixedOffset, Offset, Utc};
use rust_decimal::Decimal;

pub fn load_reference_tables(config: &dyn ConfigPort) -> Result<ReferenceTables, JournalError> {
    let tables = ReferenceTables {
        assets: load_assets(config)?,
        sessions: load_sessions(config)?,
        timeframes: load_timeframes(config)?,
        utc_offset: load_utc_offset(config)?,
    };
    tracing::debug!(
        assets = tables.assets.len(),
        timeframes = tables.timeframes.ranks().len(),
        max_entry_depth = tables.timeframes.max_entry_depth(),
        utc_offset = %tables.utc_offset,
        "reference tables loaded"
    );
    Ok(tables)
}

fn load_utc_offset(config: &dyn ConfigPort) -> Result<FixedOffset, JournalError> {
    match config.get_string("engine", "utc_offset") {
        Some(raw) => parse_utc_offset(&raw)
            .map_err(|reason| JournalError::config_invalid("engine", "utc_offset", reason)),
        None => Ok(Utc.fix()),
    }
}

/// Parses `+HH:MM`, `-HH:MM` or `Z`.
pub fn parse_utc_offset(raw: &str) -> Result<FixedOffset, String> {
    let s = raw.trim();
    if s.eq_ignore_ascii_case("z") || s.eq_ignore_ascii_case("utc") {
        return Ok(Utc.fix());
    }
    let (sign, rest) = match s.chars().next() {
        Some('+') => (1, &s[1..]),
        Some('-') => (-1, &s[1..]),
        _ => return Err(format!("expected +HH:MM or -HH:MM, got '{s}'")),
    };
    let (h, m) = rest
        .split_once(':')
        .ok_or_else(|| format!("expected +HH:MM or -HH:MM, got '{s}'"))?;
    let hours: i32 = h.parse().map_err(|_| format!("invalid hours in '{s}'"))?;
    let minutes: i32 = m.parse().map_err(|_| format!("invalid minutes in '{s}'"))?;
    if !(0..60).contains(&minutes) {
        return Err(format!("invalid minutes in '{s}'"));
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
        .ok_or_else(|| format!("offset '{s}' is out of range"))
}

fn load_assets(config: &dyn ConfigPort) -> Result<AssetRegistry, JournalError> {
    let base = if config.get_bool("engine", "use_default_assets", true) {
        AssetRegistry::with_defaults()
    } else {
        AssetRegistry::empty()
    };

    let mut entries = Vec::new();
    for (symbol, raw) in config.section_entries("assets") {
        let multiplier: Decimal = raw.trim().parse().map_err(|_| {
            JournalError::config_invalid("assets", &symbol, format!("'{raw}' is not a number"))
        })?;
        entries.push((symbol, multiplier));
    }
    base.merge(entries)
}

fn load_timeframes(config: &dyn ConfigPort) -> Result<TimeframeAlignmentValidator, JournalError> {
    let depth = match config.get_string("alignment", "max_entry_depth") {
        Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
            JournalError::config_invalid(
                "alignment",
                "max_entry_depth",
                format!("'{raw}' is not a non-negative integer"),
            )
        })?,
        None => DEFAULT_MAX_ENTRY_DEPTH,
    };

    let entries = config.section_entries("timeframes");
    if entries.is_empty() {
        let defaults = TimeframeAlignmentValidator::default();
        let ranks: Vec<(String, u32)> = defaults
            .ranks()
            .iter()
            .map(|r| (r.label.clone(), r.rank))
            .collect();
        return TimeframeAlignmentValidator::new(ranks, depth);
    }

    let mut ranks = Vec::with_capacity(entries.len());
    for (label, raw) in entries {
        let rank: u32 = raw.trim().parse().map_err(|_| {
            JournalError::config_invalid(
                "timeframes",
                &label,
                format!("'{raw}' is not a non-negative integer"),
            )
        })?;
        ranks.push((label, rank));
    }
    TimeframeAlignmentValidator::new(ranks, depth)
}

fn load_sessions(config: &dyn ConfigPort) -> Result<SessionDetector, JournalError> {
    let defaults = SessionDetector::default();
    let asian = session_window(config, "asian", defaults.asian())?;
    let london = session_window(config, "london", defaults.london())?;
    let new_york = session_window(config, "new_york", defaults.new_york())?;
    SessionDetector::new(asian, london, new_york)
}

fn session_window(
    config: &dyn ConfigPort,
    key: &str,
    default: SessionWindow,
) -> Result<SessionWindow, JournalError> {
    match config.get_string("sessions", key) {
        Some(raw) => raw
            .parse()
            .map_err(|reason: String| JournalError::config_invalid("sessions", key, reason)),
        None => Ok(default),
    }
}
