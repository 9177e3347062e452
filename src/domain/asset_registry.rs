//! Instrument symbol to contract multiplier lookup.
//!
//! The multiplier is the monetary value of a one-unit price move for one lot.
//! Symbols are normalized before lookup so that `eur/usd`, `EUR-USD` and
//! `EURUSD` resolve to the same entry. Unknown symbols fall back to a
//! multiplier of one, which keeps PnL bookkeeping in raw price units.

use crate::domain::error::JournalError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

pub const FALLBACK_MULTIPLIER: Decimal = Decimal::ONE;

const DEFAULT_MULTIPLIERS: &[(&str, Decimal)] = &[
    ("EURUSD", dec!(100000)),
    ("GBPUSD", dec!(100000)),
    ("AUDUSD", dec!(100000)),
    ("NZDUSD", dec!(100000)),
    ("USDCAD", dec!(100000)),
    ("USDCHF", dec!(100000)),
    ("USDJPY", dec!(100000)),
    ("EURGBP", dec!(100000)),
    ("EURJPY", dec!(100000)),
    ("GBPJPY", dec!(100000)),
    ("XAUUSD", dec!(100)),
    ("XAGUSD", dec!(5000)),
    ("US30", dec!(1)),
    ("NAS100", dec!(1)),
    ("SPX500", dec!(1)),
    ("GER40", dec!(1)),
    ("UK100", dec!(1)),
    ("BTCUSD", dec!(1)),
    ("ETHUSD", dec!(1)),
    ("ES", dec!(50)),
    ("NQ", dec!(20)),
    ("YM", dec!(5)),
    ("CL", dec!(1000)),
    ("GC", dec!(100)),
];

#[derive(Debug, Clone, PartialEq)]
pub struct AssetRegistry {
    multipliers: HashMap<String, Decimal>,
}

impl AssetRegistry {
    /// Builds a registry from `(symbol, multiplier)` pairs.
    ///
    /// Errors on empty symbols, non-positive multipliers, and symbols that
    /// collide after normalization.
    pub fn new<I, S>(entries: I) -> Result<Self, JournalError>
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        Self::empty().merge(entries)
    }

    pub fn empty() -> Self {
        Self {
            multipliers: HashMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let multipliers = DEFAULT_MULTIPLIERS
            .iter()
            .map(|(symbol, m)| (symbol.to_string(), *m))
            .collect();
        Self { multipliers }
    }

    /// Returns a new registry with `entries` layered over this one.
    /// Later entries override earlier ones only across the layers; a
    /// duplicate inside `entries` itself is an error.
    pub fn merge<I, S>(&self, entries: I) -> Result<Self, JournalError>
    where
        I: IntoIterator<Item = (S, Decimal)>,
        S: AsRef<str>,
    {
        let mut multipliers = self.multipliers.clone();
        let mut seen = HashMap::new();

        for (raw, multiplier) in entries {
            let raw = raw.as_ref();
            let symbol = normalize_symbol(raw);
            if symbol.is_empty() {
                return Err(JournalError::config_invalid(
                    "assets",
                    raw,
                    "symbol must not be empty",
                ));
            }
            if multiplier <= Decimal::ZERO {
                return Err(JournalError::config_invalid(
                    "assets",
                    raw,
                    format!("multiplier must be positive, got {multiplier}"),
                ));
            }
            if let Some(previous) = seen.insert(symbol.clone(), raw.to_string()) {
                return Err(JournalError::config_invalid(
                    "assets",
                    raw,
                    format!("duplicate of '{previous}' after normalization"),
                ));
            }
            multipliers.insert(symbol, multiplier);
        }

        Ok(Self { multipliers })
    }

    pub fn multiplier_for(&self, symbol: &str) -> Decimal {
        let key = normalize_symbol(symbol);
        match self.multipliers.get(&key) {
            Some(m) => *m,
            None => {
                tracing::debug!(symbol = %key, "unknown symbol, using fallback multiplier");
                FALLBACK_MULTIPLIER
            }
        }
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.multipliers.contains_key(&normalize_symbol(symbol))
    }

    pub fn len(&self) -> usize {
        self.multipliers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.multipliers.is_empty()
    }
}

impl Default for AssetRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Upper-cases and strips common separators: `" eur/usd "` -> `"EURUSD"`.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol
        .chars()
        .filter(|c| !matches!(c, '/' | '-' | '_' | '.') && !c.is_whitespace())
        .flat_map(char::to_uppercase)
        .collect()
}
