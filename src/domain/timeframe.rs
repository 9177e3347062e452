//! Top-down timeframe alignment.
//!
//! Timeframes form a closed, totally ordered table where a higher rank is a
//! coarser timeframe. An entry timeframe is aligned with an analysis
//! timeframe when it is no coarser than the analysis timeframe and no more
//! than `max_entry_depth` table steps finer. Steps count positions in the
//! table, not raw rank values, so ranks need not be contiguous.

use crate::domain::error::JournalError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_MAX_ENTRY_DEPTH: usize = 3;

const DEFAULT_RANKS: &[(&str, u32)] = &[
    ("Monthly", 9),
    ("Weekly", 8),
    ("Daily", 7),
    ("H4", 6),
    ("H1", 5),
    ("M15", 4),
    ("M5", 3),
    ("M3", 2),
    ("M1", 1),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alignment {
    pub valid: bool,
    /// Finest entry timeframe the analysis timeframe still supports. A hint
    /// only: callers may persist a non-aligned trade.
    pub recommended_max_entry_timeframe: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeframeRank {
    pub label: String,
    pub rank: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeframeAlignmentValidator {
    /// Sorted finest first.
    table: Vec<TimeframeRank>,
    max_entry_depth: usize,
}

impl TimeframeAlignmentValidator {
    pub fn new<I, S>(ranks: I, max_entry_depth: usize) -> Result<Self, JournalError>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut table = Vec::new();
        let mut labels = HashSet::new();
        let mut seen_ranks = HashSet::new();

        for (label, rank) in ranks {
            let label = label.into().trim().to_string();
            if label.is_empty() {
                return Err(JournalError::config_invalid(
                    "timeframes",
                    &label,
                    "label must not be empty",
                ));
            }
            if !labels.insert(label.to_lowercase()) {
                return Err(JournalError::config_invalid(
                    "timeframes",
                    &label,
                    "duplicate timeframe label",
                ));
            }
            if !seen_ranks.insert(rank) {
                return Err(JournalError::config_invalid(
                    "timeframes",
                    &label,
                    format!("rank {rank} is already used"),
                ));
            }
            table.push(TimeframeRank { label, rank });
        }

        if table.is_empty() {
            return Err(JournalError::ConfigMissing {
                section: "timeframes".to_string(),
                key: "<any>".to_string(),
            });
        }

        table.sort_by_key(|t| t.rank);
        Ok(Self {
            table,
            max_entry_depth,
        })
    }

    pub fn max_entry_depth(&self) -> usize {
        self.max_entry_depth
    }

    /// Table entries, finest first.
    pub fn ranks(&self) -> &[TimeframeRank] {
        &self.table
    }

    /// Canonical label for a case-insensitive match.
    pub fn canonical(&self, label: &str) -> Result<&str, JournalError> {
        self.position(label).map(|i| self.table[i].label.as_str())
    }

    pub fn validate(&self, analysis: &str, entry: &str) -> Result<Alignment, JournalError> {
        let analysis_pos = self.position(analysis)?;
        let entry_pos = self.position(entry)?;
        let floor = analysis_pos.saturating_sub(self.max_entry_depth);

        Ok(Alignment {
            valid: (floor..=analysis_pos).contains(&entry_pos),
            recommended_max_entry_timeframe: self.table[floor].label.clone(),
        })
    }

    fn position(&self, label: &str) -> Result<usize, JournalError> {
        let wanted = label.trim();
        self.table
            .iter()
            .position(|t| t.label.eq_ignore_ascii_case(wanted))
            .ok_or_else(|| JournalError::UnknownTimeframe(wanted.to_string()))
    }
}

impl Default for TimeframeAlignmentValidator {
    fn default() -> Self {
        let mut table: Vec<TimeframeRank> = DEFAULT_RANKS
            .iter()
            .map(|(label, rank)| TimeframeRank {
                label: label.to_string(),
                rank: *rank,
            })
            .collect();
        table.sort_by_key(|t| t.rank);
        Self {
            table,
            max_entry_depth: DEFAULT_MAX_ENTRY_DEPTH,
        }
    }
}
