//! Immutable reference data bundle and its swap-in store.
//!
//! Readers take an `Arc` snapshot with one atomic load; writers build a
//! complete new [`ReferenceTables`] and swap it in with
//! [`ReferenceStore::replace`]. A reader sees either the old bundle or the
//! new one, never a mix of tables from both.

use crate::domain::aggregator::TradeMetricsAggregator;
use crate::domain::asset_registry::AssetRegistry;
use crate::domain::session::SessionDetector;
use crate::domain::timeframe::TimeframeAlignmentValidator;
use arc_swap::ArcSwap;
use chrono::{FixedOffset, Offset, Utc};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceTables {
    pub assets: AssetRegistry,
    pub sessions: SessionDetector,
    pub timeframes: TimeframeAlignmentValidator,
    /// Offset of the journal's wall clock from UTC.
    pub utc_offset: FixedOffset,
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self {
            assets: AssetRegistry::with_defaults(),
            sessions: SessionDetector::default(),
            timeframes: TimeframeAlignmentValidator::default(),
            utc_offset: Utc.fix(),
        }
    }
}

pub struct ReferenceStore {
    current: ArcSwap<ReferenceTables>,
}

impl ReferenceStore {
    pub fn new(tables: ReferenceTables) -> Self {
        Self {
            current: ArcSwap::from_pointee(tables),
        }
    }

    pub fn snapshot(&self) -> Arc<ReferenceTables> {
        self.current.load_full()
    }

    pub fn replace(&self, tables: ReferenceTables) {
        self.current.store(Arc::new(tables));
        tracing::info!("reference tables replaced");
    }

    /// An aggregator pinned to the current snapshot. Later replacements do
    /// not affect it.
    pub fn aggregator(&self) -> TradeMetricsAggregator {
        TradeMetricsAggregator::new(self.snapshot())
    }
}

impl Default for ReferenceStore {
    fn default() -> Self {
        Self::new(ReferenceTables::default())
    }
}
