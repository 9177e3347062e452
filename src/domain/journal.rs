//! Batch annotation of journal records.
//!
//! Each record is annotated on its own; a failing record is logged and kept
//! in the output with its error so the caller can decide whether to block a
//! save, warn, or store the trade without derived fields.

use crate::domain::aggregator::TradeMetricsAggregator;
use crate::domain::error::JournalError;
use crate::domain::trade::{TradeMetrics, TradeRecord};

#[derive(Debug)]
pub struct AnnotatedTrade {
    pub id: String,
    pub result: Result<TradeMetrics, JournalError>,
}

impl AnnotatedTrade {
    pub fn metrics(&self) -> Option<&TradeMetrics> {
        self.result.as_ref().ok()
    }

    pub fn error(&self) -> Option<&JournalError> {
        self.result.as_ref().err()
    }
}

pub fn annotate_all(
    aggregator: &TradeMetricsAggregator,
    records: &[TradeRecord],
) -> Vec<AnnotatedTrade> {
    let annotated: Vec<AnnotatedTrade> = records
        .iter()
        .map(|record| {
            let result = aggregator.annotate(&record.input);
            if let Err(e) = &result {
                tracing::warn!(id = %record.id, error = %e, "trade could not be annotated");
            }
            AnnotatedTrade {
                id: record.id.clone(),
                result,
            }
        })
        .collect();

    let failed = annotated.iter().filter(|a| a.result.is_err()).count();
    tracing::info!(
        total = annotated.len(),
        failed,
        "journal annotation finished"
    );
    annotated
}
