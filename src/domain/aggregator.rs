//! One-pass annotation of a trade snapshot.

use crate::domain::error::JournalError;
use crate::domain::outcome::Outcome;
use crate::domain::pnl::compute_pnl;
use crate::domain::reference::ReferenceTables;
use crate::domain::risk_reward::compute_r_multiple;
use crate::domain::trade::{TradeInput, TradeMetrics};
use std::sync::Arc;

/// Orchestrates the calculators over an immutable reference snapshot.
///
/// `annotate` is a pure function of its input and the snapshot: it keeps
/// no state between calls, so it may be shared freely across threads and
/// calling it twice on the same input yields identical metrics.
#[derive(Debug, Clone)]
pub struct TradeMetricsAggregator {
    tables: Arc<ReferenceTables>,
}

impl TradeMetricsAggregator {
    pub fn new(tables: Arc<ReferenceTables>) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    pub fn annotate(&self, input: &TradeInput) -> Result<TradeMetrics, JournalError> {
        input.validate()?;

        let multiplier = self.tables.assets.multiplier_for(&input.symbol);
        let breakdown = compute_pnl(input, multiplier)?;
        let pnl = breakdown.map(|b| b.net);
        let outcome = Outcome::classify(pnl);

        let r_multiple = match (pnl, input.exit_price) {
            (Some(_), Some(exit)) => {
                compute_r_multiple(input.entry_price, exit, input.stop_loss, input.direction)
            }
            _ => None,
        };

        let session = input
            .entry_time
            .map(|t| self.tables.sessions.detect(t, self.tables.utc_offset));

        let alignment = match (&input.analysis_timeframe, &input.entry_timeframe) {
            (Some(analysis), Some(entry)) => {
                Some(self.tables.timeframes.validate(analysis, entry)?)
            }
            _ => None,
        };

        let holding_minutes = if input.is_open() {
            None
        } else {
            match (input.entry_datetime(), input.exit_datetime()) {
                (Some(entry), Some(exit)) => Some((exit - entry).num_minutes()),
                _ => None,
            }
        };

        tracing::debug!(
            symbol = %input.symbol,
            %outcome,
            pnl = ?pnl,
            r_multiple = ?r_multiple,
            "trade annotated"
        );

        Ok(TradeMetrics {
            multiplier,
            gross_pnl: breakdown.map(|b| b.gross),
            pnl,
            outcome,
            r_multiple,
            session,
            alignment,
            holding_minutes,
        })
    }
}

impl Default for TradeMetricsAggregator {
    fn default() -> Self {
        Self::new(Arc::new(ReferenceTables::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::session::Session;
    use crate::domain::trade::Direction;
    use chrono::{NaiveDate, NaiveTime};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn open_eurusd() -> TradeInput {
        TradeInput::new("EURUSD", Direction::Long, dec!(1.2000), dec!(1), date(2024, 6, 3))
    }

    #[test]
    fn open_trade_is_pending() {
        let metrics = TradeMetricsAggregator::default()
            .annotate(&open_eurusd())
            .unwrap();
        assert_eq!(metrics.outcome, Outcome::Pending);
        assert_eq!(metrics.pnl, None);
        assert_eq!(metrics.gross_pnl, None);
        assert_eq!(metrics.r_multiple, None);
        assert_eq!(metrics.session, None);
        assert_eq!(metrics.alignment, None);
        assert_eq!(metrics.holding_minutes, None);
        assert_eq!(metrics.multiplier, dec!(100000));
    }

    #[test]
    fn open_trade_with_stop_has_no_r() {
        let input = open_eurusd().with_stop_loss(dec!(1.1950));
        let metrics = TradeMetricsAggregator::default().annotate(&input).unwrap();
        assert_eq!(metrics.r_multiple, None);
    }

    #[test]
    fn closed_trade_full_bundle() {
        let input = open_eurusd()
            .with_stop_loss(dec!(1.1950))
            .with_exit_price(dec!(1.2100))
            .with_costs(dec!(7), dec!(0))
            .with_entry_time(time(14, 30))
            .with_exit_at(date(2024, 6, 4), Some(time(9, 0)))
            .with_timeframes("Daily", "M15");

        let metrics = TradeMetricsAggregator::default().annotate(&input).unwrap();
        assert_eq!(metrics.gross_pnl, Some(dec!(1000)));
        assert_eq!(metrics.pnl, Some(dec!(993)));
        assert_eq!(metrics.outcome, Outcome::Win);
        assert_eq!(metrics.r_multiple, Some(dec!(2)));
        assert_eq!(metrics.session, Some(Session::LondonNewYorkOverlap));
        assert_eq!(metrics.timeframe_aligned(), Some(true));
        assert_eq!(metrics.recommended_max_entry_timeframe(), Some("M15"));
        assert_eq!(metrics.holding_minutes, Some(18 * 60 + 30));
    }

    #[test]
    fn breakeven_after_costs() {
        let input = open_eurusd()
            .with_exit_price(dec!(1.2001))
            .with_costs(dec!(10), Decimal::ZERO);
        let metrics = TradeMetricsAggregator::default().annotate(&input).unwrap();
        assert_eq!(metrics.pnl, Some(Decimal::ZERO));
        assert_eq!(metrics.outcome, Outcome::Breakeven);
    }

    #[test]
    fn invalid_input_is_not_pending() {
        let mut input = open_eurusd();
        input.lot_size = dec!(-1);
        let err = TradeMetricsAggregator::default().annotate(&input).unwrap_err();
        assert!(matches!(err, JournalError::InvalidInput { field, .. } if field == "lot_size"));
    }

    #[test]
    fn unknown_timeframe_propagates() {
        let input = open_eurusd().with_timeframes("Daily", "M7");
        let err = TradeMetricsAggregator::default().annotate(&input).unwrap_err();
        assert!(matches!(err, JournalError::UnknownTimeframe(l) if l == "M7"));
    }

    #[test]
    fn single_timeframe_label_gives_no_alignment() {
        let mut input = open_eurusd();
        input.analysis_timeframe = Some("Daily".into());
        let metrics = TradeMetricsAggregator::default().annotate(&input).unwrap();
        assert_eq!(metrics.alignment, None);
    }

    #[test]
    fn holding_period_needs_full_timestamps() {
        let input = open_eurusd()
            .with_exit_price(dec!(1.21))
            .with_exit_at(date(2024, 6, 5), Some(time(10, 0)));
        let metrics = TradeMetricsAggregator::default().annotate(&input).unwrap();
        assert_eq!(metrics.holding_minutes, None);
    }

    #[test]
    fn entry_time_offset_applies() {
        let mut tables = ReferenceTables::default();
        tables.utc_offset = chrono::FixedOffset::west_opt(4 * 3600).unwrap();
        let aggregator = TradeMetricsAggregator::new(Arc::new(tables));

        // 08:00 at -04:00 is 12:00 UTC.
        let input = open_eurusd().with_entry_time(time(8, 0));
        let metrics = aggregator.annotate(&input).unwrap();
        assert_eq!(metrics.session, Some(Session::LondonNewYorkOverlap));
    }

    #[test]
    fn annotate_is_idempotent() {
        let input = open_eurusd()
            .with_stop_loss(dec!(1.19))
            .with_exit_price(dec!(1.18))
            .with_entry_time(time(3, 15))
            .with_timeframes("H4", "M1");
        let aggregator = TradeMetricsAggregator::default();
        let first = aggregator.annotate(&input).unwrap();
        let second = aggregator.annotate(&input).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.outcome, Outcome::Loss);
        assert_eq!(first.r_multiple, Some(dec!(-2)));
        assert_eq!(first.timeframe_aligned(), Some(false));
    }
}
