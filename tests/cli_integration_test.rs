//! CLI integration tests.
//!
//! Tests cover:
//! - Loading reference tables from real INI files on disk
//! - Annotating a CSV journal and writing the CSV report
//! - Exit codes for config, data and input failures

mod common;

use clap::Parser;
use common::*;
use rust_decimal_macros::dec;
use std::io::Write;
use tradejournal::adapters::csv_adapter::{CsvReportAdapter, CsvTradeAdapter};
use tradejournal::cli::{self, Cli};
use tradejournal::domain::error::JournalError;
use tradejournal::domain::journal::annotate_all;
use tradejournal::domain::reference::ReferenceStore;
use tradejournal::domain::session::Session;
use tradejournal::ports::report_port::ReportPort;
use tradejournal::ports::trade_port::TradePort;

fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const REFERENCE_INI: &str = r#"
[engine]
utc_offset = -05:00

[assets]
EURUSD = 100000
MES = 5

[alignment]
max_entry_depth = 2

[sessions]
london = 08:00-17:00
new_york = 13:00-22:00
"#;

/// Exit status the binary would report for `args`.
fn run(args: &[&str]) -> u8 {
    let mut argv = vec!["tradejournal"];
    argv.extend_from_slice(args);
    match cli::dispatch(Cli::try_parse_from(argv).unwrap()) {
        Ok(()) => 0,
        Err(e) => e.exit_status(),
    }
}

mod reference_config {
    use super::*;

    #[test]
    fn load_tables_from_file() {
        let ini = write_temp(REFERENCE_INI);
        let tables = cli::load_tables(Some(ini.path())).unwrap();

        assert_eq!(tables.utc_offset.local_minus_utc(), -5 * 3600);
        assert_eq!(tables.assets.multiplier_for("MES"), dec!(5));
        assert_eq!(tables.assets.multiplier_for("XAUUSD"), dec!(100));
        assert_eq!(tables.timeframes.max_entry_depth(), 2);
        // 09:30 New York wall clock is 14:30 UTC.
        assert_eq!(
            tables.sessions.detect(time(9, 30), tables.utc_offset),
            Session::LondonNewYorkOverlap
        );
        assert_eq!(
            tables.sessions.detect(time(2, 30), tables.utc_offset),
            Session::Asian
        );
    }

    #[test]
    fn invalid_value_is_config_invalid() {
        let ini = write_temp("[alignment]\nmax_entry_depth = deep\n");
        let err = cli::load_tables(Some(ini.path())).unwrap_err();
        assert!(matches!(err, JournalError::ConfigInvalid { .. }));
        assert_eq!(err.exit_status(), 2);
    }

    #[test]
    fn validate_command_exit_codes() {
        let good = write_temp(REFERENCE_INI);
        assert_eq!(run(&["validate", "--config", good.path().to_str().unwrap()]), 0);

        let bad = write_temp("[sessions]\nasian = 06:00-09:00\n");
        assert_eq!(
            run(&["validate", "--config", bad.path().to_str().unwrap()]),
            2
        );
    }
}

mod annotate {
    use super::*;

    fn journal() -> tempfile::NamedTempFile {
        write_temp(&trades_csv(&[
            "w1,EURUSD,long,1.1000,1.1050,1.0975,1,5,-1,2024-03-04,09:30,2024-03-04,11:00,Daily,M15",
            "o1,MES,short,5200,,,2,,,2024-03-05,,,,,",
            "x1,EURUSD,long,1.1000,1.0950,,1,,,2024-03-04,,,,Daily,M30",
        ]))
    }

    #[test]
    fn annotate_journal_to_report() {
        let ini = write_temp(REFERENCE_INI);
        let trades = journal();
        let store = ReferenceStore::new(cli::load_tables(Some(ini.path())).unwrap());

        let records = CsvTradeAdapter::new(trades.path().to_path_buf())
            .fetch_trades()
            .unwrap();
        let annotated = annotate_all(&store.aggregator(), &records);

        let w1 = annotated[0].metrics().unwrap();
        assert_eq!(w1.pnl, Some(dec!(494)));
        assert_eq!(w1.r_multiple, Some(dec!(2)));
        assert_eq!(w1.session, Some(Session::LondonNewYorkOverlap));
        assert_eq!(w1.timeframe_aligned(), Some(false));
        assert_eq!(w1.recommended_max_entry_timeframe(), Some("H1"));
        assert_eq!(w1.holding_minutes, Some(90));

        assert_eq!(annotated[1].metrics().unwrap().multiplier, dec!(5));
        assert!(matches!(
            annotated[2].error(),
            Some(JournalError::UnknownTimeframe(l)) if l == "M30"
        ));

        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.csv");
        CsvReportAdapter::new(Some(out.clone()))
            .write(&annotated)
            .unwrap();
        let report = std::fs::read_to_string(&out).unwrap();
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[1].starts_with("w1,100000,500,494,win,2,LondonNewYorkOverlap,false,H1,90,"));
        assert!(lines[2].starts_with("o1,5,,,pending,,,,,,"));
        assert!(lines[3].contains("unknown timeframe: M30"));
    }

    #[test]
    fn annotate_command_writes_output() {
        let trades = journal();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.csv");

        let code = run(&[
            "annotate",
            "--trades",
            trades.path().to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
        ]);
        assert_eq!(code, 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap().lines().count(), 4);
    }

    #[test]
    fn strict_mode_fails_on_bad_row() {
        let trades = journal();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("report.csv");

        let code = run(&[
            "annotate",
            "--trades",
            trades.path().to_str().unwrap(),
            "--output",
            out.to_str().unwrap(),
            "--strict",
        ]);
        assert_eq!(code, 4);
        assert!(!out.exists());
    }

    #[test]
    fn malformed_journal_is_trade_data() {
        let trades = write_temp(&trades_csv(&["m1,EURUSD,long,abc,,,1,,,2024-03-04,,,,,"]));
        let code = run(&["annotate", "--trades", trades.path().to_str().unwrap()]);
        assert_eq!(code, 3);
    }

    #[test]
    fn missing_journal_is_io() {
        let code = run(&["annotate", "--trades", "/nonexistent/journal.csv"]);
        assert_eq!(code, 1);
    }
}

mod lookups {
    use super::*;

    #[test]
    fn session_and_align_and_multiplier_succeed() {
        assert_eq!(run(&["session", "--time", "14:30"]), 0);
        assert_eq!(
            run(&["align", "--analysis", "Daily", "--entry", "M15"]),
            0
        );
        assert_eq!(run(&["multiplier", "--symbol", "xau/usd"]), 0);
    }

    #[test]
    fn unknown_timeframe_exit_code() {
        assert_eq!(
            run(&["align", "--analysis", "Daily", "--entry", "M30"]),
            4
        );
    }

    #[test]
    fn missing_config_file_exit_code() {
        assert_eq!(
            run(&["session", "--time", "10:00", "--config", "/nonexistent/ref.ini"]),
            2
        );
    }
}
