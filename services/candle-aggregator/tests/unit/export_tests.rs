//! CSV snapshot export

use candle_aggregator::reconcile::Reconciliation;
use candle_aggregator::store::CandleStore;
use candle_aggregator::{Candle, Resolution, export};
use candlestream_common::{Px, Qty, Ts};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// 2024-01-01T00:01:00Z
const T0: u64 = 1_704_067_260;

fn candle(start_secs: u64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Candle {
    Candle {
        bucket_start: Ts::from_secs(start_secs),
        open: Px::new(open),
        high: Px::new(high),
        low: Px::new(low),
        close: Px::new(close),
        volume: Qty::new(volume),
        reconciliation: None,
    }
}

fn two_bucket_store() -> CandleStore {
    let mut store = CandleStore::new();
    store
        .append(candle(T0, 100.0, 105.0, 99.5, 104.0, 3.5))
        .unwrap();
    store
        .append(candle(T0 + 60, 104.0, 104.0, 90.0, 90.0, 1.0))
        .unwrap();
    store.set_reconciliation(
        Ts::from_secs(T0),
        Reconciliation {
            open_var: 0,
            high_var: -5_000,
            low_var: 0,
            close_var: -5_000,
            volume_var: -10_000,
            open_interest: Some(Qty::new(5000.0)),
        },
    );
    store
}

fn read_rows(path: &std::path::Path) -> (Vec<String>, Vec<Vec<String>>) {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers = reader
        .headers()
        .unwrap()
        .iter()
        .map(str::to_string)
        .collect();
    let rows = reader
        .records()
        .map(|r| r.unwrap().iter().map(str::to_string).collect())
        .collect();
    (headers, rows)
}

#[test]
fn export_writes_expected_filename() {
    let dir = TempDir::new().unwrap();
    let path = export::write_csv("BTC-PERP", Resolution::M1, &two_bucket_store(), dir.path())
        .unwrap();

    let name = path.file_name().unwrap().to_str().unwrap();
    assert!(
        name.ends_with("_BTC-PERP_60sec_candles.csv"),
        "unexpected filename {name}"
    );
    assert!(path.exists());
}

#[test]
fn export_emits_headers_and_ascending_rows() {
    let dir = TempDir::new().unwrap();
    let path = export::write_csv("BTC-PERP", Resolution::M1, &two_bucket_store(), dir.path())
        .unwrap();

    let (headers, rows) = read_rows(&path);
    assert_eq!(
        headers,
        vec![
            "bucket_start",
            "open",
            "high",
            "low",
            "close",
            "volume",
            "open_var",
            "high_var",
            "low_var",
            "close_var",
            "volume_var",
            "open_interest",
        ]
    );

    assert_eq!(rows.len(), 2);
    // Ascending by bucket start.
    assert!(rows[0][0] < rows[1][0]);
    assert_eq!(rows[0][0], "2024-01-01T00:01:00+00:00");
    assert_eq!(rows[1][0], "2024-01-01T00:02:00+00:00");
}

#[test]
fn reconciled_rows_carry_variances_unreconciled_rows_are_blank() {
    let dir = TempDir::new().unwrap();
    let path = export::write_csv("BTC-PERP", Resolution::M1, &two_bucket_store(), dir.path())
        .unwrap();
    let (_, rows) = read_rows(&path);

    let reconciled = &rows[0];
    assert_eq!(reconciled[1].parse::<f64>().unwrap(), 100.0);
    assert_eq!(reconciled[6].parse::<f64>().unwrap(), 0.0);
    assert_eq!(reconciled[7].parse::<f64>().unwrap(), -0.5);
    assert_eq!(reconciled[9].parse::<f64>().unwrap(), -0.5);
    assert_eq!(reconciled[10].parse::<f64>().unwrap(), -1.0);
    assert_eq!(reconciled[11].parse::<f64>().unwrap(), 5000.0);

    // Open bucket never reconciled: every optional column is empty.
    let open = &rows[1];
    for column in &open[6..] {
        assert!(column.is_empty(), "expected blank cell, got {column}");
    }
}

#[test]
fn export_of_empty_store_writes_no_rows() {
    let dir = TempDir::new().unwrap();
    let path = export::write_csv("BTC-PERP", Resolution::H1, &CandleStore::new(), dir.path())
        .unwrap();

    assert!(path.exists());
    let mut reader = csv::Reader::from_path(&path).unwrap();
    assert_eq!(reader.records().count(), 0);
}
