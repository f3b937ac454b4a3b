//! Interval truncation properties

use candle_aggregator::Resolution;
use candlestream_common::Ts;
use chrono::{DateTime, Utc};
use rstest::rstest;

fn ts(rfc3339: &str) -> Ts {
    let dt = DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc);
    Ts::from_datetime(dt)
}

#[rstest]
#[case(Resolution::M1)]
#[case(Resolution::H1)]
#[case(Resolution::D1)]
fn bucket_start_bounds_timestamp(#[case] resolution: Resolution) {
    let samples = [
        ts("2024-03-15T13:47:23.123456789Z"),
        ts("2024-01-01T00:00:00Z"),
        ts("2023-12-31T23:59:59.999Z"),
        ts("2024-02-29T12:00:01Z"),
    ];
    for t in samples {
        let start = resolution.bucket_start(t);
        assert!(start <= t, "{resolution}: start {start} after {t}");
        assert!(
            t.as_secs() < start.as_secs() + resolution.secs(),
            "{resolution}: {t} beyond bucket [{start}, +{})",
            resolution.secs()
        );
    }
}

#[rstest]
#[case(Resolution::M1)]
#[case(Resolution::H1)]
#[case(Resolution::D1)]
fn bucket_start_is_idempotent(#[case] resolution: Resolution) {
    let t = ts("2024-03-15T13:47:23Z");
    let once = resolution.bucket_start(t);
    assert_eq!(resolution.bucket_start(once), once);
}

#[rstest]
#[case(Resolution::M1, "2024-03-15T13:47:23Z", "2024-03-15T13:47:00Z")]
#[case(Resolution::H1, "2024-03-15T13:47:23Z", "2024-03-15T13:00:00Z")]
#[case(Resolution::D1, "2024-03-15T13:47:23Z", "2024-03-15T00:00:00Z")]
#[case(Resolution::D1, "2024-03-15T23:59:59Z", "2024-03-15T00:00:00Z")]
fn bucket_start_canonical_alignment(
    #[case] resolution: Resolution,
    #[case] input: &str,
    #[case] expected: &str,
) {
    assert_eq!(resolution.bucket_start(ts(input)), ts(expected));
}

#[test]
fn aligned_timestamp_is_its_own_bucket_start() {
    let aligned = ts("2024-03-15T13:47:00Z");
    assert_eq!(Resolution::M1.bucket_start(aligned), aligned);
}
