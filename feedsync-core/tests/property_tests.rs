//! Property tests for merge invariants.
//!
//! Uses proptest to verify:
//! 1. Row count equals the number of distinct dates across existing and incoming
//! 2. Output is strictly ascending by parsed date
//! 3. Overlapping dates carry the incoming values
//! 4. Validation never lets a sentinel or malformed date through

use chrono::NaiveDate;
use feedsync_core::data::validate::{parse_date, validate_records};
use feedsync_core::data::merge::merge;
use feedsync_core::domain::{Dataset, Record};
use proptest::prelude::*;
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Day offsets from 2015-01-01 mapped to `dd/mm/yyyy` text.
fn date_text(offset: u16) -> String {
    let base = NaiveDate::from_ymd_opt(2015, 1, 1).unwrap();
    (base + chrono::Duration::days(i64::from(offset)))
        .format("%d/%m/%Y")
        .to_string()
}

fn arb_rows() -> impl Strategy<Value = Vec<(u16, i64)>> {
    prop::collection::vec((0u16..400, -1000i64..1000), 0..60)
}

fn to_records(rows: &[(u16, i64)], source: &str) -> Vec<Record> {
    rows.iter()
        .map(|(offset, value)| {
            Record::from_value(json!({
                "Ngay": date_text(*offset),
                "value": value,
                "source": source,
            }))
            .unwrap()
        })
        .collect()
}

/// Existing datasets are themselves deduplicated and sorted.
fn existing_dataset(rows: &[(u16, i64)]) -> Dataset {
    let unique: BTreeMap<u16, i64> = rows.iter().copied().collect();
    let rows: Vec<(u16, i64)> = unique.into_iter().collect();
    Dataset::from_rows(to_records(&rows, "existing"))
}

fn parsed(record: &Record) -> NaiveDate {
    parse_date(record.str_field("Ngay").unwrap()).unwrap()
}

proptest! {
    #[test]
    fn row_count_equals_distinct_dates(
        existing in arb_rows(),
        incoming in arb_rows(),
    ) {
        let distinct: BTreeSet<u16> = existing.iter().chain(incoming.iter()).map(|(d, _)| *d).collect();
        let merged = merge(existing_dataset(&existing), to_records(&incoming, "incoming"), "Ngay");

        prop_assert_eq!(merged.dataset.len(), distinct.len());
        prop_assert_eq!(merged.discarded, 0);
    }

    #[test]
    fn output_is_strictly_ascending(
        existing in arb_rows(),
        incoming in arb_rows(),
    ) {
        let merged = merge(existing_dataset(&existing), to_records(&incoming, "incoming"), "Ngay");

        for pair in merged.dataset.rows().windows(2) {
            prop_assert!(parsed(&pair[0]) < parsed(&pair[1]));
        }
    }

    #[test]
    fn overlapping_dates_take_incoming_values(
        existing in arb_rows(),
        incoming in arb_rows(),
    ) {
        // Last incoming value per date wins.
        let expected: BTreeMap<u16, i64> = incoming.iter().copied().collect();
        let merged = merge(existing_dataset(&existing), to_records(&incoming, "incoming"), "Ngay");

        for row in merged.dataset.rows() {
            let text = row.str_field("Ngay").unwrap();
            if let Some((_, value)) = expected.iter().find(|(d, _)| date_text(**d) == text) {
                prop_assert_eq!(row.str_field("source"), Some("incoming"));
                prop_assert_eq!(row.get("value"), Some(&json!(value)));
            } else {
                prop_assert_eq!(row.str_field("source"), Some("existing"));
            }
        }
    }

    #[test]
    fn validation_rejects_malformed_dates(text in "[0-9/ a-zA-Z-]{0,12}") {
        let record = Record::from_value(json!({"Ngay": text.clone()})).unwrap();
        let validated = validate_records(vec![record], "Ngay");

        if validated.records.is_empty() {
            prop_assert_eq!(validated.dropped.total(), 1);
        } else {
            let date = parse_date(&text);
            prop_assert!(date.is_some());
            prop_assert!(text != "01/01/0001");
        }
    }
}
