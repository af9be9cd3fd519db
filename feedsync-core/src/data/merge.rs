//! Merge, deduplicate and sort datasets.
//!
//! Existing rows come first, incoming rows after; on a shared date the later row
//! replaces the earlier one entirely. The parsed date is only a sort key: each row
//! keeps its original date text.

use super::validate::parse_date;
use crate::domain::dataset::union_columns;
use crate::domain::{Dataset, Record};
use chrono::NaiveDate;
use std::collections::HashMap;

/// Result of a merge.
#[derive(Debug, Clone)]
pub struct Merged {
    pub dataset: Dataset,
    /// Existing rows overwritten by an incoming row with the same date.
    pub replaced: usize,
    /// Rows dropped because their date could not be parsed.
    pub discarded: usize,
}

/// Merge `incoming` into `existing`, keyed on `date_field`.
///
/// The result holds one row per distinct date, ascending. Columns are the existing
/// columns followed by new incoming field names in first-seen order.
pub fn merge(existing: Dataset, incoming: Vec<Record>, date_field: &str) -> Merged {
    let existing_len = existing.len();
    let columns = union_columns(existing.columns().to_vec(), &incoming);

    let mut keyed: Vec<(NaiveDate, Record, bool)> = Vec::with_capacity(existing_len + incoming.len());
    let mut index: HashMap<NaiveDate, usize> = HashMap::with_capacity(keyed.capacity());
    let mut replaced = 0;
    let mut discarded = 0;

    let tagged = existing
        .into_rows()
        .into_iter()
        .map(|r| (r, false))
        .chain(incoming.into_iter().map(|r| (r, true)));

    for (record, is_incoming) in tagged {
        let Some(date) = record.str_field(date_field).and_then(parse_date) else {
            discarded += 1;
            continue;
        };

        match index.get(&date) {
            Some(&slot) => {
                if is_incoming && !keyed[slot].2 {
                    replaced += 1;
                }
                keyed[slot] = (date, record, is_incoming);
            }
            None => {
                index.insert(date, keyed.len());
                keyed.push((date, record, is_incoming));
            }
        }
    }

    // Keys are unique, so stability is irrelevant.
    keyed.sort_unstable_by_key(|(date, _, _)| *date);
    let rows = keyed.into_iter().map(|(_, record, _)| record).collect();

    Merged {
        dataset: Dataset::from_parts(columns, rows),
        replaced,
        discarded,
    }
}
