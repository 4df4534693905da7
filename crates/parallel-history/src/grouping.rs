//! Display grouping for history rows.
//!
//! Section labels are a pure function of record timestamp and the
//! caller-supplied clock, re-derived on every render and never stored.

use chrono::{DateTime, NaiveDate, Utc};

use parallel_types::TxRecord;

/// Buckets records into display sections labelled `Today`, `Yesterday`,
/// or `"{Month} {Year}"`.
///
/// Records land in the section matching their timestamp; each label
/// yields one section, ordered by first appearance, so a
/// newest-first input produces newest-first sections with the input
/// order preserved inside each one.
pub fn group_by_day(records: Vec<TxRecord>, now: DateTime<Utc>) -> Vec<(String, Vec<TxRecord>)> {
    let today = now.date_naive();
    let yesterday = today.pred_opt();

    let mut sections: Vec<(String, Vec<TxRecord>)> = Vec::new();
    for record in records {
        let label = day_label(record.timestamp_ms, today, yesterday);
        match sections.iter_mut().find(|(name, _)| *name == label) {
            Some((_, bucket)) => bucket.push(record),
            None => sections.push((label, vec![record])),
        }
    }
    sections
}

fn day_label(timestamp_ms: i64, today: NaiveDate, yesterday: Option<NaiveDate>) -> String {
    // Out-of-range timestamps clamp to the epoch rather than panic.
    let date = DateTime::<Utc>::from_timestamp_millis(timestamp_ms)
        .unwrap_or_default()
        .date_naive();
    if date == today {
        "Today".to_string()
    } else if Some(date) == yesterday {
        "Yesterday".to_string()
    } else {
        date.format("%B %Y").to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use parallel_types::{Address, TokenKind, TxDirection, TxHash, TxStatus, Wei};

    fn clock(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn record(seed: u8, at: DateTime<Utc>) -> TxRecord {
        TxRecord {
            hash: TxHash::new([seed; 32]),
            token: TokenKind::Lut,
            direction: TxDirection::Incoming,
            title: "Received LUT".to_string(),
            from: Address::new([seed; 20]),
            to: Address::new([0xBB; 20]),
            amount: "1.00".to_string(),
            raw_amount: Wei::new(1_000_000_000_000_000_000),
            timestamp_ms: at.timestamp_millis(),
            status: TxStatus::Confirmed,
            fee: None,
            usd_value: None,
        }
    }

    #[test]
    fn labels_split_today_yesterday_and_month() {
        let now = clock(2024, 3, 15, 12, 0);
        let records = vec![
            record(1, clock(2024, 3, 15, 9, 30)),
            record(2, clock(2024, 3, 14, 22, 0)),
            record(3, clock(2024, 2, 4, 8, 0)),
        ];

        let sections = group_by_day(records, now);
        let labels: Vec<&str> = sections.iter().map(|(l, _)| l.as_str()).collect();
        assert_eq!(labels, vec!["Today", "Yesterday", "February 2024"]);
    }

    #[test]
    fn midnight_boundary_still_counts_as_yesterday() {
        let now = clock(2024, 3, 15, 0, 1);
        let sections = group_by_day(vec![record(1, clock(2024, 3, 14, 23, 59))], now);
        assert_eq!(sections[0].0, "Yesterday");
    }

    #[test]
    fn year_boundary_yesterday_beats_month_label() {
        let now = clock(2024, 1, 1, 10, 0);
        let sections = group_by_day(vec![record(1, clock(2023, 12, 31, 18, 0))], now);
        assert_eq!(sections[0].0, "Yesterday");
    }

    #[test]
    fn same_month_records_share_one_section_in_order() {
        let now = clock(2024, 3, 15, 12, 0);
        let newer = record(1, clock(2024, 1, 20, 12, 0));
        let older = record(2, clock(2024, 1, 5, 12, 0));

        let sections = group_by_day(vec![newer.clone(), older.clone()], now);
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "January 2024");
        assert_eq!(sections[0].1[0].hash, newer.hash);
        assert_eq!(sections[0].1[1].hash, older.hash);
    }

    #[test]
    fn two_days_ago_gets_a_month_label() {
        let now = clock(2024, 3, 15, 12, 0);
        let sections = group_by_day(vec![record(1, clock(2024, 3, 13, 12, 0))], now);
        assert_eq!(sections[0].0, "March 2024");
    }

    #[test]
    fn empty_history_groups_to_nothing() {
        assert!(group_by_day(Vec::new(), clock(2024, 3, 15, 12, 0)).is_empty());
    }
}
