use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Number of records created in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub count: u64,
}

pub fn month_label(year: i32, month: u32) -> String {
    let name = MONTHS
        .get(month.saturating_sub(1) as usize)
        .copied()
        .unwrap_or("???");
    format!("{} {}", name, year)
}

/// Groups timestamps by calendar month, oldest month first.
pub fn monthly_rollup<I>(timestamps: I) -> Vec<MonthBucket>
where
    I: IntoIterator<Item = DateTime<Utc>>,
{
    let mut counts: BTreeMap<(i32, u32), u64> = BTreeMap::new();
    for ts in timestamps {
        *counts.entry((ts.year(), ts.month())).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|((year, month), count)| MonthBucket {
            label: month_label(year, month),
            year,
            month,
            count,
        })
        .collect()
}

pub fn count_for(buckets: &[MonthBucket], year: i32, month: u32) -> u64 {
    buckets
        .iter()
        .find(|b| b.year == year && b.month == month)
        .map(|b| b.count)
        .unwrap_or(0)
}

pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// Percentage change from `previous` to `current`; `100.0` when there is no
/// baseline.
pub fn month_over_month(previous: u64, current: u64) -> f64 {
    if previous == 0 {
        return 100.0;
    }
    (current as f64 - previous as f64) / previous as f64 * 100.0
}
