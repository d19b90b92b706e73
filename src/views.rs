//! Derived collections consumed by the renderers.
//!
//! Ordering works on the resolved start-date *strings*: ISO dates sort
//! correctly as text, and a missing date compares as `""`, which puts
//! undated records first ascending and last descending. All sorts are stable.

use crate::dates::resolve_start_date;
use crate::models::{COUNTY_NOT_SPECIFIED, CountyCount, EventRecord, MonthBuckets};
use chrono::Datelike;
use itertools::Itertools;
use std::collections::BTreeMap;

fn start_key(record: &EventRecord) -> String {
    record.start_date_raw().unwrap_or_default()
}

/// Most recent first; undated records last.
pub fn sort_descending_by_start_date<'a, I>(records: I) -> Vec<&'a EventRecord>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    records
        .into_iter()
        .sorted_by_cached_key(|r| std::cmp::Reverse(start_key(r)))
        .collect()
}

/// Earliest first; undated records first.
pub fn sort_ascending_by_start_date<'a, I>(records: I) -> Vec<&'a EventRecord>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    records.into_iter().sorted_by_cached_key(|r| start_key(r)).collect()
}

/// Count events per county, alphabetically, with "Not Specified" last.
pub fn group_by_county<'a, I>(records: I) -> Vec<CountyCount>
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for record in records {
        *counts.entry(record.county()).or_insert(0) += 1;
    }

    let unspecified = counts.remove(COUNTY_NOT_SPECIFIED);
    counts
        .into_iter()
        .chain(unspecified.map(|count| (COUNTY_NOT_SPECIFIED.to_string(), count)))
        .map(|(county, count)| CountyCount { county, count })
        .collect()
}

/// Events of one county, most recent first.
pub fn events_in_county<'a>(records: &'a [EventRecord], county: &str) -> Vec<&'a EventRecord> {
    sort_descending_by_start_date(records.iter().filter(|r| r.county() == county))
}

/// Bucket events of `year` by zero-based month index, each bucket ascending.
///
/// Records from other years, or without a start date, are left out.
pub fn group_by_month(records: &[EventRecord], year: i32) -> MonthBuckets<'_> {
    let mut buckets: MonthBuckets<'_> = BTreeMap::new();
    for record in sort_ascending_by_start_date(records) {
        let Some(start) = resolve_start_date(record) else {
            continue;
        };
        if start.year() == year {
            buckets.entry(start.month0()).or_default().push(record);
        }
    }
    buckets
}
