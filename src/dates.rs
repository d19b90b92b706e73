//! Date derivation for event records.
//!
//! Everything here is a pure function of a record (plus a reference date
//! where one is needed). Records whose dates cannot be resolved degrade to
//! `None`/empty results instead of failing; the renderers show those as
//! "Date TBA".
//!
//! Two end dates exist and must not be mixed up:
//! - the *inclusive* end, used for display and the calendar grid
//! - the *exclusive* end (inclusive end + 1 day), used by all-day calendar
//!   exports (Google, Outlook, ICS)

use crate::models::{EventRecord, iso_date_prefix};
use chrono::{Datelike, Duration, NaiveDate};
use std::ops::RangeInclusive;

/// Placeholder shown for records without a usable start date.
pub const DATE_TBA: &str = "Date TBA";

fn parse_iso(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(iso_date_prefix(raw)?, "%Y-%m-%d").ok()
}

/// Resolved start date, if any alias holds a parseable ISO date.
pub fn resolve_start_date(record: &EventRecord) -> Option<NaiveDate> {
    parse_iso(&record.start_date_raw()?)
}

/// Resolved inclusive end date, falling back to the start date.
///
/// An explicit end earlier than the start is treated as a data error and
/// ignored, leaving a single-day event.
pub fn resolve_end_date(record: &EventRecord) -> Option<NaiveDate> {
    let start = resolve_start_date(record)?;
    let end = record
        .end_date_raw()
        .as_deref()
        .and_then(parse_iso)
        .filter(|end| *end >= start);
    Some(end.unwrap_or(start))
}

/// True iff the event has not finished before `reference`'s day.
pub fn is_upcoming(record: &EventRecord, reference: NaiveDate) -> bool {
    resolve_end_date(record).is_some_and(|end| end >= reference)
}

/// Keep only records starting in the same year and month as `today`.
pub fn filter_by_current_month(records: &[EventRecord], today: NaiveDate) -> Vec<&EventRecord> {
    records
        .iter()
        .filter(|r| {
            resolve_start_date(r)
                .is_some_and(|d| d.year() == today.year() && d.month() == today.month())
        })
        .collect()
}

/// English ordinal suffix for a day of the month.
pub fn ordinal_suffix(day: u32) -> &'static str {
    if (11..=13).contains(&(day % 100)) {
        return "th";
    }
    match day % 10 {
        1 => "st",
        2 => "nd",
        3 => "rd",
        _ => "th",
    }
}

fn day_with_ordinal(date: NaiveDate) -> String {
    format!("{}{}", date.day(), ordinal_suffix(date.day()))
}

/// Human-readable date or date range for an event card.
///
/// ```text
/// Saturday, 7th Feb 2026
/// 7th–9th Feb 2026
/// 28th Jan – 2nd Feb 2026
/// 30th Dec 2025 – 2nd Jan 2026
/// ```
pub fn format_date_range(record: &EventRecord) -> String {
    let (Some(start), Some(end)) = (resolve_start_date(record), resolve_end_date(record)) else {
        return DATE_TBA.to_string();
    };

    if start == end {
        return format!(
            "{}, {} {}",
            start.format("%A"),
            day_with_ordinal(start),
            start.format("%b %Y")
        );
    }

    if start.year() != end.year() {
        format!(
            "{} {} – {} {}",
            day_with_ordinal(start),
            start.format("%b %Y"),
            day_with_ordinal(end),
            end.format("%b %Y")
        )
    } else if start.month() != end.month() {
        format!(
            "{} {} – {} {}",
            day_with_ordinal(start),
            start.format("%b"),
            day_with_ordinal(end),
            end.format("%b %Y")
        )
    } else {
        format!(
            "{}–{} {}",
            day_with_ordinal(start),
            day_with_ordinal(end),
            end.format("%b %Y")
        )
    }
}

/// Every calendar date the event covers, start to end inclusive, clipped to
/// `within`. Pass `NaiveDate::MIN..=NaiveDate::MAX` for the whole span.
///
/// Only the clipped days are visited, so a bogus `0001`..`9999` range costs
/// no more than the window it is drawn into.
pub fn expand_date_span(record: &EventRecord, within: RangeInclusive<NaiveDate>) -> Vec<NaiveDate> {
    let (Some(start), Some(end)) = (resolve_start_date(record), resolve_end_date(record)) else {
        return Vec::new();
    };
    let from = start.max(*within.start());
    let to = end.min(*within.end());
    from.iter_days().take_while(|d| *d <= to).collect()
}

/// All-day date fields for calendar export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarExport {
    pub start: NaiveDate,
    /// The day after the last day of the event.
    pub end_exclusive: NaiveDate,
}

impl CalendarExport {
    pub fn from_record(record: &EventRecord) -> Option<Self> {
        let start = resolve_start_date(record)?;
        let end = resolve_end_date(record)?;
        Some(Self {
            start,
            end_exclusive: end + Duration::days(1),
        })
    }

    /// Google Calendar `dates` parameter: `YYYYMMDD/YYYYMMDD`.
    pub fn google_dates(&self) -> String {
        format!(
            "{}/{}",
            self.start.format("%Y%m%d"),
            self.end_exclusive.format("%Y%m%d")
        )
    }

    /// Outlook `startdt` / `enddt` pair in ISO form.
    pub fn outlook_dates(&self) -> (String, String) {
        (
            self.start.format("%Y-%m-%d").to_string(),
            self.end_exclusive.format("%Y-%m-%d").to_string(),
        )
    }
}
