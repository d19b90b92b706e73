//! Data models for raw event records and their derived aggregates.
//!
//! The upstream feed has renamed its fields several times, so a single
//! semantic value (the start date, say) may live under any of a handful of
//! keys. Rather than chaining lookups inline, every aliased field has an
//! ordered alias table here and is resolved through [`EventRecord::resolve_str`].
//!
//! - [`EventRecord`]: one raw record from the feed, with alias-aware accessors
//! - [`CountyCount`]: one entry of the county aggregate
//! - [`MonthBuckets`]: events grouped by month index within a year

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Start-date keys, highest priority first.
pub const START_DATE_ALIASES: &[&str] = &["startDate", "start_date", "date"];
/// End-date keys, highest priority first.
pub const END_DATE_ALIASES: &[&str] = &["endDate", "end_date"];
pub const ORGANISER_ALIASES: &[&str] = &["organiser", "organizer"];
pub const LAYOUT_COUNT_ALIASES: &[&str] = &["layouts", "layoutCount", "layout_count"];
pub const TRADER_COUNT_ALIASES: &[&str] = &["traders", "traderCount", "trader_count"];

/// Bucket for events whose county is missing or blank.
pub const COUNTY_NOT_SPECIFIED: &str = "Not Specified";

static ISO_DATE_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}").expect("static regex"));

/// A single raw event from the upstream feed.
///
/// The record keeps every field it arrived with; nothing is dropped on the
/// way in, so `events.json` can echo fields this crate does not know about.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct EventRecord {
    pub fields: Map<String, Value>,
}

impl EventRecord {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Return the first non-empty string found under `aliases`, in order.
    ///
    /// Numbers are accepted and rendered with `to_string`, since the feed has
    /// been known to send counts and even years as bare numbers.
    pub fn resolve_str(&self, aliases: &[&str]) -> Option<String> {
        aliases.iter().find_map(|key| match self.fields.get(*key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }

    fn plain(&self, key: &str) -> Option<String> {
        self.resolve_str(&[key])
    }

    /// Event name. Not validated; a missing name reads as empty.
    pub fn name(&self) -> String {
        self.plain("name").unwrap_or_default()
    }

    pub fn description(&self) -> Option<String> {
        self.plain("description")
    }

    pub fn url(&self) -> Option<String> {
        self.plain("url")
    }

    pub fn venue(&self) -> Option<String> {
        self.plain("venue")
    }

    pub fn location(&self) -> Option<String> {
        self.plain("location")
    }

    pub fn organiser(&self) -> Option<String> {
        self.resolve_str(ORGANISER_ALIASES)
    }

    /// County, with blank and missing values collapsed to [`COUNTY_NOT_SPECIFIED`].
    pub fn county(&self) -> String {
        self.plain("county")
            .unwrap_or_else(|| COUNTY_NOT_SPECIFIED.to_string())
    }

    /// Raw start-date string (`startDate` > `start_date` > `date`).
    pub fn start_date_raw(&self) -> Option<String> {
        self.resolve_str(START_DATE_ALIASES)
    }

    /// Raw end-date string (`endDate` > `end_date`). No fallback to the start.
    pub fn end_date_raw(&self) -> Option<String> {
        self.resolve_str(END_DATE_ALIASES)
    }

    pub fn layout_count(&self) -> Option<u32> {
        parse_count(self.resolve_str(LAYOUT_COUNT_ALIASES)?)
    }

    pub fn trader_count(&self) -> Option<u32> {
        parse_count(self.resolve_str(TRADER_COUNT_ALIASES)?)
    }

    /// Base slug for per-event file names: `<start>-<name>`, either part
    /// left out when missing. May be empty, and is not unique on its own.
    pub fn slug(&self) -> String {
        let name = crate::utils::slugify_title(&self.name());
        let date = self.start_date_raw();
        [date.as_deref().and_then(iso_date_prefix), Some(name.as_str())]
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }
}

/// Extract the leading `YYYY-MM-DD` from a date string, if it has one.
pub fn iso_date_prefix(s: &str) -> Option<&str> {
    ISO_DATE_PREFIX.find(s).map(|m| m.as_str())
}

fn parse_count(raw: String) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// One entry of the county aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CountyCount {
    pub county: String,
    pub count: usize,
}

/// Events grouped by zero-based month index within one year.
pub type MonthBuckets<'a> = BTreeMap<u32, Vec<&'a EventRecord>>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> EventRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_start_date_alias_priority() {
        let r = record(json!({
            "name": "Expo",
            "date": "2026-01-03",
            "start_date": "2026-01-02",
            "startDate": "2026-01-01"
        }));
        assert_eq!(r.start_date_raw().as_deref(), Some("2026-01-01"));

        let r = record(json!({"date": "2026-01-03", "start_date": "2026-01-02"}));
        assert_eq!(r.start_date_raw().as_deref(), Some("2026-01-02"));

        let r = record(json!({"date": "2026-01-03"}));
        assert_eq!(r.start_date_raw().as_deref(), Some("2026-01-03"));
    }

    #[test]
    fn test_empty_alias_falls_through() {
        let r = record(json!({"startDate": "", "date": "2026-05-05"}));
        assert_eq!(r.start_date_raw().as_deref(), Some("2026-05-05"));
    }

    #[test]
    fn test_missing_dates() {
        let r = record(json!({"name": "Mystery show"}));
        assert_eq!(r.start_date_raw(), None);
        assert_eq!(r.end_date_raw(), None);
    }

    #[test]
    fn test_end_date_alias_priority() {
        let r = record(json!({"end_date": "2026-02-10", "endDate": "2026-02-09"}));
        assert_eq!(r.end_date_raw().as_deref(), Some("2026-02-09"));
    }

    #[test]
    fn test_organiser_spellings() {
        let r = record(json!({"organizer": "Kent MRC"}));
        assert_eq!(r.organiser().as_deref(), Some("Kent MRC"));
        let r = record(json!({"organiser": "York MRS", "organizer": "Other"}));
        assert_eq!(r.organiser().as_deref(), Some("York MRS"));
    }

    #[test]
    fn test_county_default() {
        assert_eq!(record(json!({})).county(), COUNTY_NOT_SPECIFIED);
        assert_eq!(record(json!({"county": "  "})).county(), COUNTY_NOT_SPECIFIED);
        assert_eq!(record(json!({"county": "Kent"})).county(), "Kent");
    }

    #[test]
    fn test_counts_accept_strings_and_numbers() {
        let r = record(json!({"layouts": "12", "traderCount": 7}));
        assert_eq!(r.layout_count(), Some(12));
        assert_eq!(r.trader_count(), Some(7));

        let r = record(json!({"layouts": "lots"}));
        assert_eq!(r.layout_count(), None);
    }

    #[test]
    fn test_iso_date_prefix() {
        assert_eq!(iso_date_prefix("2026-02-07"), Some("2026-02-07"));
        assert_eq!(iso_date_prefix("2026-02-07T10:00:00Z"), Some("2026-02-07"));
        assert_eq!(iso_date_prefix("7 Feb 2026"), None);
    }

    #[test]
    fn test_slug() {
        let r = record(json!({"name": "Big Train Show!", "date": "2026-02-07"}));
        assert_eq!(r.slug(), "2026-02-07-big-train-show");
        let r = record(json!({"name": "Big Train Show"}));
        assert_eq!(r.slug(), "big-train-show");
        let r = record(json!({"name": "???", "date": "2026-02-07"}));
        assert_eq!(r.slug(), "2026-02-07");
        assert_eq!(record(json!({})).slug(), "");
    }

    #[test]
    fn test_unknown_fields_survive_serialization() {
        let r = record(json!({"name": "Expo", "lat": 51.5}));
        let out = serde_json::to_value(&r).unwrap();
        assert_eq!(out["lat"], json!(51.5));
    }
}
