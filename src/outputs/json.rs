//! JSON output for client-side views.
//!
//! The map page loads `counties.json` to shade counties by event count, and
//! `events.json` carries every record alongside the fields derived for it so
//! the browser never has to repeat the date logic.

use crate::dates::{CalendarExport, format_date_range, is_upcoming};
use crate::models::{CountyCount, EventRecord};
use crate::outputs::links::{google_calendar_url, outlook_calendar_url};
use crate::outputs::{Permalinks, Site};
use crate::views::sort_descending_by_start_date;
use chrono::NaiveDate;
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// One county in `counties.json`.
#[derive(Debug, Serialize)]
pub struct CountyEntry<'a> {
    pub county: &'a str,
    pub count: usize,
    pub page: String,
}

/// One event in `events.json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEntry<'a> {
    pub record: &'a EventRecord,
    pub name: String,
    pub county: String,
    pub start_date: Option<String>,
    pub end_date_exclusive: Option<String>,
    pub formatted_date: String,
    pub upcoming: bool,
    pub google_calendar_url: Option<String>,
    pub outlook_calendar_url: Option<String>,
    pub ics: Option<String>,
}

pub fn county_entries<'a>(counties: &'a [CountyCount], links: &Permalinks) -> Vec<CountyEntry<'a>> {
    counties
        .iter()
        .map(|c| CountyEntry {
            county: &c.county,
            count: c.count,
            page: links.county_page_path(&c.county),
        })
        .collect()
}

pub fn event_entry<'a>(record: &'a EventRecord, links: &Permalinks, today: NaiveDate) -> EventEntry<'a> {
    let export = CalendarExport::from_record(record);
    EventEntry {
        record,
        name: record.name(),
        county: record.county(),
        start_date: export.map(|e| e.start.to_string()),
        end_date_exclusive: export.map(|e| e.end_exclusive.to_string()),
        formatted_date: format_date_range(record),
        upcoming: is_upcoming(record, today),
        google_calendar_url: google_calendar_url(record),
        outlook_calendar_url: outlook_calendar_url(record),
        ics: export.map(|_| links.event_ics_path(record)),
    }
}

/// Write `counties.json`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_counties(
    counties: &[CountyCount],
    links: &Permalinks,
    output_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(&county_entries(counties, links))?;
    let path = output_dir.join("counties.json");
    fs::write(&path, json).await?;
    info!(path = %path.display(), count = counties.len(), "Wrote county aggregate");
    Ok(())
}

/// Write `events.json`, most recent first.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_events(site: &Site<'_>, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let entries: Vec<EventEntry<'_>> = sort_descending_by_start_date(site.events)
        .into_iter()
        .map(|r| event_entry(r, &site.links, site.today))
        .collect();
    let json = serde_json::to_string_pretty(&entries)?;
    let path = output_dir.join("events.json");
    fs::write(&path, json).await?;
    info!(path = %path.display(), count = entries.len(), "Wrote events JSON");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_entry_serialization() {
        let record: EventRecord = serde_json::from_value(json!({
            "name": "Expo",
            "startDate": "2026-02-07",
            "endDate": "2026-02-09",
            "county": "Kent"
        }))
        .unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let links = Permalinks::new(std::slice::from_ref(&record));

        let value = serde_json::to_value(event_entry(&record, &links, today)).unwrap();

        assert_eq!(value["name"], "Expo");
        assert_eq!(value["startDate"], "2026-02-07");
        assert_eq!(value["endDateExclusive"], "2026-02-10");
        assert_eq!(value["formattedDate"], "7th–9th Feb 2026");
        assert_eq!(value["upcoming"], true);
        assert_eq!(value["ics"], "ics/2026-02-07-expo.ics");
        assert_eq!(value["record"]["county"], "Kent");
    }

    #[test]
    fn test_undated_entry() {
        let record: EventRecord = serde_json::from_value(json!({"name": "TBC"})).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let links = Permalinks::new(std::slice::from_ref(&record));

        let value = serde_json::to_value(event_entry(&record, &links, today)).unwrap();

        assert_eq!(value["formattedDate"], "Date TBA");
        assert_eq!(value["upcoming"], false);
        assert!(value["ics"].is_null());
        assert_eq!(value["county"], "Not Specified");
    }

    #[test]
    fn test_county_entries() {
        let counties = vec![CountyCount { county: "Isle of Wight".into(), count: 3 }];
        let entries = county_entries(&counties, &Permalinks::default());
        assert_eq!(entries[0].page, "counties/isle-of-wight.html");
        assert_eq!(entries[0].count, 3);
    }

    #[test]
    fn test_county_entries_share_page_paths_with_html() {
        let records: Vec<EventRecord> = [
            json!({"county": "Durham"}),
            json!({"county": "durham"}),
            json!({"county": "???"}),
        ]
        .into_iter()
        .map(|v| serde_json::from_value(v).unwrap())
        .collect();
        let links = Permalinks::new(&records);
        let counties = crate::views::group_by_county(&records);

        let pages: Vec<String> = county_entries(&counties, &links)
            .into_iter()
            .map(|e| e.page)
            .collect();

        assert_eq!(
            pages,
            vec!["counties/county.html", "counties/durham.html", "counties/durham-2.html"]
        );
    }
}
