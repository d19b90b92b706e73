//! iCalendar output.
//!
//! Every dated event gets its own `.ics` file under `ics/`, and all dated
//! events are collected into a single `events.ics` feed. Events are all-day
//! with `DTEND` one day past the last day, as RFC 5545 expects.
//!
//! ```text
//! output_dir/
//! ├── events.ics
//! └── ics/
//!     ├── 2026-02-07-spring-show.ics
//!     └── ...
//! ```

use crate::dates::CalendarExport;
use crate::models::EventRecord;
use crate::outputs::links::{export_details, export_location};
use crate::outputs::{Permalinks, Site};
use futures::stream::{self, StreamExt};
use icalendar::{Calendar, Component, Event, EventLike};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

const PARALLEL_WRITES: usize = 16;

/// Build the `VEVENT` for a record, or `None` when it has no start date.
pub fn to_vevent(record: &EventRecord, links: &Permalinks) -> Option<Event> {
    let export = CalendarExport::from_record(record)?;

    let mut event = Event::new();
    event
        .uid(&format!("{}@railway-events", links.event_slug(record)))
        .summary(&record.name())
        .starts(export.start)
        .ends(export.end_exclusive);

    let details = export_details(record);
    if !details.is_empty() {
        event.description(&details);
    }
    let location = export_location(record);
    if !location.is_empty() {
        event.location(&location);
    }
    if let Some(url) = record.url() {
        event.add_property("URL", &url);
    }

    Some(event.done())
}

/// Single-event calendar, or `None` when the record has no start date.
pub fn event_calendar(record: &EventRecord, links: &Permalinks) -> Option<Calendar> {
    let event = to_vevent(record, links)?;
    let mut cal = Calendar::new();
    cal.push(event);
    Some(cal.done())
}

/// One calendar holding every dated event, one `VEVENT` per UID.
pub fn feed_calendar<'a, I>(records: I, links: &Permalinks, title: &str) -> Calendar
where
    I: IntoIterator<Item = &'a EventRecord>,
{
    let mut cal = Calendar::new();
    cal.name(title);
    for event in records
        .into_iter()
        .unique_by(|r| links.event_slug(r))
        .filter_map(|r| to_vevent(r, links))
    {
        cal.push(event);
    }
    cal.done()
}

/// Write `events.ics` and one `ics/<slug>.ics` per dated event.
///
/// Returns the number of per-event files written. Failed writes are logged
/// and the first error is returned after the rest have been attempted.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display()))]
pub async fn write_calendars(site: &Site<'_>, output_dir: &Path) -> Result<usize, Box<dyn Error>> {
    let links = &site.links;
    let feed_path = output_dir.join("events.ics");
    fs::write(&feed_path, feed_calendar(site.events, links, site.title).to_string()).await?;
    info!(path = %feed_path.display(), "Wrote calendar feed");

    let ics_dir = output_dir.join("ics");
    fs::create_dir_all(&ics_dir).await?;

    // keyed by slug so identical records land in one file
    let files: BTreeMap<String, String> = site
        .events
        .iter()
        .filter_map(|r| Some((links.event_slug(r), event_calendar(r, links)?.to_string())))
        .collect();

    let results: Vec<Result<(), std::io::Error>> = stream::iter(files)
        .map(|(slug, body)| {
            let path = ics_dir.join(format!("{}.ics", slug));
            async move {
                fs::write(&path, body).await.inspect_err(|e| {
                    error!(path = %path.display(), error = %e, "Failed writing event calendar");
                })
            }
        })
        .buffer_unordered(PARALLEL_WRITES)
        .collect()
        .await;

    let written = results.iter().filter(|r| r.is_ok()).count();
    info!(count = written, "Wrote per-event calendars");

    match results.into_iter().find_map(Result::err) {
        Some(e) => Err(e.into()),
        None => Ok(written),
    }
}
