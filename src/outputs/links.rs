//! "Add to calendar" links for Google Calendar and Outlook.
//!
//! Both services take all-day events with an exclusive end date, so the
//! dates come from [`CalendarExport`] rather than the display range.

use crate::dates::CalendarExport;
use crate::models::EventRecord;
use urlencoding::encode;

const GOOGLE_BASE: &str = "https://calendar.google.com/calendar/render";
const OUTLOOK_BASE: &str = "https://outlook.live.com/calendar/0/deeplink/compose";

/// Venue and location joined for the calendar "where" field.
pub fn export_location(record: &EventRecord) -> String {
    [record.venue(), record.location()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
}

/// Description followed by the event URL, for the calendar body.
pub fn export_details(record: &EventRecord) -> String {
    [record.description(), record.url()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Google Calendar template link, or `None` for undated events.
pub fn google_calendar_url(record: &EventRecord) -> Option<String> {
    let export = CalendarExport::from_record(record)?;
    Some(format!(
        "{}?action=TEMPLATE&text={}&dates={}&details={}&location={}",
        GOOGLE_BASE,
        encode(&record.name()),
        encode(&export.google_dates()),
        encode(&export_details(record)),
        encode(&export_location(record)),
    ))
}

/// Outlook compose deeplink, or `None` for undated events.
pub fn outlook_calendar_url(record: &EventRecord) -> Option<String> {
    let export = CalendarExport::from_record(record)?;
    let (start, end) = export.outlook_dates();
    Some(format!(
        "{}?path=%2Fcalendar%2Faction%2Fcompose&rru=addevent&subject={}&startdt={}&enddt={}&allday=true&body={}&location={}",
        OUTLOOK_BASE,
        encode(&record.name()),
        start,
        end,
        encode(&export_details(record)),
        encode(&export_location(record)),
    ))
}
