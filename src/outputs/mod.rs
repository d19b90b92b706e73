//! Output generation for the static site.
//!
//! # Submodules
//!
//! - [`html`]: page rendering (listing, this month, calendar, counties)
//! - [`ics`]: per-event and whole-feed iCalendar files
//! - [`json`]: county aggregate and normalized events for client-side views
//! - [`links`]: Google Calendar / Outlook "add to calendar" links
//!
//! # Output Structure
//!
//! ```text
//! output_dir/
//! ├── index.html
//! ├── this-month.html
//! ├── calendar.html
//! ├── counties.html
//! ├── counties/
//! │   └── kent.html
//! ├── counties.json
//! ├── events.json
//! ├── events.ics
//! └── ics/
//!     └── 2026-02-07-spring-show.ics
//! ```

pub mod html;
pub mod ics;
pub mod json;
pub mod links;

use crate::models::EventRecord;
use crate::utils::{slugify_title, unique_slug};
use crate::views::group_by_county;
use chrono::NaiveDate;
use itertools::Itertools;
use std::collections::hash_map::DefaultHasher;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::hash::{Hash, Hasher};
use std::path::Path;
use tokio::fs;
use tracing::{debug, error, info, instrument};

/// Slug for an event whose name and date both slugify to nothing.
const EVENT_FALLBACK_SLUG: &str = "event";
/// Slug for a county name that slugifies to nothing (`"???"`).
const COUNTY_FALLBACK_SLUG: &str = "county";

/// Everything the renderers need for one build.
#[derive(Debug, Clone)]
pub struct Site<'a> {
    pub title: &'a str,
    pub today: NaiveDate,
    /// Year shown on the calendar page; independent of `today`.
    pub target_year: i32,
    pub events: &'a [EventRecord],
    pub links: Permalinks,
}

impl<'a> Site<'a> {
    pub fn new(title: &'a str, today: NaiveDate, target_year: i32, events: &'a [EventRecord]) -> Self {
        Self {
            title,
            today,
            target_year,
            events,
            links: Permalinks::new(events),
        }
    }
}

/// File names for events and counties, fixed once per build so that every
/// page, feed and JSON file agrees on them.
///
/// Event slugs are `<start>-<name>`. When two different records share that
/// base, each gets a short tag derived from its own fields, so the name stays
/// stable however the feed is ordered. Identical records keep one slug and
/// collapse into a single calendar entry.
///
/// County slugs are claimed in aggregate order (alphabetical, "Not
/// Specified" last); a later county whose slug is taken gets `-2`, `-3`, ...
#[derive(Debug, Clone, Default)]
pub struct Permalinks {
    shared_event_slugs: HashSet<String>,
    county_slugs: HashMap<String, String>,
}

impl Permalinks {
    pub fn new(events: &[EventRecord]) -> Self {
        let shared_event_slugs: HashSet<String> = events
            .iter()
            .unique_by(|r| content_key(r))
            .map(base_event_slug)
            .counts()
            .into_iter()
            .filter_map(|(slug, n)| (n > 1).then_some(slug))
            .collect();
        if !shared_event_slugs.is_empty() {
            debug!(count = shared_event_slugs.len(), "Event slugs shared by different records");
        }

        let mut taken = HashSet::new();
        let county_slugs = group_by_county(events)
            .into_iter()
            .map(|entry| {
                let slug = unique_slug(&slugify_title(&entry.county), COUNTY_FALLBACK_SLUG, &mut taken);
                (entry.county, slug)
            })
            .collect();

        Self {
            shared_event_slugs,
            county_slugs,
        }
    }

    /// Unique slug for an event; used for its `.ics` file, UID and HTML anchor.
    pub fn event_slug(&self, record: &EventRecord) -> String {
        let base = base_event_slug(record);
        if self.shared_event_slugs.contains(&base) {
            format!("{}-{}", base, content_tag(record))
        } else {
            base
        }
    }

    /// Site-relative path of an event's `.ics` file.
    pub fn event_ics_path(&self, record: &EventRecord) -> String {
        format!("ics/{}.ics", self.event_slug(record))
    }

    /// Site-relative path of a county page.
    pub fn county_page_path(&self, county: &str) -> String {
        let slug = match self.county_slugs.get(county) {
            Some(slug) => slug.clone(),
            None => unique_slug(&slugify_title(county), COUNTY_FALLBACK_SLUG, &mut HashSet::new()),
        };
        format!("counties/{}.html", slug)
    }
}

fn base_event_slug(record: &EventRecord) -> String {
    let slug = record.slug();
    if slug.is_empty() {
        EVENT_FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// Canonical JSON text of a record; map keys come out sorted.
fn content_key(record: &EventRecord) -> String {
    serde_json::Value::Object(record.fields.clone()).to_string()
}

/// Eight hex digits hashed from the record's fields.
fn content_tag(record: &EventRecord) -> String {
    let mut hasher = DefaultHasher::new();
    content_key(record).hash(&mut hasher);
    format!("{:08x}", hasher.finish() as u32)
}

/// Write the whole site into `output_dir`.
///
/// Each output is attempted even if an earlier one failed; failures are
/// logged and the first one is returned once everything has been tried.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), events = site.events.len()))]
pub async fn write_site(site: &Site<'_>, output_dir: &Path) -> Result<(), Box<dyn Error>> {
    let mut first_error: Option<Box<dyn Error>> = None;
    let mut record_failure = |what: &str, e: Box<dyn Error>| {
        error!(output = what, error = %e, "Failed writing output");
        first_error.get_or_insert(e);
    };

    fs::create_dir_all(output_dir.join("counties")).await?;

    match html::render_site(site) {
        Ok(pages) => {
            let total = pages.len();
            for page in pages {
                let path = output_dir.join(&page.path);
                if let Err(e) = fs::write(&path, page.html).await {
                    record_failure(page.path.as_str(), e.into());
                }
            }
            info!(pages = total, "Wrote HTML pages");
        }
        Err(e) => record_failure("html", e.into()),
    }

    if let Err(e) = ics::write_calendars(site, output_dir).await {
        record_failure("ics", e);
    }

    let counties = group_by_county(site.events);
    if let Err(e) = json::write_counties(&counties, &site.links, output_dir).await {
        record_failure("counties.json", e);
    }
    if let Err(e) = json::write_events(site, output_dir).await {
        record_failure("events.json", e);
    }

    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn records(values: Vec<Value>) -> Vec<EventRecord> {
        values
            .into_iter()
            .map(|v| serde_json::from_value(v).unwrap())
            .collect()
    }

    #[test]
    fn test_paths() {
        let events = records(vec![
            json!({"name": "Expo", "date": "2026-05-01", "county": "Tyne & Wear"}),
        ]);
        let links = Permalinks::new(&events);
        assert_eq!(links.county_page_path("Tyne & Wear"), "counties/tyne-wear.html");
        assert_eq!(links.event_ics_path(&events[0]), "ics/2026-05-01-expo.ics");
    }

    #[test]
    fn test_same_name_same_day_events_get_distinct_slugs() {
        let events = records(vec![
            json!({"name": "Expo", "date": "2026-05-01", "venue": "Hall A"}),
            json!({"name": "Expo", "date": "2026-05-01", "venue": "Hall B"}),
            json!({"name": "Other", "date": "2026-05-01"}),
        ]);
        let links = Permalinks::new(&events);

        let a = links.event_slug(&events[0]);
        let b = links.event_slug(&events[1]);
        assert_ne!(a, b);
        assert!(a.starts_with("2026-05-01-expo-"));
        assert!(b.starts_with("2026-05-01-expo-"));
        assert_eq!(links.event_slug(&events[2]), "2026-05-01-other");

        // stable regardless of feed order
        let reversed: Vec<EventRecord> = events.iter().rev().cloned().collect();
        assert_eq!(Permalinks::new(&reversed).event_slug(&events[0]), a);
    }

    #[test]
    fn test_identical_records_share_a_slug() {
        let events = records(vec![
            json!({"name": "Expo", "date": "2026-05-01"}),
            json!({"name": "Expo", "date": "2026-05-01"}),
        ]);
        let links = Permalinks::new(&events);
        assert_eq!(links.event_slug(&events[0]), "2026-05-01-expo");
        assert_eq!(links.event_slug(&events[1]), "2026-05-01-expo");
    }

    #[test]
    fn test_unnamed_undated_event_slug() {
        let events = records(vec![json!({"venue": "Somewhere"})]);
        let links = Permalinks::new(&events);
        assert_eq!(links.event_ics_path(&events[0]), "ics/event.ics");
    }

    #[test]
    fn test_county_paths_are_unique_and_non_empty() {
        let events = records(vec![
            json!({"name": "A", "county": "durham"}),
            json!({"name": "B", "county": "Durham"}),
            json!({"name": "C", "county": "???"}),
        ]);
        let links = Permalinks::new(&events);

        assert_eq!(links.county_page_path("???"), "counties/county.html");
        assert_eq!(links.county_page_path("Durham"), "counties/durham.html");
        assert_eq!(links.county_page_path("durham"), "counties/durham-2.html");
    }

    #[tokio::test]
    async fn test_write_site() {
        let dir = std::env::temp_dir().join(format!("railway_events_site_{}", std::process::id()));
        let events = records(vec![
            json!({"name": "Expo", "date": "2026-03-07", "county": "Kent"}),
            json!({"name": "Open day"}),
        ]);
        let site = Site::new("Events", NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), 2026, &events);

        write_site(&site, &dir).await.unwrap();

        for file in [
            "index.html",
            "this-month.html",
            "calendar.html",
            "counties.html",
            "counties/kent.html",
            "counties/not-specified.html",
            "counties.json",
            "events.json",
            "events.ics",
            "ics/2026-03-07-expo.ics",
        ] {
            assert!(dir.join(file).exists(), "missing {file}");
        }
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_write_site_keeps_colliding_pages_apart() {
        let dir =
            std::env::temp_dir().join(format!("railway_events_collide_{}", std::process::id()));
        let events = records(vec![
            json!({"name": "Expo", "date": "2026-05-01", "venue": "Hall A", "county": "Durham"}),
            json!({"name": "Expo", "date": "2026-05-01", "venue": "Hall B", "county": "durham"}),
            json!({"name": "Mystery", "date": "2026-06-01", "county": "???"}),
        ]);
        let site = Site::new("Events", NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(), 2026, &events);

        write_site(&site, &dir).await.unwrap();

        let ics_files = std::fs::read_dir(dir.join("ics")).unwrap().count();
        assert_eq!(ics_files, 3);

        let feed = std::fs::read_to_string(dir.join("events.ics")).unwrap();
        let uids: HashSet<&str> = feed.lines().filter(|l| l.starts_with("UID")).collect();
        assert_eq!(uids.len(), 3);

        let durham = std::fs::read_to_string(dir.join("counties/durham.html")).unwrap();
        let durham_2 = std::fs::read_to_string(dir.join("counties/durham-2.html")).unwrap();
        assert!(durham.contains("Hall A") && !durham.contains("Hall B"));
        assert!(durham_2.contains("Hall B") && !durham_2.contains("Hall A"));
        assert!(dir.join("counties/county.html").exists());
        assert!(!dir.join("counties/.html").exists());

        let counties: Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("counties.json")).unwrap())
                .unwrap();
        let pages: HashSet<&str> = counties
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["page"].as_str().unwrap())
            .collect();
        assert_eq!(pages.len(), 3);
        assert!(pages.contains("counties/county.html"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
