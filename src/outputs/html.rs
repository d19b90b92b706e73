//! HTML page rendering.
//!
//! Pages are built as plain strings with `write!`, one function per page.
//! Rendering is pure; [`super::write_site`] does the file I/O.
//!
//! | Page | Content |
//! |------|---------|
//! | `index.html` | upcoming and undated events, most recent first |
//! | `this-month.html` | events starting in the build month |
//! | `calendar.html` | month grids for the target year plus per-month listings |
//! | `counties.html` | county index with counts |
//! | `counties/<slug>.html` | every event in one county |

use super::links::{google_calendar_url, outlook_calendar_url};
use super::{Permalinks, Site};
use crate::dates::{
    expand_date_span, filter_by_current_month, format_date_range, is_upcoming, resolve_start_date,
};
use crate::models::EventRecord;
use crate::utils::escape_html;
use crate::views::{
    events_in_county, group_by_county, group_by_month, sort_ascending_by_start_date,
    sort_descending_by_start_date,
};
use chrono::{Datelike, NaiveDate};
use std::collections::HashMap;
use std::fmt::{self, Write};

const STYLE: &str = "body{font-family:system-ui,sans-serif;max-width:60rem;margin:0 auto;padding:1rem}\
nav a{margin-right:1rem}.event{border:1px solid #ccc;border-radius:6px;padding:.75rem;margin:.75rem 0}\
.date{font-weight:600}.meta{color:#555}.export a{margin-right:.75rem;font-size:.9em}\
table.month{border-collapse:collapse;width:100%;margin-bottom:1rem}\
table.month td,table.month th{border:1px solid #ddd;vertical-align:top;width:14%;height:3.5rem;padding:2px;font-size:.8em}\
td.busy{background:#eef6ee}";

/// A rendered page and its site-relative path.
#[derive(Debug)]
pub struct Page {
    pub path: String,
    pub html: String,
}

/// Render every page of the site.
pub fn render_site(site: &Site<'_>) -> Result<Vec<Page>, fmt::Error> {
    let mut pages = vec![
        Page { path: "index.html".into(), html: render_index(site)? },
        Page { path: "this-month.html".into(), html: render_this_month(site)? },
        Page { path: "calendar.html".into(), html: render_calendar(site)? },
        Page { path: "counties.html".into(), html: render_counties(site)? },
    ];
    for entry in group_by_county(site.events) {
        pages.push(Page {
            path: site.links.county_page_path(&entry.county),
            html: render_county(site, &entry.county)?,
        });
    }
    Ok(pages)
}

fn layout(site: &Site<'_>, heading: &str, root: &str, body: &str) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">")?;
    writeln!(out, "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">")?;
    writeln!(
        out,
        "<title>{} | {}</title>",
        escape_html(heading),
        escape_html(site.title)
    )?;
    writeln!(out, "<style>{}</style>\n</head>\n<body>", STYLE)?;
    writeln!(out, "<header><h1>{}</h1>", escape_html(site.title))?;
    writeln!(
        out,
        "<nav><a href=\"{r}index.html\">Upcoming</a><a href=\"{r}this-month.html\">This month</a>\
         <a href=\"{r}calendar.html\">Calendar</a><a href=\"{r}counties.html\">Counties</a>\
         <a href=\"{r}events.ics\">Subscribe (ICS)</a></nav></header>",
        r = root
    )?;
    writeln!(out, "<main>\n<h2>{}</h2>", escape_html(heading))?;
    out.push_str(body);
    writeln!(out, "</main>")?;
    writeln!(
        out,
        "<footer><small>Built {}</small></footer>\n</body>\n</html>",
        site.today.format("%-d %B %Y")
    )?;
    Ok(out)
}

/// One event card with date, place, organiser, counts and export links.
pub fn render_event_card(
    record: &EventRecord,
    links: &Permalinks,
    root: &str,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(
        out,
        "<article class=\"event\" id=\"{}\">",
        escape_html(&links.event_slug(record))
    )?;

    let name = escape_html(&record.name());
    match record.url() {
        Some(url) => writeln!(out, "<h3><a href=\"{}\">{}</a></h3>", escape_html(&url), name)?,
        None => writeln!(out, "<h3>{}</h3>", name)?,
    }
    writeln!(out, "<p class=\"date\">{}</p>", escape_html(&format_date_range(record)))?;

    let place: Vec<String> = [record.venue(), record.location()]
        .into_iter()
        .flatten()
        .map(|s| escape_html(&s))
        .collect();
    if !place.is_empty() {
        writeln!(out, "<p class=\"meta\">{}</p>", place.join(", "))?;
    }
    writeln!(
        out,
        "<p class=\"meta\">County: <a href=\"{}{}\">{}</a></p>",
        root,
        links.county_page_path(&record.county()),
        escape_html(&record.county())
    )?;
    if let Some(organiser) = record.organiser() {
        writeln!(out, "<p class=\"meta\">Organised by {}</p>", escape_html(&organiser))?;
    }

    let mut counts = Vec::new();
    if let Some(n) = record.layout_count() {
        counts.push(format!("{} layout{}", n, if n == 1 { "" } else { "s" }));
    }
    if let Some(n) = record.trader_count() {
        counts.push(format!("{} trader{}", n, if n == 1 { "" } else { "s" }));
    }
    if !counts.is_empty() {
        writeln!(out, "<p class=\"meta\">{}</p>", counts.join(" · "))?;
    }

    if let Some(description) = record.description() {
        writeln!(out, "<p>{}</p>", escape_html(&description))?;
    }

    if let (Some(google), Some(outlook)) = (google_calendar_url(record), outlook_calendar_url(record)) {
        writeln!(
            out,
            "<p class=\"export\"><a href=\"{}\">Google Calendar</a><a href=\"{}\">Outlook</a>\
             <a href=\"{}{}\">iCal</a></p>",
            escape_html(&google),
            escape_html(&outlook),
            root,
            links.event_ics_path(record)
        )?;
    }
    writeln!(out, "</article>")?;
    Ok(out)
}

fn render_cards(
    records: &[&EventRecord],
    links: &Permalinks,
    root: &str,
    empty: &str,
) -> Result<String, fmt::Error> {
    if records.is_empty() {
        return Ok(format!("<p>{}</p>\n", empty));
    }
    let mut out = String::new();
    for record in records {
        out.push_str(&render_event_card(record, links, root)?);
    }
    Ok(out)
}

/// Upcoming events plus those still waiting on a date.
pub fn render_index(site: &Site<'_>) -> Result<String, fmt::Error> {
    let listed = sort_descending_by_start_date(
        site.events
            .iter()
            .filter(|r| resolve_start_date(r).is_none() || is_upcoming(r, site.today)),
    );
    let body = render_cards(&listed, &site.links, "", "No upcoming events.")?;
    layout(site, "Upcoming events", "", &body)
}

pub fn render_this_month(site: &Site<'_>) -> Result<String, fmt::Error> {
    let listed = sort_ascending_by_start_date(filter_by_current_month(site.events, site.today));
    let body = render_cards(&listed, &site.links, "", "Nothing on this month.")?;
    let heading = format!("This month: {}", site.today.format("%B %Y"));
    layout(site, &heading, "", &body)
}

/// Month grids for the target year, each followed by that month's events.
pub fn render_calendar(site: &Site<'_>) -> Result<String, fmt::Error> {
    let year = site.target_year;
    let (Some(jan1), Some(dec31)) = (
        NaiveDate::from_ymd_opt(year, 1, 1),
        NaiveDate::from_ymd_opt(year, 12, 31),
    ) else {
        return layout(site, &format!("Calendar {}", year), "", "<p>Year out of range.</p>\n");
    };

    let mut by_day: HashMap<NaiveDate, Vec<&EventRecord>> = HashMap::new();
    for record in sort_ascending_by_start_date(site.events) {
        for day in expand_date_span(record, jan1..=dec31) {
            by_day.entry(day).or_default().push(record);
        }
    }
    let buckets = group_by_month(site.events, year);

    let mut body = String::new();
    for month0 in 0..12u32 {
        let Some(first) = NaiveDate::from_ymd_opt(year, month0 + 1, 1) else {
            continue;
        };
        writeln!(body, "<section id=\"m{}\">", month0 + 1)?;
        writeln!(body, "<h3>{}</h3>", first.format("%B %Y"))?;
        body.push_str(&render_month_grid(first, &by_day, &site.links)?);

        let listed = buckets.get(&month0).map(Vec::as_slice).unwrap_or_default();
        body.push_str(&render_cards(listed, &site.links, "", "No events this month.")?);
        writeln!(body, "</section>")?;
    }

    layout(site, &format!("Calendar {}", year), "", &body)
}

fn render_month_grid(
    first: NaiveDate,
    by_day: &HashMap<NaiveDate, Vec<&EventRecord>>,
    links: &Permalinks,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "<table class=\"month\">")?;
    writeln!(
        out,
        "<tr><th>Mon</th><th>Tue</th><th>Wed</th><th>Thu</th><th>Fri</th><th>Sat</th><th>Sun</th></tr>"
    )?;

    let lead = first.weekday().num_days_from_monday() as usize;
    let mut cells: Vec<Option<NaiveDate>> = vec![None; lead];
    cells.extend(
        first
            .iter_days()
            .take_while(|d| d.month() == first.month())
            .map(Some),
    );
    while cells.len() % 7 != 0 {
        cells.push(None);
    }

    for week in cells.chunks(7) {
        write!(out, "<tr>")?;
        for cell in week {
            match cell {
                None => write!(out, "<td></td>")?,
                Some(day) => {
                    let events = by_day.get(day).map(Vec::as_slice).unwrap_or_default();
                    let class = if events.is_empty() { "" } else { " class=\"busy\"" };
                    write!(out, "<td{}><strong>{}</strong>", class, day.day())?;
                    for record in events {
                        write!(
                            out,
                            "<br><a href=\"#{}\">{}</a>",
                            escape_html(&links.event_slug(record)),
                            escape_html(&record.name())
                        )?;
                    }
                    write!(out, "</td>")?;
                }
            }
        }
        writeln!(out, "</tr>")?;
    }
    writeln!(out, "</table>")?;
    Ok(out)
}

pub fn render_counties(site: &Site<'_>) -> Result<String, fmt::Error> {
    let mut body = String::new();
    writeln!(
        body,
        "<div id=\"county-map\" data-source=\"counties.json\"></div>\n<ul class=\"counties\">"
    )?;
    for entry in group_by_county(site.events) {
        writeln!(
            body,
            "<li><a href=\"{}\">{}</a> ({})</li>",
            site.links.county_page_path(&entry.county),
            escape_html(&entry.county),
            entry.count
        )?;
    }
    writeln!(body, "</ul>")?;
    layout(site, "Events by county", "", &body)
}

pub fn render_county(site: &Site<'_>, county: &str) -> Result<String, fmt::Error> {
    let listed = events_in_county(site.events, county);
    let body = render_cards(&listed, &site.links, "../", "No events.")?;
    layout(site, county, "../", &body)
}
