//! Upstream event feed.
//!
//! The feed is a single JSON document fetched once per build. It has been
//! published in two shapes over time:
//!
//! ```text
//! [ {event}, {event}, ... ]
//! { "events": [ {event}, ... ], ...anything else }
//! ```
//!
//! Any other shape yields an empty event list. Network errors, non-success
//! statuses and malformed JSON are fatal and abort the build.

use crate::models::EventRecord;
use crate::utils::truncate_for_log;
use reqwest::get;
use serde_json::Value;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Fetch the feed and extract its event records.
#[instrument(level = "info", skip_all, fields(url = %url))]
pub async fn fetch_events(url: &Url) -> Result<Vec<EventRecord>, Box<dyn Error>> {
    let response = get(url.as_str()).await?.error_for_status()?;
    let body = response.text().await?;
    info!(bytes = body.len(), "Fetched event feed");

    let document: Value = serde_json::from_str(&body).map_err(|e| {
        warn!(error = %e, body_preview = %truncate_for_log(&body, 300), "Feed is not valid JSON");
        e
    })?;

    let events = extract_events(document);
    info!(count = events.len(), "Parsed event records");
    Ok(events)
}

/// Pull event records out of a feed document.
///
/// Entries that are not JSON objects are skipped.
pub fn extract_events(document: Value) -> Vec<EventRecord> {
    let entries = match document {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match map.remove("events") {
            Some(Value::Array(entries)) => entries,
            _ => {
                warn!("Feed object has no `events` array; treating as empty");
                return Vec::new();
            }
        },
        other => {
            warn!(kind = json_kind(&other), "Unrecognized feed shape; treating as empty");
            return Vec::new();
        }
    };

    let total = entries.len();
    let events: Vec<EventRecord> = entries
        .into_iter()
        .filter_map(|entry| match entry {
            Value::Object(fields) => Some(EventRecord::new(fields)),
            _ => None,
        })
        .collect();

    if events.len() < total {
        debug!(skipped = total - events.len(), "Skipped non-object feed entries");
    }
    events
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
