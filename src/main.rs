//! # Railway Events
//!
//! A static-site build for a listing of railway-modelling exhibitions and
//! open days. It fetches the upstream JSON feed once, normalizes the records
//! (whose field names have drifted over the years), derives the views the
//! site needs and writes HTML, JSON and iCalendar files.
//!
//! ## Usage
//!
//! ```sh
//! railway_events -o ./public --source-url https://example.org/api/events.json
//! EVENTS_SOURCE_URL=https://example.org/api/events.json railway_events -o ./public
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetch**: one GET of the feed; any failure aborts the build
//! 2. **Normalize**: alias resolution and date derivation per record
//! 3. **Derive**: sorted listing, county aggregate, month buckets, calendar spans
//! 4. **Output**: HTML pages, `events.json`, `counties.json`, ICS files

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod dates;
mod feed;
mod models;
mod outputs;
mod utils;
mod views;

use cli::Cli;
use outputs::Site;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("railway_events starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    info!(%today, target_year = args.target_year, "Build dates resolved");

    // Fail before the network round-trip if we can't write anything
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let events = feed::fetch_events(&args.source_url).await.inspect_err(|e| {
        error!(url = %args.source_url, error = %e, "Failed to fetch event feed");
    })?;

    let dated = events
        .iter()
        .filter(|r| dates::resolve_start_date(r).is_some())
        .count();
    info!(
        total = events.len(),
        dated,
        undated = events.len() - dated,
        upcoming = events.iter().filter(|r| dates::is_upcoming(r, today)).count(),
        "Normalized events"
    );

    let site = Site::new(&args.site_title, today, args.target_year, &events);
    outputs::write_site(&site, &args.output_dir).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Build complete"
    );

    Ok(())
}
