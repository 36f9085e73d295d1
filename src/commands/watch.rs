use std::path::Path;
use std::thread;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;

use crate::error::Result;
use crate::output::{self, Format};
use crate::session::Session;
use crate::store::files::RosterStore;

/// Reference evaluation cadence; any cadence at or below one minute works,
/// since minutes are the finest configurable unit.
const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Run the scheduler loop: optional startup reset once at entry, then a
/// fixed-tick evaluation forever.
pub fn run(root: &Path, interval_secs: Option<u64>, format: Format) -> Result<()> {
    let store = RosterStore::open(root)?;
    let session = Session::open(&store)?;
    let interval = Duration::from_secs(interval_secs.unwrap_or(DEFAULT_INTERVAL_SECS));

    if let Some(cleared) = session.startup_reset()? {
        report_fire(&json!({ "fired": "startup", "cleared": cleared }), format)?;
    }

    loop {
        if let Some((reason, cleared)) = session.tick(Utc::now())? {
            report_fire(
                &json!({ "fired": reason, "cleared": cleared }),
                format,
            )?;
        }
        thread::sleep(interval);
    }
}

/// A single scheduler evaluation, for cron-style drivers and scripting.
pub fn tick(root: &Path, format: Format) -> Result<()> {
    let store = RosterStore::open(root)?;
    let session = Session::open(&store)?;
    match session.tick(Utc::now())? {
        Some((reason, cleared)) => {
            report_fire(&json!({ "fired": reason, "cleared": cleared }), format)
        }
        None => match format {
            Format::Json => output::print_json(&json!({ "fired": null })),
            Format::Pretty => {
                println!("nothing due");
                Ok(())
            }
        },
    }
}

fn report_fire(payload: &serde_json::Value, format: Format) -> Result<()> {
    match format {
        Format::Json => output::print_json(payload),
        Format::Pretty => {
            println!(
                "reset fired ({}), cleared {}",
                payload["fired"].as_str().unwrap_or("?"),
                payload["cleared"]
            );
            Ok(())
        }
    }
}
