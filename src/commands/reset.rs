use std::path::Path;

use serde_json::json;

use crate::error::Result;
use crate::output::{self, Format};
use crate::session::Session;
use crate::store::files::RosterStore;

/// Configure the recurring daily reset. Replaces any one-shot schedule.
pub fn set_recurring(root: &Path, time: &str, zone_code: &str, format: Format) -> Result<()> {
    let store = RosterStore::open(root)?;
    let session = Session::open(&store)?;
    let schedule = session.set_recurring_reset(time, zone_code)?;
    match format {
        Format::Json => output::print_json(&json!({
            "result": "reset_configured",
            "schedule": schedule,
        })),
        Format::Pretty => {
            println!("{schedule}");
            Ok(())
        }
    }
}

/// Configure a one-shot dated reset. Replaces any recurring schedule.
pub fn set_one_shot(
    root: &Path,
    date: &str,
    time: &str,
    zone_code: &str,
    format: Format,
) -> Result<()> {
    let store = RosterStore::open(root)?;
    let session = Session::open(&store)?;
    let schedule = session.set_one_shot_reset(date, time, zone_code)?;
    match format {
        Format::Json => output::print_json(&json!({
            "result": "reset_configured",
            "schedule": schedule,
        })),
        Format::Pretty => {
            println!("{schedule}");
            Ok(())
        }
    }
}

pub fn timezones(format: Format) -> Result<()> {
    output::print_zone_codes(format)
}
