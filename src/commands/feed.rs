use std::path::Path;

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::files::RosterStore;

/// Read the notification feed, optionally limited to the last N events.
pub fn run(root: &Path, limit: Option<usize>, format: Format) -> Result<()> {
    let store = RosterStore::open(root)?;
    let events = store.read_events(limit)?;
    output::print_events(&events, format)
}
