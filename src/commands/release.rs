use std::path::Path;

use chrono::Utc;

use crate::error::Result;
use crate::output::{self, Format};
use crate::session::Session;
use crate::store::files::RosterStore;

pub fn run(root: &Path, text: &str, holder: &str, format: Format) -> Result<()> {
    let store = RosterStore::open(root)?;
    let session = Session::open(&store)?;
    let reply = session.release_text(text, holder, Utc::now())?;
    output::print_release_reply(&reply, format)
}
