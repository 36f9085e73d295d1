use std::path::Path;

use crate::error::Result;
use crate::output::{self, Format};
use crate::session::Session;
use crate::store::files::RosterStore;

pub fn run(root: &Path, format: Format) -> Result<()> {
    let store = RosterStore::open(root)?;
    let session = Session::open(&store)?;
    let view = session.status()?;
    output::print_status(&view, format)
}
