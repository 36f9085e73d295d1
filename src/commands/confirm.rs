use std::path::Path;

use chrono::Utc;
use clap::ValueEnum;

use crate::error::Result;
use crate::output::{self, Format};
use crate::session::Session;
use crate::store::files::RosterStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Answer {
    Yes,
    No,
}

pub fn run(root: &Path, answer: Answer, holder: &str, format: Format) -> Result<()> {
    let store = RosterStore::open(root)?;
    let session = Session::open(&store)?;
    let reply = session.confirm(holder, answer == Answer::Yes, Utc::now())?;
    output::print_confirm_reply(&reply, format)
}
