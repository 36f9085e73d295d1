use std::path::Path;

use serde_json::json;

use crate::error::Result;
use crate::output::{self, Format};
use crate::session::Session;
use crate::store::files::RosterStore;

pub fn lock(root: &Path, format: Format) -> Result<()> {
    let store = RosterStore::open(root)?;
    Session::open(&store)?.lock()?;
    match format {
        Format::Json => output::print_json(&json!({ "result": "locked" })),
        Format::Pretty => {
            println!("signups locked");
            Ok(())
        }
    }
}

pub fn unlock(root: &Path, format: Format) -> Result<()> {
    let store = RosterStore::open(root)?;
    Session::open(&store)?.unlock()?;
    match format {
        Format::Json => output::print_json(&json!({ "result": "unlocked" })),
        Format::Pretty => {
            println!("signups open");
            Ok(())
        }
    }
}

pub fn force(root: &Path, tag: &str, holder: &str, format: Format) -> Result<()> {
    let store = RosterStore::open(root)?;
    let session = Session::open(&store)?;
    let displaced = session.force_assign(tag, holder)?;
    match format {
        Format::Json => output::print_json(&json!({
            "result": "assigned",
            "tag": tag.to_uppercase(),
            "holder": holder,
            "displaced": displaced,
        })),
        Format::Pretty => {
            match displaced {
                Some(previous) => {
                    println!("assigned {} to {holder} (was {previous})", tag.to_uppercase());
                }
                None => println!("assigned {} to {holder}", tag.to_uppercase()),
            }
            Ok(())
        }
    }
}

pub fn unassign(root: &Path, tag: &str, format: Format) -> Result<()> {
    let store = RosterStore::open(root)?;
    let session = Session::open(&store)?;
    let reply = session.force_unassign(tag)?;
    output::print_force_clear_reply(&reply, format)
}
