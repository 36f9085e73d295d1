use std::fs;
use std::path::Path;

use crate::catalog::Catalog;
use crate::error::{Result, RosterError};
use crate::store::files::RosterStore;

/// Seed a new .roster directory from a catalog dataset file.
pub fn run(base: &Path, catalog_file: &Path) -> Result<()> {
    let data = fs::read_to_string(catalog_file)?;
    let catalog: Catalog = serde_json::from_str(&data).map_err(|e| {
        RosterError::InvalidCatalog(catalog_file.display().to_string(), e.to_string())
    })?;

    let store = RosterStore::init(base, &catalog)?;
    println!(
        "initialized {} with {} catalog entries",
        store.root().display(),
        catalog.len()
    );
    Ok(())
}
