use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One claimable entry in the catalog. The tag (map key) is the primary key;
/// everything else is display/grouping data the core treats as opaque.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    pub name: String,
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    /// Alternate names from secondary datasets, folded into the name index.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
}

/// Read-only catalog keyed by uppercase tag. Loaded once at startup;
/// immutable for the process lifetime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Catalog {
    entries: BTreeMap<String, CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: BTreeMap<String, CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Case-insensitive tag lookup, returning the canonical (stored) tag.
    pub fn canonical_tag(&self, input: &str) -> Option<&str> {
        let upper = input.trim().to_uppercase();
        self.entries.get_key_value(&upper).map(|(k, _)| k.as_str())
    }

    pub fn contains_tag(&self, tag: &str) -> bool {
        self.canonical_tag(tag).is_some()
    }

    pub fn entry(&self, tag: &str) -> Option<&CatalogEntry> {
        self.entries.get(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CatalogEntry)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Distinct region labels in sorted order.
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = self.entries.values().map(|e| e.region.as_str()).collect();
        regions.sort();
        regions.dedup();
        regions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display label for log/event consumers: `TAG — Name`.
    pub fn label(&self, tag: &str) -> String {
        match self.entries.get(tag) {
            Some(entry) => format!("{tag} — {}", entry.name),
            None => tag.to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testutil {
    use super::*;

    pub fn entry(name: &str, region: &str, aliases: &[&str]) -> CatalogEntry {
        CatalogEntry {
            name: name.into(),
            region: region.into(),
            flag: None,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Small fixture catalog used across module tests.
    pub fn sample() -> Catalog {
        let mut entries = BTreeMap::new();
        entries.insert("GER".into(), entry("Germany", "Europe", &[]));
        entries.insert("HUN".into(), entry("Hungary", "Europe", &[]));
        entries.insert("ENG".into(), entry("United Kingdom", "Europe", &[]));
        entries.insert("USA".into(), entry("United States", "NA", &[]));
        entries.insert("JAP".into(), entry("Japan", "Asia", &["Empire of Japan"]));
        Catalog::new(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::testutil::sample;

    #[test]
    fn canonical_tag_is_case_insensitive() {
        let catalog = sample();
        assert_eq!(catalog.canonical_tag("ger"), Some("GER"));
        assert_eq!(catalog.canonical_tag(" Ger "), Some("GER"));
        assert_eq!(catalog.canonical_tag("XYZ"), None);
    }

    #[test]
    fn regions_are_sorted_and_deduped() {
        let catalog = sample();
        assert_eq!(catalog.regions(), vec!["Asia", "Europe", "NA"]);
    }

    #[test]
    fn label_includes_display_name() {
        let catalog = sample();
        assert_eq!(catalog.label("GER"), "GER — Germany");
        assert_eq!(catalog.label("XYZ"), "XYZ");
    }
}
