use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::Catalog;

/// Informal short names mapped to a canonical tag. Folded into the index at
/// build time exactly like any other alternate name, so they participate in
/// exact and substring matching identically. Each entry applies only when
/// its target tag exists in the catalog.
pub const STATIC_ALIASES: &[(&str, &str)] = &[
    ("uk", "ENG"),
    ("england", "ENG"),
    ("britain", "ENG"),
    ("usa", "USA"),
    ("united states", "USA"),
];

/// Outcome of resolving free-text input against the catalog. Ambiguity and
/// not-found are first-class results, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Tag(String),
    Ambiguous(Vec<String>),
    NotFound,
}

/// Trim, lowercase, and collapse internal whitespace runs to single spaces.
/// Deliberately not accent- or punctuation-insensitive.
pub fn normalize(input: &str) -> String {
    input
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Reverse index from normalized name to candidate tags. Many-to-many: two
/// entries may share a name, one entry has many names. Built once from the
/// catalog snapshot plus the static alias table; immutable thereafter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameIndex {
    names: BTreeMap<String, BTreeSet<String>>,
}

impl NameIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut index = Self::default();
        for (tag, entry) in catalog.iter() {
            index.add(&entry.name, tag);
            for alias in &entry.aliases {
                index.add(alias, tag);
            }
        }
        for (alias, tag) in STATIC_ALIASES {
            if catalog.contains_tag(tag) {
                index.add(alias, tag);
            }
        }
        index
    }

    fn add(&mut self, name: &str, tag: &str) {
        let normalized = normalize(name);
        if !normalized.is_empty() {
            self.names
                .entry(normalized)
                .or_default()
                .insert(tag.to_string());
        }
    }

    /// Resolve user input to a tag. Tier order, first success wins:
    /// 1) exact tag match (case-insensitive) — short-circuits name matching,
    /// 2) exact normalized name lookup,
    /// 3) substring scan over every indexed name.
    pub fn resolve(&self, catalog: &Catalog, input: &str) -> Resolution {
        let normalized = normalize(input);
        if normalized.is_empty() {
            return Resolution::NotFound;
        }

        if let Some(tag) = catalog.canonical_tag(input) {
            return Resolution::Tag(tag.to_string());
        }

        if let Some(tags) = self.names.get(&normalized) {
            return Self::from_candidates(tags.iter().cloned().collect());
        }

        let mut union: BTreeSet<String> = BTreeSet::new();
        for (name, tags) in &self.names {
            if name.contains(&normalized) {
                union.extend(tags.iter().cloned());
            }
        }
        Self::from_candidates(union.into_iter().collect())
    }

    fn from_candidates(candidates: Vec<String>) -> Resolution {
        match candidates.len() {
            0 => Resolution::NotFound,
            1 => Resolution::Tag(candidates.into_iter().next().unwrap()),
            _ => Resolution::Ambiguous(candidates),
        }
    }
}
