use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};

/// Outcome of a claim attempt. All variants are expected business results;
/// none of them is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ClaimOutcome {
    Claimed,
    BlockedLocked,
    AlreadyHeld { by: String },
    Swapped { from: String, to: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    Released,
    NotClaimed,
    NotOwner { by: String },
}

/// The claim set: tag → holder. Absence of a key means unclaimed; a key is
/// present only while claimed. Pure over the in-memory map — persistence is
/// the caller's job, applied in full after a mutating outcome or not at all.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims {
    map: BTreeMap<String, String>,
}

impl Claims {
    pub fn holder_of(&self, tag: &str) -> Option<&str> {
        self.map.get(tag).map(String::as_str)
    }

    /// Linear scan, first match. Fine at catalog scale (tens of entries);
    /// a larger catalog would want a transactional holder→tag index.
    pub fn tag_of(&self, holder: &str) -> Option<&str> {
        self.map
            .iter()
            .find(|(_, h)| h.as_str() == holder)
            .map(|(t, _)| t.as_str())
    }

    /// Decide what `claim` would do without mutating. Locked check first;
    /// a swap is blocked (not queued) when the target is held by another
    /// holder; re-claiming one's own tag is idempotent.
    pub fn evaluate(&self, tag: &str, holder: &str, locked: bool) -> ClaimOutcome {
        if locked {
            return ClaimOutcome::BlockedLocked;
        }
        let current = self.tag_of(holder).map(str::to_string);
        if let Some(current) = current
            && current != tag
        {
            if let Some(other) = self.map.get(tag)
                && other != holder
            {
                return ClaimOutcome::AlreadyHeld { by: other.clone() };
            }
            return ClaimOutcome::Swapped {
                from: current,
                to: tag.to_string(),
            };
        }
        if let Some(other) = self.map.get(tag)
            && other != holder
        {
            return ClaimOutcome::AlreadyHeld { by: other.clone() };
        }
        ClaimOutcome::Claimed
    }

    /// Apply a claim. The swap is an atomic two-step replace on the in-memory
    /// map: the old key is removed and the new one inserted before the caller
    /// ever persists, so the stored set never holds both or neither.
    pub fn claim(&mut self, tag: &str, holder: &str, locked: bool) -> ClaimOutcome {
        let outcome = self.evaluate(tag, holder, locked);
        match &outcome {
            ClaimOutcome::Claimed => {
                self.map.insert(tag.to_string(), holder.to_string());
            }
            ClaimOutcome::Swapped { from, .. } => {
                self.map.remove(from);
                self.map.insert(tag.to_string(), holder.to_string());
            }
            ClaimOutcome::BlockedLocked | ClaimOutcome::AlreadyHeld { .. } => {}
        }
        outcome
    }

    pub fn release(&mut self, tag: &str, holder: &str) -> ReleaseOutcome {
        match self.map.get(tag) {
            None => ReleaseOutcome::NotClaimed,
            Some(owner) if owner != holder => ReleaseOutcome::NotOwner { by: owner.clone() },
            Some(_) => {
                self.map.remove(tag);
                ReleaseOutcome::Released
            }
        }
    }

    /// Administrative override: assign regardless of current holder.
    /// Returns the displaced holder, if any. Tag validation against the
    /// catalog is the caller's job.
    pub fn force_assign(&mut self, tag: &str, holder: &str) -> Option<String> {
        self.map.insert(tag.to_string(), holder.to_string())
    }

    /// Administrative override: clear regardless of ownership.
    /// Returns the removed holder, or None if the tag was unclaimed.
    pub fn force_clear(&mut self, tag: &str) -> Option<String> {
        self.map.remove(tag)
    }

    /// Empty the claim set unconditionally. Used by the reset scheduler and
    /// the optional startup-reset policy. Returns the number of claims removed.
    pub fn bulk_clear(&mut self) -> usize {
        let count = self.map.len();
        self.map.clear();
        count
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(t, h)| (t.as_str(), h.as_str()))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Reject a loaded claim set that violates the one-claim-per-holder
    /// invariant. Reachable only via manual file edits; detected at load
    /// rather than silently picking one of the claims.
    pub fn check_holder_invariant(&self) -> Result<()> {
        let mut seen: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for (tag, holder) in &self.map {
            seen.entry(holder.as_str()).or_default().push(tag.as_str());
        }
        for (holder, tags) in seen {
            if tags.len() > 1 {
                return Err(RosterError::DuplicateHolder(
                    holder.to_string(),
                    tags.join(", "),
                ));
            }
        }
        Ok(())
    }
}
