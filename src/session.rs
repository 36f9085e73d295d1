use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::config::RosterConfig;
use crate::error::{Result, RosterError};
use crate::events::EventKind;
use crate::ledger::{ClaimOutcome, Claims, ReleaseOutcome};
use crate::resolve::{NameIndex, Resolution};
use crate::schedule::{FireReason, ResetSchedule};
use crate::store::files::RosterStore;

/// A swap suspended for interactive confirmation. At most one per holder
/// (latest wins); expired entries are swept on every access and every tick.
/// Persisted so the reply can arrive in a later invocation; a token, not a
/// blocked thread, so nothing else waits on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSwap {
    pub token: String,
    pub holder: String,
    pub from_tag: String,
    pub to_tag: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ClaimReply {
    Claimed {
        tag: String,
    },
    Swapped {
        from: String,
        to: String,
    },
    /// Confirmation mode only: the swap was recorded but not applied.
    NeedsConfirm {
        from: String,
        to: String,
        token: String,
        expires_at: DateTime<Utc>,
    },
    BlockedLocked,
    AlreadyHeld {
        tag: String,
        by: String,
    },
    Ambiguous {
        candidates: Vec<String>,
    },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ReleaseReply {
    Released { tag: String },
    NotClaimed { tag: String },
    NotOwner { tag: String, by: String },
    Ambiguous { candidates: Vec<String> },
    NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ConfirmReply {
    /// "yes" — the claim was re-run for real, with fresh checks.
    Applied { outcome: ClaimReply },
    Declined { from: String, to: String },
    Expired,
    NonePending,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ForceClearReply {
    Cleared { tag: String, holder: String },
    NotClaimed { tag: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryView {
    pub tag: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionView {
    pub region: String,
    pub entries: Vec<EntryView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusView {
    pub locked: bool,
    pub schedule: ResetSchedule,
    pub claimed: usize,
    pub total: usize,
    pub regions: Vec<RegionView>,
}

/// Ties a user request to resolver → ledger calls, including the pending
/// swap-confirmation state, and triggers persistence and notification.
/// All mutations run under the store's state lock.
pub struct Session<'a> {
    store: &'a RosterStore,
    catalog: Catalog,
    index: NameIndex,
}

impl<'a> Session<'a> {
    pub fn open(store: &'a RosterStore) -> Result<Self> {
        let catalog = store.load_catalog()?;
        let index = NameIndex::build(&catalog);
        Ok(Self {
            store,
            catalog,
            index,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // -- member operations --------------------------------------------------

    /// Resolve free-text input and claim the result for `holder`.
    pub fn claim_text(
        &self,
        input: &str,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<ClaimReply> {
        require_holder(holder)?;
        let tag = match self.index.resolve(&self.catalog, input) {
            Resolution::Tag(tag) => tag,
            Resolution::Ambiguous(candidates) => {
                return Ok(ClaimReply::Ambiguous { candidates });
            }
            Resolution::NotFound => return Ok(ClaimReply::NotFound),
        };

        let _guard = self.store.state_lock()?;
        self.sweep_expired(now)?;
        let config = self.store.load_config()?;
        let mut claims = self.store.load_claims()?;

        // A fresh request supersedes any outstanding confirmation from the
        // same holder: only one pending per requester, latest wins.
        self.remove_pending(holder)?;

        if config.confirm_swaps
            && let ClaimOutcome::Swapped { from, to } = claims.evaluate(&tag, holder, config.locked)
        {
            let entry = PendingSwap {
                token: uuid::Uuid::new_v4().to_string(),
                holder: holder.to_string(),
                from_tag: from.clone(),
                to_tag: to.clone(),
                created_at: now,
                expires_at: now + Duration::seconds(config.confirm_ttl_secs as i64),
            };
            let mut pending = self.store.load_pending()?;
            pending.push(entry.clone());
            self.store.save_pending(&pending)?;
            return Ok(ClaimReply::NeedsConfirm {
                from,
                to,
                token: entry.token,
                expires_at: entry.expires_at,
            });
        }

        self.apply_claim(&mut claims, &tag, holder, &config)
    }

    /// Answer an outstanding swap confirmation. A timeout counts as "no".
    pub fn confirm(&self, holder: &str, accept: bool, now: DateTime<Utc>) -> Result<ConfirmReply> {
        require_holder(holder)?;
        let _guard = self.store.state_lock()?;

        let mut pending = self.store.load_pending()?;
        let Some(pos) = pending.iter().position(|p| p.holder == holder) else {
            return Ok(ConfirmReply::NonePending);
        };
        let entry = pending.remove(pos);
        self.store.save_pending(&pending)?;

        if entry.expires_at <= now {
            return Ok(ConfirmReply::Expired);
        }
        if !accept {
            return Ok(ConfirmReply::Declined {
                from: entry.from_tag,
                to: entry.to_tag,
            });
        }

        // Execute for real. State may have moved while the confirmation was
        // outstanding, so the claim is re-checked from scratch.
        let config = self.store.load_config()?;
        let mut claims = self.store.load_claims()?;
        let outcome = self.apply_claim(&mut claims, &entry.to_tag, holder, &config)?;
        Ok(ConfirmReply::Applied { outcome })
    }

    /// Resolve free-text input and release the result for `holder`.
    pub fn release_text(
        &self,
        input: &str,
        holder: &str,
        now: DateTime<Utc>,
    ) -> Result<ReleaseReply> {
        require_holder(holder)?;
        let tag = match self.index.resolve(&self.catalog, input) {
            Resolution::Tag(tag) => tag,
            Resolution::Ambiguous(candidates) => {
                return Ok(ReleaseReply::Ambiguous { candidates });
            }
            Resolution::NotFound => return Ok(ReleaseReply::NotFound),
        };

        let _guard = self.store.state_lock()?;
        self.sweep_expired(now)?;
        let mut claims = self.store.load_claims()?;
        match claims.release(&tag, holder) {
            ReleaseOutcome::Released => {
                self.store.save_claims(&claims)?;
                let _ = self.store.append_event(EventKind::Released {
                    tag: tag.clone(),
                    holder: holder.to_string(),
                });
                Ok(ReleaseReply::Released { tag })
            }
            ReleaseOutcome::NotClaimed => Ok(ReleaseReply::NotClaimed { tag }),
            ReleaseOutcome::NotOwner { by } => Ok(ReleaseReply::NotOwner { tag, by }),
        }
    }

    // -- admin operations ---------------------------------------------------

    pub fn lock(&self) -> Result<()> {
        self.set_locked(true, EventKind::Locked)
    }

    pub fn unlock(&self) -> Result<()> {
        self.set_locked(false, EventKind::Unlocked)
    }

    fn set_locked(&self, locked: bool, event: EventKind) -> Result<()> {
        let _guard = self.store.state_lock()?;
        let mut config = self.store.load_config()?;
        config.locked = locked;
        self.store.save_config(&config)?;
        let _ = self.store.append_event(event);
        Ok(())
    }

    /// Assign a tag regardless of current holder. Returns the displaced
    /// holder, if any. The tag must exist in the catalog.
    pub fn force_assign(&self, tag: &str, holder: &str) -> Result<Option<String>> {
        require_holder(holder)?;
        let tag = self.require_tag(tag)?;
        let _guard = self.store.state_lock()?;
        let mut claims = self.store.load_claims()?;
        // The holder may already hold another tag; an admin assign moves
        // them rather than minting a second claim.
        if let Some(current) = claims.tag_of(holder).map(str::to_string)
            && current != tag
        {
            claims.force_clear(&current);
        }
        let displaced = claims.force_assign(&tag, holder);
        self.store.save_claims(&claims)?;
        let _ = self.store.append_event(EventKind::ForcedAssign {
            tag,
            holder: holder.to_string(),
            displaced: displaced.clone(),
        });
        Ok(displaced)
    }

    /// Clear a tag regardless of ownership.
    pub fn force_unassign(&self, tag: &str) -> Result<ForceClearReply> {
        let tag = self.require_tag(tag)?;
        let _guard = self.store.state_lock()?;
        let mut claims = self.store.load_claims()?;
        match claims.force_clear(&tag) {
            Some(holder) => {
                self.store.save_claims(&claims)?;
                let _ = self.store.append_event(EventKind::ForcedUnassign {
                    tag: tag.clone(),
                    holder: holder.clone(),
                });
                Ok(ForceClearReply::Cleared { tag, holder })
            }
            None => Ok(ForceClearReply::NotClaimed { tag }),
        }
    }

    pub fn set_recurring_reset(&self, time: &str, zone_code: &str) -> Result<ResetSchedule> {
        self.install_schedule(ResetSchedule::recurring(time, zone_code)?)
    }

    pub fn set_one_shot_reset(
        &self,
        date: &str,
        time: &str,
        zone_code: &str,
    ) -> Result<ResetSchedule> {
        self.install_schedule(ResetSchedule::one_shot(date, time, zone_code)?)
    }

    /// Replace the whole schedule variant. Validation happened in the
    /// constructor, so a bad request never reaches this point and a
    /// previously valid schedule is never half-cleared.
    fn install_schedule(&self, schedule: ResetSchedule) -> Result<ResetSchedule> {
        let _guard = self.store.state_lock()?;
        let mut config = self.store.load_config()?;
        config.schedule = schedule.clone();
        self.store.save_config(&config)?;
        let _ = self.store.append_event(EventKind::ResetConfigured {
            schedule: schedule.clone(),
        });
        Ok(schedule)
    }

    // -- scheduler driver ---------------------------------------------------

    /// One scheduler evaluation. If the reset is due: bulk-clear, persist
    /// claims and the advanced schedule, then notify. Also sweeps expired
    /// confirmations.
    pub fn tick(&self, now: DateTime<Utc>) -> Result<Option<(FireReason, usize)>> {
        let _guard = self.store.state_lock()?;
        self.sweep_expired(now)?;

        let mut config = self.store.load_config()?;
        let (next, fired) = config.schedule.tick(now);
        let Some(reason) = fired else {
            return Ok(None);
        };

        let mut claims = self.store.load_claims()?;
        let cleared = claims.bulk_clear();
        self.store.save_claims(&claims)?;
        config.schedule = next;
        self.store.save_config(&config)?;
        let _ = self
            .store
            .append_event(EventKind::ResetFired { reason, cleared });
        Ok(Some((reason, cleared)))
    }

    /// Optional startup policy: wipe all claims once when the watch loop
    /// starts, and drop the stale render handle.
    pub fn startup_reset(&self) -> Result<Option<usize>> {
        let _guard = self.store.state_lock()?;
        let mut config = self.store.load_config()?;
        if !config.startup_reset {
            return Ok(None);
        }
        let mut claims = self.store.load_claims()?;
        let cleared = claims.bulk_clear();
        self.store.save_claims(&claims)?;
        config.render_ref = None;
        self.store.save_config(&config)?;
        let _ = self.store.append_event(EventKind::ResetFired {
            reason: FireReason::Startup,
            cleared,
        });
        Ok(Some(cleared))
    }

    // -- render collaborator surface ----------------------------------------

    pub fn render_ref(&self) -> Result<Option<String>> {
        Ok(self.store.load_config()?.render_ref)
    }

    /// Persist the renderer's opaque handle so it survives restarts.
    pub fn set_render_ref(&self, render_ref: Option<String>) -> Result<()> {
        let _guard = self.store.state_lock()?;
        let mut config = self.store.load_config()?;
        config.render_ref = render_ref;
        self.store.save_config(&config)
    }

    /// Read-only snapshot for rendering: catalog grouped by region with the
    /// current holder per entry, plus lock state and active schedule.
    pub fn status(&self) -> Result<StatusView> {
        let config = self.store.load_config()?;
        let claims = self.store.load_claims()?;

        let mut regions: Vec<RegionView> = Vec::new();
        for region in self.catalog.regions() {
            let entries: Vec<EntryView> = self
                .catalog
                .iter()
                .filter(|(_, e)| e.region == region)
                .map(|(tag, e)| EntryView {
                    tag: tag.to_string(),
                    name: e.name.clone(),
                    flag: e.flag.clone(),
                    holder: claims.holder_of(tag).map(str::to_string),
                })
                .collect();
            regions.push(RegionView {
                region: region.to_string(),
                entries,
            });
        }

        Ok(StatusView {
            locked: config.locked,
            schedule: config.schedule,
            claimed: claims.len(),
            total: self.catalog.len(),
            regions,
        })
    }

    // -- helpers ------------------------------------------------------------

    fn require_tag(&self, input: &str) -> Result<String> {
        self.catalog
            .canonical_tag(input)
            .map(str::to_string)
            .ok_or_else(|| RosterError::UnknownTag(input.trim().to_string()))
    }

    /// Apply a claim against loaded state, persist on mutation, notify after
    /// the write. Caller holds the state lock.
    fn apply_claim(
        &self,
        claims: &mut Claims,
        tag: &str,
        holder: &str,
        config: &RosterConfig,
    ) -> Result<ClaimReply> {
        match claims.claim(tag, holder, config.locked) {
            ClaimOutcome::Claimed => {
                self.store.save_claims(claims)?;
                let _ = self.store.append_event(EventKind::Claimed {
                    tag: tag.to_string(),
                    holder: holder.to_string(),
                });
                Ok(ClaimReply::Claimed {
                    tag: tag.to_string(),
                })
            }
            ClaimOutcome::Swapped { from, to } => {
                self.store.save_claims(claims)?;
                let _ = self.store.append_event(EventKind::Swapped {
                    from: from.clone(),
                    to: to.clone(),
                    holder: holder.to_string(),
                });
                Ok(ClaimReply::Swapped { from, to })
            }
            ClaimOutcome::BlockedLocked => Ok(ClaimReply::BlockedLocked),
            ClaimOutcome::AlreadyHeld { by } => Ok(ClaimReply::AlreadyHeld {
                tag: tag.to_string(),
                by,
            }),
        }
    }

    fn remove_pending(&self, holder: &str) -> Result<()> {
        let mut pending = self.store.load_pending()?;
        let before = pending.len();
        pending.retain(|p| p.holder != holder);
        if pending.len() != before {
            self.store.save_pending(&pending)?;
        }
        Ok(())
    }

    /// Timeout sweep: drop confirmations whose expiry has passed.
    fn sweep_expired(&self, now: DateTime<Utc>) -> Result<()> {
        let mut pending = self.store.load_pending()?;
        let before = pending.len();
        pending.retain(|p| p.expires_at > now);
        if pending.len() != before {
            self.store.save_pending(&pending)?;
        }
        Ok(())
    }
}

fn require_holder(holder: &str) -> Result<()> {
    if holder.trim().is_empty() {
        return Err(RosterError::InvalidHolder);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::testutil::sample;
    use chrono::TimeZone;
    use tempfile::{TempDir, tempdir};

    fn setup() -> (TempDir, RosterStore) {
        let dir = tempdir().unwrap();
        let store = RosterStore::init(dir.path(), &sample()).unwrap();
        (dir, store)
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn set_config(store: &RosterStore, f: impl FnOnce(&mut RosterConfig)) {
        let mut config = store.load_config().unwrap();
        f(&mut config);
        store.save_config(&config).unwrap();
    }

    #[test]
    fn claim_by_name_then_swap_by_tag() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();

        let reply = session.claim_text("hungary", "u1", now()).unwrap();
        assert_eq!(reply, ClaimReply::Claimed { tag: "HUN".into() });

        let reply = session.claim_text("ger", "u1", now()).unwrap();
        assert_eq!(
            reply,
            ClaimReply::Swapped {
                from: "HUN".into(),
                to: "GER".into()
            }
        );

        let reply = session.release_text("HUN", "u1", now()).unwrap();
        assert_eq!(reply, ReleaseReply::NotClaimed { tag: "HUN".into() });

        let reply = session.claim_text("GER", "u2", now()).unwrap();
        assert_eq!(
            reply,
            ClaimReply::AlreadyHeld {
                tag: "GER".into(),
                by: "u1".into()
            }
        );
    }

    #[test]
    fn ambiguous_and_not_found_do_not_mutate() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();

        assert!(matches!(
            session.claim_text("united", "u1", now()).unwrap(),
            ClaimReply::Ambiguous { .. }
        ));
        assert_eq!(
            session.claim_text("atlantis", "u1", now()).unwrap(),
            ClaimReply::NotFound
        );
        assert!(store.load_claims().unwrap().is_empty());
    }

    #[test]
    fn locked_blocks_claims_but_not_release_or_admin() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();

        session.claim_text("GER", "u1", now()).unwrap();
        session.lock().unwrap();

        assert_eq!(
            session.claim_text("HUN", "u2", now()).unwrap(),
            ClaimReply::BlockedLocked
        );
        assert_eq!(
            session.release_text("GER", "u1", now()).unwrap(),
            ReleaseReply::Released { tag: "GER".into() }
        );
        session.force_assign("HUN", "u3").unwrap();
        assert!(matches!(
            session.force_unassign("HUN").unwrap(),
            ForceClearReply::Cleared { .. }
        ));

        session.unlock().unwrap();
        assert_eq!(
            session.claim_text("HUN", "u2", now()).unwrap(),
            ClaimReply::Claimed { tag: "HUN".into() }
        );
    }

    #[test]
    fn silent_mode_swaps_immediately() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();
        session.claim_text("HUN", "u1", now()).unwrap();
        assert!(matches!(
            session.claim_text("GER", "u1", now()).unwrap(),
            ClaimReply::Swapped { .. }
        ));
    }

    #[test]
    fn confirm_mode_suspends_swap_until_yes() {
        let (_dir, store) = setup();
        set_config(&store, |c| c.confirm_swaps = true);
        let session = Session::open(&store).unwrap();

        session.claim_text("HUN", "u1", now()).unwrap();
        let reply = session.claim_text("GER", "u1", now()).unwrap();
        assert!(matches!(reply, ClaimReply::NeedsConfirm { .. }));
        // Nothing applied yet.
        assert_eq!(store.load_claims().unwrap().holder_of("HUN"), Some("u1"));
        assert_eq!(store.load_claims().unwrap().holder_of("GER"), None);

        let reply = session.confirm("u1", true, now()).unwrap();
        assert_eq!(
            reply,
            ConfirmReply::Applied {
                outcome: ClaimReply::Swapped {
                    from: "HUN".into(),
                    to: "GER".into()
                }
            }
        );
        assert_eq!(store.load_claims().unwrap().holder_of("GER"), Some("u1"));
        assert_eq!(store.load_claims().unwrap().holder_of("HUN"), None);
    }

    #[test]
    fn confirm_no_aborts_without_mutation() {
        let (_dir, store) = setup();
        set_config(&store, |c| c.confirm_swaps = true);
        let session = Session::open(&store).unwrap();

        session.claim_text("HUN", "u1", now()).unwrap();
        session.claim_text("GER", "u1", now()).unwrap();
        let reply = session.confirm("u1", false, now()).unwrap();
        assert_eq!(
            reply,
            ConfirmReply::Declined {
                from: "HUN".into(),
                to: "GER".into()
            }
        );
        assert_eq!(store.load_claims().unwrap().holder_of("HUN"), Some("u1"));
        // The pending entry was consumed.
        assert_eq!(
            session.confirm("u1", true, now()).unwrap(),
            ConfirmReply::NonePending
        );
    }

    #[test]
    fn expired_confirmation_counts_as_no() {
        let (_dir, store) = setup();
        set_config(&store, |c| c.confirm_swaps = true);
        let session = Session::open(&store).unwrap();

        session.claim_text("HUN", "u1", now()).unwrap();
        session.claim_text("GER", "u1", now()).unwrap();
        let later = now() + Duration::seconds(120);
        assert_eq!(
            session.confirm("u1", true, later).unwrap(),
            ConfirmReply::Expired
        );
        assert_eq!(store.load_claims().unwrap().holder_of("HUN"), Some("u1"));
    }

    #[test]
    fn newer_request_supersedes_pending() {
        let (_dir, store) = setup();
        set_config(&store, |c| c.confirm_swaps = true);
        let session = Session::open(&store).unwrap();

        session.claim_text("HUN", "u1", now()).unwrap();
        session.claim_text("GER", "u1", now()).unwrap();
        session.claim_text("JAP", "u1", now()).unwrap();

        let pending = store.load_pending().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].to_tag, "JAP");

        let reply = session.confirm("u1", true, now()).unwrap();
        assert_eq!(
            reply,
            ConfirmReply::Applied {
                outcome: ClaimReply::Swapped {
                    from: "HUN".into(),
                    to: "JAP".into()
                }
            }
        );
    }

    #[test]
    fn confirmed_swap_rechecks_state() {
        let (_dir, store) = setup();
        set_config(&store, |c| c.confirm_swaps = true);
        let session = Session::open(&store).unwrap();

        session.claim_text("HUN", "u1", now()).unwrap();
        session.claim_text("GER", "u1", now()).unwrap();
        // While u1's confirmation is outstanding, u2 grabs GER.
        session.claim_text("GER", "u2", now()).unwrap();

        let reply = session.confirm("u1", true, now()).unwrap();
        assert_eq!(
            reply,
            ConfirmReply::Applied {
                outcome: ClaimReply::AlreadyHeld {
                    tag: "GER".into(),
                    by: "u2".into()
                }
            }
        );
        assert_eq!(store.load_claims().unwrap().holder_of("HUN"), Some("u1"));
    }

    #[test]
    fn other_holders_proceed_while_confirmation_outstanding() {
        let (_dir, store) = setup();
        set_config(&store, |c| c.confirm_swaps = true);
        let session = Session::open(&store).unwrap();

        session.claim_text("HUN", "u1", now()).unwrap();
        session.claim_text("GER", "u1", now()).unwrap();
        assert_eq!(
            session.claim_text("JAP", "u2", now()).unwrap(),
            ClaimReply::Claimed { tag: "JAP".into() }
        );
    }

    #[test]
    fn force_assign_moves_existing_claim() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();
        session.claim_text("HUN", "u1", now()).unwrap();
        session.force_assign("GER", "u1").unwrap();
        let claims = store.load_claims().unwrap();
        assert_eq!(claims.holder_of("GER"), Some("u1"));
        assert_eq!(claims.holder_of("HUN"), None);
        claims.check_holder_invariant().unwrap();
    }

    #[test]
    fn force_ops_validate_tag_against_catalog() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();
        assert_eq!(
            session.force_assign("XYZ", "u1").unwrap_err().code(),
            "unknown_tag"
        );
        assert_eq!(
            session.force_unassign("XYZ").unwrap_err().code(),
            "unknown_tag"
        );
    }

    #[test]
    fn tick_fires_recurring_and_clears_claims() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();
        session.claim_text("GER", "u1", now()).unwrap();
        session.set_recurring_reset("08:00", "UTC").unwrap();

        let fired = session.tick(now()).unwrap();
        assert_eq!(fired, Some((FireReason::Recurring, 1)));
        assert!(store.load_claims().unwrap().is_empty());

        // Same local day: the watermark suppresses a second fire.
        let fired = session.tick(now() + Duration::minutes(1)).unwrap();
        assert_eq!(fired, None);
    }

    #[test]
    fn one_shot_reverts_to_idle_after_firing() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();
        session
            .set_one_shot_reset("2026-06-01", "11:00", "UTC")
            .unwrap();

        let fired = session.tick(now()).unwrap();
        assert_eq!(fired, Some((FireReason::OneShot, 0)));
        assert_eq!(store.load_config().unwrap().schedule, ResetSchedule::Idle);
        assert_eq!(session.tick(now() + Duration::minutes(1)).unwrap(), None);
    }

    #[test]
    fn configuring_either_mode_replaces_the_other() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();

        session.set_recurring_reset("08:00", "UTC").unwrap();
        session
            .set_one_shot_reset("2026-07-01", "09:00", "CET")
            .unwrap();
        assert!(matches!(
            store.load_config().unwrap().schedule,
            ResetSchedule::OneShot { .. }
        ));

        session.set_recurring_reset("10:00", "PST").unwrap();
        match store.load_config().unwrap().schedule {
            ResetSchedule::Recurring {
                time,
                zone_code,
                last_fired,
            } => {
                assert_eq!(time, "10:00");
                assert_eq!(zone_code, "PST");
                assert_eq!(last_fired, None);
            }
            other => panic!("expected recurring, got {other:?}"),
        }
    }

    #[test]
    fn invalid_configuration_preserves_previous_schedule() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();
        let installed = session.set_recurring_reset("08:00", "UTC").unwrap();

        assert!(session.set_one_shot_reset("bad", "09:00", "CET").is_err());
        assert!(session.set_recurring_reset("09:00", "NOPE").is_err());
        assert_eq!(store.load_config().unwrap().schedule, installed);
    }

    #[test]
    fn tick_sweeps_expired_confirmations() {
        let (_dir, store) = setup();
        set_config(&store, |c| c.confirm_swaps = true);
        let session = Session::open(&store).unwrap();

        session.claim_text("HUN", "u1", now()).unwrap();
        session.claim_text("GER", "u1", now()).unwrap();
        assert_eq!(store.load_pending().unwrap().len(), 1);

        session.tick(now() + Duration::seconds(120)).unwrap();
        assert!(store.load_pending().unwrap().is_empty());
    }

    #[test]
    fn startup_reset_honors_policy_flag() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();
        session.claim_text("GER", "u1", now()).unwrap();
        session.set_render_ref(Some("msg-42".into())).unwrap();

        assert_eq!(session.startup_reset().unwrap(), Some(1));
        assert!(store.load_claims().unwrap().is_empty());
        assert_eq!(session.render_ref().unwrap(), None);

        set_config(&store, |c| c.startup_reset = false);
        session.claim_text("GER", "u1", now()).unwrap();
        assert_eq!(session.startup_reset().unwrap(), None);
        assert_eq!(store.load_claims().unwrap().holder_of("GER"), Some("u1"));
    }

    #[test]
    fn status_groups_by_region_with_holders() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();
        session.claim_text("GER", "u1", now()).unwrap();

        let view = session.status().unwrap();
        assert_eq!(view.claimed, 1);
        assert_eq!(view.total, 5);
        let europe = view
            .regions
            .iter()
            .find(|r| r.region == "Europe")
            .expect("europe region");
        let ger = europe.entries.iter().find(|e| e.tag == "GER").unwrap();
        assert_eq!(ger.holder.as_deref(), Some("u1"));
        let hun = europe.entries.iter().find(|e| e.tag == "HUN").unwrap();
        assert_eq!(hun.holder, None);
    }

    #[test]
    fn events_record_each_mutation() {
        let (_dir, store) = setup();
        let session = Session::open(&store).unwrap();
        session.claim_text("HUN", "u1", now()).unwrap();
        session.claim_text("GER", "u1", now()).unwrap();
        session.release_text("GER", "u1", now()).unwrap();
        session.lock().unwrap();

        let kinds: Vec<String> = store
            .read_events(None)
            .unwrap()
            .into_iter()
            .map(|e| match e.kind {
                EventKind::Claimed { .. } => "claimed".into(),
                EventKind::Swapped { .. } => "swapped".into(),
                EventKind::Released { .. } => "released".into(),
                EventKind::Locked => "locked".into(),
                other => format!("{other:?}"),
            })
            .collect();
        assert_eq!(kinds, vec!["claimed", "swapped", "released", "locked"]);
    }
}
