use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::catalog::Catalog;
use crate::config::RosterConfig;
use crate::error::{Result, RosterError};
use crate::events::{Event, EventKind};
use crate::ledger::Claims;
use crate::session::PendingSwap;
use crate::store::lock;

/// Root of the .roster directory: durable claim state, config, the read-only
/// catalog, and the runtime event feed / pending confirmations.
///
/// Every mutating caller holds `state_lock()` across its whole
/// read-modify-write of claims + config, which is what enforces the
/// single-active-writer guarantee. Files are rewritten in full on every
/// mutation; there is no write-behind.
pub struct RosterStore {
    root: PathBuf,
}

impl RosterStore {
    /// Open an existing .roster directory.
    pub fn open(base: &Path) -> Result<Self> {
        let root = base.join(".roster");
        if !root.join("config.json").exists() {
            return Err(RosterError::NotInitialized);
        }
        Ok(Self { root })
    }

    /// Initialize a new .roster directory seeded with the given catalog.
    pub fn init(base: &Path, catalog: &Catalog) -> Result<Self> {
        let root = base.join(".roster");
        if root.join("config.json").exists() {
            return Err(RosterError::AlreadyInitialized);
        }

        fs::create_dir_all(root.join("runtime"))?;
        let store = Self { root };
        store.write_json(&store.catalog_path(), catalog)?;
        store.write_json(&store.claims_path(), &Claims::default())?;
        store.write_json(&store.config_path(), &RosterConfig::default())?;
        store.write_json(&store.pending_path(), &Vec::<PendingSwap>::new())?;
        fs::write(store.feed_path(), "")?;
        Ok(store)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // -- path helpers -------------------------------------------------------

    fn catalog_path(&self) -> PathBuf {
        self.root.join("catalog.json")
    }

    fn claims_path(&self) -> PathBuf {
        self.root.join("claims.json")
    }

    fn config_path(&self) -> PathBuf {
        self.root.join("config.json")
    }

    fn pending_path(&self) -> PathBuf {
        self.root.join("runtime").join("pending.json")
    }

    fn feed_path(&self) -> PathBuf {
        self.root.join("runtime").join("events.jsonl")
    }

    fn state_lock_path(&self) -> PathBuf {
        self.root.join("state.lock")
    }

    fn feed_lock_path(&self) -> PathBuf {
        self.root.join("runtime").join("feed.lock")
    }

    // -- locking ------------------------------------------------------------

    /// One lock guards the claims + config pair so a message-triggered
    /// mutation and a timer-triggered reset can never interleave.
    pub fn state_lock(&self) -> Result<File> {
        lock::acquire_lock(&self.state_lock_path())
    }

    // -- durable state ------------------------------------------------------

    /// The catalog is a startup input, not owned state: a broken catalog is
    /// a hard error, never silently replaced.
    pub fn load_catalog(&self) -> Result<Catalog> {
        let path = self.catalog_path();
        let data = fs::read_to_string(&path)?;
        serde_json::from_str(&data)
            .map_err(|e| RosterError::InvalidCatalog(path.display().to_string(), e.to_string()))
    }

    /// Load the claim map. An unparseable file self-heals to empty and is
    /// rewritten; a parseable map that gives one holder several tags is
    /// corruption and is rejected outright.
    pub fn load_claims(&self) -> Result<Claims> {
        let claims: Claims = self.load_or_heal(&self.claims_path())?;
        claims.check_holder_invariant()?;
        Ok(claims)
    }

    pub fn save_claims(&self, claims: &Claims) -> Result<()> {
        self.write_json(&self.claims_path(), claims)
    }

    pub fn load_config(&self) -> Result<RosterConfig> {
        self.load_or_heal(&self.config_path())
    }

    pub fn save_config(&self, config: &RosterConfig) -> Result<()> {
        self.write_json(&self.config_path(), config)
    }

    pub fn load_pending(&self) -> Result<Vec<PendingSwap>> {
        self.load_or_heal(&self.pending_path())
    }

    pub fn save_pending(&self, pending: &[PendingSwap]) -> Result<()> {
        self.write_json(&self.pending_path(), &pending)
    }

    /// Missing, empty, or unparseable files recover to the default value,
    /// which is immediately persisted so the store never stays broken.
    fn load_or_heal<T>(&self, path: &Path) -> Result<T>
    where
        T: DeserializeOwned + Serialize + Default,
    {
        if !path.exists() || fs::metadata(path)?.len() == 0 {
            let value = T::default();
            self.write_json(path, &value)?;
            return Ok(value);
        }
        let data = fs::read_to_string(path)?;
        match serde_json::from_str(&data) {
            Ok(value) => Ok(value),
            Err(_) => {
                let value = T::default();
                self.write_json(path, &value)?;
                Ok(value)
            }
        }
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        fs::write(path, json)?;
        Ok(())
    }

    // -- event feed ---------------------------------------------------------

    /// Append an event (lock + append + unlock). Best-effort from callers:
    /// a feed failure never rolls back the mutation that produced it.
    pub fn append_event(&self, kind: EventKind) -> Result<()> {
        let lock = lock::acquire_lock(&self.feed_lock_path())?;
        let mut line = serde_json::to_string(&Event::now(kind))?;
        line.push('\n');
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.feed_path())?;
        file.write_all(line.as_bytes())?;
        lock::release_lock(lock)?;
        Ok(())
    }

    /// Read feed events, optionally limited to the last N.
    pub fn read_events(&self, limit: Option<usize>) -> Result<Vec<Event>> {
        let path = self.feed_path();
        if !path.exists() {
            return Ok(vec![]);
        }
        let content = fs::read_to_string(&path)?;
        let mut events: Vec<Event> = content
            .lines()
            .filter(|l| !l.trim().is_empty())
            .filter_map(|l| serde_json::from_str(l).ok())
            .collect();
        if let Some(n) = limit {
            let len = events.len();
            if len > n {
                events = events.split_off(len - n);
            }
        }
        Ok(events)
    }
}

/// Walk up from the current directory to find the .roster root.
pub fn find_root() -> Result<PathBuf> {
    let mut dir = std::env::current_dir().map_err(RosterError::Io)?;
    loop {
        if dir.join(".roster").exists() {
            return Ok(dir);
        }
        if !dir.pop() {
            return Err(RosterError::NotInitialized);
        }
    }
}
