//! Profile store.
//!
//! Owns the authoritative, insertion-ordered profile collection. Every
//! mutation writes the full snapshot to a local and a synchronized backend;
//! write failures are logged and otherwise ignored, the in-memory state stays
//! authoritative for the running process.
//!
//! Loading prefers the synchronized backend and falls back to the local one.
//! A collection recovered from the local backend is pushed back up so data
//! created while offline reaches the other devices. External change
//! notifications trigger the same load and replace the whole collection: the
//! most recent snapshot visible in the synchronized backend wins.
//!
//! The store is meant to be driven from a single owning thread. Remote
//! notifications are queued on a channel and applied only when the owner
//! calls [`ProfileStore::process_remote_changes`].

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use uuid::Uuid;

use crate::platform::Platform;
use crate::storage::backend::{KeyValueBackend, RemoteChange, SyncedBackend};
use crate::storage::codec;
use crate::storage::types::Profile;

/// Key the snapshot is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "savedProfiles";

/// Lifecycle of a store instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Loading,
    Ready,
}

/// Where the current collection was adopted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Remote,
    Local,
    /// Neither backend held a valid snapshot.
    Empty,
}

/// A single in-place change to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Added(Uuid),
    Updated(Uuid),
    Deleted(Vec<Uuid>),
    Cleared,
}

/// Notification delivered to store observers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    Mutated(Mutation),
    /// The whole collection was replaced by a (re)load.
    Replaced { source: LoadSource, count: usize },
}

pub struct ProfileStore<L, R> {
    key: String,
    local: L,
    remote: R,
    profiles: Vec<Profile>,
    state: StoreState,
    source: LoadSource,
    remote_changes: Receiver<RemoteChange>,
    observers: Vec<Sender<StoreEvent>>,
}

impl<L, R> ProfileStore<L, R>
where
    L: KeyValueBackend,
    R: SyncedBackend,
{
    /// Open a store over the given backends and load its collection.
    ///
    /// The remote change subscription is taken before the initial load so
    /// nothing published in between is missed.
    pub fn open(local: L, mut remote: R, key: impl Into<String>) -> Self {
        let remote_changes = remote.subscribe();
        let mut store = Self {
            key: key.into(),
            local,
            remote,
            profiles: Vec::new(),
            state: StoreState::Uninitialized,
            source: LoadSource::Empty,
            remote_changes,
            observers: Vec::new(),
        };
        store.state = StoreState::Loading;
        store.load();
        store.state = StoreState::Ready;
        store
    }

    pub fn state(&self) -> StoreState {
        self.state
    }

    pub fn load_source(&self) -> LoadSource {
        self.source
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn local(&self) -> &L {
        &self.local
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// Register an observer. Dropping the receiver unregisters it.
    pub fn subscribe(&mut self) -> Receiver<StoreEvent> {
        let (tx, rx) = mpsc::channel();
        self.observers.push(tx);
        rx
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// The full collection in insertion order.
    pub fn list(&self) -> &[Profile] {
        &self.profiles
    }

    /// Profiles of one platform, in collection order.
    pub fn list_for_platform(&self, platform: Platform) -> Vec<&Profile> {
        self.profiles
            .iter()
            .filter(|p| p.platform() == platform)
            .collect()
    }

    pub fn count_for_platform(&self, platform: Platform) -> usize {
        self.profiles
            .iter()
            .filter(|p| p.platform() == platform)
            .count()
    }

    pub fn get(&self, id: Uuid) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id() == id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Append a profile.
    ///
    /// Returns `false` and leaves the collection untouched when the id is
    /// already taken.
    pub fn add(&mut self, profile: Profile) -> bool {
        let id = profile.id();
        if self.get(id).is_some() {
            log::warn!("Ignoring add of profile {}: id already present", id);
            return false;
        }
        self.profiles.push(profile);
        self.commit(Mutation::Added(id));
        true
    }

    /// Replace the editable fields of the entry with the same id, in place.
    ///
    /// Unknown ids are a no-op and return `false`.
    pub fn update(&mut self, profile: &Profile) -> bool {
        let id = profile.id();
        let Some(existing) = self.profiles.iter_mut().find(|p| p.id() == id) else {
            log::debug!("Ignoring update of unknown profile {}", id);
            return false;
        };
        existing.apply_edits(profile);
        self.commit(Mutation::Updated(id));
        true
    }

    /// Remove `profile` (matched by id).
    pub fn delete(&mut self, profile: &Profile) -> bool {
        self.delete_by_id(profile.id())
    }

    /// Remove the entry with `id`. Unknown ids are a no-op.
    pub fn delete_by_id(&mut self, id: Uuid) -> bool {
        let Some(index) = self.profiles.iter().position(|p| p.id() == id) else {
            return false;
        };
        self.profiles.remove(index);
        self.commit(Mutation::Deleted(vec![id]));
        true
    }

    /// Remove the profiles at `offsets` within `list_for_platform(platform)`.
    ///
    /// Offsets refer to the platform list as it was before this call;
    /// offsets past its end are ignored. Returns how many were removed.
    pub fn delete_at_offsets(&mut self, platform: Platform, offsets: &[usize]) -> usize {
        let scoped: Vec<Uuid> = self
            .list_for_platform(platform)
            .into_iter()
            .map(Profile::id)
            .collect();
        let mut positions: Vec<usize> = offsets
            .iter()
            .copied()
            .filter(|&i| i < scoped.len())
            .collect();
        positions.sort_unstable();
        positions.dedup();
        let doomed: Vec<Uuid> = positions.into_iter().map(|i| scoped[i]).collect();

        let before = self.profiles.len();
        self.profiles.retain(|p| !doomed.contains(&p.id()));
        let removed = before - self.profiles.len();

        if removed > 0 {
            self.commit(Mutation::Deleted(doomed));
        }
        removed
    }

    /// Remove every profile of every platform.
    pub fn delete_all(&mut self) {
        self.profiles.clear();
        self.commit(Mutation::Cleared);
    }

    // =========================================================================
    // Synchronization
    // =========================================================================

    /// Reload from the backends and replace the whole collection.
    pub fn reload(&mut self) -> LoadSource {
        self.load()
    }

    /// Apply queued remote change notifications.
    ///
    /// Pending notifications are coalesced into at most one reload. Returns
    /// whether a reload happened.
    pub fn process_remote_changes(&mut self) -> bool {
        let mut relevant = false;
        loop {
            match self.remote_changes.try_recv() {
                Ok(change) => {
                    if change.touches(&self.key) {
                        log::debug!("Remote change ({:?}) affects {}", change.reason, self.key);
                        relevant = true;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    log::warn!("{}: change feed closed", self.remote.label());
                    break;
                }
            }
        }

        if relevant {
            self.load();
        }
        relevant
    }

    /// Ask the synchronized backend to flush and look for external changes,
    /// then apply whatever it reported.
    pub fn synchronize(&mut self) -> bool {
        if let Err(e) = self.remote.synchronize() {
            log::warn!("{}: synchronize failed: {}", self.remote.label(), e);
        }
        self.process_remote_changes()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Remote first, then local (re-pushed to remote), then empty.
    fn load(&mut self) -> LoadSource {
        let (profiles, source) = if let Some(profiles) = read_snapshot(&self.remote, &self.key) {
            (profiles, LoadSource::Remote)
        } else if let Some(profiles) = read_snapshot(&self.local, &self.key) {
            (profiles, LoadSource::Local)
        } else {
            (Vec::new(), LoadSource::Empty)
        };

        log::info!(
            "Loaded {} profiles from {:?} for key {}",
            profiles.len(),
            source,
            self.key
        );
        self.profiles = profiles;
        self.source = source;

        if source == LoadSource::Local {
            self.push_remote();
        }

        self.notify(StoreEvent::Replaced {
            source,
            count: self.profiles.len(),
        });
        source
    }

    fn commit(&mut self, mutation: Mutation) {
        self.persist();
        self.notify(StoreEvent::Mutated(mutation));
    }

    /// Write the current snapshot to both backends. Failures are logged only.
    fn persist(&mut self) {
        let Some(bytes) = self.encode() else {
            return;
        };
        if let Err(e) = self.local.write(&self.key, &bytes) {
            log::warn!("{}: write failed: {}", self.local.label(), e);
        }
        self.write_remote(&bytes);
    }

    fn push_remote(&mut self) {
        if let Some(bytes) = self.encode() {
            log::info!("Propagating local snapshot to {}", self.remote.label());
            self.write_remote(&bytes);
        }
    }

    fn write_remote(&mut self, bytes: &[u8]) {
        if let Err(e) = self.remote.write(&self.key, bytes) {
            log::warn!("{}: write failed: {}", self.remote.label(), e);
            return;
        }
        if let Err(e) = self.remote.synchronize() {
            log::warn!("{}: synchronize failed: {}", self.remote.label(), e);
        }
    }

    fn encode(&self) -> Option<Vec<u8>> {
        match codec::encode(&self.profiles) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                log::warn!("Failed to encode {} profiles: {}", self.profiles.len(), e);
                None
            }
        }
    }

    fn notify(&mut self, event: StoreEvent) {
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

/// Read and decode the snapshot under `key`; any failure reads as absent.
fn read_snapshot<B: KeyValueBackend + ?Sized>(backend: &B, key: &str) -> Option<Vec<Profile>> {
    match backend.read(key) {
        Ok(Some(bytes)) => codec::decode(backend.label(), &bytes),
        Ok(None) => None,
        Err(e) => {
            log::warn!("{}: read failed: {}", backend.label(), e);
            None
        }
    }
}
