//! In-process key-value backend.
//!
//! Clones of a [`MemoryBackend`] share one namespace, the way several devices
//! signed into one account share a cloud key-value store. A write through
//! one handle is reported to the subscribers of every other handle.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::error::{ProfileError, Result};
use crate::storage::backend::{ChangeReason, KeyValueBackend, RemoteChange, SyncedBackend};

#[derive(Default)]
struct Namespace {
    entries: HashMap<String, Vec<u8>>,
    /// (handle, sender) pairs.
    subscribers: Vec<(u64, Sender<RemoteChange>)>,
    next_handle: u64,
    fail_writes: bool,
}

impl Namespace {
    /// Deliver `change` to every subscriber except those of `origin`.
    fn notify(&mut self, origin: Option<u64>, change: &RemoteChange) {
        self.subscribers.retain(|(handle, tx)| {
            if Some(*handle) == origin {
                return true;
            }
            tx.send(change.clone()).is_ok()
        });
    }
}

pub struct MemoryBackend {
    label: String,
    handle: u64,
    shared: Arc<Mutex<Namespace>>,
}

impl MemoryBackend {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            handle: 0,
            shared: Arc::new(Mutex::new(Namespace {
                next_handle: 1,
                ..Namespace::default()
            })),
        }
    }

    fn namespace(&self) -> MutexGuard<'_, Namespace> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every write to this namespace fail until switched back.
    pub fn set_fail_writes(&self, fail: bool) {
        self.namespace().fail_writes = fail;
    }

    /// Notify every subscriber, this handle's included.
    ///
    /// Stands in for service-initiated events such as an account switch.
    pub fn broadcast(&self, reason: ChangeReason) {
        self.namespace()
            .notify(None, &RemoteChange::new(reason, Vec::new()));
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        self.namespace().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Clone for MemoryBackend {
    /// Attach another handle (another device) to the same namespace.
    fn clone(&self) -> Self {
        let handle = {
            let mut ns = self.namespace();
            let handle = ns.next_handle;
            ns.next_handle += 1;
            handle
        };
        Self {
            label: self.label.clone(),
            handle,
            shared: Arc::clone(&self.shared),
        }
    }
}

impl KeyValueBackend for MemoryBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.namespace().entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let mut ns = self.namespace();
        if ns.fail_writes {
            return Err(ProfileError::storage(&self.label, "write rejected"));
        }
        ns.entries.insert(key.to_string(), value.to_vec());
        ns.notify(
            Some(self.handle),
            &RemoteChange::new(ChangeReason::ServerChange, vec![key.to_string()]),
        );
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let mut ns = self.namespace();
        if ns.fail_writes {
            return Err(ProfileError::storage(&self.label, "remove rejected"));
        }
        if ns.entries.remove(key).is_some() {
            ns.notify(
                Some(self.handle),
                &RemoteChange::new(ChangeReason::ServerChange, vec![key.to_string()]),
            );
        }
        Ok(())
    }
}

impl SyncedBackend for MemoryBackend {
    /// Writes are visible immediately; nothing to flush.
    fn synchronize(&mut self) -> Result<()> {
        Ok(())
    }

    fn subscribe(&mut self) -> Receiver<RemoteChange> {
        let (tx, rx) = mpsc::channel();
        self.namespace().subscribers.push((self.handle, tx));
        rx
    }
}
