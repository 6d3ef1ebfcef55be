//! Key-value backend abstraction.
//!
//! The profile store mirrors its snapshot into two backends: a local one
//! private to this device and a synchronized one shared by every device of
//! the same account. Only the synchronized backend reports external changes.

use std::sync::mpsc::Receiver;

use crate::error::{ProfileError, Result};

/// Check that `key` can name a value in every backend.
///
/// Keys become file names in [`FileBackend`](crate::storage::FileBackend),
/// so path separators and leading dots are refused.
pub fn validate_key(key: &str) -> Result<()> {
    if key.trim().is_empty() || key.contains(['/', '\\']) || key.starts_with('.') {
        return Err(ProfileError::InvalidInput(format!("Invalid storage key '{}'", key)));
    }
    Ok(())
}

pub trait KeyValueBackend {
    /// Diagnostic label used in logs and errors.
    fn label(&self) -> &str;

    /// Read the bytes stored under `key`, `None` if the key is absent.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Create or replace the value stored under `key`.
    fn write(&mut self, key: &str, value: &[u8]) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove(&mut self, key: &str) -> Result<()>;
}

pub trait SyncedBackend: KeyValueBackend {
    /// Flush pending writes and pick up changes made elsewhere.
    ///
    /// Subscribers are notified of any external change detected here.
    fn synchronize(&mut self) -> Result<()>;

    /// Register for external change notifications.
    ///
    /// Notifications are queued on the returned channel and are meant to be
    /// drained by whoever owns the receiving state.
    fn subscribe(&mut self) -> Receiver<RemoteChange>;
}

/// Why the synchronized backend changed underneath us.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeReason {
    /// Another device wrote new values.
    ServerChange,
    /// First download after the account became available.
    InitialSync,
    /// The signed-in account changed; all keys may differ.
    AccountChange,
}

/// External change notification from a synchronized backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteChange {
    pub reason: ChangeReason,
    /// Keys that changed. Empty means "any key may have changed".
    pub keys: Vec<String>,
}

impl RemoteChange {
    pub fn new(reason: ChangeReason, keys: Vec<String>) -> Self {
        Self { reason, keys }
    }

    /// Whether this change may affect `key`.
    pub fn touches(&self, key: &str) -> bool {
        self.reason == ChangeReason::AccountChange
            || self.keys.is_empty()
            || self.keys.iter().any(|k| k == key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touches() {
        let change = RemoteChange::new(ChangeReason::ServerChange, vec!["savedProfiles".into()]);
        assert!(change.touches("savedProfiles"));
        assert!(!change.touches("other"));

        let any = RemoteChange::new(ChangeReason::InitialSync, vec![]);
        assert!(any.touches("other"));

        let account = RemoteChange::new(ChangeReason::AccountChange, vec!["x".into()]);
        assert!(account.touches("savedProfiles"));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("savedProfiles").is_ok());
        assert!(validate_key("kids-profiles.v2").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("  ").is_err());
        assert!(validate_key("profiles/v2").is_err());
        assert!(validate_key("profiles\\v2").is_err());
        assert!(validate_key(".hidden").is_err());
        assert!(validate_key("../escape").is_err());
    }
}
