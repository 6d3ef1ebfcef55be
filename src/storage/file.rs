//! Directory-backed key-value backend.
//!
//! Each key is stored as `<root>/<key>.json`. Used for the device-local store
//! and, pointed at a folder that is replicated between devices, for the
//! synchronized store. External changes are detected on `synchronize` by
//! comparing every file against the state we last saw or wrote ourselves.
//! Entries that are not regular files, or cannot be read, are skipped.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::SystemTime;

use crate::error::{ProfileError, Result};
use crate::storage::backend::{
    ChangeReason, KeyValueBackend, RemoteChange, SyncedBackend, validate_key,
};

const EXTENSION: &str = "json";
const TMP_EXTENSION: &str = "json.tmp";

/// What we know about one key file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileStamp {
    modified: SystemTime,
    digest: u64,
}

pub struct FileBackend {
    label: String,
    root: PathBuf,
    /// Last observed state of every key file.
    seen: HashMap<String, FileStamp>,
    /// Whether the root has existed at some point since opening.
    root_seen: bool,
    subscribers: Vec<Sender<RemoteChange>>,
}

impl FileBackend {
    /// Open a backend rooted at `root`.
    ///
    /// The directory is created on first write. Files already present are
    /// taken as the baseline for change detection. If the directory does not
    /// exist yet, the first external change found in it is reported as
    /// [`ChangeReason::InitialSync`].
    pub fn open(label: impl Into<String>, root: &Path) -> Result<Self> {
        let mut backend = Self {
            label: label.into(),
            root: root.to_path_buf(),
            seen: HashMap::new(),
            root_seen: root.exists(),
            subscribers: Vec::new(),
        };
        backend.seen = backend.scan()?;
        Ok(backend)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{}.{}", key, EXTENSION)))
    }

    fn modified(&self, path: &Path) -> Result<SystemTime> {
        std::fs::metadata(path)
            .and_then(|m| m.modified())
            .map_err(|e| ProfileError::storage(&self.label, e))
    }

    fn stamp(&self, path: &Path) -> Result<FileStamp> {
        let modified = self.modified(path)?;
        let bytes = std::fs::read(path).map_err(|e| ProfileError::storage(&self.label, e))?;
        Ok(FileStamp {
            modified,
            digest: digest(&bytes),
        })
    }

    /// Stamp every key file currently under the root.
    ///
    /// Only the root itself being unreadable is an error. Single entries that
    /// vanish or cannot be read are logged and left out.
    fn scan(&self) -> Result<HashMap<String, FileStamp>> {
        let mut stamps = HashMap::new();
        if !self.root.exists() {
            return Ok(stamps);
        }

        let entries =
            std::fs::read_dir(&self.root).map_err(|e| ProfileError::storage(&self.label, e))?;
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    log::warn!("{}: skipping unreadable entry: {}", self.label, e);
                    continue;
                }
            };
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if !entry.file_type().is_ok_and(|t| t.is_file()) {
                log::debug!("{}: ignoring non-file {}", self.label, path.display());
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match self.stamp(&path) {
                Ok(stamp) => {
                    stamps.insert(key.to_string(), stamp);
                }
                Err(e) => log::warn!("{}: skipping {}: {}", self.label, path.display(), e),
            }
        }
        Ok(stamps)
    }

    fn notify(&mut self, change: RemoteChange) {
        self.subscribers.retain(|tx| tx.send(change.clone()).is_ok());
    }
}

impl KeyValueBackend for FileBackend {
    fn label(&self) -> &str {
        &self.label
    }

    fn read(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read(&path)
            .map(Some)
            .map_err(|e| ProfileError::storage(&self.label, e))
    }

    fn write(&mut self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        std::fs::create_dir_all(&self.root).map_err(|e| ProfileError::storage(&self.label, e))?;
        self.root_seen = true;

        // Write aside and rename so readers never observe a partial file.
        let tmp = path.with_extension(TMP_EXTENSION);
        std::fs::write(&tmp, value).map_err(|e| ProfileError::storage(&self.label, e))?;
        std::fs::rename(&tmp, &path).map_err(|e| ProfileError::storage(&self.label, e))?;

        // Digest of the bytes we wrote, never a re-read of the file.
        let stamp = FileStamp {
            modified: self.modified(&path)?,
            digest: digest(value),
        };
        self.seen.insert(key.to_string(), stamp);
        log::debug!("{}: wrote {} bytes to {}", self.label, value.len(), path.display());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| ProfileError::storage(&self.label, e))?;
        }
        self.seen.remove(key);
        Ok(())
    }
}

impl SyncedBackend for FileBackend {
    fn synchronize(&mut self) -> Result<()> {
        let current = self.scan()?;

        let mut changed: Vec<String> = current
            .iter()
            .filter(|(key, stamp)| self.seen.get(*key) != Some(*stamp))
            .map(|(key, _)| key.clone())
            .collect();
        changed.extend(
            self.seen
                .keys()
                .filter(|key| !current.contains_key(*key))
                .cloned(),
        );

        self.seen = current;

        let reason = if self.root_seen {
            ChangeReason::ServerChange
        } else {
            ChangeReason::InitialSync
        };
        self.root_seen |= self.root.exists();

        if !changed.is_empty() {
            changed.sort();
            log::info!("{}: external change ({:?}) to {:?}", self.label, reason, changed);
            self.notify(RemoteChange::new(reason, changed));
        }
        Ok(())
    }

    fn subscribe(&mut self) -> Receiver<RemoteChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }
}

fn digest(bytes: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}
