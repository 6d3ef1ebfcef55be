//! Profile storage and persistence module.
//!
//! Holds the profile data model, the snapshot codec and the key-value
//! backends the profile store mirrors its collection into.

pub mod backend;
pub mod codec;
pub mod file;
pub mod memory;
pub mod types;

// Re-export commonly used items
pub use backend::{ChangeReason, KeyValueBackend, RemoteChange, SyncedBackend, validate_key};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use types::*;
