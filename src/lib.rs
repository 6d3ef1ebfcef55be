//! Profile Creator Library
//!
//! "Who's watching?" style profiles grouped under a fixed catalog of
//! streaming, music, gaming and kids platforms, persisted to a device-local
//! store and mirrored to a store synchronized across devices.
//!
//! # Features
//!
//! - Add, edit and delete profiles per platform
//! - Every change is written to both the local and the synchronized backend
//! - Remote-first loading with local fallback and re-propagation
//! - Whole-collection reload when another device publishes changes
//!
//! # Example
//!
//! ```
//! use profile_creator::platform::Platform;
//! use profile_creator::storage::{MemoryBackend, Profile};
//! use profile_creator::store::{ProfileStore, DEFAULT_STORAGE_KEY};
//!
//! let mut store = ProfileStore::open(
//!     MemoryBackend::new("local"),
//!     MemoryBackend::new("cloud"),
//!     DEFAULT_STORAGE_KEY,
//! );
//!
//! let alex = Profile::new("Alex", "🐶", Platform::Netflix);
//! store.add(alex.clone());
//! store.add(Profile::new("Sam", "🦊", Platform::Spotify));
//!
//! assert_eq!(store.list().len(), 2);
//! assert_eq!(store.list_for_platform(Platform::Netflix).len(), 1);
//!
//! store.delete_by_id(alex.id());
//! assert_eq!(store.list()[0].name, "Sam");
//! ```

pub mod config;
pub mod error;
pub mod platform;
pub mod storage;
pub mod store;
pub mod utils;

// Re-exports for convenience
pub use error::{ProfileError, Result};
pub use platform::{Category, Platform, PlatformInfo};
pub use storage::{AvatarType, Profile};
pub use store::{LoadSource, ProfileStore, StoreEvent, StoreState};
