//! Snapshot encoding.
//!
//! A snapshot is the full ordered profile list encoded as a JSON array.
//! Decoding never fails loudly: corrupt or missing data reads as "no data"
//! so callers can fall back to another source.

use std::collections::HashSet;

use crate::error::Result;
use crate::storage::types::Profile;

/// Encode the full collection.
pub fn encode(profiles: &[Profile]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(profiles)?)
}

/// Decode a snapshot read from `label`.
///
/// Returns `None` for unparsable data. Entries repeating an earlier id are
/// dropped so the adopted collection keeps ids unique.
pub fn decode(label: &str, bytes: &[u8]) -> Option<Vec<Profile>> {
    let profiles: Vec<Profile> = match serde_json::from_slice(bytes) {
        Ok(profiles) => profiles,
        Err(e) => {
            log::warn!("{}: discarding unreadable snapshot ({})", label, e);
            return None;
        }
    };

    let total = profiles.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<Profile> = profiles
        .into_iter()
        .filter(|p| seen.insert(p.id()))
        .collect();

    if unique.len() != total {
        log::warn!(
            "{}: dropped {} profiles with duplicate ids",
            label,
            total - unique.len()
        );
    }

    Some(unique)
}
