//! Profile data model.
//!
//! Field names serialize in camelCase; image payloads are base64 strings.

use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::platform::Platform;

/// How a profile's avatar is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarType {
    #[default]
    Emoji,
    Photo,
    Memoji,
}

impl std::fmt::Display for AvatarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvatarType::Emoji => write!(f, "emoji"),
            AvatarType::Photo => write!(f, "photo"),
            AvatarType::Memoji => write!(f, "memoji"),
        }
    }
}

/// A named identity scoped to one platform.
///
/// `id`, `platform` and `created_at` are fixed when the profile is built and
/// cannot be reassigned afterwards; everything else may be edited and handed
/// back to the store through `update`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    id: Uuid,
    pub name: String,
    #[serde(default)]
    pub avatar_type: AvatarType,
    /// Glyph shown for emoji avatars, and as fallback for the others.
    pub avatar_emoji: String,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
    pub avatar_image_data: Option<Vec<u8>>,
    #[serde(default)]
    pub is_kids_profile: bool,
    platform: Platform,
    created_at: DateTime<Utc>,
}

impl Profile {
    /// Create a new emoji profile with a fresh id and the current time.
    pub fn new(
        name: impl Into<String>,
        avatar_emoji: impl Into<String>,
        platform: Platform,
    ) -> Self {
        Self::with_identity(Uuid::new_v4(), name, avatar_emoji, platform, Utc::now())
    }

    /// Create a profile with an explicit identity, e.g. when importing.
    pub fn with_identity(
        id: Uuid,
        name: impl Into<String>,
        avatar_emoji: impl Into<String>,
        platform: Platform,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            avatar_type: AvatarType::Emoji,
            avatar_emoji: avatar_emoji.into(),
            avatar_image_data: None,
            is_kids_profile: false,
            platform,
            created_at,
        }
    }

    /// Mark the profile as a kids profile.
    pub fn kids(mut self, is_kids_profile: bool) -> Self {
        self.is_kids_profile = is_kids_profile;
        self
    }

    /// Replace the avatar with an image payload (photo or memoji).
    pub fn with_image(mut self, avatar_type: AvatarType, data: Vec<u8>) -> Self {
        self.set_image(avatar_type, data);
        self
    }

    /// Switch to an image avatar in place.
    pub fn set_image(&mut self, avatar_type: AvatarType, data: Vec<u8>) {
        self.avatar_type = avatar_type;
        self.avatar_image_data = Some(data);
    }

    /// Switch back to a plain emoji avatar, dropping any image payload.
    pub fn set_emoji(&mut self, emoji: impl Into<String>) {
        self.avatar_type = AvatarType::Emoji;
        self.avatar_emoji = emoji.into();
        self.avatar_image_data = None;
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Copy the editable fields of `other` onto `self`.
    ///
    /// Identity fields are left untouched.
    pub(crate) fn apply_edits(&mut self, other: &Profile) {
        self.name.clone_from(&other.name);
        self.avatar_type = other.avatar_type;
        self.avatar_emoji.clone_from(&other.avatar_emoji);
        self.avatar_image_data.clone_from(&other.avatar_image_data);
        self.is_kids_profile = other.is_kids_profile;
    }
}

/// Serde adapter storing optional binary blobs as base64 strings.
mod base64_bytes {
    use super::BASE64;
    use base64::Engine as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        data: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match data {
            Some(bytes) => serializer.serialize_str(&BASE64.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|s| BASE64.decode(s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_profile_defaults() {
        let profile = Profile::new("Alex", "🐶", Platform::Netflix);
        assert_eq!(profile.avatar_type, AvatarType::Emoji);
        assert!(profile.avatar_image_data.is_none());
        assert!(!profile.is_kids_profile);
        assert_eq!(profile.platform(), Platform::Netflix);
    }

    #[test]
    fn test_fresh_ids_differ() {
        let a = Profile::new("Alex", "🐶", Platform::Netflix);
        let b = Profile::new("Alex", "🐶", Platform::Netflix);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_json_field_names() {
        let profile = Profile::new("Sam", "🦊", Platform::DisneyPlus)
            .kids(true)
            .with_image(AvatarType::Photo, vec![0xFF, 0xD8, 0xFF]);
        let value = serde_json::to_value(&profile).unwrap();

        assert_eq!(value["avatarType"], "photo");
        assert_eq!(value["avatarEmoji"], "🦊");
        assert_eq!(value["avatarImageData"], "/9j/");
        assert_eq!(value["isKidsProfile"], true);
        assert_eq!(value["platform"], "disneyPlus");
        assert!(value.get("createdAt").is_some());
    }

    #[test]
    fn test_emoji_profile_omits_image_data() {
        let profile = Profile::new("Sam", "🦊", Platform::Hulu);
        let value = serde_json::to_value(&profile).unwrap();
        assert!(value.get("avatarImageData").is_none());
    }

    #[test]
    fn test_apply_edits_keeps_identity() {
        let mut stored = Profile::new("Alex", "🐶", Platform::Netflix);
        let other = Profile::new("Alexis", "🐱", Platform::Spotify).kids(true);

        stored.apply_edits(&other);

        assert_eq!(stored.name, "Alexis");
        assert_eq!(stored.avatar_emoji, "🐱");
        assert!(stored.is_kids_profile);
        assert_eq!(stored.platform(), Platform::Netflix);
        assert_ne!(stored.id(), other.id());
    }

    #[test]
    fn test_set_emoji_drops_image() {
        let mut profile = Profile::new("Sam", "🦊", Platform::Hulu)
            .with_image(AvatarType::Memoji, vec![1, 2, 3]);
        profile.set_emoji("🐼");
        assert_eq!(profile.avatar_type, AvatarType::Emoji);
        assert!(profile.avatar_image_data.is_none());
    }
}
