//! Platform catalog.
//!
//! Profiles are grouped under a fixed, closed set of streaming, music,
//! gaming and kids platforms. Display metadata lives in a static lookup
//! table; the profile store treats [`Platform`] as an opaque value.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ProfileError;

// =============================================================================
// Platform Identifiers
// =============================================================================

/// Platform a profile belongs to.
///
/// Serialized with the catalog raw ids (`netflix`, `disneyPlus`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    // Streaming
    Netflix,
    DisneyPlus,
    Hulu,
    AmazonPrime,
    HboMax,
    #[serde(rename = "appleTVPlus")]
    AppleTvPlus,
    Youtube,
    Peacock,
    // Music
    Spotify,
    AppleMusic,
    AmazonMusic,
    Tidal,
    // Gaming
    Xbox,
    Playstation,
    Nintendo,
    Steam,
    Roblox,
    Minecraft,
    EpicGames,
    EaPlay,
    // Kids
    YoutubeKids,
    PbsKids,
    NickJr,
    DisneyJunior,
}

/// Broad grouping used for wording and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Streaming,
    Music,
    Gaming,
    Kids,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Streaming,
        Category::Music,
        Category::Gaming,
        Category::Kids,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Category::Streaming => "Streaming",
            Category::Music => "Music",
            Category::Gaming => "Gaming",
            Category::Kids => "Kids",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Static display metadata for one platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    pub platform: Platform,
    /// Raw identifier, identical to the serialized form.
    pub id: &'static str,
    pub display_name: &'static str,
    pub category: Category,
    /// SF Symbols style icon reference.
    pub icon_name: &'static str,
    pub logo_image_name: &'static str,
    /// Brand color as RGB.
    pub primary_color: [u8; 3],
    /// Screen background color as RGB.
    pub background_color: [u8; 3],
}

impl PlatformInfo {
    /// Kids platforms use light backgrounds and therefore dark text.
    pub fn use_light_text(&self) -> bool {
        self.category != Category::Kids
    }

    /// Heading shown above the profile picker.
    pub fn greeting(&self) -> &'static str {
        match self.category {
            Category::Music => "Who's Listening?",
            Category::Gaming => "Who's Playing?",
            Category::Streaming | Category::Kids => "Who's Watching?",
        }
    }

    /// Primary color as `#RRGGBB`.
    pub fn primary_hex(&self) -> String {
        let [r, g, b] = self.primary_color;
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }
}

impl Platform {
    /// All platforms, in catalog order.
    pub const ALL: [Platform; 24] = [
        Platform::Netflix,
        Platform::DisneyPlus,
        Platform::Hulu,
        Platform::AmazonPrime,
        Platform::HboMax,
        Platform::AppleTvPlus,
        Platform::Youtube,
        Platform::Peacock,
        Platform::Spotify,
        Platform::AppleMusic,
        Platform::AmazonMusic,
        Platform::Tidal,
        Platform::Xbox,
        Platform::Playstation,
        Platform::Nintendo,
        Platform::Steam,
        Platform::Roblox,
        Platform::Minecraft,
        Platform::EpicGames,
        Platform::EaPlay,
        Platform::YoutubeKids,
        Platform::PbsKids,
        Platform::NickJr,
        Platform::DisneyJunior,
    ];

    /// Look up this platform's display metadata.
    pub fn info(self) -> &'static PlatformInfo {
        // CATALOG is laid out in declaration order.
        &CATALOG[self as usize]
    }

    pub fn id(self) -> &'static str {
        self.info().id
    }

    pub fn display_name(self) -> &'static str {
        self.info().display_name
    }

    pub fn category(self) -> Category {
        self.info().category
    }

    /// Platforms belonging to one category, in catalog order.
    pub fn in_category(category: Category) -> impl Iterator<Item = Platform> {
        Self::ALL
            .into_iter()
            .filter(move |p| p.category() == category)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Platform {
    type Err = ProfileError;

    /// Accepts the raw id or the display name, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| {
                let info = p.info();
                info.id.to_lowercase() == wanted || info.display_name.to_lowercase() == wanted
            })
            .ok_or_else(|| ProfileError::UnknownPlatform(s.to_string()))
    }
}

// =============================================================================
// Catalog Table
// =============================================================================

const fn entry(
    platform: Platform,
    id: &'static str,
    display_name: &'static str,
    category: Category,
    icon_name: &'static str,
    logo_image_name: &'static str,
    primary_color: [u8; 3],
    background_color: [u8; 3],
) -> PlatformInfo {
    PlatformInfo {
        platform,
        id,
        display_name,
        category,
        icon_name,
        logo_image_name,
        primary_color,
        background_color,
    }
}

use Category::{Gaming, Kids, Music, Streaming};

#[rustfmt::skip]
static CATALOG: [PlatformInfo; 24] = [
    entry(Platform::Netflix, "netflix", "Netflix", Streaming, "play.rectangle.fill", "netflix-logo", [229, 9, 20], [20, 20, 20]),
    entry(Platform::DisneyPlus, "disneyPlus", "Disney+", Streaming, "sparkles", "disney-logo", [17, 60, 207], [26, 29, 41]),
    entry(Platform::Hulu, "hulu", "Hulu", Streaming, "leaf.fill", "hulu-logo", [28, 231, 131], [8, 8, 8]),
    entry(Platform::AmazonPrime, "amazonPrime", "Prime Video", Streaming, "shippingbox.fill", "prime-logo", [0, 168, 225], [15, 24, 33]),
    entry(Platform::HboMax, "hboMax", "Max", Streaming, "film.fill", "max-logo", [150, 60, 189], [0, 0, 0]),
    entry(Platform::AppleTvPlus, "appleTVPlus", "Apple TV+", Streaming, "apple.logo", "appletv-logo", [142, 142, 147], [25, 25, 25]),
    entry(Platform::Youtube, "youtube", "YouTube", Streaming, "play.rectangle.fill", "youtube-logo", [255, 0, 0], [15, 15, 15]),
    entry(Platform::Peacock, "peacock", "Peacock", Streaming, "bird.fill", "peacock-logo", [250, 184, 47], [0, 0, 0]),
    entry(Platform::Spotify, "spotify", "Spotify", Music, "waveform", "spotify-logo", [30, 215, 96], [18, 18, 18]),
    entry(Platform::AppleMusic, "appleMusic", "Apple Music", Music, "music.note", "applemusic-logo", [252, 60, 68], [20, 20, 20]),
    entry(Platform::AmazonMusic, "amazonMusic", "Amazon Music", Music, "music.note.list", "amazonmusic-logo", [37, 209, 234], [15, 18, 25]),
    entry(Platform::Tidal, "tidal", "Tidal", Music, "waveform", "tidal-logo", [0, 255, 255], [0, 0, 0]),
    entry(Platform::Xbox, "xbox", "Xbox", Gaming, "gamecontroller.fill", "xbox-logo", [16, 124, 16], [16, 16, 16]),
    entry(Platform::Playstation, "playstation", "PlayStation", Gaming, "gamecontroller.fill", "playstation-logo", [0, 55, 145], [0, 20, 50]),
    entry(Platform::Nintendo, "nintendo", "Nintendo", Gaming, "gamecontroller.fill", "nintendo-logo", [230, 0, 18], [20, 20, 20]),
    entry(Platform::Steam, "steam", "Steam", Gaming, "gamecontroller.fill", "steam-logo", [27, 40, 56], [23, 29, 37]),
    entry(Platform::Roblox, "roblox", "Roblox", Gaming, "cube.fill", "roblox-logo", [226, 35, 26], [20, 20, 20]),
    entry(Platform::Minecraft, "minecraft", "Minecraft", Gaming, "square.grid.3x3.fill", "minecraft-logo", [86, 130, 70], [45, 45, 45]),
    entry(Platform::EpicGames, "epicGames", "Epic Games", Gaming, "gamecontroller.fill", "epicgames-logo", [0, 150, 255], [18, 18, 18]),
    entry(Platform::EaPlay, "eaPlay", "EA Play", Gaming, "gamecontroller.fill", "eaplay-logo", [255, 75, 0], [15, 15, 15]),
    entry(Platform::YoutubeKids, "youtubeKids", "YouTube Kids", Kids, "play.rectangle.fill", "youtubekids-logo", [255, 0, 0], [255, 255, 255]),
    entry(Platform::PbsKids, "pbsKids", "PBS Kids", Kids, "book.fill", "pbskids-logo", [62, 180, 73], [240, 248, 240]),
    entry(Platform::NickJr, "nickJr", "Nick Jr", Kids, "star.fill", "nickjr-logo", [255, 128, 0], [255, 245, 230]),
    entry(Platform::DisneyJunior, "disneyJunior", "Disney Junior", Kids, "sparkles", "disneyjunior-logo", [113, 86, 163], [240, 235, 250]),
];
