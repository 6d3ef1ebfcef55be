//! Profile Creator CLI
//!
//! Command-line interface for managing per-platform profiles stored locally
//! and in a synchronized folder.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use profile_creator::ProfileError;
use profile_creator::config::{self, AppConfig};
use profile_creator::platform::{Category, Platform};
use profile_creator::storage::{AvatarType, FileBackend, Profile};
use profile_creator::store::{Mutation, ProfileStore, StoreEvent};
use profile_creator::utils::parsing::{parse_platform, parse_profile_name, resolve_profile_id};

type Store = ProfileStore<FileBackend, FileBackend>;

const DEFAULT_AVATAR: &str = "😀";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Manage "who's watching" profiles per platform
#[derive(Parser, Debug)]
#[command(name = "profile-creator")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to config.json (default: OS config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the platform catalog
    Platforms {
        /// Only show one category: streaming, music, gaming or kids
        #[arg(long)]
        category: Option<String>,
    },

    /// List profiles
    List {
        /// Only show profiles of this platform
        #[arg(short, long)]
        platform: Option<String>,
    },

    /// Show one profile in detail
    Show {
        /// Profile id or unambiguous id prefix
        id: String,
    },

    /// Add a profile to a platform
    Add {
        /// Platform id or name (e.g. netflix, "Disney+")
        #[arg(short, long)]
        platform: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Emoji avatar
        #[arg(short, long, default_value = DEFAULT_AVATAR)]
        avatar: String,

        /// Use an image file as photo avatar
        #[arg(long, conflicts_with = "memoji")]
        photo: Option<PathBuf>,

        /// Use an image file as memoji avatar
        #[arg(long)]
        memoji: Option<PathBuf>,

        /// Mark as kids profile
        #[arg(short, long)]
        kids: bool,
    },

    /// Edit an existing profile
    Update {
        /// Profile id or unambiguous id prefix
        id: String,

        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New emoji avatar (drops any image)
        #[arg(short, long, conflicts_with_all = ["photo", "memoji"])]
        avatar: Option<String>,

        /// Replace avatar with a photo
        #[arg(long, conflicts_with = "memoji")]
        photo: Option<PathBuf>,

        /// Replace avatar with a memoji image
        #[arg(long)]
        memoji: Option<PathBuf>,

        /// Set or clear the kids flag
        #[arg(short, long)]
        kids: Option<bool>,
    },

    /// Delete a profile
    Delete {
        /// Profile id or unambiguous id prefix
        id: String,
    },

    /// Delete profiles by their position in a platform's list
    DeleteAt {
        /// Platform id or name
        #[arg(short, long)]
        platform: String,

        /// Zero-based positions as shown by `list --platform`
        #[arg(required = true)]
        indices: Vec<usize>,
    },

    /// Delete every profile of every platform
    DeleteAll {
        /// Confirm the irreversible deletion
        #[arg(long)]
        yes: bool,
    },

    /// Pick up changes from other devices once
    Sync {
        /// Reload from the backends even if no change was reported
        #[arg(long)]
        reload: bool,
    },

    /// Keep watching the synchronized folder for changes
    Watch {
        /// Poll interval in seconds
        #[arg(short, long, default_value = "2")]
        interval: u64,
    },
}

// =============================================================================
// Main
// =============================================================================

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => config::load_config_from(path),
        None => config::load_config(),
    }
    .context("Failed to load configuration")?;

    match args.command {
        Command::Platforms { category } => cmd_platforms(category.as_deref()),
        Command::List { platform } => cmd_list(&config, platform.as_deref()),
        Command::Show { id } => cmd_show(&config, &id),
        Command::Add {
            platform,
            name,
            avatar,
            photo,
            memoji,
            kids,
        } => cmd_add(&config, &platform, &name, &avatar, image_arg(photo, memoji), kids),
        Command::Update {
            id,
            name,
            avatar,
            photo,
            memoji,
            kids,
        } => cmd_update(&config, &id, name.as_deref(), avatar, image_arg(photo, memoji), kids),
        Command::Delete { id } => cmd_delete(&config, &id),
        Command::DeleteAt { platform, indices } => cmd_delete_at(&config, &platform, &indices),
        Command::DeleteAll { yes } => cmd_delete_all(&config, yes),
        Command::Sync { reload } => cmd_sync(&config, reload),
        Command::Watch { interval } => cmd_watch(&config, interval),
    }
}

fn image_arg(photo: Option<PathBuf>, memoji: Option<PathBuf>) -> Option<(AvatarType, PathBuf)> {
    photo
        .map(|p| (AvatarType::Photo, p))
        .or_else(|| memoji.map(|p| (AvatarType::Memoji, p)))
}

fn open_store(config: &AppConfig) -> Result<Store> {
    let local_dir = config.local_dir()?;
    let remote_dir = config.remote_dir()?;
    let local = FileBackend::open("local", &local_dir)
        .with_context(|| format!("Failed to open local store at {}", local_dir.display()))?;
    let remote = FileBackend::open("synced", &remote_dir)
        .with_context(|| format!("Failed to open synced store at {}", remote_dir.display()))?;
    Ok(ProfileStore::open(local, remote, config.storage_key.clone()))
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Failed to read avatar image {}", path.display()))
}

fn print_profile_line(index: Option<usize>, profile: &Profile) {
    let id = profile.id().to_string();
    let kids = if profile.is_kids_profile { " [kids]" } else { "" };
    let avatar = match profile.avatar_type {
        AvatarType::Emoji => String::new(),
        other => format!(" ({})", other),
    };
    match index {
        Some(i) => println!(
            "  {:>2}. {} {}{}{}  {}",
            i,
            profile.avatar_emoji,
            profile.name,
            kids,
            avatar,
            &id[..8]
        ),
        None => println!(
            "  {} {}{}{}  {}  {}",
            profile.avatar_emoji,
            profile.name,
            kids,
            avatar,
            profile.platform(),
            &id[..8]
        ),
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn cmd_platforms(category: Option<&str>) -> Result<()> {
    let categories: Vec<Category> = match category {
        Some(name) => {
            let wanted = name.to_lowercase();
            let found = Category::ALL
                .into_iter()
                .find(|c| c.name().to_lowercase() == wanted)
                .ok_or_else(|| {
                    ProfileError::InvalidInput(format!(
                        "Unknown category '{}'. Use: streaming, music, gaming or kids",
                        name
                    ))
                })?;
            vec![found]
        }
        None => Category::ALL.to_vec(),
    };

    for category in categories {
        println!("{}", category);
        for platform in Platform::in_category(category) {
            let info = platform.info();
            println!(
                "  {:<14} {:<14} {}  {}",
                info.id,
                info.display_name,
                info.primary_hex(),
                info.greeting()
            );
        }
    }
    Ok(())
}

fn cmd_list(config: &AppConfig, platform: Option<&str>) -> Result<()> {
    let store = open_store(config)?;

    if let Some(name) = platform {
        let platform = parse_platform(name)?;
        let profiles = store.list_for_platform(platform);
        println!(
            "{} - {} ({}/{})",
            platform,
            platform.info().greeting(),
            profiles.len(),
            config.max_profiles_per_platform
        );
        if profiles.is_empty() {
            println!("  No profiles yet");
        }
        for (i, profile) in profiles.into_iter().enumerate() {
            print_profile_line(Some(i), profile);
        }
        return Ok(());
    }

    if store.is_empty() {
        println!("No profiles yet");
        return Ok(());
    }
    println!("{} profiles ({:?})", store.len(), store.load_source());
    for profile in store.list() {
        print_profile_line(None, profile);
    }
    Ok(())
}

fn cmd_show(config: &AppConfig, id: &str) -> Result<()> {
    let store = open_store(config)?;
    let id = resolve_profile_id(id, store.list())?;
    let profile = store.get(id).ok_or(ProfileError::ProfileNotFound(id))?;

    println!("Id:        {}", profile.id());
    println!("Name:      {}", profile.name);
    println!("Platform:  {} ({})", profile.platform(), profile.platform().id());
    println!("Avatar:    {} {}", profile.avatar_emoji, profile.avatar_type);
    if let Some(data) = &profile.avatar_image_data {
        println!("Image:     {} bytes", data.len());
    }
    println!("Kids:      {}", if profile.is_kids_profile { "yes" } else { "no" });
    println!("Created:   {}", profile.created_at().to_rfc3339());
    Ok(())
}

fn cmd_add(
    config: &AppConfig,
    platform: &str,
    name: &str,
    avatar: &str,
    image: Option<(AvatarType, PathBuf)>,
    kids: bool,
) -> Result<()> {
    let platform = parse_platform(platform)?;
    let name = parse_profile_name(name)?;
    let mut store = open_store(config)?;

    let max = config.max_profiles_per_platform;
    if store.count_for_platform(platform) >= max {
        return Err(ProfileError::ProfileLimitReached {
            platform: platform.to_string(),
            max,
        }
        .into());
    }

    let mut profile = Profile::new(name, avatar, platform).kids(kids);
    if let Some((avatar_type, path)) = image {
        profile.set_image(avatar_type, read_image(&path)?);
    }

    let id = profile.id();
    store.add(profile);
    println!("✅ Added profile {} to {}", id, platform);
    Ok(())
}

fn cmd_update(
    config: &AppConfig,
    id: &str,
    name: Option<&str>,
    avatar: Option<String>,
    image: Option<(AvatarType, PathBuf)>,
    kids: Option<bool>,
) -> Result<()> {
    let mut store = open_store(config)?;
    let id = resolve_profile_id(id, store.list())?;
    let mut profile = store
        .get(id)
        .cloned()
        .ok_or(ProfileError::ProfileNotFound(id))?;

    if let Some(name) = name {
        profile.name = parse_profile_name(name)?;
    }
    if let Some(emoji) = avatar {
        profile.set_emoji(emoji);
    }
    if let Some((avatar_type, path)) = image {
        profile.set_image(avatar_type, read_image(&path)?);
    }
    if let Some(kids) = kids {
        profile.is_kids_profile = kids;
    }

    store.update(&profile);
    println!("✅ Updated profile {}", profile.name);
    Ok(())
}

fn cmd_delete(config: &AppConfig, id: &str) -> Result<()> {
    let mut store = open_store(config)?;
    let id = resolve_profile_id(id, store.list())?;
    if !store.delete_by_id(id) {
        return Err(ProfileError::ProfileNotFound(id).into());
    }
    println!("🗑️  Deleted profile {}", id);
    Ok(())
}

fn cmd_delete_at(config: &AppConfig, platform: &str, indices: &[usize]) -> Result<()> {
    let platform = parse_platform(platform)?;
    let mut store = open_store(config)?;
    let removed = store.delete_at_offsets(platform, indices);
    println!("🗑️  Deleted {} profiles from {}", removed, platform);
    Ok(())
}

fn cmd_delete_all(config: &AppConfig, yes: bool) -> Result<()> {
    if !yes {
        bail!("This deletes every profile on every platform. Re-run with --yes to confirm.");
    }
    let mut store = open_store(config)?;
    let count = store.len();
    store.delete_all();
    println!("🗑️  Deleted all {} profiles", count);
    Ok(())
}

fn cmd_sync(config: &AppConfig, reload: bool) -> Result<()> {
    let mut store = open_store(config)?;
    println!(
        "Loaded {} profiles from {:?} ({})",
        store.len(),
        store.load_source(),
        store.key()
    );
    if reload {
        let source = store.reload();
        println!("🔄 Reloaded {} profiles from {:?}", store.len(), source);
    } else if store.synchronize() {
        println!("🔄 Reloaded {} profiles after remote change", store.len());
    } else {
        println!("✅ Up to date");
    }
    Ok(())
}

fn cmd_watch(config: &AppConfig, interval_secs: u64) -> Result<()> {
    let mut store = open_store(config)?;
    let events = store.subscribe();

    // Setup Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .context("Failed to set Ctrl+C handler")?;

    println!(
        "👀 Watching {} in {} (every {}s, Ctrl+C to stop)",
        store.key(),
        store.remote().root().display(),
        interval_secs
    );
    println!("Loaded {} profiles from {:?}", store.len(), store.load_source());

    while running.load(Ordering::SeqCst) {
        store.synchronize();

        for event in events.try_iter() {
            match event {
                StoreEvent::Replaced { source, count } => {
                    println!("🔄 Collection replaced: {} profiles from {:?}", count, source);
                }
                StoreEvent::Mutated(Mutation::Cleared) => println!("🗑️  Cleared"),
                StoreEvent::Mutated(m) => println!("✏️  {:?}", m),
            }
        }

        std::thread::sleep(Duration::from_secs(interval_secs.max(1)));
    }

    println!("\n👋 Stopped watching");
    Ok(())
}
