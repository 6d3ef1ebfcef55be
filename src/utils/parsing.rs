//! Parsing utilities for CLI arguments.
//!
//! This module provides the input validation the command-line front end
//! applies before anything reaches the profile store.

use uuid::Uuid;

use crate::error::{ProfileError, Result};
use crate::platform::Platform;
use crate::storage::Profile;

// =============================================================================
// Platform Parsing
// =============================================================================

/// Parse a platform id or display name.
///
/// # Example
/// ```
/// use profile_creator::utils::parsing::parse_platform;
/// use profile_creator::platform::Platform;
///
/// assert_eq!(parse_platform("disneyPlus").unwrap(), Platform::DisneyPlus);
/// assert_eq!(parse_platform("Prime Video").unwrap(), Platform::AmazonPrime);
/// ```
pub fn parse_platform(name: &str) -> Result<Platform> {
    name.parse()
}

// =============================================================================
// Profile Input
// =============================================================================

/// Trim a profile name and reject blank ones.
pub fn parse_profile_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProfileError::InvalidInput("Profile name must not be empty".into()));
    }
    Ok(trimmed.to_string())
}

/// Resolve a full id or an unambiguous id prefix against `profiles`.
///
/// # Example
/// ```
/// use profile_creator::platform::Platform;
/// use profile_creator::storage::Profile;
/// use profile_creator::utils::parsing::resolve_profile_id;
///
/// let alex = Profile::new("Alex", "🐶", Platform::Netflix);
/// let full = alex.id().to_string();
/// let profiles = vec![alex.clone()];
///
/// assert_eq!(resolve_profile_id(&full, &profiles).unwrap(), alex.id());
/// assert_eq!(resolve_profile_id(&full[..8], &profiles).unwrap(), alex.id());
/// ```
pub fn resolve_profile_id(input: &str, profiles: &[Profile]) -> Result<Uuid> {
    let input = input.trim().to_lowercase();
    if let Ok(id) = Uuid::parse_str(&input) {
        return Ok(id);
    }
    if input.len() < 4 {
        return Err(ProfileError::InvalidInput(
            "Give at least 4 characters of the profile id".into(),
        ));
    }

    let matches: Vec<Uuid> = profiles
        .iter()
        .map(Profile::id)
        .filter(|id| id.to_string().starts_with(&input))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => Err(ProfileError::InvalidInput(format!("No profile id starts with '{}'", input))),
        _ => Err(ProfileError::InvalidInput(format!(
            "Profile id prefix '{}' is ambiguous ({} matches)",
            input,
            matches.len()
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("netflix", Platform::Netflix)]
    #[case("NETFLIX", Platform::Netflix)]
    #[case(" hboMax ", Platform::HboMax)]
    #[case("Max", Platform::HboMax)]
    #[case("YouTube Kids", Platform::YoutubeKids)]
    fn test_parse_platform(#[case] input: &str, #[case] expected: Platform) {
        assert_eq!(parse_platform(input).unwrap(), expected);
    }

    #[test]
    fn test_parse_platform_unknown() {
        assert!(matches!(
            parse_platform("betamax"),
            Err(ProfileError::UnknownPlatform(_))
        ));
    }

    #[test]
    fn test_parse_profile_name() {
        assert_eq!(parse_profile_name("  Alex ").unwrap(), "Alex");
        assert!(parse_profile_name("   ").is_err());
        assert!(parse_profile_name("").is_err());
    }

    #[test]
    fn test_resolve_profile_id_prefix() {
        let a = Profile::with_identity(
            Uuid::parse_str("aaaa1111-0000-0000-0000-000000000000").unwrap(),
            "A",
            "🙂",
            Platform::Netflix,
            chrono::Utc::now(),
        );
        let b = Profile::with_identity(
            Uuid::parse_str("aaaa2222-0000-0000-0000-000000000000").unwrap(),
            "B",
            "🙂",
            Platform::Netflix,
            chrono::Utc::now(),
        );
        let profiles = vec![a.clone(), b.clone()];

        assert_eq!(resolve_profile_id("AAAA1", &profiles).unwrap(), a.id());
        assert_eq!(resolve_profile_id("aaaa2", &profiles).unwrap(), b.id());
        assert!(resolve_profile_id("aaaa", &profiles).is_err());
        assert!(resolve_profile_id("bbbb", &profiles).is_err());
        assert!(resolve_profile_id("aa", &profiles).is_err());
    }
}
