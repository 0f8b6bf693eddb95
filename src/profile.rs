//! Player profile and identity management
//!
//! This module defines the unique identifiers used across the session and
//! the player profile created at registration. A profile lives for the
//! rest of the session; registering again replaces it wholesale.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use uuid::Uuid;

/// A unique identifier for players, questions, and challenges
///
/// Identifiers are generated locally at creation time and are unique per
/// session. They serialize as UUID strings on the wire.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for Id {
    /// Creates a new random identifier (same as `new()`)
    fn default() -> Self {
        Self::new()
    }
}

impl Display for Id {
    /// Formats the identifier as a UUID string
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for Id {
    type Err = uuid::Error;

    /// Parses an identifier from a UUID string
    ///
    /// # Errors
    ///
    /// Returns a `uuid::Error` if the string is not a valid UUID.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::from_str(s)?))
    }
}

/// Client-side preferences attached to a profile
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Preferences {
    /// Whether sound effects are enabled
    pub sound_enabled: bool,
    /// Whether real-time notifications are shown
    pub notifications_enabled: bool,
}

impl Default for Preferences {
    /// Sound and notifications are both on by default
    fn default() -> Self {
        Self {
            sound_enabled: true,
            notifications_enabled: true,
        }
    }
}

/// A registered player's profile
///
/// Created once per registration with a fresh identifier; never mutated
/// except through experience accrual, and only replaced by registering
/// again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier generated at creation time
    pub id: Id,
    /// The player's display name
    pub username: String,
    /// Current profile level, derived from total experience
    pub profile_level: u32,
    /// Total experience points accrued across the session
    pub total_xp: u64,
    /// Badges earned by the player
    pub badges: Vec<String>,
    /// Client-side preferences
    pub preferences: Preferences,
}

impl Profile {
    /// Creates a fresh profile for a validated username
    pub fn new(username: String) -> Self {
        Self {
            id: Id::new(),
            username,
            profile_level: 1,
            total_xp: 0,
            badges: Vec::new(),
            preferences: Preferences::default(),
        }
    }

    /// Adds experience points and recomputes the profile level
    ///
    /// Levels advance every fixed amount of experience, starting at level 1.
    pub fn gain_xp(&mut self, amount: u64) {
        self.total_xp += amount;
        self.profile_level = 1 + (self.total_xp / crate::constants::profile::XP_PER_LEVEL) as u32;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        let id = Id::new();
        let parsed = Id::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_id_unique() {
        assert_ne!(Id::new(), Id::new());
    }

    #[test]
    fn test_id_serializes_as_string() {
        let id = Id::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn test_profile_new_defaults() {
        let profile = Profile::new("QuizWhiz".to_owned());
        assert_eq!(profile.username, "QuizWhiz");
        assert_eq!(profile.profile_level, 1);
        assert_eq!(profile.total_xp, 0);
        assert!(profile.badges.is_empty());
        assert!(profile.preferences.sound_enabled);
    }

    #[test]
    fn test_gain_xp_levels_up() {
        let mut profile = Profile::new("QuizWhiz".to_owned());
        profile.gain_xp(999);
        assert_eq!(profile.profile_level, 1);
        profile.gain_xp(1);
        assert_eq!(profile.profile_level, 2);
        profile.gain_xp(2500);
        assert_eq!(profile.profile_level, 4);
        assert_eq!(profile.total_xp, 3500);
    }
}
