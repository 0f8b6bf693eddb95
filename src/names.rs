//! Username validation and guest name generation
//!
//! This module validates the username a player registers with and, for
//! players who do not type one, generates a presentable guest name. The
//! server remains responsible for global uniqueness; the client only
//! rejects names that are empty, too long, or inappropriate.

use heck::ToTitleCase;
use rustrict::CensorStr;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Defines the style of automatically generated guest names
///
/// When a player registers without choosing a username, this enum
/// determines what type of name is generated for them.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, garde::Validate)]
pub enum NameStyle {
    /// Roman-style names (praenomen + nomen, optionally + cognomen)
    Roman(#[garde(range(min = 2, max = 3))] usize),
    /// Pet-style names (adjective + animal combinations)
    Petname(#[garde(range(min = 2, max = 3))] usize),
}

impl Default for NameStyle {
    /// Default name style is Petname with 2 words
    fn default() -> Self {
        Self::Petname(2)
    }
}

impl NameStyle {
    /// Generates a random guest name according to this style
    ///
    /// # Returns
    ///
    /// A randomly generated name as a String.
    pub fn get_name(&self) -> String {
        match self {
            Self::Roman(count) => romanname::romanname(romanname::NameConfig {
                praenomen: *count > 2,
            }),
            Self::Petname(count) => petname::petname(*count as u8, " ").unwrap_or_default(),
        }
        .to_title_case()
    }
}

/// Errors that can occur during username validation
#[derive(Error, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The name is empty or contains only whitespace
    #[error("name cannot be empty")]
    Empty,
    /// The name exceeds the maximum allowed length
    #[error("name is too long")]
    TooLong,
    /// The name contains inappropriate content
    #[error("name is inappropriate")]
    Inappropriate,
}

/// Validates and cleans a requested username
///
/// The name is trimmed of surrounding whitespace and checked against
/// length limits and the content filter.
///
/// # Arguments
///
/// * `name` - The requested username
///
/// # Returns
///
/// The cleaned name on success.
///
/// # Errors
///
/// * `Error::TooLong` - Name exceeds the maximum length
/// * `Error::Empty` - Name is empty after trimming whitespace
/// * `Error::Inappropriate` - Name contains inappropriate content
pub fn clean(name: &str) -> Result<String, Error> {
    if name.len() > crate::constants::profile::MAX_USERNAME_LENGTH {
        return Err(Error::TooLong);
    }
    let name = rustrict::trim_whitespace(name);
    if name.is_empty() {
        return Err(Error::Empty);
    }
    if name.is_inappropriate() {
        return Err(Error::Inappropriate);
    }
    Ok(name.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_accepts_valid_name() {
        assert_eq!(clean("QuizWhiz").unwrap(), "QuizWhiz");
    }

    #[test]
    fn test_clean_trims_whitespace() {
        assert_eq!(clean("  Ada Lovelace  ").unwrap(), "Ada Lovelace");
    }

    #[test]
    fn test_clean_rejects_empty() {
        assert_eq!(clean(""), Err(Error::Empty));
        assert_eq!(clean("    "), Err(Error::Empty));
    }

    #[test]
    fn test_clean_rejects_too_long() {
        let name = "a".repeat(crate::constants::profile::MAX_USERNAME_LENGTH + 1);
        assert_eq!(clean(&name), Err(Error::TooLong));
    }

    #[test]
    fn test_clean_rejects_inappropriate() {
        assert_eq!(clean("fuck"), Err(Error::Inappropriate));
    }

    #[test]
    fn test_name_style_generates_nonempty() {
        let petname = NameStyle::Petname(2).get_name();
        assert!(!petname.is_empty());

        let roman = NameStyle::Roman(2).get_name();
        assert!(!roman.is_empty());
    }

    #[test]
    fn test_name_style_default() {
        assert!(matches!(NameStyle::default(), NameStyle::Petname(2)));
    }
}
