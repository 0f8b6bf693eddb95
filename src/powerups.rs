//! Power-up kinds and their session accounting
//!
//! Power-ups are limited-use consumables that temporarily alter gameplay
//! rules. Each kind has an independent non-negative counter in the quiz
//! state; using one decrements its counter by exactly one and applies a
//! kind-specific effect. The effects themselves are coordinated by the
//! session controller; this module owns the kinds, the session grants,
//! and the pure option-elimination logic of the fifty-fifty.

use enum_map::{Enum, EnumMap, enum_map};
use serde::{Deserialize, Serialize};

use crate::constants::power_ups;

/// The kinds of power-ups available in a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PowerUpKind {
    /// Pauses the countdown for a fixed interval
    TimeFreeze,
    /// Eliminates two incorrect options from the current question
    FiftyFifty,
    /// Asks the server to replace the current question
    SkipQuestion,
}

/// Returns the power-up counters granted at the start of a session
pub fn initial_counters() -> EnumMap<PowerUpKind, u32> {
    enum_map! {
        PowerUpKind::TimeFreeze => power_ups::INITIAL_TIME_FREEZE,
        PowerUpKind::FiftyFifty => power_ups::INITIAL_FIFTY_FIFTY,
        PowerUpKind::SkipQuestion => power_ups::INITIAL_SKIP_QUESTION,
    }
}

/// Picks the option indices a fifty-fifty removes
///
/// Candidates are the options that are neither correct nor already
/// eliminated; up to two of them are chosen at random. The correct option
/// is never a candidate, so the player is always left with a winnable
/// question.
///
/// # Arguments
///
/// * `option_count` - Number of options on the current question
/// * `correct` - Index of the correct option
/// * `already_eliminated` - Indices removed by an earlier fifty-fifty
///
/// # Returns
///
/// The indices to eliminate, in ascending order; empty when no incorrect
/// options remain.
pub fn fifty_fifty_eliminations(
    option_count: usize,
    correct: usize,
    already_eliminated: &[usize],
) -> Vec<usize> {
    let mut candidates: Vec<usize> = (0..option_count)
        .filter(|index| *index != correct && !already_eliminated.contains(index))
        .collect();

    fastrand::shuffle(&mut candidates);
    candidates.truncate(power_ups::FIFTY_FIFTY_ELIMINATIONS);
    candidates.sort_unstable();
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_counters() {
        let counters = initial_counters();
        assert_eq!(counters[PowerUpKind::TimeFreeze], 2);
        assert_eq!(counters[PowerUpKind::FiftyFifty], 2);
        assert_eq!(counters[PowerUpKind::SkipQuestion], 1);
    }

    #[test]
    fn test_fifty_fifty_never_removes_correct() {
        for _ in 0..50 {
            let eliminated = fifty_fifty_eliminations(4, 2, &[]);
            assert_eq!(eliminated.len(), 2);
            assert!(!eliminated.contains(&2));
        }
    }

    #[test]
    fn test_fifty_fifty_respects_prior_eliminations() {
        let first = fifty_fifty_eliminations(4, 0, &[]);
        assert_eq!(first.len(), 2);

        let second = fifty_fifty_eliminations(4, 0, &first);
        assert_eq!(second.len(), 1);
        assert!(!second.contains(&0));
        assert!(!first.contains(&second[0]));
    }

    #[test]
    fn test_fifty_fifty_exhausted() {
        // Two options: the single incorrect one goes first, then nothing.
        let first = fifty_fifty_eliminations(2, 1, &[]);
        assert_eq!(first, vec![0]);

        let second = fifty_fifty_eliminations(2, 1, &first);
        assert!(second.is_empty());
    }

    #[test]
    fn test_power_up_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&PowerUpKind::TimeFreeze).unwrap(),
            "\"timeFreeze\""
        );
        assert_eq!(
            serde_json::to_string(&PowerUpKind::FiftyFifty).unwrap(),
            "\"fiftyFifty\""
        );
        assert_eq!(
            serde_json::to_string(&PowerUpKind::SkipQuestion).unwrap(),
            "\"skipQuestion\""
        );
    }
}
