//! # Quizmaster Client Library
//!
//! This library implements the client-side engine for a real-time
//! multiplayer quiz session. It coordinates a single server connection,
//! a typed action-dispatch game-state store, a per-question countdown,
//! an achievement rule table, and limited-use power-ups.
//!
//! The crate is sans-IO: all waits are expressed as scheduled alarm
//! callbacks and all sends go through an uplink trait, so the embedding
//! runtime owns the actual socket and clock. Everything runs on one
//! logical thread of control; handlers run to completion before the next
//! event is processed.

#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::similar_names)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::ignored_unit_patterns)]
#![allow(clippy::struct_field_names)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::wildcard_imports)]

use derive_where::derive_where;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

pub mod constants;

pub mod achievements;
pub mod connection;
pub mod game;
pub mod leaderboard;
pub mod names;
pub mod powerups;
pub mod profile;
pub mod protocol;
pub mod store;
pub mod timer;
pub mod uplink;

/// Alarm messages for timed events across the client
///
/// Alarms are handed to the embedding runtime's scheduler together with
/// a delay; when the delay elapses, the runtime feeds the message back
/// through [`game::Game::receive_alarm`]. Each variant carries enough
/// context for the handler to recognize stale alarms.
#[derive(Debug, Clone, derive_more::From, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Countdown ticks and freeze resumes
    Timer(timer::AlarmMessage),
    /// Reconnection delays
    Connection(connection::AlarmMessage),
    /// Achievement banner clearing
    Achievements(achievements::AlarmMessage),
}

/// A truncated vector that maintains the exact count while limiting displayed items
///
/// This structure is useful for displaying a limited number of items while
/// still showing the total count. For example, a scoreboard can show the
/// top ten users while reporting how many users are ranked in total.
#[derive(Debug, Clone, Serialize)]
#[derive_where(Default)]
pub struct TruncatedVec<T> {
    /// The exact total count of items
    exact_count: usize,
    /// The truncated list of items (up to the limit)
    items: Vec<T>,
}

impl<T: Clone> TruncatedVec<T> {
    /// Creates a new truncated vector from an iterator
    ///
    /// # Arguments
    ///
    /// * `list` - An iterator over items to include
    /// * `limit` - Maximum number of items to include in the truncated vector
    /// * `exact_count` - The exact total count of items (may be larger than limit)
    ///
    /// # Returns
    ///
    /// A new `TruncatedVec` containing up to `limit` items from the iterator
    pub fn new<I: Iterator<Item = T>>(list: I, limit: usize, exact_count: usize) -> Self {
        let items = list.take(limit).collect_vec();
        Self { exact_count, items }
    }

    /// Maps a function over the items in the truncated vector
    ///
    /// # Arguments
    ///
    /// * `f` - Function to apply to each item
    ///
    /// # Returns
    ///
    /// A new `TruncatedVec` with the function applied to each item
    pub fn map<F, U>(self, f: F) -> TruncatedVec<U>
    where
        F: Fn(T) -> U,
    {
        TruncatedVec {
            exact_count: self.exact_count,
            items: self.items.into_iter().map(f).collect_vec(),
        }
    }

    /// Returns the exact count of items
    pub fn exact_count(&self) -> usize {
        self.exact_count
    }

    /// Returns the truncated items
    pub fn items(&self) -> &[T] {
        &self.items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_vec_limits_items() {
        let scores = vec![("Ada", 500), ("Alan", 400), ("Grace", 300)];
        let truncated = TruncatedVec::new(scores.into_iter(), 2, 3);

        assert_eq!(truncated.exact_count(), 3);
        assert_eq!(truncated.items(), &[("Ada", 500), ("Alan", 400)]);
    }

    #[test]
    fn test_truncated_vec_limit_larger_than_items() {
        let truncated = TruncatedVec::new(vec![1, 2].into_iter(), 10, 2);

        assert_eq!(truncated.exact_count(), 2);
        assert_eq!(truncated.items(), &[1, 2]);
    }

    #[test]
    fn test_truncated_vec_map() {
        let truncated = TruncatedVec::new(vec![1u64, 2, 3].into_iter(), 2, 3);
        let mapped = truncated.map(|points| points * 10);

        assert_eq!(mapped.exact_count(), 3);
        assert_eq!(mapped.items(), &[10, 20]);
    }

    #[test]
    fn test_alarm_message_roundtrip() {
        let alarm: AlarmMessage = timer::AlarmMessage::Tick { epoch: 7 }.into();
        let json = serde_json::to_string(&alarm).unwrap();
        let parsed: AlarmMessage = serde_json::from_str(&json).unwrap();

        assert!(matches!(
            parsed,
            AlarmMessage::Timer(timer::AlarmMessage::Tick { epoch: 7 })
        ));
    }
}
