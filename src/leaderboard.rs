//! Leaderboard snapshots and local score tracking
//!
//! This module holds the three server-ranked boards the session displays
//! (daily, weekly, all-time) and the local scoreboard used by the
//! single-player flow: cumulative points per user with a top-ten view.
//! Ranked boards are replaced wholesale by server pushes; the local
//! scoreboard is the only place the client aggregates scores itself.

use std::collections::HashMap;

use enum_map::{Enum, EnumMap};
use itertools::Itertools;
use once_cell_serde::sync::OnceCell;
use serde::{Deserialize, Serialize};
use web_time::SystemTime;

use super::TruncatedVec;

/// The named leaderboards a session tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Enum, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoardKind {
    /// Standings over the current day
    Daily,
    /// Standings over the current week
    Weekly,
    /// Standings since the beginning of time
    AllTime,
}

/// One row of a ranked leaderboard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Display name of the ranked player
    pub username: String,
    /// Points the player holds on this board
    pub points: u64,
}

/// The session's view of the server-ranked boards
///
/// Each board is an ordered list as the server last pushed it; the client
/// never re-sorts or merges, it only replaces the named list.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Leaderboards {
    /// Board contents keyed by kind
    boards: EnumMap<BoardKind, Vec<RankedEntry>>,
}

impl Leaderboards {
    /// Replaces the contents of one named board
    pub fn replace(&mut self, kind: BoardKind, entries: Vec<RankedEntry>) {
        self.boards[kind] = entries;
    }

    /// Returns the current contents of one named board
    pub fn board(&self, kind: BoardKind) -> &[RankedEntry] {
        &self.boards[kind]
    }
}

/// The outcome of one finished quiz, as recorded locally
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizResult {
    /// Category the quiz was played in
    pub category: Option<String>,
    /// Points earned in the quiz
    pub score: u64,
    /// Number of questions the quiz contained
    pub total_questions: usize,
    /// When the quiz finished
    pub timestamp: SystemTime,
}

/// Serialization helper for the local scoreboard
#[derive(Deserialize)]
struct LocalScoreboardSerde {
    records: HashMap<String, LocalRecord>,
}

/// Per-user record in the local scoreboard
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
struct LocalRecord {
    /// Cumulative points across all recorded quizzes
    total_points: u64,
    /// Every recorded quiz outcome, oldest first
    history: Vec<QuizResult>,
}

/// Local cumulative scoring for the single-player flow
///
/// Progress is recorded per username and the top standings are served by
/// cumulative points in descending order. Standings are cached until the
/// next write.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(from = "LocalScoreboardSerde")]
pub struct LocalScoreboard {
    /// Records keyed by username
    records: HashMap<String, LocalRecord>,

    /// Cached standings in descending point order (not serialized)
    #[serde(skip)]
    standings: OnceCell<Vec<(String, u64)>>,
}

impl From<LocalScoreboardSerde> for LocalScoreboard {
    /// Reconstructs the scoreboard from serialized data
    ///
    /// The standings cache is rebuilt lazily on the next read.
    fn from(serde: LocalScoreboardSerde) -> Self {
        Self {
            records: serde.records,
            standings: OnceCell::new(),
        }
    }
}

impl LocalScoreboard {
    /// Records a finished quiz for a user
    ///
    /// Creates the user's record on first write and accumulates points on
    /// every subsequent one. Invalidates the cached standings.
    ///
    /// # Arguments
    ///
    /// * `username` - The user the result belongs to
    /// * `result` - The finished quiz outcome
    pub fn save_progress(&mut self, username: &str, result: QuizResult) {
        let record = self.records.entry(username.to_owned()).or_default();
        record.total_points += result.score;
        record.history.push(result);

        self.standings.take();
    }

    /// Returns the number of recorded quizzes for a user
    pub fn quizzes_played(&self, username: &str) -> usize {
        self.records
            .get(username)
            .map_or(0, |record| record.history.len())
    }

    /// Returns the top standings by cumulative points, descending
    ///
    /// # Arguments
    ///
    /// * `limit` - Maximum number of entries to include
    ///
    /// # Returns
    ///
    /// A `TruncatedVec` of `(username, points)` pairs preserving the exact
    /// number of ranked users.
    pub fn top(&self, limit: usize) -> TruncatedVec<(String, u64)> {
        let standings = self.standings.get_or_init(|| {
            self.records
                .iter()
                .map(|(username, record)| (username.clone(), record.total_points))
                .sorted_by_key(|(_, points)| *points)
                .rev()
                .collect_vec()
        });

        TruncatedVec::new(standings.iter().cloned(), limit, standings.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(score: u64) -> QuizResult {
        QuizResult {
            category: Some("standards".to_owned()),
            score,
            total_questions: 3,
            timestamp: SystemTime::now(),
        }
    }

    #[test]
    fn test_boards_replace() {
        let mut leaderboards = Leaderboards::default();
        assert!(leaderboards.board(BoardKind::Daily).is_empty());

        leaderboards.replace(
            BoardKind::Daily,
            vec![RankedEntry {
                username: "Ada".to_owned(),
                points: 1200,
            }],
        );
        assert_eq!(leaderboards.board(BoardKind::Daily).len(), 1);
        assert!(leaderboards.board(BoardKind::Weekly).is_empty());

        leaderboards.replace(BoardKind::Daily, vec![]);
        assert!(leaderboards.board(BoardKind::Daily).is_empty());
    }

    #[test]
    fn test_board_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&BoardKind::AllTime).unwrap(),
            "\"allTime\""
        );
        assert_eq!(
            serde_json::from_str::<BoardKind>("\"weekly\"").unwrap(),
            BoardKind::Weekly
        );
    }

    #[test]
    fn test_save_progress_accumulates() {
        let mut scoreboard = LocalScoreboard::default();
        scoreboard.save_progress("Ada", result(100));
        scoreboard.save_progress("Ada", result(250));

        let top = scoreboard.top(10);
        assert_eq!(top.exact_count(), 1);
        assert_eq!(top.items(), &[("Ada".to_owned(), 350)]);
        assert_eq!(scoreboard.quizzes_played("Ada"), 2);
    }

    #[test]
    fn test_top_sorted_descending_and_limited() {
        let mut scoreboard = LocalScoreboard::default();
        for (index, name) in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"]
            .iter()
            .enumerate()
        {
            scoreboard.save_progress(name, result(index as u64 * 10));
        }

        let top = scoreboard.top(10);
        assert_eq!(top.exact_count(), 12);
        assert_eq!(top.items().len(), 10);
        assert_eq!(top.items()[0], ("l".to_owned(), 110));
        assert!(
            top.items()
                .windows(2)
                .all(|pair| pair[0].1 >= pair[1].1)
        );
    }

    #[test]
    fn test_top_cache_invalidated_on_write() {
        let mut scoreboard = LocalScoreboard::default();
        scoreboard.save_progress("Ada", result(100));
        assert_eq!(scoreboard.top(10).items()[0].1, 100);

        scoreboard.save_progress("Ada", result(50));
        assert_eq!(scoreboard.top(10).items()[0].1, 150);
    }
}
