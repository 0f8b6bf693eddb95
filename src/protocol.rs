//! Wire protocol for the quiz server connection
//!
//! Frames are whole-message JSON, externally tagged with a `type` field
//! in SCREAMING_SNAKE_CASE and camelCase payload fields. Outbound
//! commands are fire-and-forget: no acknowledgement or retry is modeled,
//! the server is trusted to be idempotent or the client view eventually
//! consistent. Inbound frames that fail to decode surface a typed error
//! which the session controller drops after logging; a well-formed frame
//! of an unknown kind decodes to an error the same way and is dropped
//! silently, state untouched.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    leaderboard::{BoardKind, RankedEntry},
    profile::{Id, Profile},
    store::{Challenge, Difficulty, EventKind, GameMode, Question},
};

/// Errors decoding an inbound frame
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The frame was not valid JSON or not a known message shape
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// A server-announced event carried inside a `GLOBAL_EVENT` frame
///
/// The client stamps its own receipt time when appending to the feed, so
/// the wire shape carries no timestamp.
#[derive(Debug, Clone, Deserialize)]
pub struct WireEvent {
    /// The classification of the event; defaults to a system notice
    #[serde(default)]
    pub kind: EventKind,
    /// Human-readable message
    pub message: String,
}

/// Messages pushed by the server
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum ServerMessage {
    /// Replaces one named leaderboard
    LeaderboardUpdate {
        /// Which board the update replaces
        board: BoardKind,
        /// The new board contents
        leaderboard: Vec<RankedEntry>,
    },
    /// Presents a new question
    NewQuestion {
        /// The question to present
        question: Question,
    },
    /// Announces a global happening for the event feed
    GlobalEvent {
        /// The announced event
        event: WireEvent,
    },
    /// Updates the online-player list
    PlayerJoin {
        /// Usernames currently online
        online_players: Vec<String>,
    },
    /// Delivers a head-to-head challenge
    ChallengeReceived {
        /// The challenge received
        challenge: Challenge,
    },
}

impl ServerMessage {
    /// Decodes one inbound JSON frame
    ///
    /// # Errors
    ///
    /// Returns a [`ProtocolError`] if the text is not valid JSON or not a
    /// known message kind.
    pub fn from_message(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

/// Commands sent to the server
#[serde_with::serde_as]
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE", rename_all_fields = "camelCase")]
pub enum ClientMessage {
    /// Registers the player's profile
    UserRegister {
        /// The freshly created profile
        user: Profile,
    },
    /// Requests a quiz in the given mode and difficulty
    StartQuiz {
        /// The registered player
        user_id: Id,
        /// The mode to play in
        game_mode: GameMode,
        /// The difficulty to play at
        difficulty: Difficulty,
    },
    /// Submits the player's answer for scoring
    AnswerSubmit {
        /// The registered player
        user_id: Id,
        /// The question being answered
        question_id: Id,
        /// Index of the chosen option
        selected_option: usize,
        /// Time the player took to answer
        #[serde_as(as = "serde_with::DurationSeconds<u64>")]
        time_spent: Duration,
        /// The mode the answer was played in
        game_mode: GameMode,
    },
    /// Asks the server to replace the current question
    SkipQuestion {
        /// The registered player
        user_id: Id,
    },
    /// Accepts a received challenge
    AcceptChallenge {
        /// The registered player
        user_id: Id,
        /// The challenge being accepted
        challenge_id: Id,
    },
    /// Reports that the countdown expired without an answer
    TimeUp {
        /// The registered player
        user_id: Id,
        /// The question that timed out
        question_id: Id,
    },
}

impl ClientMessage {
    /// Converts the command to a JSON string for transmission
    ///
    /// # Panics
    ///
    /// This method panics if serialization fails, which should never happen
    /// with the default JSON serializer for well-formed data.
    pub fn to_message(&self) -> String {
        serde_json::to_string(self).expect("default serializer cannot fail")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_quiz_wire_shape() {
        let message = ClientMessage::StartQuiz {
            user_id: Id::new(),
            game_mode: GameMode::Ranked,
            difficulty: Difficulty::Hard,
        };
        let json = message.to_message();

        assert!(json.contains("\"type\":\"START_QUIZ\""));
        assert!(json.contains("\"gameMode\":\"ranked\""));
        assert!(json.contains("\"difficulty\":\"hard\""));
        assert!(json.contains("\"userId\""));
    }

    #[test]
    fn test_answer_submit_time_in_seconds() {
        let message = ClientMessage::AnswerSubmit {
            user_id: Id::new(),
            question_id: Id::new(),
            selected_option: 2,
            time_spent: Duration::from_secs(12),
            game_mode: GameMode::Casual,
        };
        let json = message.to_message();

        assert!(json.contains("\"type\":\"ANSWER_SUBMIT\""));
        assert!(json.contains("\"selectedOption\":2"));
        assert!(json.contains("\"timeSpent\":12"));
    }

    #[test]
    fn test_time_up_wire_shape() {
        let message = ClientMessage::TimeUp {
            user_id: Id::new(),
            question_id: Id::new(),
        };
        let json = message.to_message();

        assert!(json.contains("\"type\":\"TIME_UP\""));
        assert!(json.contains("\"questionId\""));
    }

    #[test]
    fn test_decode_leaderboard_update() {
        let frame = r#"{
            "type": "LEADERBOARD_UPDATE",
            "board": "weekly",
            "leaderboard": [{"username": "Ada", "points": 4200}]
        }"#;

        let message = ServerMessage::from_message(frame).unwrap();
        let ServerMessage::LeaderboardUpdate { board, leaderboard } = message else {
            panic!("wrong kind");
        };
        assert_eq!(board, BoardKind::Weekly);
        assert_eq!(leaderboard[0].username, "Ada");
        assert_eq!(leaderboard[0].points, 4200);
    }

    #[test]
    fn test_decode_new_question() {
        let frame = format!(
            r#"{{
                "type": "NEW_QUESTION",
                "question": {{
                    "id": "{}",
                    "text": "When was BIS established?",
                    "options": ["1947", "1986", "1952", "1991"],
                    "correct": 1
                }}
            }}"#,
            Id::new()
        );

        let message = ServerMessage::from_message(&frame).unwrap();
        let ServerMessage::NewQuestion { question } = message else {
            panic!("wrong kind");
        };
        assert_eq!(question.options.len(), 4);
        assert_eq!(question.correct, 1);
        assert!(question.has_valid_answer());
    }

    #[test]
    fn test_decode_global_event_defaults_to_system() {
        let frame = r#"{"type": "GLOBAL_EVENT", "event": {"message": "Double XP weekend!"}}"#;

        let message = ServerMessage::from_message(frame).unwrap();
        let ServerMessage::GlobalEvent { event } = message else {
            panic!("wrong kind");
        };
        assert_eq!(event.kind, EventKind::System);
        assert_eq!(event.message, "Double XP weekend!");
    }

    #[test]
    fn test_decode_player_join() {
        let frame = r#"{"type": "PLAYER_JOIN", "onlinePlayers": ["Ada", "Alan"]}"#;

        let message = ServerMessage::from_message(frame).unwrap();
        let ServerMessage::PlayerJoin { online_players } = message else {
            panic!("wrong kind");
        };
        assert_eq!(online_players, vec!["Ada", "Alan"]);
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let frame = r#"{"type": "SERVER_GOSSIP", "payload": {}}"#;
        assert!(ServerMessage::from_message(frame).is_err());
    }

    #[test]
    fn test_decode_rejects_invalid_json() {
        assert!(ServerMessage::from_message("not json at all").is_err());
        assert!(ServerMessage::from_message("").is_err());
    }
}
