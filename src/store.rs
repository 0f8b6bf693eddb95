//! Session state and the action-dispatch store
//!
//! This module owns the single authoritative `Session` value for one
//! client. The only mutation surface is [`Store::dispatch`] with a typed
//! [`Action`]; every other component reads immutable snapshots through
//! [`Store::session`]. Actions apply atomically, in the order received,
//! on one logical thread, so no locking is needed by construction.

use std::{collections::HashMap, time::Duration};

use enum_map::EnumMap;
use garde::Validate;
use serde::{Deserialize, Serialize};
use web_time::SystemTime;

use crate::{
    achievements::AchievementId,
    constants,
    leaderboard::{BoardKind, Leaderboards, RankedEntry},
    powerups::{self, PowerUpKind},
    profile::{Id, Profile},
};

/// The mode a session is played in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GameMode {
    /// Relaxed play with no ranking consequences
    #[default]
    Casual,
    /// Competitive play counting toward the ranked boards
    Ranked,
    /// Bracketed tournament play
    Tournament,
}

/// The difficulty a quiz is played at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Difficulty {
    /// Generous scoring, easier questions
    Easy,
    /// The default difficulty
    #[default]
    Medium,
    /// Harder questions, higher base points
    Hard,
}

impl Difficulty {
    /// Base points a correct answer is worth at this difficulty
    pub fn base_points(self) -> u64 {
        match self {
            Self::Easy => constants::scoring::EASY_POINTS,
            Self::Medium => constants::scoring::MEDIUM_POINTS,
            Self::Hard => constants::scoring::HARD_POINTS,
        }
    }
}

/// A question as pushed by the server
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Question {
    /// Unique identifier assigned by the server
    #[garde(skip)]
    pub id: Id,
    /// The question text shown to the player
    #[garde(length(max = constants::question::MAX_TEXT_LENGTH))]
    pub text: String,
    /// The answer options, in presentation order
    #[garde(
        length(min = constants::question::MIN_OPTION_COUNT, max = constants::question::MAX_OPTION_COUNT),
        inner(length(max = constants::question::MAX_OPTION_LENGTH))
    )]
    pub options: Vec<String>,
    /// Index of the correct option
    #[garde(skip)]
    pub correct: usize,
}

impl Question {
    /// Checks that the correct index refers to an existing option
    ///
    /// Garde covers field-local bounds; this covers the cross-field
    /// requirement a malformed server frame could violate.
    pub fn has_valid_answer(&self) -> bool {
        self.correct < self.options.len()
    }
}

/// A pending head-to-head challenge from another player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Unique identifier assigned by the server
    pub id: Id,
    /// Username of the challenging player
    pub from: String,
}

/// The classification of a real-time feed entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKind {
    /// Connection and session lifecycle notices
    #[default]
    System,
    /// Achievement unlock announcements
    Achievement,
    /// Incoming challenges
    Challenge,
    /// Presence and other social notices
    Social,
}

/// An action the player can take directly from a feed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventAction {
    /// Accept the referenced challenge
    AcceptChallenge {
        /// Identifier of the challenge to accept
        challenge_id: Id,
    },
}

/// One entry of the bounded real-time event feed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// The classification of this entry
    pub kind: EventKind,
    /// Human-readable message
    pub message: String,
    /// When the entry was appended
    pub timestamp: SystemTime,
    /// Optional action the player can take from the entry
    pub action: Option<EventAction>,
}

impl Event {
    /// Creates a feed entry of the given kind with no attached action
    pub fn new(kind: EventKind, message: String) -> Self {
        Self {
            kind,
            message,
            timestamp: SystemTime::now(),
            action: None,
        }
    }

    /// Creates a system notice
    pub fn system(message: String) -> Self {
        Self::new(EventKind::System, message)
    }

    /// Creates a challenge entry carrying an accept action
    pub fn challenge(message: String, challenge_id: Id) -> Self {
        Self {
            kind: EventKind::Challenge,
            message,
            timestamp: SystemTime::now(),
            action: Some(EventAction::AcceptChallenge { challenge_id }),
        }
    }
}

/// The quiz-progress portion of the session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizState {
    /// The question currently presented, if any
    pub current_question: Option<Question>,
    /// Every question presented this quiz, oldest first
    pub questions: Vec<Question>,
    /// Points earned this quiz
    pub score: u64,
    /// Consecutive correct answers; resets to 0 on a miss
    pub streak: u32,
    /// Seconds left to answer the current question
    pub time_remaining: u32,
    /// Category of the running quiz, if one was chosen
    pub category: Option<String>,
    /// Difficulty of the running quiz
    pub difficulty: Difficulty,
    /// Whether the current question already has a submitted answer
    ///
    /// Set before the countdown is cancelled so a stale tick can never
    /// fire a time-up for an answered question.
    pub answer_submitted: bool,
    /// Option indices removed by a fifty-fifty, cleared on a new question
    pub eliminated_options: Vec<usize>,
    /// Remaining uses per power-up kind
    pub power_ups: EnumMap<PowerUpKind, u32>,
}

impl Default for QuizState {
    /// A fresh quiz state with full power-up grants and no question
    fn default() -> Self {
        Self {
            current_question: None,
            questions: Vec::new(),
            score: 0,
            streak: 0,
            time_remaining: 0,
            category: None,
            difficulty: Difficulty::default(),
            answer_submitted: false,
            eliminated_options: Vec::new(),
            power_ups: powerups::initial_counters(),
        }
    }
}

/// The achievement portion of the session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AchievementState {
    /// Ids unlocked so far, in unlock order; each appears at most once
    pub unlocked: Vec<AchievementId>,
    /// Progress per achievement, 0-100
    pub progress: HashMap<AchievementId, u8>,
    /// The most recent unlock, shown as a transient banner
    pub recent_unlock: Option<AchievementId>,
}

impl AchievementState {
    /// Whether the given achievement has already been unlocked
    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.unlocked.contains(&id)
    }
}

/// The social portion of the session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SocialState {
    /// Usernames currently online, as last pushed by the server
    pub online_players: Vec<String>,
    /// Challenges received and not yet accepted
    pub pending_challenges: Vec<Challenge>,
}

/// Aggregate statistics for the session
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Statistics {
    /// Questions concluded, by answer or by timeout
    pub questions_answered: u32,
    /// Questions answered correctly
    pub correct_answers: u32,
    /// Questions answered before the countdown expired
    pub timed_answers: u32,
    /// Total time spent on in-time answers
    pub total_answer_time: Duration,
    /// Highest streak reached this session
    pub best_streak: u32,
    /// Power-ups consumed this session
    pub power_ups_used: u32,
    /// Challenges accepted this session
    pub challenges_accepted: u32,
}

impl Statistics {
    /// Average time per in-time answer
    ///
    /// Timeouts count a question as answered but never contribute here.
    pub fn average_time(&self) -> Option<Duration> {
        if self.timed_answers == 0 {
            None
        } else {
            Some(self.total_answer_time / self.timed_answers)
        }
    }
}

/// The complete session state for one client
///
/// A single instance lives inside the [`Store`] for the lifetime of one
/// session controller; there is no persistence for this variant.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Session {
    /// The registered player, if any
    pub user: Option<Profile>,
    /// Quiz progress
    pub quiz: QuizState,
    /// Server-ranked leaderboards
    pub leaderboard: Leaderboards,
    /// Bounded FIFO feed of real-time events
    pub real_time_events: Vec<Event>,
    /// Achievement progress and unlocks
    pub achievements: AchievementState,
    /// The mode this session is played in
    pub game_mode: GameMode,
    /// Presence and challenges
    pub social: SocialState,
    /// Aggregate statistics
    pub statistics: Statistics,
}

/// The typed mutations the store accepts
///
/// Each variant carries its full payload and touches only the state its
/// meaning covers, leaving sibling fields untouched.
#[derive(Debug, Clone)]
pub enum Action {
    /// Replaces the registered profile
    RegisterProfile(Profile),
    /// Sets the session's game mode
    SetGameMode(GameMode),
    /// Resets quiz progress for a fresh quiz
    BeginQuiz {
        /// Category chosen for the quiz
        category: Option<String>,
        /// Difficulty chosen for the quiz
        difficulty: Difficulty,
    },
    /// Presents a new current question and rearms the countdown state
    PresentQuestion(Question),
    /// Decrements the countdown by one second
    CountdownTick,
    /// Records a submitted answer and its scoring outcome
    RecordAnswer {
        /// Whether the selected option was correct
        correct: bool,
        /// Points awarded for the answer
        points: u64,
        /// Time the player took to answer
        time_spent: Duration,
    },
    /// Concludes the current question as timed out
    QuestionTimedOut,
    /// Records the options a fifty-fifty removed
    EliminateOptions(Vec<usize>),
    /// Decrements one power-up counter
    ConsumePowerUp(PowerUpKind),
    /// Replaces one named leaderboard
    ReplaceBoard {
        /// Which board to replace
        board: BoardKind,
        /// The new contents
        entries: Vec<RankedEntry>,
    },
    /// Appends an entry to the bounded event feed
    PushEvent(Event),
    /// Replaces the online-player list
    SetOnlinePlayers(Vec<String>),
    /// Records a received challenge
    PushChallenge(Challenge),
    /// Removes a challenge, marking it accepted
    AcceptChallenge(Id),
    /// Unlocks an achievement and raises the banner
    UnlockAchievement(AchievementId),
    /// Clears the unlock banner if it still shows the given id
    ClearRecentUnlock(AchievementId),
}

/// The single owner of the session state
///
/// All mutation goes through [`Store::dispatch`]; all reads go through
/// [`Store::session`]. No other component holds a mutable reference.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Store {
    /// The authoritative session state
    session: Session,
}

impl Store {
    /// Creates a store for a fresh session in the given mode
    pub fn new(game_mode: GameMode) -> Self {
        Self {
            session: Session {
                game_mode,
                ..Session::default()
            },
        }
    }

    /// Returns an immutable snapshot of the current session state
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Applies one action to the session state
    ///
    /// Actions apply atomically and in the order received. Unknown or
    /// stale payloads (for example clearing a banner that has moved on)
    /// leave the state untouched.
    pub fn dispatch(&mut self, action: Action) {
        let session = &mut self.session;
        match action {
            Action::RegisterProfile(profile) => {
                session.user = Some(profile);
            }
            Action::SetGameMode(game_mode) => {
                session.game_mode = game_mode;
            }
            Action::BeginQuiz {
                category,
                difficulty,
            } => {
                // Power-up grants are per session, not per quiz.
                let power_ups = session.quiz.power_ups.clone();
                session.quiz = QuizState {
                    category,
                    difficulty,
                    power_ups,
                    ..QuizState::default()
                };
            }
            Action::PresentQuestion(question) => {
                let quiz = &mut session.quiz;
                quiz.answer_submitted = false;
                quiz.eliminated_options.clear();
                quiz.time_remaining = constants::question::TIME_LIMIT_SECONDS;
                quiz.questions.push(question.clone());
                quiz.current_question = Some(question);
            }
            Action::CountdownTick => {
                session.quiz.time_remaining = session.quiz.time_remaining.saturating_sub(1);
            }
            Action::RecordAnswer {
                correct,
                points,
                time_spent,
            } => {
                let quiz = &mut session.quiz;
                quiz.answer_submitted = true;
                if correct {
                    quiz.score += points;
                    quiz.streak += 1;
                } else {
                    quiz.streak = 0;
                }

                let stats = &mut session.statistics;
                stats.questions_answered += 1;
                stats.timed_answers += 1;
                stats.total_answer_time += time_spent;
                if correct {
                    stats.correct_answers += 1;
                }
                stats.best_streak = stats.best_streak.max(session.quiz.streak);

                if correct {
                    if let Some(user) = &mut session.user {
                        user.gain_xp(points);
                    }
                }
            }
            Action::QuestionTimedOut => {
                session.quiz.answer_submitted = true;
                session.quiz.streak = 0;
                session.statistics.questions_answered += 1;
            }
            Action::EliminateOptions(mut indices) => {
                session.quiz.eliminated_options.append(&mut indices);
            }
            Action::ConsumePowerUp(kind) => {
                let counter = &mut session.quiz.power_ups[kind];
                *counter = counter.saturating_sub(1);
                session.statistics.power_ups_used += 1;
            }
            Action::ReplaceBoard { board, entries } => {
                session.leaderboard.replace(board, entries);
            }
            Action::PushEvent(event) => {
                session.real_time_events.push(event);
                let overflow = session
                    .real_time_events
                    .len()
                    .saturating_sub(constants::feed::MAX_EVENTS);
                if overflow > 0 {
                    session.real_time_events.drain(..overflow);
                }
            }
            Action::SetOnlinePlayers(players) => {
                session.social.online_players = players;
            }
            Action::PushChallenge(challenge) => {
                session.social.pending_challenges.push(challenge);
            }
            Action::AcceptChallenge(id) => {
                let pending = &mut session.social.pending_challenges;
                let before = pending.len();
                pending.retain(|challenge| challenge.id != id);
                if pending.len() < before {
                    session.statistics.challenges_accepted += 1;
                }
            }
            Action::UnlockAchievement(id) => {
                if !session.achievements.is_unlocked(id) {
                    session.achievements.unlocked.push(id);
                    session
                        .achievements
                        .progress
                        .insert(id, constants::achievements::PROGRESS_COMPLETE);
                    session.achievements.recent_unlock = Some(id);
                }
            }
            Action::ClearRecentUnlock(id) => {
                if session.achievements.recent_unlock == Some(id) {
                    session.achievements.recent_unlock = None;
                }
            }
        }
    }
}
