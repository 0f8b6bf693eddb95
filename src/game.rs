//! Session controller and event coordination
//!
//! This module contains the main [`Game`] struct coordinating one live
//! quiz session: it owns the state store, the question countdown, and the
//! connection lifecycle, translates inbound server messages into typed
//! actions, runs the achievement evaluator after state changes, and
//! issues outbound commands through the uplink.
//!
//! All entry points take the embedding runtime's scheduling callback and
//! uplink finder, in the same shape on every method: the controller never
//! owns a socket or a clock.

use std::time::Duration;

use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::{
    AlarmMessage, achievements,
    connection::{ConnectionManager, Status},
    constants,
    names::{self, NameStyle},
    powerups::{self, PowerUpKind},
    profile::{Id, Profile},
    protocol::{ClientMessage, ProtocolError, ServerMessage},
    store::{Action, Difficulty, Event, EventKind, GameMode, Session, Store},
    timer::{self, QuestionTimer},
    uplink::Uplink,
};

/// Configuration options for a quiz session
///
/// These options are fixed for the lifetime of one [`Game`].
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, Validate)]
pub struct Options {
    /// The mode the session is played in
    #[garde(skip)]
    pub game_mode: GameMode,
    /// The difficulty quizzes are requested at
    #[garde(skip)]
    pub difficulty: Difficulty,
    /// Style for generated guest names (None means players must type one)
    #[garde(dive)]
    pub random_names: Option<NameStyle>,
}

/// The session controller for one live quiz client
///
/// Owns the authoritative state and the two pieces of cancellable or
/// recoverable machinery (countdown, connection). The embedding runtime
/// feeds it transport events, inbound frames, and fired alarms; the
/// controller feeds back outbound commands and newly scheduled alarms.
#[derive(Debug, Serialize, Deserialize)]
pub struct Game {
    /// Session configuration
    options: Options,
    /// The single owner of the session state
    store: Store,
    /// Countdown state machine for the current question
    timer: QuestionTimer,
    /// Connection lifecycle and reconnection policy
    connection: ConnectionManager,
}

impl Game {
    /// Creates a controller for a fresh session
    pub fn new(options: Options) -> Self {
        Self {
            options,
            store: Store::new(options.game_mode),
            timer: QuestionTimer::new(),
            connection: ConnectionManager::new(),
        }
    }

    /// Returns an immutable snapshot of the session state
    pub fn session(&self) -> &Session {
        self.store.session()
    }

    /// Returns the current countdown phase
    pub fn timer_phase(&self) -> timer::Phase {
        self.timer.phase()
    }

    /// Returns the current uplink status
    pub fn connection_status(&self) -> Status {
        self.connection.status()
    }

    /// Calculates the score for an answer based on how quickly it came
    ///
    /// Full points for an immediate answer, decreasing linearly to half
    /// points at the end of the time limit.
    ///
    /// # Arguments
    ///
    /// * `full_duration` - Total time allowed for answering
    /// * `taken_duration` - Time taken to submit the answer
    /// * `full_points_awarded` - Maximum points possible for the question
    ///
    /// # Returns
    ///
    /// The calculated score (between half and full points)
    fn calculate_score(
        full_duration: Duration,
        taken_duration: Duration,
        full_points_awarded: u64,
    ) -> u64 {
        (full_points_awarded as f64
            * (1. - (taken_duration.as_secs_f64() / full_duration.as_secs_f64() / 2.)))
            as u64
    }

    /// Runs the achievement rule table and applies any fresh unlocks
    ///
    /// Unlocks apply in table order; each raises the banner, posts a feed
    /// entry, and schedules the banner clear. Re-running on an unchanged
    /// snapshot is a no-op.
    fn evaluate_achievements<S: FnMut(AlarmMessage, Duration)>(&mut self, schedule_message: &mut S) {
        let fresh: Vec<_> = achievements::newly_satisfied(self.store.session())
            .into_iter()
            .map(|rule| (rule.id, rule.title))
            .collect();

        for (id, title) in fresh {
            self.store.dispatch(Action::UnlockAchievement(id));
            self.store.dispatch(Action::PushEvent(Event::new(
                EventKind::Achievement,
                format!("Achievement unlocked: {title}"),
            )));
            schedule_message(
                achievements::AlarmMessage::ClearRecentUnlock { id }.into(),
                Duration::from_secs(constants::achievements::BANNER_SECONDS),
            );
        }
    }

    // Transport lifecycle

    /// Records that the uplink opened
    ///
    /// Resets the reconnection backoff and posts a system feed notice.
    pub fn handle_open(&mut self) {
        self.connection.handle_open();
        self.store.dispatch(Action::PushEvent(Event::system(
            "Connected to the quiz network".to_owned(),
        )));
    }

    /// Records that the uplink closed and schedules the reconnection
    ///
    /// No user-visible error is surfaced beyond the connection module's
    /// log notice; the session keeps its state and waits.
    ///
    /// # Arguments
    ///
    /// * `schedule_message` - Function to schedule the reconnection alarm
    pub fn handle_closed<S: FnMut(AlarmMessage, Duration)>(&mut self, schedule_message: S) {
        self.connection.handle_closed(schedule_message);
    }

    /// Records a transport error
    ///
    /// The live uplink, if any, is forcibly closed, which takes the same
    /// recovery path as a plain close.
    ///
    /// # Arguments
    ///
    /// * `schedule_message` - Function to schedule the reconnection alarm
    /// * `uplink_finder` - Function returning the current live uplink
    pub fn handle_error<U: Uplink, F: Fn() -> Option<U>, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        schedule_message: S,
        uplink_finder: F,
    ) {
        if let Some(uplink) = uplink_finder() {
            uplink.close();
        }
        self.handle_closed(schedule_message);
    }

    // Inbound

    /// Decodes and processes one inbound text frame
    ///
    /// Malformed frames are dropped with a debug log and leave the state
    /// untouched.
    ///
    /// # Arguments
    ///
    /// * `text` - The raw frame as received
    /// * `schedule_message` - Function to schedule alarm messages
    pub fn receive_frame<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        text: &str,
        schedule_message: S,
    ) {
        match ServerMessage::from_message(text) {
            Ok(message) => self.receive_message(message, schedule_message),
            Err(ProtocolError::Malformed(error)) => {
                tracing::debug!(%error, "dropping malformed frame");
            }
        }
    }

    /// Processes one decoded server message
    ///
    /// # Arguments
    ///
    /// * `message` - The inbound message to process
    /// * `schedule_message` - Function to schedule alarm messages
    pub fn receive_message<S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: ServerMessage,
        mut schedule_message: S,
    ) {
        match message {
            ServerMessage::LeaderboardUpdate { board, leaderboard } => {
                self.store.dispatch(Action::ReplaceBoard {
                    board,
                    entries: leaderboard,
                });
            }
            ServerMessage::NewQuestion { question } => {
                if question.validate().is_err() || !question.has_valid_answer() {
                    tracing::debug!("dropping malformed question");
                    return;
                }

                // Arming the countdown bumps the epoch, which is what
                // cancels the previous question's tick chain.
                self.store.dispatch(Action::PresentQuestion(question));
                let epoch = self.timer.start();
                schedule_message(
                    timer::AlarmMessage::Tick { epoch }.into(),
                    Duration::from_secs(constants::question::TICK_INTERVAL_SECONDS),
                );
            }
            ServerMessage::GlobalEvent { event } => {
                self.store
                    .dispatch(Action::PushEvent(Event::new(event.kind, event.message)));
            }
            ServerMessage::PlayerJoin { online_players } => {
                let notice = format!(
                    "{} online",
                    pluralizer::pluralize("player", online_players.len() as isize, true)
                );
                self.store
                    .dispatch(Action::SetOnlinePlayers(online_players));
                self.store
                    .dispatch(Action::PushEvent(Event::new(EventKind::Social, notice)));
            }
            ServerMessage::ChallengeReceived { challenge } => {
                let notice = format!("{} challenged you!", challenge.from);
                let challenge_id = challenge.id;
                self.store.dispatch(Action::PushChallenge(challenge));
                self.store
                    .dispatch(Action::PushEvent(Event::challenge(notice, challenge_id)));
            }
        }

        self.evaluate_achievements(&mut schedule_message);
    }

    // Alarms

    /// Processes a fired alarm message
    ///
    /// # Arguments
    ///
    /// * `message` - The alarm that fired
    /// * `schedule_message` - Function to schedule follow-up alarms
    /// * `uplink_finder` - Function returning the current live uplink
    ///
    /// # Returns
    ///
    /// `true` if the embedding runtime should dial a new connection now;
    /// `false` otherwise.
    pub fn receive_alarm<U: Uplink, F: Fn() -> Option<U>, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        message: AlarmMessage,
        mut schedule_message: S,
        uplink_finder: F,
    ) -> bool {
        match message {
            AlarmMessage::Timer(timer::AlarmMessage::Tick { epoch }) => {
                if !self.timer.accepts(epoch) || !self.timer.is_running() {
                    return false;
                }
                // The answered guard is set before the countdown is
                // cancelled, so even a tick that slipped past the epoch
                // check cannot conclude an answered question twice.
                if self.store.session().quiz.answer_submitted {
                    return false;
                }

                self.store.dispatch(Action::CountdownTick);

                if self.store.session().quiz.time_remaining == 0 {
                    self.conclude_timed_out(&mut schedule_message, uplink_finder);
                } else {
                    schedule_message(
                        timer::AlarmMessage::Tick { epoch }.into(),
                        Duration::from_secs(constants::question::TICK_INTERVAL_SECONDS),
                    );
                }
            }
            AlarmMessage::Timer(timer::AlarmMessage::Resume { epoch }) => {
                if self.timer.resume(epoch) {
                    schedule_message(
                        timer::AlarmMessage::Tick { epoch }.into(),
                        Duration::from_secs(constants::question::TICK_INTERVAL_SECONDS),
                    );
                }
            }
            AlarmMessage::Achievements(achievements::AlarmMessage::ClearRecentUnlock { id }) => {
                self.store.dispatch(Action::ClearRecentUnlock(id));
            }
            AlarmMessage::Connection(alarm) => {
                return self.connection.receive_alarm(alarm);
            }
        }

        false
    }

    /// Concludes the current question as timed out
    ///
    /// Emits the time-up command, counts the question as answered for
    /// statistics, and resets the streak. The average answer time is
    /// deliberately not touched.
    fn conclude_timed_out<U: Uplink, F: Fn() -> Option<U>, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        schedule_message: &mut S,
        uplink_finder: F,
    ) {
        self.timer.expire();

        let question_id = self
            .store
            .session()
            .quiz
            .current_question
            .as_ref()
            .map(|question| question.id);
        let user_id = self.store.session().user.as_ref().map(|user| user.id);

        self.store.dispatch(Action::QuestionTimedOut);

        if let (Some(user_id), Some(question_id)) = (user_id, question_id) {
            self.send(
                &ClientMessage::TimeUp {
                    user_id,
                    question_id,
                },
                &uplink_finder,
            );
        }

        self.evaluate_achievements(schedule_message);
    }

    // Player intents

    /// Registers the player, replacing any earlier profile
    ///
    /// With a username, the name is validated and cleaned; without one, a
    /// guest name is generated in the configured style. The new profile
    /// is announced to the server.
    ///
    /// # Arguments
    ///
    /// * `username` - The typed username, or `None` for a guest name
    /// * `uplink_finder` - Function returning the current live uplink
    ///
    /// # Returns
    ///
    /// The id of the freshly created profile.
    ///
    /// # Errors
    ///
    /// Returns a [`names::Error`] if the typed username is rejected.
    pub fn register_user<U: Uplink, F: Fn() -> Option<U>>(
        &mut self,
        username: Option<&str>,
        uplink_finder: F,
    ) -> Result<Id, names::Error> {
        let name = match username {
            Some(typed) => names::clean(typed)?,
            None => self.options.random_names.unwrap_or_default().get_name(),
        };

        let profile = Profile::new(name);
        let id = profile.id;

        self.send(
            &ClientMessage::UserRegister {
                user: profile.clone(),
            },
            &uplink_finder,
        );
        self.store.dispatch(Action::RegisterProfile(profile));

        Ok(id)
    }

    /// Requests a quiz in the configured mode and difficulty
    ///
    /// Resets quiz progress (keeping power-up counters) and announces the
    /// request; questions then arrive as server pushes.
    ///
    /// # Arguments
    ///
    /// * `category` - Category to play, if the player chose one
    /// * `uplink_finder` - Function returning the current live uplink
    ///
    /// # Returns
    ///
    /// `false` if no player is registered yet.
    pub fn start_quiz<U: Uplink, F: Fn() -> Option<U>>(
        &mut self,
        category: Option<String>,
        uplink_finder: F,
    ) -> bool {
        let Some(user_id) = self.store.session().user.as_ref().map(|user| user.id) else {
            return false;
        };

        self.store.dispatch(Action::BeginQuiz {
            category,
            difficulty: self.options.difficulty,
        });
        self.send(
            &ClientMessage::StartQuiz {
                user_id,
                game_mode: self.options.game_mode,
                difficulty: self.options.difficulty,
            },
            &uplink_finder,
        );

        true
    }

    /// Submits the player's answer for the current question
    ///
    /// Scores the answer locally (the question payload carries the
    /// correct index), cancels the countdown, and announces the answer.
    /// The answered guard is dispatched before the countdown is
    /// cancelled, closing the race with an in-flight tick.
    ///
    /// # Arguments
    ///
    /// * `selected` - Index of the chosen option
    /// * `schedule_message` - Function to schedule alarm messages
    /// * `uplink_finder` - Function returning the current live uplink
    ///
    /// # Returns
    ///
    /// `false` if there is no answerable question, the option does not
    /// exist or was eliminated, or no player is registered.
    pub fn submit_answer<U: Uplink, F: Fn() -> Option<U>, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        selected: usize,
        mut schedule_message: S,
        uplink_finder: F,
    ) -> bool {
        let session = self.store.session();
        let Some(user_id) = session.user.as_ref().map(|user| user.id) else {
            return false;
        };
        let quiz = &session.quiz;
        let Some(question) = &quiz.current_question else {
            return false;
        };
        if quiz.answer_submitted
            || selected >= question.options.len()
            || quiz.eliminated_options.contains(&selected)
        {
            return false;
        }

        let question_id = question.id;
        let correct = selected == question.correct;
        let full_duration = Duration::from_secs(constants::question::TIME_LIMIT_SECONDS.into());
        let time_spent = Duration::from_secs(
            (constants::question::TIME_LIMIT_SECONDS - quiz.time_remaining).into(),
        );
        let points = if correct {
            Self::calculate_score(
                full_duration,
                time_spent,
                quiz.difficulty.base_points(),
            )
        } else {
            0
        };

        // Guard first, then cancel: a tick delivered between these two
        // steps sees the submitted answer and stands down.
        self.store.dispatch(Action::RecordAnswer {
            correct,
            points,
            time_spent,
        });
        self.timer.cancel();

        self.send(
            &ClientMessage::AnswerSubmit {
                user_id,
                question_id,
                selected_option: selected,
                time_spent,
                game_mode: self.options.game_mode,
            },
            &uplink_finder,
        );

        self.evaluate_achievements(&mut schedule_message);

        true
    }

    /// Uses one power-up of the given kind
    ///
    /// A kind whose counter is zero, or whose effect cannot apply right
    /// now, is a silent no-op; otherwise the counter decrements by
    /// exactly one and the effect fires.
    ///
    /// # Arguments
    ///
    /// * `kind` - The power-up to use
    /// * `schedule_message` - Function to schedule alarm messages
    /// * `uplink_finder` - Function returning the current live uplink
    ///
    /// # Returns
    ///
    /// `true` if the power-up was consumed and its effect applied.
    pub fn use_power_up<U: Uplink, F: Fn() -> Option<U>, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        kind: PowerUpKind,
        mut schedule_message: S,
        uplink_finder: F,
    ) -> bool {
        if self.store.session().quiz.power_ups[kind] == 0 {
            return false;
        }

        match kind {
            PowerUpKind::TimeFreeze => {
                let Some(epoch) = self.timer.freeze() else {
                    return false;
                };
                schedule_message(
                    timer::AlarmMessage::Resume { epoch }.into(),
                    Duration::from_secs(constants::power_ups::TIME_FREEZE_SECONDS),
                );
            }
            PowerUpKind::FiftyFifty => {
                let quiz = &self.store.session().quiz;
                let Some(question) = &quiz.current_question else {
                    return false;
                };
                if quiz.answer_submitted {
                    return false;
                }
                let eliminated = powerups::fifty_fifty_eliminations(
                    question.options.len(),
                    question.correct,
                    &quiz.eliminated_options,
                );
                if eliminated.is_empty() {
                    return false;
                }
                self.store.dispatch(Action::EliminateOptions(eliminated));
            }
            PowerUpKind::SkipQuestion => {
                let Some(user_id) = self.store.session().user.as_ref().map(|user| user.id) else {
                    return false;
                };
                // No local fallback: the next question arrives, or not,
                // at the server's discretion.
                self.send(&ClientMessage::SkipQuestion { user_id }, &uplink_finder);
            }
        }

        self.store.dispatch(Action::ConsumePowerUp(kind));
        self.evaluate_achievements(&mut schedule_message);

        true
    }

    /// Accepts a pending challenge
    ///
    /// # Arguments
    ///
    /// * `challenge_id` - The challenge to accept
    /// * `schedule_message` - Function to schedule alarm messages
    /// * `uplink_finder` - Function returning the current live uplink
    ///
    /// # Returns
    ///
    /// `false` if no player is registered or the challenge is unknown.
    pub fn accept_challenge<U: Uplink, F: Fn() -> Option<U>, S: FnMut(AlarmMessage, Duration)>(
        &mut self,
        challenge_id: Id,
        mut schedule_message: S,
        uplink_finder: F,
    ) -> bool {
        let session = self.store.session();
        let Some(user_id) = session.user.as_ref().map(|user| user.id) else {
            return false;
        };
        if !session
            .social
            .pending_challenges
            .iter()
            .any(|challenge| challenge.id == challenge_id)
        {
            return false;
        }

        self.store.dispatch(Action::AcceptChallenge(challenge_id));
        self.send(
            &ClientMessage::AcceptChallenge {
                user_id,
                challenge_id,
            },
            &uplink_finder,
        );
        self.evaluate_achievements(&mut schedule_message);

        true
    }

    /// Sends one command through the current uplink, if any
    ///
    /// Commands are fire-and-forget; with no live uplink the command is
    /// simply dropped.
    fn send<U: Uplink, F: Fn() -> Option<U>>(&self, message: &ClientMessage, uplink_finder: &F) {
        let Some(uplink) = uplink_finder() else {
            return;
        };
        uplink.send_message(message);
    }
}
