//! Achievement rules and evaluation
//!
//! Achievements are one-time badges defined by a fixed rule table of pure
//! predicates over the session state. The evaluator runs after every
//! state-affecting operation; a rule whose predicate holds and whose id
//! is not yet unlocked fires exactly once, in table order. Unlocking
//! raises a transient banner that a scheduled alarm clears.

use serde::{Deserialize, Serialize};

use crate::store::Session;

/// The identities of the achievements a session can unlock
///
/// Each id unlocks at most once per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AchievementId {
    /// Concluded the first question of the session
    FirstAnswer,
    /// Reached a streak of three correct answers
    HotStreak,
    /// Reached a streak of ten correct answers
    QuizMaster,
    /// Earned five thousand points in one quiz
    PointHoarder,
    /// Consumed three power-ups
    PowerPlayer,
    /// Accepted a head-to-head challenge
    Challenger,
}

/// A single achievement rule
///
/// The condition is a pure predicate over the session snapshot; it must
/// stay true once satisfied for progress displays to make sense, but the
/// unlock guard makes re-evaluation harmless either way.
pub struct Rule {
    /// The id this rule unlocks
    pub id: AchievementId,
    /// Short display title
    pub title: &'static str,
    /// One-line description of the requirement
    pub description: &'static str,
    /// Predicate deciding whether the rule is satisfied
    pub condition: fn(&Session) -> bool,
}

fn first_answer(session: &Session) -> bool {
    session.statistics.questions_answered >= 1
}

fn hot_streak(session: &Session) -> bool {
    session.quiz.streak >= 3
}

fn quiz_master(session: &Session) -> bool {
    session.quiz.streak >= 10
}

fn point_hoarder(session: &Session) -> bool {
    session.quiz.score >= 5000
}

fn power_player(session: &Session) -> bool {
    session.statistics.power_ups_used >= 3
}

fn challenger(session: &Session) -> bool {
    session.statistics.challenges_accepted >= 1
}

/// The fixed rule table, in unlock-check order
pub const RULES: &[Rule] = &[
    Rule {
        id: AchievementId::FirstAnswer,
        title: "First Steps",
        description: "Conclude your first question",
        condition: first_answer,
    },
    Rule {
        id: AchievementId::HotStreak,
        title: "Hot Streak",
        description: "Answer three questions in a row correctly",
        condition: hot_streak,
    },
    Rule {
        id: AchievementId::QuizMaster,
        title: "Quiz Master",
        description: "Answer ten questions in a row correctly",
        condition: quiz_master,
    },
    Rule {
        id: AchievementId::PointHoarder,
        title: "Point Hoarder",
        description: "Earn five thousand points in one quiz",
        condition: point_hoarder,
    },
    Rule {
        id: AchievementId::PowerPlayer,
        title: "Power Player",
        description: "Use three power-ups",
        condition: power_player,
    },
    Rule {
        id: AchievementId::Challenger,
        title: "Challenger",
        description: "Accept a challenge from another player",
        condition: challenger,
    },
];

/// Looks up the rule for an achievement id
pub fn rule(id: AchievementId) -> Option<&'static Rule> {
    RULES.iter().find(|rule| rule.id == id)
}

/// Returns the rules that are satisfied but not yet unlocked
///
/// The result preserves table order; the caller dispatches the unlocks,
/// which makes a second evaluation of the same snapshot return nothing.
pub fn newly_satisfied(session: &Session) -> Vec<&'static Rule> {
    RULES
        .iter()
        .filter(|rule| (rule.condition)(session) && !session.achievements.is_unlocked(rule.id))
        .collect()
}

/// Alarm messages for the transient unlock banner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// Clears the banner if it still shows the given achievement
    ClearRecentUnlock {
        /// The unlock the banner was raised for
        id: AchievementId,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Action, GameMode, Store};

    #[test]
    fn test_ids_serialize_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&AchievementId::QuizMaster).unwrap(),
            "\"QUIZ_MASTER\""
        );
        assert_eq!(
            serde_json::to_string(&AchievementId::HotStreak).unwrap(),
            "\"HOT_STREAK\""
        );
    }

    #[test]
    fn test_rule_lookup() {
        assert_eq!(rule(AchievementId::QuizMaster).unwrap().title, "Quiz Master");
        assert!(RULES.iter().all(|r| rule(r.id).is_some()));
    }

    #[test]
    fn test_fresh_session_satisfies_nothing() {
        let store = Store::new(GameMode::Casual);
        assert!(newly_satisfied(store.session()).is_empty());
    }

    #[test]
    fn test_satisfied_rule_fires_once() {
        let mut store = Store::new(GameMode::Casual);
        for _ in 0..3 {
            store.dispatch(Action::ConsumePowerUp(crate::powerups::PowerUpKind::TimeFreeze));
        }

        let satisfied = newly_satisfied(store.session());
        assert_eq!(satisfied.len(), 1);
        assert_eq!(satisfied[0].id, AchievementId::PowerPlayer);

        store.dispatch(Action::UnlockAchievement(AchievementId::PowerPlayer));

        // The predicate still holds, but the unlock guard silences it.
        assert!(newly_satisfied(store.session()).is_empty());
    }

    #[test]
    fn test_simultaneous_rules_in_table_order() {
        let mut store = Store::new(GameMode::Casual);
        for _ in 0..10 {
            store.dispatch(Action::PresentQuestion(crate::store::Question {
                id: crate::profile::Id::new(),
                text: "q".to_owned(),
                options: vec!["a".to_owned(), "b".to_owned()],
                correct: 0,
            }));
            store.dispatch(Action::RecordAnswer {
                correct: true,
                points: 1000,
                time_spent: std::time::Duration::from_secs(1),
            });
        }

        let satisfied = newly_satisfied(store.session());
        let ids: Vec<_> = satisfied.iter().map(|rule| rule.id).collect();
        assert_eq!(
            ids,
            vec![
                AchievementId::FirstAnswer,
                AchievementId::HotStreak,
                AchievementId::QuizMaster,
                AchievementId::PointHoarder,
            ]
        );
    }
}
