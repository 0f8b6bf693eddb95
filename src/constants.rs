//! Configuration constants for the quiz session client
//!
//! This module contains the limits and fixed timings used throughout the
//! client state machine, so that protocol behavior and resource bounds
//! stay in one auditable place.

/// Question flow constants
pub mod question {
    /// Seconds a player has to answer once a question is presented
    pub const TIME_LIMIT_SECONDS: u32 = 30;
    /// Interval between countdown ticks, in seconds
    pub const TICK_INTERVAL_SECONDS: u64 = 1;
    /// Maximum length of a question text in characters
    pub const MAX_TEXT_LENGTH: usize = 200;
    /// Minimum number of answer options for a question
    pub const MIN_OPTION_COUNT: usize = 2;
    /// Maximum number of answer options for a question
    pub const MAX_OPTION_COUNT: usize = 8;
    /// Maximum length of a single answer option in characters
    pub const MAX_OPTION_LENGTH: usize = 200;
}

/// Real-time event feed constants
pub mod feed {
    /// Maximum number of retained feed entries, including the newest one
    pub const MAX_EVENTS: usize = 16;
}

/// Connection lifecycle constants
pub mod connection {
    /// Base delay before the first reconnection attempt, in seconds
    pub const RECONNECT_BASE_SECONDS: u64 = 3;
    /// Upper bound on the reconnection delay, in seconds
    pub const RECONNECT_CAP_SECONDS: u64 = 48;
}

/// Power-up constants
pub mod power_ups {
    /// Time freezes granted at the start of a session
    pub const INITIAL_TIME_FREEZE: u32 = 2;
    /// Fifty-fifties granted at the start of a session
    pub const INITIAL_FIFTY_FIFTY: u32 = 2;
    /// Question skips granted at the start of a session
    pub const INITIAL_SKIP_QUESTION: u32 = 1;
    /// Seconds the countdown stays frozen after a time freeze
    pub const TIME_FREEZE_SECONDS: u64 = 5;
    /// Incorrect options removed by a fifty-fifty
    pub const FIFTY_FIFTY_ELIMINATIONS: usize = 2;
}

/// Achievement constants
pub mod achievements {
    /// Seconds the unlock banner stays visible before auto-clearing
    pub const BANNER_SECONDS: u64 = 3;
    /// Progress value recorded for an unlocked achievement
    pub const PROGRESS_COMPLETE: u8 = 100;
}

/// Profile and username constants
pub mod profile {
    /// Maximum length of a username in characters
    pub const MAX_USERNAME_LENGTH: usize = 30;
    /// Experience points required per profile level
    pub const XP_PER_LEVEL: u64 = 1000;
}

/// Leaderboard constants
pub mod leaderboard {
    /// Entries returned by the local scoreboard
    pub const TOP_LIMIT: usize = 10;
}

/// Scoring constants
pub mod scoring {
    /// Base points awarded for a correct answer on easy difficulty
    pub const EASY_POINTS: u64 = 500;
    /// Base points awarded for a correct answer on medium difficulty
    pub const MEDIUM_POINTS: u64 = 1000;
    /// Base points awarded for a correct answer on hard difficulty
    pub const HARD_POINTS: u64 = 1500;
}
