//! Connection lifecycle and reconnection policy
//!
//! The client holds exactly one uplink to the quiz server. This module
//! tracks its lifecycle and drives recovery: every close schedules a
//! single reconnection alarm, and the alarm firing tells the embedding
//! runtime to dial again. Delays follow bounded exponential backoff from
//! a 3 second base; attempts are unbounded in count, so the client keeps
//! trying for as long as the session lives.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;

/// Alarm messages for the connection lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum AlarmMessage {
    /// The reconnection delay has elapsed and the runtime should redial
    Reconnect {
        /// Which attempt this alarm belongs to
        attempt: u32,
    },
}

/// The observed state of the uplink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// A dial is in flight
    #[default]
    Connecting,
    /// The uplink is live
    Open,
    /// The uplink is down and a reconnection alarm is pending
    Closed,
}

/// Reconnection delay policy
///
/// Delays double per consecutive failed attempt, starting at the base
/// and never exceeding the cap. A successful open resets the sequence.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Delay before the first retry
    base: Duration,
    /// Upper bound on any retry delay
    cap: Duration,
}

impl Default for RetryPolicy {
    /// The standard policy: 3 second base, 48 second cap
    fn default() -> Self {
        Self {
            base: Duration::from_secs(constants::connection::RECONNECT_BASE_SECONDS),
            cap: Duration::from_secs(constants::connection::RECONNECT_CAP_SECONDS),
        }
    }
}

impl RetryPolicy {
    /// Computes the delay for the given attempt number (0-based)
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(16);
        self.base
            .saturating_mul(2u32.saturating_pow(exponent))
            .min(self.cap)
    }
}

/// Tracks the single server connection and its recovery
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConnectionManager {
    /// Current uplink state
    status: Status,
    /// Consecutive failed attempts since the last successful open
    attempt: u32,
    /// The delay policy in effect
    retry: RetryPolicy,
}

impl ConnectionManager {
    /// Creates a manager in the connecting state with the standard policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current uplink status
    pub fn status(&self) -> Status {
        self.status
    }

    /// Records a successful open and resets the backoff sequence
    pub fn handle_open(&mut self) {
        self.status = Status::Open;
        self.attempt = 0;
        tracing::debug!("uplink open");
    }

    /// Records a close and schedules exactly one reconnection alarm
    ///
    /// # Arguments
    ///
    /// * `schedule_message` - Function to schedule the reconnection alarm
    ///
    /// # Returns
    ///
    /// The delay until the scheduled alarm fires.
    pub fn handle_closed<S: FnMut(crate::AlarmMessage, Duration)>(
        &mut self,
        mut schedule_message: S,
    ) -> Duration {
        self.status = Status::Closed;
        let delay = self.retry.delay(self.attempt);
        tracing::debug!(attempt = self.attempt, ?delay, "uplink closed, reconnecting");
        schedule_message(
            AlarmMessage::Reconnect {
                attempt: self.attempt,
            }
            .into(),
            delay,
        );
        self.attempt += 1;
        delay
    }

    /// Handles a fired reconnection alarm
    ///
    /// # Arguments
    ///
    /// * `message` - The alarm that fired
    ///
    /// # Returns
    ///
    /// `true` if the runtime should dial a new connection now; `false`
    /// for alarms that arrive after the uplink already recovered.
    pub fn receive_alarm(&mut self, message: AlarmMessage) -> bool {
        let AlarmMessage::Reconnect { attempt } = message;
        if self.status == Status::Closed {
            tracing::debug!(attempt, "redialing");
            self.status = Status::Connecting;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_policy_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_secs(3));
        assert_eq!(policy.delay(1), Duration::from_secs(6));
        assert_eq!(policy.delay(2), Duration::from_secs(12));
        assert_eq!(policy.delay(3), Duration::from_secs(24));
        assert_eq!(policy.delay(4), Duration::from_secs(48));
        assert_eq!(policy.delay(5), Duration::from_secs(48));
        assert_eq!(policy.delay(1000), Duration::from_secs(48));
    }

    #[test]
    fn test_close_schedules_one_alarm() {
        let mut manager = ConnectionManager::new();
        manager.handle_open();

        let mut scheduled = Vec::new();
        let delay = manager.handle_closed(|message, delay| scheduled.push((message, delay)));

        assert_eq!(manager.status(), Status::Closed);
        assert_eq!(scheduled.len(), 1);
        assert_eq!(delay, Duration::from_secs(3));
    }

    #[test]
    fn test_backoff_grows_until_reset() {
        let mut manager = ConnectionManager::new();

        let mut delays = Vec::new();
        for _ in 0..5 {
            delays.push(manager.handle_closed(|_, _| {}));
        }
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(3),
                Duration::from_secs(6),
                Duration::from_secs(12),
                Duration::from_secs(24),
                Duration::from_secs(48),
            ]
        );

        manager.handle_open();
        assert_eq!(manager.handle_closed(|_, _| {}), Duration::from_secs(3));
    }

    #[test]
    fn test_alarm_redials_only_while_closed() {
        let mut manager = ConnectionManager::new();
        manager.handle_closed(|_, _| {});

        assert!(manager.receive_alarm(AlarmMessage::Reconnect { attempt: 0 }));
        assert_eq!(manager.status(), Status::Connecting);

        // A second firing of the same alarm is stale.
        assert!(!manager.receive_alarm(AlarmMessage::Reconnect { attempt: 0 }));

        manager.handle_open();
        assert!(!manager.receive_alarm(AlarmMessage::Reconnect { attempt: 1 }));
        assert_eq!(manager.status(), Status::Open);
    }
}
