use std::collections::HashMap;

use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::warn;

/// Failed attempts allowed before a username is locked out.
pub const MAX_FAILURES: u32 = 5;
/// How long a lockout lasts.
pub const LOCKOUT_MINUTES: i64 = 15;

#[derive(Debug, Clone, Default)]
struct AttemptRecord {
    failures: u32,
    locked_until: Option<OffsetDateTime>,
}

/// Tracks failed logins per username. Volatile: a restart clears every
/// lockout. Expired locks are noticed lazily on the next attempt; nothing
/// sweeps the table.
#[derive(Default)]
pub struct LockoutTracker {
    attempts: Mutex<HashMap<String, AttemptRecord>>,
}

impl LockoutTracker {
    /// Active lock expiry for a username, if one is still in force at `now`.
    pub async fn locked_until(
        &self,
        username: &str,
        now: OffsetDateTime,
    ) -> Option<OffsetDateTime> {
        self.attempts
            .lock()
            .await
            .get(username)
            .and_then(|r| r.locked_until)
            .filter(|until| *until > now)
    }

    /// Count one failure; reaching [`MAX_FAILURES`] locks the username for
    /// [`LOCKOUT_MINUTES`]. Returns the updated failure count.
    pub async fn record_failure(&self, username: &str, now: OffsetDateTime) -> u32 {
        let mut attempts = self.attempts.lock().await;
        let record = attempts.entry(username.to_string()).or_default();
        if record.locked_until.is_some_and(|until| until <= now) {
            // Stale lock from an earlier streak; start a fresh count.
            *record = AttemptRecord::default();
        }
        record.failures += 1;
        if record.failures >= MAX_FAILURES {
            record.locked_until = Some(now + Duration::minutes(LOCKOUT_MINUTES));
            warn!(username, failures = record.failures, "username locked out");
        }
        record.failures
    }

    /// Drop the record entirely, called after a successful authentication.
    pub async fn reset(&self, username: &str) {
        self.attempts.lock().await.remove(username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn locks_on_fifth_failure() {
        let tracker = LockoutTracker::default();
        let now = OffsetDateTime::now_utc();

        for _ in 0..4 {
            tracker.record_failure("clerk", now).await;
        }
        assert!(tracker.locked_until("clerk", now).await.is_none());

        tracker.record_failure("clerk", now).await;
        let until = tracker.locked_until("clerk", now).await.expect("locked");
        assert_eq!(until, now + Duration::minutes(LOCKOUT_MINUTES));
    }

    #[tokio::test]
    async fn lock_expires_lazily() {
        let tracker = LockoutTracker::default();
        let now = OffsetDateTime::now_utc();
        for _ in 0..5 {
            tracker.record_failure("clerk", now).await;
        }

        let just_before = now + Duration::minutes(LOCKOUT_MINUTES) - Duration::seconds(1);
        assert!(tracker.locked_until("clerk", just_before).await.is_some());

        let after = now + Duration::minutes(LOCKOUT_MINUTES);
        assert!(tracker.locked_until("clerk", after).await.is_none());
    }

    #[tokio::test]
    async fn failure_after_expired_lock_starts_fresh_count() {
        let tracker = LockoutTracker::default();
        let now = OffsetDateTime::now_utc();
        for _ in 0..5 {
            tracker.record_failure("clerk", now).await;
        }

        let later = now + Duration::minutes(LOCKOUT_MINUTES + 1);
        let failures = tracker.record_failure("clerk", later).await;
        assert_eq!(failures, 1);
        assert!(tracker.locked_until("clerk", later).await.is_none());
    }

    #[tokio::test]
    async fn reset_clears_the_record() {
        let tracker = LockoutTracker::default();
        let now = OffsetDateTime::now_utc();
        for _ in 0..4 {
            tracker.record_failure("clerk", now).await;
        }
        tracker.reset("clerk").await;

        // The next streak starts from zero again.
        for _ in 0..4 {
            tracker.record_failure("clerk", now).await;
        }
        assert!(tracker.locked_until("clerk", now).await.is_none());
    }

    #[tokio::test]
    async fn usernames_are_tracked_independently() {
        let tracker = LockoutTracker::default();
        let now = OffsetDateTime::now_utc();
        for _ in 0..5 {
            tracker.record_failure("clerk", now).await;
        }
        assert!(tracker.locked_until("clerk", now).await.is_some());
        assert!(tracker.locked_until("owner", now).await.is_none());
    }
}
