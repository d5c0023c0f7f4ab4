//! Session freshness rules, rotation scheduling, and garbage-collection cutoffs.
//!
//! A session is anchored by two timestamps: `created_at` bounds its absolute
//! lifetime and `rotated_at` bounds inactivity. Revocation overrides both.

use chrono::Duration;

use crate::types::Timestamp;

/// How far ahead of the rotation interval the client is told to rotate.
pub const ROTATION_LEEWAY_SECS: i64 = 5;

/// Default absolute session lifetime (30 days).
pub const DEFAULT_MAX_LIFETIME_HOURS: i64 = 30 * 24;

/// Default inactivity timeout (7 days).
pub const DEFAULT_MAX_INACTIVE_HOURS: i64 = 7 * 24;

/// Default proactive rotation interval.
pub const DEFAULT_ROTATION_INTERVAL_MINS: i64 = 10;

/// Default time a dead session row is kept for forensics before deletion.
pub const DEFAULT_REVOKED_RETENTION_DAYS: i64 = 30;

/// Outcome of checking a found session row against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Live,
    Revoked,
    Expired,
}

/// Timestamps below which dead rows may be deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleanupCutoffs {
    /// Revoked rows whose `revoked_at` is older than this.
    pub revoked_before: Timestamp,
    /// Unrevoked rows whose `created_at` is older than this (lifetime exceeded long ago).
    pub created_before: Timestamp,
    /// Unrevoked rows whose `rotated_at` is older than this (inactive long ago).
    pub rotated_before: Timestamp,
}

/// Lifetime and rotation parameters for sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionPolicy {
    pub max_lifetime: Duration,
    pub max_inactive_lifetime: Duration,
    pub rotation_interval: Duration,
    pub revoked_retention: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            max_lifetime: Duration::hours(DEFAULT_MAX_LIFETIME_HOURS),
            max_inactive_lifetime: Duration::hours(DEFAULT_MAX_INACTIVE_HOURS),
            rotation_interval: Duration::minutes(DEFAULT_ROTATION_INTERVAL_MINS),
            revoked_retention: Duration::days(DEFAULT_REVOKED_RETENTION_DAYS),
        }
    }
}

impl SessionPolicy {
    /// Classify a session. Revocation is reported ahead of expiry.
    pub fn evaluate(
        &self,
        revoked_at: Option<Timestamp>,
        created_at: Timestamp,
        rotated_at: Timestamp,
        now: Timestamp,
    ) -> SessionState {
        if revoked_at.is_some() {
            return SessionState::Revoked;
        }

        let absolute_deadline = now - self.max_lifetime;
        let inactivity_deadline = now - self.max_inactive_lifetime;
        if created_at < absolute_deadline || rotated_at < inactivity_deadline {
            return SessionState::Expired;
        }

        SessionState::Live
    }

    /// When the client should rotate next: `rotated_at + interval - leeway`.
    pub fn next_rotation(&self, rotated_at: Timestamp) -> Timestamp {
        rotated_at + self.rotation_interval - Duration::seconds(ROTATION_LEEWAY_SECS)
    }

    pub fn needs_rotation(&self, rotated_at: Timestamp, now: Timestamp) -> bool {
        now >= self.next_rotation(rotated_at)
    }

    /// Cookie `Max-Age` for both session cookies, in whole seconds.
    pub fn cookie_max_age_secs(&self) -> i64 {
        self.max_lifetime.num_seconds()
    }

    /// A row is collectable once it has been dead for longer than the retention window.
    pub fn cleanup_cutoffs(&self, now: Timestamp) -> CleanupCutoffs {
        let retention_start = now - self.revoked_retention;
        CleanupCutoffs {
            revoked_before: retention_start,
            created_before: retention_start - self.max_lifetime,
            rotated_before: retention_start - self.max_inactive_lifetime,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn policy() -> SessionPolicy {
        SessionPolicy::default()
    }

    #[test]
    fn fresh_session_is_live() {
        let now = Utc::now();
        assert_eq!(policy().evaluate(None, now, now, now), SessionState::Live);
    }

    #[test]
    fn revoked_wins_over_expired() {
        let now = Utc::now();
        let ancient = now - Duration::days(365);
        assert_eq!(
            policy().evaluate(Some(now), ancient, ancient, now),
            SessionState::Revoked
        );
    }

    #[test]
    fn old_created_at_expires_even_if_recently_rotated() {
        let now = Utc::now();
        let created = now - Duration::days(31);
        assert_eq!(policy().evaluate(None, created, now, now), SessionState::Expired);
    }

    #[test]
    fn stale_rotated_at_expires_even_if_recently_created() {
        let now = Utc::now();
        let rotated = now - Duration::days(8);
        let created = now - Duration::days(9);
        assert_eq!(policy().evaluate(None, created, rotated, now), SessionState::Expired);
    }

    #[test]
    fn boundary_is_still_live() {
        let now = Utc::now();
        let p = policy();
        let created = now - p.max_lifetime;
        let rotated = now - p.max_inactive_lifetime;
        assert_eq!(p.evaluate(None, created, rotated, now), SessionState::Live);
    }

    #[test]
    fn next_rotation_subtracts_leeway() {
        let now = Utc::now();
        let next = policy().next_rotation(now);
        assert_eq!(next - now, Duration::minutes(10) - Duration::seconds(5));
    }

    #[test]
    fn needs_rotation_flips_at_next_rotation() {
        let p = policy();
        let rotated = Utc::now();
        let next = p.next_rotation(rotated);
        assert!(!p.needs_rotation(rotated, next - Duration::seconds(1)));
        assert!(p.needs_rotation(rotated, next));
    }

    #[test]
    fn cookie_max_age_is_absolute_lifetime() {
        assert_eq!(policy().cookie_max_age_secs(), 30 * 24 * 3600);
    }

    #[test]
    fn cleanup_cutoffs_extend_past_expiry_by_retention() {
        let now = Utc::now();
        let p = policy();
        let cutoffs = p.cleanup_cutoffs(now);
        assert_eq!(cutoffs.revoked_before, now - Duration::days(30));
        assert_eq!(cutoffs.created_before, now - Duration::days(60));
        assert_eq!(cutoffs.rotated_before, now - Duration::days(37));
    }
}
