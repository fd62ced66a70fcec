//! Suspension lifecycle status.
//!
//! Status is never stored. It is derived on read from three optional
//! timestamps, checked in a fixed order:
//!
//! 1. `revoked_at` set => [`SuspensionStatus::Revoked`]
//! 2. `starts_at` after now => [`SuspensionStatus::Pending`]
//! 3. `expires_at` at or before now => [`SuspensionStatus::Expired`]
//! 4. otherwise => [`SuspensionStatus::Active`]
//!
//! Rule 2 wins over rule 3, so a suspension scheduled to start in the
//! future is `Pending` even if its expiry has already passed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a suspension at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuspensionStatus {
    /// In force.
    Active,
    /// Scheduled, not yet in force.
    Pending,
    /// Ran its course.
    Expired,
    /// Lifted by an actor.
    Revoked,
}

impl SuspensionStatus {
    /// Derive the status at `now`.
    #[must_use]
    pub fn derive(
        now: DateTime<Utc>,
        starts_at: Option<DateTime<Utc>>,
        expires_at: Option<DateTime<Utc>>,
        revoked_at: Option<DateTime<Utc>>,
    ) -> Self {
        if revoked_at.is_some() {
            Self::Revoked
        } else if starts_at.is_some_and(|starts| starts > now) {
            Self::Pending
        } else if expires_at.is_some_and(|expires| expires <= now) {
            Self::Expired
        } else {
            Self::Active
        }
    }

    /// Whether a suspension in this state blocks access.
    #[must_use]
    pub const fn is_enforced(self) -> bool {
        matches!(self, Self::Active)
    }

    /// Lowercase name, as serialized.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Expired => "expired",
            Self::Revoked => "revoked",
        }
    }
}

impl std::fmt::Display for SuspensionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_718_193_600, 0).unwrap_or_default()
    }

    #[test]
    fn test_no_timestamps_is_active() {
        assert_eq!(
            SuspensionStatus::derive(now(), None, None, None),
            SuspensionStatus::Active
        );
    }

    #[test]
    fn test_revoked_overrides_everything() {
        let past = now() - Duration::hours(1);
        let future = now() + Duration::hours(1);
        for starts in [None, Some(past), Some(future)] {
            for expires in [None, Some(past), Some(future)] {
                assert_eq!(
                    SuspensionStatus::derive(now(), starts, expires, Some(past)),
                    SuspensionStatus::Revoked
                );
            }
        }
        assert_eq!(
            SuspensionStatus::derive(now(), None, None, Some(now())),
            SuspensionStatus::Revoked
        );
    }

    #[test]
    fn test_future_start_beats_past_expiry() {
        let status = SuspensionStatus::derive(
            now(),
            Some(now() + Duration::days(1)),
            Some(now() - Duration::days(1)),
            None,
        );
        assert_eq!(status, SuspensionStatus::Pending);
    }

    #[test]
    fn test_boundaries() {
        assert_eq!(
            SuspensionStatus::derive(now(), None, Some(now()), None),
            SuspensionStatus::Expired
        );
        assert_eq!(
            SuspensionStatus::derive(now(), Some(now()), None, None),
            SuspensionStatus::Active
        );
        assert_eq!(
            SuspensionStatus::derive(now(), None, Some(now() + Duration::seconds(1)), None),
            SuspensionStatus::Active
        );
        assert_eq!(
            SuspensionStatus::derive(now(), Some(now() + Duration::seconds(1)), None, None),
            SuspensionStatus::Pending
        );
    }

    #[test]
    fn test_started_and_not_expired_is_active() {
        let status = SuspensionStatus::derive(
            now(),
            Some(now() - Duration::days(1)),
            Some(now() + Duration::days(1)),
            None,
        );
        assert_eq!(status, SuspensionStatus::Active);
        assert!(status.is_enforced());
        assert!(!SuspensionStatus::Pending.is_enforced());
    }

    #[test]
    fn test_serialization() {
        assert_eq!(
            serde_json::to_string(&SuspensionStatus::Revoked).unwrap_or_default(),
            "\"revoked\""
        );
        assert_eq!(SuspensionStatus::Expired.to_string(), "expired");
    }
}
