//! Suspension record.

use chrono::{DateTime, Utc};
use sanction_common::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::status::SuspensionStatus;
use crate::strategies::Metadata;

/// Typed pointer to an entity, independent of any storage schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityReference {
    /// Kind of entity, e.g. `"user"` or `"organization"`.
    pub entity_type: String,
    /// Key of the entity within its kind.
    pub entity_id: String,
}

impl EntityReference {
    /// Create a reference.
    #[must_use]
    pub fn new(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
        }
    }
}

/// The entity a suspension targets.
pub type SubjectReference = EntityReference;

/// The entity that suspended or revoked.
pub type ActorReference = EntityReference;

/// A stored pattern, interpreted by the matcher registered for `match_type`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCriterion {
    /// Matcher type identifier.
    pub match_type: String,
    /// Stored value or pattern.
    pub match_value: String,
}

impl MatchCriterion {
    /// Create a criterion.
    #[must_use]
    pub fn new(match_type: impl Into<String>, match_value: impl Into<String>) -> Self {
        Self {
            match_type: match_type.into(),
            match_value: match_value.into(),
        }
    }
}

/// A block on a subject, a pattern, both, or (with neither) a global rule
/// that only a strategy can scope.
///
/// Records are immutable apart from revocation, which happens at most once.
/// They are never deleted; revoked records remain as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Suspension {
    id: String,
    subject: Option<SubjectReference>,
    criterion: Option<MatchCriterion>,
    reason: Option<String>,
    suspended_by: Option<ActorReference>,
    suspended_at: DateTime<Utc>,
    starts_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
    revoked_at: Option<DateTime<Utc>>,
    revoked_by: Option<ActorReference>,
    strategy_type: Option<String>,
    strategy_metadata: Option<Metadata>,
}

impl Suspension {
    /// Start building a suspension created at `suspended_at`.
    #[must_use]
    pub fn new(id: impl Into<String>, suspended_at: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            subject: None,
            criterion: None,
            reason: None,
            suspended_by: None,
            suspended_at,
            starts_at: None,
            expires_at: None,
            revoked_at: None,
            revoked_by: None,
            strategy_type: None,
            strategy_metadata: None,
        }
    }

    /// Target a specific subject.
    #[must_use]
    pub fn with_subject(mut self, subject: SubjectReference) -> Self {
        self.subject = Some(subject);
        self
    }

    /// Target values covered by a pattern.
    #[must_use]
    pub fn with_criterion(mut self, criterion: MatchCriterion) -> Self {
        self.criterion = Some(criterion);
        self
    }

    /// Record why.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Record who.
    #[must_use]
    pub fn with_suspended_by(mut self, actor: ActorReference) -> Self {
        self.suspended_by = Some(actor);
        self
    }

    /// Defer enforcement until `starts_at`.
    #[must_use]
    pub const fn with_starts_at(mut self, starts_at: DateTime<Utc>) -> Self {
        self.starts_at = Some(starts_at);
        self
    }

    /// End enforcement at `expires_at`.
    #[must_use]
    pub const fn with_expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    /// Gate enforcement behind a strategy.
    #[must_use]
    pub fn with_strategy(mut self, strategy_type: impl Into<String>, metadata: Metadata) -> Self {
        self.strategy_type = Some(strategy_type.into());
        self.strategy_metadata = Some(metadata);
        self
    }

    /// Unique identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Suspended subject, if any.
    #[must_use]
    pub const fn subject(&self) -> Option<&SubjectReference> {
        self.subject.as_ref()
    }

    /// Pattern criterion, if any.
    #[must_use]
    pub const fn criterion(&self) -> Option<&MatchCriterion> {
        self.criterion.as_ref()
    }

    /// Reason given at creation or revocation.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }

    /// Actor that created the suspension.
    #[must_use]
    pub const fn suspended_by(&self) -> Option<&ActorReference> {
        self.suspended_by.as_ref()
    }

    /// Creation instant.
    #[must_use]
    pub const fn suspended_at(&self) -> DateTime<Utc> {
        self.suspended_at
    }

    /// Scheduled start, if deferred.
    #[must_use]
    pub const fn starts_at(&self) -> Option<DateTime<Utc>> {
        self.starts_at
    }

    /// Expiry, if temporary.
    #[must_use]
    pub const fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Revocation instant, if revoked.
    #[must_use]
    pub const fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }

    /// Actor that revoked, if recorded.
    #[must_use]
    pub const fn revoked_by(&self) -> Option<&ActorReference> {
        self.revoked_by.as_ref()
    }

    /// Strategy identifier, if gated.
    #[must_use]
    pub fn strategy_type(&self) -> Option<&str> {
        self.strategy_type.as_deref()
    }

    /// Strategy metadata, if gated.
    #[must_use]
    pub const fn strategy_metadata(&self) -> Option<&Metadata> {
        self.strategy_metadata.as_ref()
    }

    /// Neither subject nor criterion: applies wherever its strategy says.
    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.subject.is_none() && self.criterion.is_none()
    }

    /// Lifecycle status at `now`.
    #[must_use]
    pub fn status_at(&self, now: DateTime<Utc>) -> SuspensionStatus {
        SuspensionStatus::derive(now, self.starts_at, self.expires_at, self.revoked_at)
    }

    /// Lifecycle status now.
    #[must_use]
    pub fn status(&self) -> SuspensionStatus {
        self.status_at(Utc::now())
    }

    /// Whether the suspension is in force at `now`.
    #[must_use]
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now).is_enforced()
    }

    /// End enforcement. A second revocation is rejected; a revoked
    /// suspension never becomes active again.
    pub fn revoke(
        &mut self,
        actor: Option<ActorReference>,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        if self.revoked_at.is_some() {
            return Err(AppError::Conflict(format!(
                "Suspension {} is already revoked",
                self.id
            )));
        }

        self.revoked_at = Some(now);
        self.revoked_by = actor;
        if let Some(reason) = reason {
            self.reason = Some(reason);
        }
        Ok(())
    }
}
