//! Suspension service: creation, revocation and enforcement checks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sanction_common::{AppError, AppResult, Config, IdGenerator, SuspensionConfig};
use serde::Deserialize;
use validator::Validate;

use crate::clock::{Clock, SystemClock};
use crate::context::RequestContext;
use crate::matchers::MatcherRegistry;
use crate::repositories::SuspensionRepository;
use crate::resolvers::{DeviceResolver, GeoResolver, IpResolver};
use crate::services::event_publisher::EventPublisherService;
use crate::strategies::{Metadata, StrategyRegistry};
use crate::suspension::{ActorReference, MatchCriterion, SubjectReference, Suspension};

/// Input for creating a suspension.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateSuspensionInput {
    pub subject: Option<SubjectReference>,
    #[validate(length(min = 1, max = 64))]
    pub match_type: Option<String>,
    #[validate(length(min = 1, max = 2048))]
    pub match_value: Option<String>,
    pub reason: Option<String>,
    pub suspended_by: Option<ActorReference>,
    pub starts_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 64))]
    pub strategy_type: Option<String>,
    pub strategy_metadata: Option<Metadata>,
}

/// Service for managing and enforcing suspensions.
#[derive(Clone)]
pub struct SuspensionService {
    repository: Arc<dyn SuspensionRepository>,
    matchers: Arc<MatcherRegistry>,
    strategies: Arc<StrategyRegistry>,
    event_publisher: Option<EventPublisherService>,
    clock: Arc<dyn Clock>,
    max_reason_length: usize,
    id_gen: IdGenerator,
}

impl SuspensionService {
    /// Create a new suspension service.
    #[must_use]
    pub fn new(
        repository: Arc<dyn SuspensionRepository>,
        matchers: Arc<MatcherRegistry>,
        strategies: Arc<StrategyRegistry>,
    ) -> Self {
        Self {
            repository,
            matchers,
            strategies,
            event_publisher: None,
            clock: Arc::new(SystemClock),
            max_reason_length: SuspensionConfig::default().max_reason_length,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a service with the built-in matchers and strategies, configured
    /// from `config`.
    pub fn from_config(
        config: &Config,
        repository: Arc<dyn SuspensionRepository>,
        ip_resolver: Arc<dyn IpResolver>,
        geo_resolver: Arc<dyn GeoResolver>,
        device_resolver: Arc<dyn DeviceResolver>,
    ) -> AppResult<Self> {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let matchers = MatcherRegistry::with_defaults(config.regex_limits());
        let strategies = StrategyRegistry::with_defaults(
            ip_resolver,
            geo_resolver,
            device_resolver,
            config.default_timezone()?,
            clock.clone(),
        );

        Ok(Self::new(repository, Arc::new(matchers), Arc::new(strategies))
            .with_clock(clock)
            .with_config(&config.suspensions))
    }

    /// Read time from `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Apply suspension limits.
    #[must_use]
    pub const fn with_config(mut self, config: &SuspensionConfig) -> Self {
        self.max_reason_length = config.max_reason_length;
        self
    }

    /// Set the event publisher.
    pub fn set_event_publisher(&mut self, event_publisher: EventPublisherService) {
        self.event_publisher = Some(event_publisher);
    }

    /// Matchers used for pattern suspensions.
    #[must_use]
    pub fn matchers(&self) -> &MatcherRegistry {
        &self.matchers
    }

    /// Strategies used to gate suspensions.
    #[must_use]
    pub fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    // ========== Administration ==========

    /// Create a suspension.
    pub async fn suspend(&self, input: CreateSuspensionInput) -> AppResult<Suspension> {
        input.validate()?;

        let reason = self.check_reason(input.reason)?;

        if let Some(ref subject) = input.subject {
            check_reference("subject", subject)?;
        }
        if let Some(ref actor) = input.suspended_by {
            check_reference("suspendedBy", actor)?;
        }

        let criterion = match (input.match_type, input.match_value) {
            (Some(match_type), Some(match_value)) => {
                let Some(matcher) = self.matchers.get(&match_type) else {
                    return Err(AppError::UnknownMatcher(match_type));
                };
                if !matcher.validate(&match_value) {
                    return Err(AppError::Validation(format!(
                        "Invalid {match_type} pattern: {match_value}"
                    )));
                }
                Some(MatchCriterion::new(match_type, match_value))
            }
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "matchType and matchValue must be given together".to_string(),
                ));
            }
        };

        match input.strategy_type {
            Some(ref strategy_type) if !self.strategies.contains(strategy_type) => {
                return Err(AppError::UnknownStrategy(strategy_type.clone()));
            }
            None if input.strategy_metadata.is_some() => {
                return Err(AppError::Validation(
                    "strategyMetadata requires a strategyType".to_string(),
                ));
            }
            _ => {}
        }

        if input.subject.is_none() && criterion.is_none() && input.strategy_type.is_none() {
            return Err(AppError::Validation(
                "A suspension without subject or criterion requires a strategy".to_string(),
            ));
        }

        if let (Some(starts_at), Some(expires_at)) = (input.starts_at, input.expires_at)
            && expires_at <= starts_at
        {
            return Err(AppError::Validation(
                "expiresAt must be after startsAt".to_string(),
            ));
        }

        let now = self.clock.now();
        let mut suspension = Suspension::new(self.id_gen.generate_at(now.into()), now);
        if let Some(subject) = input.subject {
            suspension = suspension.with_subject(subject);
        }
        if let Some(criterion) = criterion {
            suspension = suspension.with_criterion(criterion);
        }
        if let Some(reason) = reason {
            suspension = suspension.with_reason(reason);
        }
        if let Some(actor) = input.suspended_by {
            suspension = suspension.with_suspended_by(actor);
        }
        if let Some(starts_at) = input.starts_at {
            suspension = suspension.with_starts_at(starts_at);
        }
        if let Some(expires_at) = input.expires_at {
            suspension = suspension.with_expires_at(expires_at);
        }
        if let Some(strategy_type) = input.strategy_type {
            suspension =
                suspension.with_strategy(strategy_type, input.strategy_metadata.unwrap_or_default());
        }

        let suspension = self.repository.insert(suspension).await?;

        tracing::info!(
            suspension_id = suspension.id(),
            subject = ?suspension.subject(),
            match_type = suspension.criterion().map(|c| c.match_type.as_str()),
            strategy = suspension.strategy_type(),
            "Suspension created"
        );

        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher.publish_suspended(&suspension).await
        {
            tracing::warn!(error = %e, "Failed to publish suspended event");
        }

        Ok(suspension)
    }

    /// Revoke a suspension. Revoking twice is a conflict.
    pub async fn revoke(
        &self,
        id: &str,
        actor: Option<ActorReference>,
        reason: Option<String>,
    ) -> AppResult<Suspension> {
        let reason = self.check_reason(reason)?;
        if let Some(ref actor) = actor {
            check_reference("revokedBy", actor)?;
        }

        let suspension = self
            .repository
            .revoke(id, actor, reason, self.clock.now())
            .await?;

        tracing::info!(
            suspension_id = suspension.id(),
            revoked_by = ?suspension.revoked_by(),
            "Suspension revoked"
        );

        if let Some(ref event_publisher) = self.event_publisher
            && let Err(e) = event_publisher
                .publish_revoked(&suspension, suspension.revoked_by())
                .await
        {
            tracing::warn!(error = %e, "Failed to publish revoked event");
        }

        Ok(suspension)
    }

    /// Get a suspension by ID.
    pub async fn get(&self, id: &str) -> AppResult<Suspension> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::SuspensionNotFound(id.to_string()))
    }

    /// Every suspension ever placed on `subject`, revoked and expired included.
    pub async fn history_for_subject(
        &self,
        subject: &SubjectReference,
    ) -> AppResult<Vec<Suspension>> {
        self.repository.find_by_subject(subject).await
    }

    /// Suspensions on `subject` whose status is active now. Strategy gates
    /// are not evaluated.
    pub async fn active_for_subject(
        &self,
        subject: &SubjectReference,
    ) -> AppResult<Vec<Suspension>> {
        let now = self.clock.now();
        Ok(self
            .repository
            .find_by_subject(subject)
            .await?
            .into_iter()
            .filter(|s| s.is_active_at(now))
            .collect())
    }

    // ========== Enforcement ==========

    /// The first suspension on `subject` that applies to this request.
    pub async fn enforced_for_subject(
        &self,
        subject: &SubjectReference,
        ctx: &RequestContext,
    ) -> AppResult<Option<Suspension>> {
        let now = self.clock.now();
        Ok(self
            .repository
            .find_by_subject(subject)
            .await?
            .into_iter()
            .find(|s| self.is_enforced(s, now, ctx)))
    }

    /// Whether `subject` is blocked for this request.
    pub async fn is_subject_suspended(
        &self,
        subject: &SubjectReference,
        ctx: &RequestContext,
    ) -> AppResult<bool> {
        Ok(self.enforced_for_subject(subject, ctx).await?.is_some())
    }

    /// The first suspension whose criterion of `match_type` covers
    /// `candidate` and that applies to this request.
    pub async fn check_value(
        &self,
        match_type: &str,
        candidate: &str,
        ctx: &RequestContext,
    ) -> AppResult<Option<Suspension>> {
        if !self.matchers.contains(match_type) {
            tracing::warn!(match_type, "No matcher registered");
            return Ok(None);
        }

        let now = self.clock.now();
        let found = self
            .repository
            .find_by_match_type(match_type)
            .await?
            .into_iter()
            .find(|s| {
                s.criterion().is_some_and(|criterion| {
                    self.matchers
                        .matches(match_type, &criterion.match_value, candidate)
                }) && self.is_enforced(s, now, ctx)
            });

        if let Some(ref suspension) = found {
            tracing::debug!(
                suspension_id = suspension.id(),
                match_type,
                "Value matched suspension"
            );
        }

        Ok(found)
    }

    /// The first global suspension whose strategy applies to this request.
    pub async fn check_global(&self, ctx: &RequestContext) -> AppResult<Option<Suspension>> {
        let now = self.clock.now();
        Ok(self
            .repository
            .find_global()
            .await?
            .into_iter()
            .find(|s| self.is_enforced(s, now, ctx)))
    }

    fn is_enforced(&self, suspension: &Suspension, now: DateTime<Utc>, ctx: &RequestContext) -> bool {
        if !suspension.is_active_at(now) {
            return false;
        }

        match suspension.strategy_type() {
            None => true,
            Some(strategy_type) => match suspension.strategy_metadata() {
                Some(metadata) => self.strategies.evaluate(strategy_type, ctx, metadata),
                None => self.strategies.evaluate(strategy_type, ctx, &Metadata::new()),
            },
        }
    }

    fn check_reason(&self, reason: Option<String>) -> AppResult<Option<String>> {
        let Some(reason) = reason else {
            return Ok(None);
        };
        let reason = reason.trim();
        if reason.is_empty() {
            return Ok(None);
        }
        if reason.chars().count() > self.max_reason_length {
            return Err(AppError::Validation(format!(
                "Reason must be at most {} characters",
                self.max_reason_length
            )));
        }
        Ok(Some(reason.to_string()))
    }
}

fn check_reference(field: &str, reference: &SubjectReference) -> AppResult<()> {
    if reference.entity_type.trim().is_empty() || reference.entity_id.trim().is_empty() {
        return Err(AppError::Validation(format!(
            "{field} requires entityType and entityId"
        )));
    }
    Ok(())
}
