//! Suspension event publisher.
//!
//! Provides an abstraction for announcing suspension lifecycle changes.
//! Transport (pub/sub, webhooks, audit log) is supplied by the host.

use async_trait::async_trait;
use sanction_common::AppResult;
use std::sync::{Arc, Mutex};

use crate::suspension::{ActorReference, Suspension};

/// Lifecycle events emitted by the suspension service.
#[derive(Debug, Clone, PartialEq)]
pub enum SuspensionEvent {
    /// A suspension was created.
    Suspended {
        /// The stored record.
        suspension: Suspension,
    },
    /// A suspension was revoked.
    Revoked {
        /// The record after revocation.
        suspension: Suspension,
        /// Who revoked it, if recorded.
        revoked_by: Option<ActorReference>,
    },
}

impl SuspensionEvent {
    /// Event name, e.g. for a pub/sub channel suffix.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Suspended { .. } => "suspended",
            Self::Revoked { .. } => "revoked",
        }
    }

    /// The suspension the event concerns.
    #[must_use]
    pub const fn suspension(&self) -> &Suspension {
        match self {
            Self::Suspended { suspension } | Self::Revoked { suspension, .. } => suspension,
        }
    }
}

/// Trait for publishing suspension events.
///
/// This allows the service to announce changes without depending on the
/// delivery mechanism.
#[async_trait]
pub trait SuspensionEventPublisher: Send + Sync {
    /// Publish a suspension created event.
    async fn publish_suspended(&self, suspension: &Suspension) -> AppResult<()>;

    /// Publish a suspension revoked event.
    async fn publish_revoked(
        &self,
        suspension: &Suspension,
        revoked_by: Option<&ActorReference>,
    ) -> AppResult<()>;
}

/// A no-op publisher for when nothing listens.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl SuspensionEventPublisher for NoOpEventPublisher {
    async fn publish_suspended(&self, _suspension: &Suspension) -> AppResult<()> {
        Ok(())
    }

    async fn publish_revoked(
        &self,
        _suspension: &Suspension,
        _revoked_by: Option<&ActorReference>,
    ) -> AppResult<()> {
        Ok(())
    }
}

/// Keeps every published event in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingEventPublisher {
    events: Arc<Mutex<Vec<SuspensionEvent>>>,
}

impl RecordingEventPublisher {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Events published so far, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<SuspensionEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    fn push(&self, event: SuspensionEvent) {
        // A poisoned lock only means another recorder call panicked.
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event);
    }
}

#[async_trait]
impl SuspensionEventPublisher for RecordingEventPublisher {
    async fn publish_suspended(&self, suspension: &Suspension) -> AppResult<()> {
        self.push(SuspensionEvent::Suspended {
            suspension: suspension.clone(),
        });
        Ok(())
    }

    async fn publish_revoked(
        &self,
        suspension: &Suspension,
        revoked_by: Option<&ActorReference>,
    ) -> AppResult<()> {
        self.push(SuspensionEvent::Revoked {
            suspension: suspension.clone(),
            revoked_by: revoked_by.cloned(),
        });
        Ok(())
    }
}

/// Shared publisher handle.
pub type EventPublisherService = Arc<dyn SuspensionEventPublisher>;
