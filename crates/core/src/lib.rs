//! Core suspension logic for sanction.
//!
//! - [`matchers`]: value matchers (email, IP/CIDR, phone, ...) and their registry
//! - [`strategies`]: request-time gates (time window, IP, country, ...) and their registry
//! - [`status`]: lifecycle status derivation
//! - [`suspension`]: the suspension record
//! - [`repositories`]: storage contract and an in-memory store
//! - [`services`]: creation, revocation and enforcement checks
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sanction_common::{AppResult, Config};
//! use sanction_core::{
//!     CreateSuspensionInput, HeaderDeviceResolver, HeaderIpResolver, MemorySuspensionRepository,
//!     NoGeoResolver, RequestContext, SuspensionService,
//! };
//!
//! async fn example() -> AppResult<()> {
//!     let service = SuspensionService::from_config(
//!         &Config::load()?,
//!         Arc::new(MemorySuspensionRepository::new()),
//!         Arc::new(HeaderIpResolver::default()),
//!         Arc::new(NoGeoResolver),
//!         Arc::new(HeaderDeviceResolver::default()),
//!     )?;
//!
//!     service
//!         .suspend(CreateSuspensionInput {
//!             match_type: Some("email".to_string()),
//!             match_value: Some("*@spam.example".to_string()),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let ctx = RequestContext::new("POST", "/signup");
//!     let blocked = service.check_value("email", "bot@spam.example", &ctx).await?;
//!     assert!(blocked.is_some());
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod context;
pub mod matchers;
pub mod repositories;
pub mod resolvers;
pub mod services;
pub mod status;
pub mod strategies;
pub mod suspension;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::RequestContext;
pub use matchers::{Matcher, MatcherRegistry};
pub use repositories::{MemorySuspensionRepository, SuspensionRepository};
pub use resolvers::{
    DeviceResolver, GeoLocation, GeoResolver, HeaderDeviceResolver, HeaderIpResolver,
    IpResolver, NoGeoResolver, RemoteAddrIpResolver, StaticGeoResolver,
};
pub use services::{
    CreateSuspensionInput, EventPublisherService, NoOpEventPublisher, RecordingEventPublisher,
    SuspensionEvent, SuspensionEventPublisher, SuspensionService,
};
pub use status::SuspensionStatus;
pub use strategies::{ConditionalStrategy, Metadata, Strategy, StrategyRegistry};
pub use suspension::{
    ActorReference, EntityReference, MatchCriterion, SubjectReference, Suspension,
};
