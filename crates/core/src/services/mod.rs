//! Business logic services.

#![allow(missing_docs)]

pub mod event_publisher;
pub mod suspension;

pub use event_publisher::{
    EventPublisherService, NoOpEventPublisher, RecordingEventPublisher, SuspensionEvent,
    SuspensionEventPublisher,
};
pub use suspension::{CreateSuspensionInput, SuspensionService};
