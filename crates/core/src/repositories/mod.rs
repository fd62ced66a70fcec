//! Suspension storage.

pub mod suspension;

pub use suspension::{MemorySuspensionRepository, SuspensionRepository};
