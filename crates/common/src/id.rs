//! Suspension identifiers.

use std::time::SystemTime;

use ulid::Ulid;

/// Issues lowercase ULIDs for suspension records.
///
/// The timestamp half of a ULID comes from the caller so that identifiers
/// follow the service clock rather than the wall clock. History listings
/// then sort by creation without a secondary key.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdGenerator;

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Issue an ID stamped with `at`.
    #[must_use]
    pub fn generate_at(&self, at: SystemTime) -> String {
        Ulid::from_datetime(at).to_string().to_lowercase()
    }
}
