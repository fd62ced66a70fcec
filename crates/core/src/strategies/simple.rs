//! Unconditional strategy.

use super::{Metadata, Strategy};
use crate::context::RequestContext;

/// Always applies. Used for suspensions without a conditional gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleStrategy;

impl SimpleStrategy {
    /// Registry identifier.
    pub const IDENTIFIER: &'static str = "simple";
}

impl Strategy for SimpleStrategy {
    fn identifier(&self) -> &str {
        Self::IDENTIFIER
    }

    fn matches(&self, _ctx: &RequestContext, _metadata: &Metadata) -> bool {
        true
    }
}
