//! Caller-supplied predicate gate.

use std::sync::Arc;

use serde_json::Value;

use super::{Metadata, Strategy};
use crate::context::RequestContext;

/// Predicate signature accepted by [`ConditionalStrategy`].
pub type Predicate = dyn Fn(&RequestContext, &Metadata) -> Value + Send + Sync;

/// Coerce a predicate result to a boolean.
///
/// `null`, `false`, `0`, `""`, `"0"`, `[]` and `{}` are falsy; everything
/// else is truthy.
#[must_use]
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Wraps an application predicate, e.g. "only on the checkout path".
#[derive(Clone)]
pub struct ConditionalStrategy {
    identifier: String,
    predicate: Arc<Predicate>,
}

impl ConditionalStrategy {
    /// Default registry identifier.
    pub const IDENTIFIER: &'static str = "conditional";

    /// Register `predicate` under `identifier`.
    pub fn new<F>(identifier: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&RequestContext, &Metadata) -> Value + Send + Sync + 'static,
    {
        Self {
            identifier: identifier.into(),
            predicate: Arc::new(predicate),
        }
    }
}

impl Strategy for ConditionalStrategy {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    fn matches(&self, ctx: &RequestContext, metadata: &Metadata) -> bool {
        truthy(&(self.predicate)(ctx, metadata))
    }
}

impl std::fmt::Debug for ConditionalStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConditionalStrategy")
            .field("identifier", &self.identifier)
            .finish_non_exhaustive()
    }
}
