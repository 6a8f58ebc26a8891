//! Named guard predicates and the registry that resolves them.
//!
//! Transitions reference guards by name so the routing table stays purely
//! declarative and the predicates stay independently testable. Guards must be
//! pure functions of the [`FlowContext`]; they read the claim and user through
//! defensive lookups and never mutate either.

use std::collections::HashMap;
use std::sync::Arc;

use crate::context::FlowContext;
use crate::error::FlowError;

/// A guard predicate over the flow context.
pub type GuardFn = Arc<dyn Fn(&FlowContext) -> bool + Send + Sync>;

/// Resolves guard names to predicates.
///
/// The graph builder validates every referenced name against this at build
/// time, so `evaluate` on an unknown name is unreachable in a validated
/// graph but still reported as an error rather than a panic.
pub trait GuardRegistry: Send + Sync {
    fn contains(&self, name: &str) -> bool;
    fn evaluate(&self, name: &str, ctx: &FlowContext) -> Result<bool, FlowError>;
}

/// `HashMap`-backed registry, the default implementation.
#[derive(Clone, Default)]
pub struct GuardSet {
    guards: HashMap<String, GuardFn>,
}

impl GuardSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a predicate under `name`, replacing any previous entry.
    pub fn register<F>(mut self, name: impl Into<String>, guard: F) -> Self
    where
        F: Fn(&FlowContext) -> bool + Send + Sync + 'static,
    {
        self.guards.insert(name.into(), Arc::new(guard));
        self
    }

    pub fn len(&self) -> usize {
        self.guards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guards.is_empty()
    }
}

impl GuardRegistry for GuardSet {
    fn contains(&self, name: &str) -> bool {
        self.guards.contains_key(name)
    }

    fn evaluate(&self, name: &str, ctx: &FlowContext) -> Result<bool, FlowError> {
        let guard = self.guards.get(name).ok_or_else(|| FlowError::UnknownGuard {
            route: String::new(),
            guard: name.to_string(),
        })?;
        Ok(guard(ctx))
    }
}

impl std::fmt::Debug for GuardSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.guards.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("GuardSet").field("guards", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn registered_guard_evaluates_against_context() {
        let guards = GuardSet::new()
            .register("is_medical_leave", |ctx: &FlowContext| {
                ctx.claim_str("leave_details.reason") == Some("medical")
            });
        let medical = FlowContext::new(json!({"leave_details": {"reason": "medical"}}), json!({}));
        let empty = FlowContext::empty();

        assert!(guards.evaluate("is_medical_leave", &medical).unwrap());
        // Defensive lookup: absent field means the guard is simply false.
        assert!(!guards.evaluate("is_medical_leave", &empty).unwrap());
    }

    #[test]
    fn unknown_guard_is_an_error_not_a_panic() {
        let guards = GuardSet::new();
        let err = guards
            .evaluate("never_registered", &FlowContext::empty())
            .unwrap_err();
        assert!(matches!(err, FlowError::UnknownGuard { .. }));
    }
}
