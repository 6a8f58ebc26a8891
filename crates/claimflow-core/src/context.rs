//! The data threaded through the flow machine: a claim-in-progress and the
//! user working on it.
//!
//! The claim and user models belong to external collaborators; the flow
//! engine treats both as opaque JSON values with a stable-but-unspecified
//! shape. Guards read them through defensive dotted-path lookups, so a
//! missing optional field is simply absent rather than an error.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowContext {
    pub claim: Value,
    pub user: Value,
}

impl FlowContext {
    pub fn new(claim: Value, user: Value) -> Self {
        Self { claim, user }
    }

    /// Context with an empty claim and user, the state of a brand-new session.
    pub fn empty() -> Self {
        Self {
            claim: Value::Object(Default::default()),
            user: Value::Object(Default::default()),
        }
    }

    /// Look up a dotted path (`"leave_details.reason"`) in the claim.
    pub fn claim_field(&self, path: &str) -> Option<&Value> {
        lookup(&self.claim, path)
    }

    /// Look up a dotted path in the user.
    pub fn user_field(&self, path: &str) -> Option<&Value> {
        lookup(&self.user, path)
    }

    /// Claim field coerced to a bool; absent or non-boolean reads as `false`.
    pub fn claim_flag(&self, path: &str) -> bool {
        self.claim_field(path).and_then(Value::as_bool).unwrap_or(false)
    }

    /// Claim field coerced to a string slice, if present.
    pub fn claim_str(&self, path: &str) -> Option<&str> {
        self.claim_field(path).and_then(Value::as_str)
    }

    /// True when the claim field exists and is neither `null` nor `""`.
    pub fn claim_has(&self, path: &str) -> bool {
        match self.claim_field(path) {
            Some(Value::Null) | None => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |value, key| value.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_lookup_is_defensive() {
        let ctx = FlowContext::new(
            json!({"leave_details": {"reason": "medical"}}),
            json!({}),
        );
        assert_eq!(ctx.claim_str("leave_details.reason"), Some("medical"));
        // Missing leaf, missing branch, and traversal through a scalar all
        // resolve to None instead of panicking.
        assert!(ctx.claim_field("leave_details.start_date").is_none());
        assert!(ctx.claim_field("employment.status").is_none());
        assert!(ctx.claim_field("leave_details.reason.inner").is_none());
    }

    #[test]
    fn flags_default_to_false() {
        let ctx = FlowContext::new(json!({"has_mailing_address": true}), json!({}));
        assert!(ctx.claim_flag("has_mailing_address"));
        assert!(!ctx.claim_flag("has_state_id"));
        assert!(!FlowContext::empty().claim_flag("has_mailing_address"));
    }

    #[test]
    fn presence_treats_null_and_empty_string_as_absent() {
        let ctx = FlowContext::new(
            json!({"first_name": "", "middle_name": null, "last_name": "Ames", "hours": 0}),
            json!({}),
        );
        assert!(!ctx.claim_has("first_name"));
        assert!(!ctx.claim_has("middle_name"));
        assert!(ctx.claim_has("last_name"));
        assert!(ctx.claim_has("hours"));
    }
}
