//! Per-step completion status, derived from which collected fields are
//! present on the claim. Drives the checklist/progress UI.

use serde::{Deserialize, Serialize};

use crate::context::FlowContext;
use crate::graph::{FlowGraph, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    NotStarted,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepProgress {
    pub step: Step,
    pub status: StepStatus,
    pub completed_fields: usize,
    pub total_fields: usize,
}

impl FlowGraph {
    /// Progress of every step, in step declaration order.
    ///
    /// A field counts as completed when the claim carries a non-null,
    /// non-empty value for it. A step that collects no fields (review pages,
    /// interstitials) reports `Completed` with zero totals.
    pub fn step_progress(&self, ctx: &FlowContext) -> Vec<StepProgress> {
        self.steps()
            .iter()
            .map(|step| {
                let mut total = 0;
                let mut completed = 0;
                for state in self.states().filter(|s| s.step() == step) {
                    for field in state.fields() {
                        total += 1;
                        if ctx.claim_has(field) {
                            completed += 1;
                        }
                    }
                }
                let status = if total == 0 || completed == total {
                    StepStatus::Completed
                } else if completed == 0 {
                    StepStatus::NotStarted
                } else {
                    StepStatus::InProgress
                };
                StepProgress {
                    step: step.clone(),
                    status,
                    completed_fields: completed,
                    total_fields: total,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Transition;
    use serde_json::json;

    fn graph() -> FlowGraph {
        FlowGraph::builder("name")
            .state("name", "verify-id", ["first_name", "last_name"])
            .on("CONTINUE", [Transition::to("address")])
            .state("address", "verify-id", ["address.line_1", "address.city"])
            .on("CONTINUE", [Transition::to("leave-reason")])
            .state("leave-reason", "leave-details", ["leave_details.reason"])
            .on("CONTINUE", [Transition::to("review")])
            .state("review", "review-and-confirm", [])
            .build()
            .unwrap()
    }

    #[test]
    fn statuses_follow_field_presence() {
        let ctx = FlowContext::new(
            json!({
                "first_name": "June",
                "last_name": "Okafor",
                "address": {"line_1": "12 Main St"}
            }),
            json!({}),
        );
        let progress = graph().step_progress(&ctx);
        assert_eq!(progress.len(), 3);

        assert_eq!(progress[0].step, Step::new("verify-id"));
        assert_eq!(progress[0].status, StepStatus::InProgress);
        assert_eq!(progress[0].completed_fields, 3);
        assert_eq!(progress[0].total_fields, 4);

        assert_eq!(progress[1].status, StepStatus::NotStarted);
        // No fields to collect on the review step.
        assert_eq!(progress[2].status, StepStatus::Completed);
    }

    #[test]
    fn all_fields_present_completes_the_step() {
        let ctx = FlowContext::new(
            json!({
                "first_name": "June",
                "last_name": "Okafor",
                "address": {"line_1": "12 Main St", "city": "Quincy"},
                "leave_details": {"reason": "medical"}
            }),
            json!({}),
        );
        let progress = graph().step_progress(&ctx);
        assert!(progress.iter().all(|p| p.status == StepStatus::Completed));
    }

    #[test]
    fn empty_claim_has_nothing_started() {
        let progress = graph().step_progress(&FlowContext::empty());
        assert_eq!(progress[0].status, StepStatus::NotStarted);
        assert_eq!(progress[1].status, StepStatus::NotStarted);
    }
}
