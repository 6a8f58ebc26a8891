//! Walks a claimant through a small application flow, printing the route
//! taken at each page and the step checklist at the end.
//!
//! Run with: cargo run -p claimflow-core --example claimant_flow

use claimflow_core::{FlowContext, FlowGraph, Transition};
use serde_json::json;

const CONTINUE: &str = "CONTINUE";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let graph = FlowGraph::builder("claims/start")
        .guard("is_medical_leave", |ctx: &FlowContext| {
            ctx.claim_str("leave_details.reason") == Some("medical")
        })
        .state("claims/start", "verify-id", ["first_name", "last_name"])
        .on(CONTINUE, [Transition::to("claims/leave-reason")])
        .state("claims/leave-reason", "leave-details", ["leave_details.reason"])
        .on(
            CONTINUE,
            [
                Transition::when("is_medical_leave", "claims/upload-certification"),
                Transition::to("claims/leave-dates"),
            ],
        )
        .state("claims/upload-certification", "leave-details", [])
        .on(CONTINUE, [Transition::to("claims/leave-dates")])
        .state(
            "claims/leave-dates",
            "leave-details",
            ["leave_details.start_date", "leave_details.end_date"],
        )
        .on(CONTINUE, [Transition::to("claims/review")])
        .state("claims/review", "review-and-confirm", [])
        .build()?;

    let ctx = FlowContext::new(
        json!({
            "first_name": "June",
            "last_name": "Okafor",
            "leave_details": {"reason": "medical", "start_date": "2026-09-01"}
        }),
        json!({"email_address": "june@example.com"}),
    );

    let mut route = graph.initial().clone();
    println!("-> {route}");
    loop {
        let next = graph.next_route(&route, CONTINUE, &ctx)?;
        if next == route {
            break;
        }
        println!("-> {next}");
        route = next;
    }

    println!("\nstep progress:");
    for progress in graph.step_progress(&ctx) {
        println!(
            "  {:<20} {:?} ({}/{})",
            progress.step.to_string(),
            progress.status,
            progress.completed_fields,
            progress.total_fields
        );
    }
    Ok(())
}
