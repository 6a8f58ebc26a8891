//! A generated claim must be routable by the portal's flow engine: the
//! harness exists to simulate real claimants, so its records have to carry
//! enough shape for the guards the routing table actually uses.

use chrono::NaiveDate;
use claimflow_core::{FlowContext, FlowGraph, Route, Transition};
use claimflow_harness::{EmployeeGenerator, EmployerGenerator};
use serde_json::json;

const CONTINUE: &str = "CONTINUE";

fn portal_flow() -> FlowGraph {
    FlowGraph::builder("claims/start")
        .guard("is_medical_leave", |ctx: &FlowContext| {
            ctx.claim_str("leave_details.reason") == Some("medical")
        })
        .guard("is_employed", |ctx: &FlowContext| {
            ctx.claim_str("employment.status") == Some("employed")
        })
        .state("claims/start", "verify-id", ["first_name", "last_name"])
        .on(CONTINUE, [Transition::to("claims/employment-status")])
        .state("claims/employment-status", "employment", ["employment.status"])
        .on(
            CONTINUE,
            [
                Transition::when("is_employed", "claims/employer-details"),
                Transition::to("claims/leave-reason"),
            ],
        )
        .state(
            "claims/employer-details",
            "employment",
            ["employment.employer_fein"],
        )
        .on(CONTINUE, [Transition::to("claims/leave-reason")])
        .state("claims/leave-reason", "leave-details", ["leave_details.reason"])
        .on(
            CONTINUE,
            [
                Transition::when("is_medical_leave", "claims/upload-certification"),
                Transition::to("claims/review"),
            ],
        )
        .state("claims/upload-certification", "leave-details", [])
        .on(CONTINUE, [Transition::to("claims/review")])
        .state("claims/review", "review-and-confirm", [])
        .build()
        .unwrap()
}

#[test]
fn generated_claims_route_all_the_way_to_review() {
    let graph = portal_flow();
    let employers = EmployerGenerator::new(23).pool(2);
    let mut gen = EmployeeGenerator::new(23, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());

    for employer in &employers {
        let employee = gen.generate(employer);
        let claim = gen.claim(&employee);
        let ctx = FlowContext::new(claim.to_flow_claim(), json!({}));

        let mut route = graph.initial().clone();
        let mut hops = 0;
        loop {
            let next = graph.next_route(&route, CONTINUE, &ctx).unwrap();
            if next == route {
                break;
            }
            route = next;
            hops += 1;
            assert!(hops < 32, "flow must terminate");
        }
        assert_eq!(route, Route::new("claims/review"));
    }
}

#[test]
fn generated_claims_always_take_the_employed_branch() {
    let graph = portal_flow();
    let employers = EmployerGenerator::new(4).pool(1);
    let mut gen = EmployeeGenerator::new(4, NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
    let employee = gen.generate(&employers[0]);
    let claim = gen.claim(&employee);
    let ctx = FlowContext::new(claim.to_flow_claim(), json!({}));

    let next = graph
        .next_route(&Route::new("claims/employment-status"), CONTINUE, &ctx)
        .unwrap();
    assert_eq!(next, Route::new("claims/employer-details"));
}
