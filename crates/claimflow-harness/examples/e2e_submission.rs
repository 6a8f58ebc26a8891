//! Full harness run: generate a synthetic population, write the DOR files
//! and CSV indexes, then push the generated claims through a stub portal
//! client with the tracker persisted to disk.
//!
//! Run with: cargo run -p claimflow-harness --example e2e_submission

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use claimflow_harness::{
    write_employee_file, write_employer_file, write_employer_index, ClaimRecord,
    EmployeeGenerator, EmployerGenerator, EmployerPool, HarnessError, JsonFileTracker,
    SubmissionClient, SubmissionReceipt, Submitter, SubmitterConfig,
};
use futures::stream;
use tokio::io::BufWriter;

/// Stand-in for the real portal client: accepts most claims, rejects a few.
struct StubPortal {
    attempts: AtomicUsize,
}

#[async_trait]
impl SubmissionClient for StubPortal {
    async fn submit(&self, claim: &ClaimRecord) -> Result<SubmissionReceipt, HarnessError> {
        let n = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if n % 7 == 0 {
            Err(HarnessError::Submission("portal timed out".into()))
        } else {
            Ok(SubmissionReceipt {
                case_id: format!("NTN-{n:06}"),
            })
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let out_dir = std::env::temp_dir().join("claimflow-e2e");
    std::fs::create_dir_all(&out_dir)?;
    let filing_period = NaiveDate::from_ymd_opt(2026, 3, 31).expect("valid date");

    // Synthetic population.
    let employers = EmployerGenerator::new(2026).pool(10);
    let pool = EmployerPool::new(employers.clone());
    let mut employee_gen = EmployeeGenerator::new(2026, filing_period);
    let employees = employee_gen.pool(&employers, 100);
    let claims: Vec<ClaimRecord> = employees
        .iter()
        .take(20)
        .map(|employee| employee_gen.claim(employee))
        .collect();

    // DOR files plus the human-readable index.
    let employer_file = tokio::fs::File::create(out_dir.join("DORDFMLEMP_20260331120000")).await?;
    write_employer_file(stream::iter(employers.clone()), BufWriter::new(employer_file)).await?;
    let employee_file = tokio::fs::File::create(out_dir.join("DORDFML_20260331120000")).await?;
    write_employee_file(stream::iter(employees), &pool, BufWriter::new(employee_file)).await?;
    let index_file = tokio::fs::File::create(out_dir.join("employers.csv")).await?;
    write_employer_index(stream::iter(employers), BufWriter::new(index_file)).await?;

    // Submission with a persisted tracker; rerunning the example skips
    // everything already submitted.
    let mut tracker = JsonFileTracker::open(out_dir.join("claims.json"))?;
    let submitter = Submitter::new(
        StubPortal {
            attempts: AtomicUsize::new(0),
        },
        SubmitterConfig {
            concurrency: 3,
            base_delay: Duration::from_millis(250),
            failure_budget: 3,
        },
    );
    let report = submitter
        .run(stream::iter(claims), &mut tracker, |claim, receipt| async move {
            println!("registered {} as {}", claim.claim_id, receipt.case_id);
            Ok(())
        })
        .await?;

    println!(
        "done: {} submitted, {} failed, {} skipped (state in {})",
        report.submitted,
        report.failed,
        report.skipped,
        out_dir.display()
    );
    Ok(())
}
