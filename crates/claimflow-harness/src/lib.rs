//! E2E harness: synthetic employer/employee generation, fixed-width DOR and
//! CSV index writers, and a backoff-controlled batch submitter for driving
//! load and correctness tests against the claims backend.

pub mod backoff;
pub mod dor;
pub mod error;
pub mod generate;
pub mod index;
pub mod records;
pub mod submit;
pub mod tracker;

pub use backoff::{BackoffPolicy, Outcome, DEFAULT_BASE_DELAY, TIER_MULTIPLIERS};
pub use dor::{
    format_employee_line, format_employer_line, parse_employee_line, parse_employer_line,
    write_employee_file, write_employer_file,
};
pub use error::HarnessError;
pub use generate::{EmployeeGenerator, EmployerGenerator};
pub use index::{write_employee_index, write_employer_index};
pub use records::{ClaimRecord, EmployeeRecord, EmployerPool, EmployerRecord};
pub use submit::{
    SubmissionClient, SubmissionReceipt, Submitter, SubmitterConfig, SubmitterReport,
};
pub use tracker::{ClaimState, ClaimStateTracker, JsonFileTracker, MemoryTracker};
