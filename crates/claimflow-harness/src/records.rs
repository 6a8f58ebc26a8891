//! Record types flowing through the harness: synthetic employers and
//! employees feeding the DOR writers, and the claim records pushed through
//! the submitter.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// An employer as it appears in the DOR employer file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployerRecord {
    /// DOR account key, 11 digits.
    pub account_key: String,
    /// Federal employer identification number, 9 digits.
    pub fein: String,
    pub name: String,
    pub dba_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub family_exemption: bool,
    pub medical_exemption: bool,
    pub exemption_commence: Option<NaiveDate>,
    pub exemption_cease: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

/// An employee wage row in the DOR employee file, linked to its employer
/// by FEIN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRecord {
    pub first_name: String,
    pub last_name: String,
    /// Social security number, 9 digits.
    pub ssn: String,
    pub employer_fein: String,
    pub independent_contractor: bool,
    pub opt_in: bool,
    pub filing_period: NaiveDate,
    pub ytd_wages: Decimal,
    pub quarter_wages: Decimal,
    pub employee_medical: Decimal,
    pub employer_medical: Decimal,
    pub employee_family: Decimal,
    pub employer_family: Decimal,
}

/// A generated claim ready for portal submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_id: String,
    pub first_name: String,
    pub last_name: String,
    pub employee_ssn: String,
    pub employer_fein: String,
    pub leave_reason: String,
    pub leave_start: NaiveDate,
    pub leave_end: NaiveDate,
}

impl ClaimRecord {
    /// The claim shaped as the flow engine's context value, so a generated
    /// claim can be routed through a `claimflow_core::FlowGraph`.
    pub fn to_flow_claim(&self) -> serde_json::Value {
        json!({
            "first_name": self.first_name,
            "last_name": self.last_name,
            "tax_identifier": self.employee_ssn,
            "employment": {
                "status": "employed",
                "employer_fein": self.employer_fein,
            },
            "leave_details": {
                "reason": self.leave_reason,
                "start_date": self.leave_start.to_string(),
                "end_date": self.leave_end.to_string(),
            },
        })
    }
}

/// Employer pool indexed by FEIN; owns the referential side of the
/// employee-to-employer link.
#[derive(Debug, Clone, Default)]
pub struct EmployerPool {
    by_fein: HashMap<String, EmployerRecord>,
}

impl EmployerPool {
    pub fn new(employers: impl IntoIterator<Item = EmployerRecord>) -> Self {
        Self {
            by_fein: employers
                .into_iter()
                .map(|employer| (employer.fein.clone(), employer))
                .collect(),
        }
    }

    pub fn get(&self, fein: &str) -> Option<&EmployerRecord> {
        self.by_fein.get(fein)
    }

    pub fn len(&self) -> usize {
        self.by_fein.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_fein.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EmployerRecord> {
        self.by_fein.values()
    }
}
