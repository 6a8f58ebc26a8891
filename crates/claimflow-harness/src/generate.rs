//! Synthetic employer/employee pools and claim records.
//!
//! Generators are seedable so a scenario can be regenerated byte-for-byte:
//! the same seed produces the same pool, which matters when a DOR file and a
//! submission run must agree on the population.

use chrono::{NaiveDate, Utc};
use fake::faker::address::en::{BuildingNumber, CityName, StateAbbr, StreetName};
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use crate::records::{ClaimRecord, EmployeeRecord, EmployerRecord};

// Contribution rates applied to quarterly wages.
const EMPLOYEE_MEDICAL_RATE: Decimal = dec!(0.0075);
const EMPLOYER_MEDICAL_RATE: Decimal = dec!(0.0045);
const EMPLOYEE_FAMILY_RATE: Decimal = dec!(0.0018);

const LEAVE_REASONS: [&str; 3] = ["medical", "bonding", "care"];

fn digits(rng: &mut StdRng, count: usize) -> String {
    let mut out = String::with_capacity(count);
    // Leading digit nonzero so identifiers keep their full width everywhere.
    out.push(char::from(b'1' + rng.gen_range(0..9u8)));
    for _ in 1..count {
        out.push(char::from(b'0' + rng.gen_range(0..10u8)));
    }
    out
}

pub struct EmployerGenerator {
    rng: StdRng,
}

impl EmployerGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn generate(&mut self) -> EmployerRecord {
        let name: String = CompanyName().fake_with_rng(&mut self.rng);
        let exempt = self.rng.gen_bool(0.05);
        let exemption_commence = exempt.then(|| NaiveDate::from_ymd_opt(2026, 1, 1)).flatten();
        let exemption_cease = exempt.then(|| NaiveDate::from_ymd_opt(2026, 12, 31)).flatten();
        EmployerRecord {
            account_key: digits(&mut self.rng, 11),
            fein: digits(&mut self.rng, 9),
            dba_name: name.clone(),
            name,
            street: format!(
                "{} {}",
                BuildingNumber().fake_with_rng::<String, _>(&mut self.rng),
                StreetName().fake_with_rng::<String, _>(&mut self.rng)
            ),
            city: CityName().fake_with_rng(&mut self.rng),
            state: StateAbbr().fake_with_rng(&mut self.rng),
            zip: digits(&mut self.rng, 9),
            country: "USA".to_string(),
            family_exemption: exempt,
            medical_exemption: exempt,
            exemption_commence,
            exemption_cease,
            updated_at: Utc::now(),
        }
    }

    pub fn pool(&mut self, count: usize) -> Vec<EmployerRecord> {
        (0..count).map(|_| self.generate()).collect()
    }
}

pub struct EmployeeGenerator {
    rng: StdRng,
    filing_period: NaiveDate,
}

impl EmployeeGenerator {
    pub fn new(seed: u64, filing_period: NaiveDate) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            filing_period,
        }
    }

    /// Generate one employee on the given employer's payroll.
    pub fn generate(&mut self, employer: &EmployerRecord) -> EmployeeRecord {
        let quarter_wages = Decimal::new(self.rng.gen_range(400_000..2_500_000), 2);
        let ytd_wages = quarter_wages * dec!(2);
        EmployeeRecord {
            first_name: FirstName().fake_with_rng(&mut self.rng),
            last_name: LastName().fake_with_rng(&mut self.rng),
            ssn: digits(&mut self.rng, 9),
            employer_fein: employer.fein.clone(),
            independent_contractor: self.rng.gen_bool(0.02),
            opt_in: self.rng.gen_bool(0.9),
            filing_period: self.filing_period,
            ytd_wages,
            quarter_wages,
            employee_medical: (quarter_wages * EMPLOYEE_MEDICAL_RATE).round_dp(2),
            employer_medical: (quarter_wages * EMPLOYER_MEDICAL_RATE).round_dp(2),
            employee_family: (quarter_wages * EMPLOYEE_FAMILY_RATE).round_dp(2),
            employer_family: dec!(0.00),
        }
    }

    /// Generate `count` employees spread randomly over the employer pool.
    /// An empty pool yields an empty vec.
    pub fn pool(&mut self, employers: &[EmployerRecord], count: usize) -> Vec<EmployeeRecord> {
        (0..count)
            .filter_map(|_| {
                let employer = employers.choose(&mut self.rng)?.clone();
                Some(self.generate(&employer))
            })
            .collect()
    }

    /// Turn an employee into a submittable claim record.
    pub fn claim(&mut self, employee: &EmployeeRecord) -> ClaimRecord {
        let reason = *LEAVE_REASONS
            .choose(&mut self.rng)
            .unwrap_or(&LEAVE_REASONS[0]);
        let start_offset = self.rng.gen_range(30..90);
        let duration_weeks = self.rng.gen_range(2..12);
        let leave_start = self.filing_period + chrono::Days::new(start_offset);
        let leave_end = leave_start + chrono::Days::new(duration_weeks * 7);
        ClaimRecord {
            claim_id: Uuid::new_v4().to_string(),
            first_name: employee.first_name.clone(),
            last_name: employee.last_name.clone(),
            employee_ssn: employee.ssn.clone(),
            employer_fein: employee.employer_fein.clone(),
            leave_reason: reason.to_string(),
            leave_start,
            leave_end,
        }
    }
}
