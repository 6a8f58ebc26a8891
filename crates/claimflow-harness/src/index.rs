//! Delimited CSV companions to the fixed-width DOR files, for human review.
//! Same streaming contract as the DOR writers: one line per record, no
//! whole-input buffering.

use futures::{pin_mut, Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::HarnessError;
use crate::records::{EmployeeRecord, EmployerRecord};

const EMPLOYER_HEADER: &str = "account_key,name,fein,street,city,state,zip,country,dba_name,\
family_exemption,medical_exemption,exemption_commence,exemption_cease,updated_at";

const EMPLOYEE_HEADER: &str = "ssn,first_name,last_name,employer_fein,independent_contractor,\
opt_in,filing_period,ytd_wages,quarter_wages,employee_medical,employer_medical,\
employee_family,employer_family";

/// Quote a field only when it contains a delimiter, quote, or newline.
fn field(value: &str) -> String {
    if value.contains(&['"', ',', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn employer_row(employer: &EmployerRecord) -> String {
    let date = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    [
        field(&employer.account_key),
        field(&employer.name),
        field(&employer.fein),
        field(&employer.street),
        field(&employer.city),
        field(&employer.state),
        field(&employer.zip),
        field(&employer.country),
        field(&employer.dba_name),
        employer.family_exemption.to_string(),
        employer.medical_exemption.to_string(),
        date(employer.exemption_commence),
        date(employer.exemption_cease),
        employer.updated_at.to_rfc3339(),
    ]
    .join(",")
}

fn employee_row(employee: &EmployeeRecord) -> String {
    [
        field(&employee.ssn),
        field(&employee.first_name),
        field(&employee.last_name),
        field(&employee.employer_fein),
        employee.independent_contractor.to_string(),
        employee.opt_in.to_string(),
        employee.filing_period.to_string(),
        employee.ytd_wages.to_string(),
        employee.quarter_wages.to_string(),
        employee.employee_medical.to_string(),
        employee.employer_medical.to_string(),
        employee.employee_family.to_string(),
        employee.employer_family.to_string(),
    ]
    .join(",")
}

/// Stream employers into a CSV index. Returns the number of data rows.
pub async fn write_employer_index<S, W>(employers: S, mut out: W) -> Result<usize, HarnessError>
where
    S: Stream<Item = EmployerRecord>,
    W: AsyncWrite + Unpin,
{
    pin_mut!(employers);
    out.write_all(EMPLOYER_HEADER.as_bytes()).await?;
    out.write_all(b"\n").await?;
    let mut written = 0usize;
    while let Some(employer) = employers.next().await {
        let mut row = employer_row(&employer);
        row.push('\n');
        out.write_all(row.as_bytes()).await?;
        written += 1;
    }
    out.flush().await?;
    tracing::info!(records = written, "wrote employer index");
    Ok(written)
}

/// Stream employee wage rows into a CSV index. Returns the number of data rows.
pub async fn write_employee_index<S, W>(employees: S, mut out: W) -> Result<usize, HarnessError>
where
    S: Stream<Item = EmployeeRecord>,
    W: AsyncWrite + Unpin,
{
    pin_mut!(employees);
    out.write_all(EMPLOYEE_HEADER.as_bytes()).await?;
    out.write_all(b"\n").await?;
    let mut written = 0usize;
    while let Some(employee) = employees.next().await {
        let mut row = employee_row(&employee);
        row.push('\n');
        out.write_all(row.as_bytes()).await?;
        written += 1;
    }
    out.flush().await?;
    tracing::info!(records = written, "wrote employee index");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal_macros::dec;

    #[test]
    fn commas_and_quotes_are_escaped() {
        assert_eq!(field("Acme, Inc."), "\"Acme, Inc.\"");
        assert_eq!(field("The \"Best\" Co"), "\"The \"\"Best\"\" Co\"");
        assert_eq!(field("Plain Co"), "Plain Co");
    }

    #[tokio::test]
    async fn employer_index_has_header_and_rows() {
        let employer = EmployerRecord {
            account_key: "00000000001".into(),
            fein: "041234567".into(),
            name: "Acme, Inc.".into(),
            dba_name: "Acme".into(),
            street: "1 Elm St".into(),
            city: "Quincy".into(),
            state: "MA".into(),
            zip: "021690000".into(),
            country: "USA".into(),
            family_exemption: false,
            medical_exemption: false,
            exemption_commence: None,
            exemption_cease: None,
            updated_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 0, 0).unwrap(),
        };
        let mut out = Vec::new();
        let written = write_employer_index(futures::stream::iter(vec![employer]), &mut out)
            .await
            .unwrap();
        assert_eq!(written, 1);
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(EMPLOYER_HEADER));
        let row = lines.next().unwrap();
        assert!(row.starts_with("00000000001,\"Acme, Inc.\",041234567,"));
    }

    #[tokio::test]
    async fn employee_index_preserves_amount_text() {
        let employee = EmployeeRecord {
            first_name: "June".into(),
            last_name: "Okafor".into(),
            ssn: "123456789".into(),
            employer_fein: "041234567".into(),
            independent_contractor: false,
            opt_in: true,
            filing_period: NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            ytd_wages: dec!(24000.00),
            quarter_wages: dec!(12000.00),
            employee_medical: dec!(90.00),
            employer_medical: dec!(54.00),
            employee_family: dec!(21.60),
            employer_family: dec!(0.00),
        };
        let mut out = Vec::new();
        write_employee_index(futures::stream::iter(vec![employee]), &mut out)
            .await
            .unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.lines().nth(1).unwrap().contains("12000.00"));
    }
}
