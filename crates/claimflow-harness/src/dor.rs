//! Fixed-width DOR file writers and the matching fixed-offset parsers.
//!
//! The byte layout is the contract: the downstream tax ETL parses these
//! files by column offset, so every width and date format here must match
//! the consuming system exactly. String fields are right-padded with spaces
//! to their column width and truncated when longer; amounts are fixed-point
//! decimals with two digits, left-padded with spaces; flags are one byte
//! `Y`/`N`; dates are `yyyyMMdd` and timestamps `yyyyMMddHHmmss`.
//!
//! Writers are streaming transforms: one formatted line per input record,
//! never buffering the whole input. A wage record referencing an employer
//! missing from the pool aborts the write immediately and leaves the
//! partially written file for the caller to clean up.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use futures::{pin_mut, Stream, StreamExt};
use rust_decimal::Decimal;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::HarnessError;
use crate::records::{EmployeeRecord, EmployerPool, EmployerRecord};

/// Column widths and formats of the DOR interchange layout.
pub mod layout {
    pub const ACCOUNT_KEY: usize = 11;
    pub const EMPLOYER_NAME: usize = 255;
    pub const FEIN: usize = 9;
    pub const STREET: usize = 255;
    pub const CITY: usize = 30;
    pub const STATE: usize = 2;
    pub const ZIP: usize = 9;
    pub const COUNTRY: usize = 3;
    pub const DBA_NAME: usize = 255;
    pub const FIRST_NAME: usize = 255;
    pub const LAST_NAME: usize = 255;
    pub const SSN: usize = 9;
    pub const FLAG: usize = 1;
    pub const DATE: usize = 8;
    pub const TIMESTAMP: usize = 14;
    pub const AMOUNT: usize = 20;

    pub const DATE_FORMAT: &str = "%Y%m%d";
    pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

    /// Width of one employer line, excluding the newline.
    pub const EMPLOYER_LINE: usize = ACCOUNT_KEY
        + EMPLOYER_NAME
        + FEIN
        + STREET
        + CITY
        + STATE
        + ZIP
        + COUNTRY
        + DBA_NAME
        + 2 * FLAG
        + 2 * DATE
        + TIMESTAMP;

    /// Width of one employee wage line, excluding the newline.
    pub const EMPLOYEE_LINE: usize =
        ACCOUNT_KEY + DATE + FIRST_NAME + LAST_NAME + SSN + 2 * FLAG + 6 * AMOUNT;
}

/// Right-pad to `width` with spaces, truncating when longer. Non-ASCII
/// characters are replaced so the byte width always equals the column width.
fn text(value: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    for c in value.chars().take(width) {
        out.push(if c.is_ascii() { c } else { '?' });
    }
    while out.len() < width {
        out.push(' ');
    }
    out
}

/// Fixed-point decimal with two digits, left-padded with spaces.
fn amount(value: Decimal, width: usize) -> String {
    format!("{:>width$}", format!("{:.2}", value.round_dp(2)))
}

fn flag(value: bool) -> char {
    if value {
        'Y'
    } else {
        'N'
    }
}

fn date(value: Option<NaiveDate>) -> String {
    match value {
        Some(d) => d.format(layout::DATE_FORMAT).to_string(),
        None => " ".repeat(layout::DATE),
    }
}

fn timestamp(value: DateTime<Utc>) -> String {
    value.format(layout::TIMESTAMP_FORMAT).to_string()
}

/// Format one employer line, without the trailing newline.
pub fn format_employer_line(employer: &EmployerRecord) -> String {
    let mut line = String::with_capacity(layout::EMPLOYER_LINE);
    line.push_str(&text(&employer.account_key, layout::ACCOUNT_KEY));
    line.push_str(&text(&employer.name, layout::EMPLOYER_NAME));
    line.push_str(&text(&employer.fein, layout::FEIN));
    line.push_str(&text(&employer.street, layout::STREET));
    line.push_str(&text(&employer.city, layout::CITY));
    line.push_str(&text(&employer.state, layout::STATE));
    line.push_str(&text(&employer.zip, layout::ZIP));
    line.push_str(&text(&employer.country, layout::COUNTRY));
    line.push_str(&text(&employer.dba_name, layout::DBA_NAME));
    line.push(flag(employer.family_exemption));
    line.push(flag(employer.medical_exemption));
    line.push_str(&date(employer.exemption_commence));
    line.push_str(&date(employer.exemption_cease));
    line.push_str(&timestamp(employer.updated_at));
    line
}

/// Format one employee wage line, without the trailing newline. The account
/// key comes from the employer the wage row belongs to.
pub fn format_employee_line(account_key: &str, employee: &EmployeeRecord) -> String {
    let mut line = String::with_capacity(layout::EMPLOYEE_LINE);
    line.push_str(&text(account_key, layout::ACCOUNT_KEY));
    line.push_str(&date(Some(employee.filing_period)));
    line.push_str(&text(&employee.first_name, layout::FIRST_NAME));
    line.push_str(&text(&employee.last_name, layout::LAST_NAME));
    line.push_str(&text(&employee.ssn, layout::SSN));
    line.push(flag(employee.independent_contractor));
    line.push(flag(employee.opt_in));
    line.push_str(&amount(employee.ytd_wages, layout::AMOUNT));
    line.push_str(&amount(employee.quarter_wages, layout::AMOUNT));
    line.push_str(&amount(employee.employee_medical, layout::AMOUNT));
    line.push_str(&amount(employee.employer_medical, layout::AMOUNT));
    line.push_str(&amount(employee.employee_family, layout::AMOUNT));
    line.push_str(&amount(employee.employer_family, layout::AMOUNT));
    line
}

/// Stream employers into the fixed-width employer file. Returns the number
/// of records written.
pub async fn write_employer_file<S, W>(employers: S, mut out: W) -> Result<usize, HarnessError>
where
    S: Stream<Item = EmployerRecord>,
    W: AsyncWrite + Unpin,
{
    pin_mut!(employers);
    let mut written = 0usize;
    while let Some(employer) = employers.next().await {
        let mut line = format_employer_line(&employer);
        line.push('\n');
        out.write_all(line.as_bytes()).await?;
        written += 1;
    }
    out.flush().await?;
    tracing::info!(records = written, "wrote DOR employer file");
    Ok(written)
}

/// Stream employee wage rows into the fixed-width employee file, resolving
/// each row's account key through the employer pool. Returns the number of
/// records written.
pub async fn write_employee_file<S, W>(
    employees: S,
    pool: &EmployerPool,
    mut out: W,
) -> Result<usize, HarnessError>
where
    S: Stream<Item = EmployeeRecord>,
    W: AsyncWrite + Unpin,
{
    pin_mut!(employees);
    let mut written = 0usize;
    while let Some(employee) = employees.next().await {
        let employer = pool.get(&employee.employer_fein).ok_or_else(|| {
            HarnessError::UnknownEmployer {
                ssn: employee.ssn.clone(),
                fein: employee.employer_fein.clone(),
            }
        })?;
        let mut line = format_employee_line(&employer.account_key, &employee);
        line.push('\n');
        out.write_all(line.as_bytes()).await?;
        written += 1;
    }
    out.flush().await?;
    tracing::info!(records = written, "wrote DOR employee file");
    Ok(written)
}

/// Cursor over one fixed-width line, slicing fields by byte offset.
struct Columns<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Columns<'a> {
    fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    fn take(&mut self, width: usize) -> Result<&'a str, HarnessError> {
        let field = self
            .line
            .get(self.pos..self.pos + width)
            .ok_or_else(|| HarnessError::MalformedLine(self.line.to_string()))?;
        self.pos += width;
        Ok(field)
    }

    fn take_text(&mut self, width: usize) -> Result<String, HarnessError> {
        Ok(self.take(width)?.trim_end().to_string())
    }

    fn take_flag(&mut self) -> Result<bool, HarnessError> {
        Ok(self.take(layout::FLAG)? == "Y")
    }

    fn take_date(&mut self) -> Result<Option<NaiveDate>, HarnessError> {
        let field = self.take(layout::DATE)?;
        if field.trim().is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(field, layout::DATE_FORMAT)
            .map(Some)
            .map_err(|_| HarnessError::MalformedLine(self.line.to_string()))
    }

    fn take_timestamp(&mut self) -> Result<DateTime<Utc>, HarnessError> {
        let field = self.take(layout::TIMESTAMP)?;
        NaiveDateTime::parse_from_str(field, layout::TIMESTAMP_FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(|_| HarnessError::MalformedLine(self.line.to_string()))
    }

    fn take_amount(&mut self) -> Result<Decimal, HarnessError> {
        self.take(layout::AMOUNT)?
            .trim()
            .parse::<Decimal>()
            .map_err(|_| HarnessError::MalformedLine(self.line.to_string()))
    }
}

/// Recover an employer record from one fixed-width line (values modulo
/// padding and truncation).
pub fn parse_employer_line(line: &str) -> Result<EmployerRecord, HarnessError> {
    let mut columns = Columns::new(line);
    Ok(EmployerRecord {
        account_key: columns.take_text(layout::ACCOUNT_KEY)?,
        name: columns.take_text(layout::EMPLOYER_NAME)?,
        fein: columns.take_text(layout::FEIN)?,
        street: columns.take_text(layout::STREET)?,
        city: columns.take_text(layout::CITY)?,
        state: columns.take_text(layout::STATE)?,
        zip: columns.take_text(layout::ZIP)?,
        country: columns.take_text(layout::COUNTRY)?,
        dba_name: columns.take_text(layout::DBA_NAME)?,
        family_exemption: columns.take_flag()?,
        medical_exemption: columns.take_flag()?,
        exemption_commence: columns.take_date()?,
        exemption_cease: columns.take_date()?,
        updated_at: columns.take_timestamp()?,
    })
}

/// Recover `(account_key, employee)` from one fixed-width wage line.
pub fn parse_employee_line(line: &str) -> Result<(String, EmployeeRecord), HarnessError> {
    let mut columns = Columns::new(line);
    let account_key = columns.take_text(layout::ACCOUNT_KEY)?;
    let filing_period = columns
        .take_date()?
        .ok_or_else(|| HarnessError::MalformedLine(line.to_string()))?;
    let employee = EmployeeRecord {
        first_name: columns.take_text(layout::FIRST_NAME)?,
        last_name: columns.take_text(layout::LAST_NAME)?,
        ssn: columns.take_text(layout::SSN)?,
        // The wage line carries the account key, not the FEIN; callers join
        // back to the employer through the pool when they need it.
        employer_fein: String::new(),
        independent_contractor: columns.take_flag()?,
        opt_in: columns.take_flag()?,
        filing_period,
        ytd_wages: columns.take_amount()?,
        quarter_wages: columns.take_amount()?,
        employee_medical: columns.take_amount()?,
        employer_medical: columns.take_amount()?,
        employee_family: columns.take_amount()?,
        employer_family: columns.take_amount()?,
    };
    Ok((account_key, employee))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn employer() -> EmployerRecord {
        EmployerRecord {
            account_key: "00000000001".into(),
            fein: "041234567".into(),
            name: "Wayne Enterprises".into(),
            dba_name: "Wayne".into(),
            street: "1007 Mountain Drive".into(),
            city: "Gotham".into(),
            state: "MA".into(),
            zip: "021101234".into(),
            country: "USA".into(),
            family_exemption: false,
            medical_exemption: true,
            exemption_commence: NaiveDate::from_ymd_opt(2026, 1, 1),
            exemption_cease: None,
            updated_at: Utc.with_ymd_and_hms(2026, 3, 14, 9, 26, 53).unwrap(),
        }
    }

    fn employee() -> EmployeeRecord {
        EmployeeRecord {
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
        }
    }

    #[test]
    fn employer_line_has_the_contractual_width() {
        assert_eq!(format_employer_line(&employer()).len(), layout::EMPLOYER_LINE);
    }

    #[test]
    fn employee_line_has_the_contractual_width() {
        let line = format_employee_line("00000000001", &employee());
        assert_eq!(line.len(), layout::EMPLOYEE_LINE);
    }

    #[test]
    fn short_name_is_right_padded_not_truncated() {
        let line = format_employer_line(&employer());
        let name = &line[layout::ACCOUNT_KEY..layout::ACCOUNT_KEY + layout::EMPLOYER_NAME];
        assert!(name.starts_with("Wayne Enterprises"));
        assert_eq!(name.len(), layout::EMPLOYER_NAME);
        assert!(name.ends_with(' '));
    }

    #[test]
    fn long_name_is_truncated_not_overflowed() {
        let mut record = employer();
        record.name = "X".repeat(layout::EMPLOYER_NAME + 40);
        let line = format_employer_line(&record);
        assert_eq!(line.len(), layout::EMPLOYER_LINE);
        let name = &line[layout::ACCOUNT_KEY..layout::ACCOUNT_KEY + layout::EMPLOYER_NAME];
        assert_eq!(name, "X".repeat(layout::EMPLOYER_NAME));
    }

    #[test]
    fn dates_and_timestamps_use_the_interchange_formats() {
        let line = format_employer_line(&employer());
        assert!(line.ends_with("20260101        20260314092653"));
    }

    #[test]
    fn amounts_are_left_padded_fixed_point() {
        assert_eq!(amount(dec!(12000), 20), "            12000.00");
        assert_eq!(amount(dec!(0.5), 20), "                0.50");
        assert_eq!(amount(dec!(21.604), 20), "               21.60");
    }

    #[test]
    fn employer_round_trips_through_offset_slicing() {
        let record = employer();
        let parsed = parse_employer_line(&format_employer_line(&record)).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn employee_round_trips_through_offset_slicing() {
        let record = employee();
        let line = format_employee_line("00000000001", &record);
        let (account_key, parsed) = parse_employee_line(&line).unwrap();
        assert_eq!(account_key, "00000000001");
        // The FEIN never appears on the wage line; everything else survives.
        let mut expected = record;
        expected.employer_fein = String::new();
        assert_eq!(parsed, expected);
    }

    #[test]
    fn truncated_line_is_malformed() {
        let line = format_employer_line(&employer());
        let err = parse_employer_line(&line[..line.len() / 2]).unwrap_err();
        assert!(matches!(err, HarnessError::MalformedLine(_)));
    }

    #[tokio::test]
    async fn writers_emit_one_line_per_record() {
        let employers = vec![employer(), employer()];
        let pool = EmployerPool::new(employers.clone());
        let mut employer_out = Vec::new();
        let written = write_employer_file(futures::stream::iter(employers), &mut employer_out)
            .await
            .unwrap();
        assert_eq!(written, 2);
        let lines: Vec<&str> = std::str::from_utf8(&employer_out)
            .unwrap()
            .lines()
            .collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|l| l.len() == layout::EMPLOYER_LINE));

        let mut employee_out = Vec::new();
        let written = write_employee_file(
            futures::stream::iter(vec![employee()]),
            &pool,
            &mut employee_out,
        )
        .await
        .unwrap();
        assert_eq!(written, 1);
    }

    #[tokio::test]
    async fn unknown_employer_aborts_the_employee_write() {
        let pool = EmployerPool::new(vec![employer()]);
        let mut orphan = employee();
        orphan.employer_fein = "999999999".into();
        let mut out = Vec::new();
        let err = write_employee_file(
            futures::stream::iter(vec![employee(), orphan]),
            &pool,
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, HarnessError::UnknownEmployer { .. }));
        // The first record was already flushed out; the partial file stays.
        assert_eq!(out.len(), layout::EMPLOYEE_LINE + 1);
    }
}
