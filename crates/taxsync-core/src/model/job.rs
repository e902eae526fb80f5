use super::{non_negative, text};
use crate::error::{Result, TaxError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// How a job's wage figure is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobKind {
    /// `amount` is paid per period.
    Salary,
    /// `amount` is an hourly rate; `hours_per_period` applies.
    Hourly,
}

impl JobKind {
    pub fn is_salaried(self) -> bool {
        matches!(self, JobKind::Salary)
    }
}

impl FromStr for JobKind {
    type Err = TaxError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "salary" | "salaried" => Ok(JobKind::Salary),
            "hourly" => Ok(JobKind::Hourly),
            other => Err(TaxError::validation(format!(
                "Unknown job type '{}' (expected salary or hourly).",
                other
            ))),
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobKind::Salary => f.write_str("salary"),
            JobKind::Hourly => f.write_str("hourly"),
        }
    }
}

/// Result of resolving a pay-period label on the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodLookup {
    /// Number of pay periods per year.
    Periods(u32),
    /// The server did not recognize the label (wire sentinel `-1`).
    Invalid,
}

impl PeriodLookup {
    pub const INVALID_SENTINEL: i64 = -1;

    pub fn from_wire(raw: i64) -> Self {
        match u32::try_from(raw) {
            Ok(periods) if periods > 0 => PeriodLookup::Periods(periods),
            _ => PeriodLookup::Invalid,
        }
    }
}

/// One income source as stored by the server.
///
/// Wire row: `[description, isSalaried, amount, periodMultiplier, hours]`.
/// `isSalaried` may arrive as a boolean or as `0`/`1`; `hours` may be absent
/// and then defaults to zero. `periodMultiplier` is any positive number, or
/// `null` / `"A"` for "per year".
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<Value>")]
pub struct Job {
    pub description: String,
    pub is_salaried: bool,
    pub amount: f64,
    pub period_multiplier: f64,
    pub hours_per_period: f64,
}

impl Job {
    /// Multiplier a per-year sentinel decodes to.
    pub const PER_YEAR: f64 = 1.0;

    pub fn kind(&self) -> JobKind {
        if self.is_salaried {
            JobKind::Salary
        } else {
            JobKind::Hourly
        }
    }
}

impl TryFrom<Vec<Value>> for Job {
    type Error = TaxError;

    fn try_from(row: Vec<Value>) -> Result<Self> {
        if row.len() < 4 {
            return Err(TaxError::decode(format!(
                "job row needs at least 4 cells, got {}",
                row.len()
            )));
        }

        let is_salaried = match &row[1] {
            Value::Bool(flag) => *flag,
            Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
            _ => return Err(TaxError::decode("job salary flag must be a boolean or 0/1")),
        };

        let period_multiplier = match &row[3] {
            Value::Null => Self::PER_YEAR,
            Value::String(code) if code.eq_ignore_ascii_case("A") => Self::PER_YEAR,
            other => other
                .as_f64()
                .filter(|v| v.is_finite() && *v > 0.0)
                .ok_or_else(|| {
                    TaxError::decode("job period multiplier must be a positive number")
                })?,
        };

        let hours_per_period = if row.len() > 4 && !row[4].is_null() {
            non_negative(&row, 4, "job hours")?
        } else {
            0.0
        };

        Ok(Self {
            description: text(&row, 0, "job description")?,
            is_salaried,
            amount: non_negative(&row, 2, "job amount")?,
            period_multiplier,
            hours_per_period,
        })
    }
}
