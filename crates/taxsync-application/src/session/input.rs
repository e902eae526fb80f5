//! Local validation of user-entered values.
//!
//! Everything here runs before any request is issued; failures are
//! `Validation` errors and never reach the network layer.

use crate::actions::HOURS_REQUIRED_MESSAGE;
use taxsync_core::error::{Result, TaxError};

/// Trims a description and rejects it when empty.
pub fn description(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TaxError::validation("Description must not be empty."));
    }
    Ok(trimmed.to_string())
}

/// Parses a non-negative decimal. A leading `$` and thousands separators are accepted.
pub fn decimal(raw: &str, what: &str) -> Result<f64> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|c| *c != ',')
        .collect();

    let value: f64 = cleaned
        .parse()
        .map_err(|_| TaxError::validation(format!("{} must be a number, got '{}'.", what, raw.trim())))?;

    if !value.is_finite() || value < 0.0 {
        return Err(TaxError::validation(format!(
            "{} must be a non-negative number.",
            what
        )));
    }
    Ok(value)
}

/// Hours are required for hourly jobs and ignored (sent as zero) for salaried ones.
pub fn hours(is_salaried: bool, raw: Option<&str>) -> Result<f64> {
    if is_salaried {
        return Ok(0.0);
    }
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => decimal(value, "Hours"),
        _ => Err(TaxError::validation(HOURS_REQUIRED_MESSAGE)),
    }
}
