//! Domain records mirrored from the remote service.
//!
//! Collections arrive as ordered lists of positional rows; the types here
//! decode those rows and nothing else. All tax arithmetic stays on the server.

mod collection;
mod filing_status;
mod job;
mod line_item;
mod tax_result;

pub use collection::Collection;
pub use filing_status::{FilingStatus, StatusNames};
pub use job::{Job, JobKind, PeriodLookup};
pub use line_item::{Credit, Deduction, LineItem};
pub use tax_result::TaxResult;

use crate::error::{Result, TaxError};
use serde_json::Value;

/// Reads a non-negative decimal out of a wire row cell.
pub(crate) fn non_negative(row: &[Value], index: usize, what: &str) -> Result<f64> {
    let value = row
        .get(index)
        .and_then(Value::as_f64)
        .ok_or_else(|| TaxError::decode(format!("{} must be a number", what)))?;
    if value < 0.0 {
        return Err(TaxError::decode(format!("{} must not be negative", what)));
    }
    Ok(value)
}

pub(crate) fn text(row: &[Value], index: usize, what: &str) -> Result<String> {
    row.get(index)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| TaxError::decode(format!("{} must be a string", what)))
}
