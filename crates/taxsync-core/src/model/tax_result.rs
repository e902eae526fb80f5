use serde::{Deserialize, Serialize};

/// Server-computed estimate returned by `calculate`.
///
/// The client never derives or adjusts these figures.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaxResult {
    pub gross_income: f64,
    pub taxable_income: f64,
    pub fica_tax: f64,
    pub income_tax: f64,
    pub refundable_credits: f64,
    pub total_tax: f64,
}
