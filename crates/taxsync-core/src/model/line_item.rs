use super::{non_negative, text};
use crate::error::{Result, TaxError};
use serde::Deserialize;
use serde_json::Value;

/// A described amount: the shape shared by deductions and both credit kinds.
///
/// Wire row: `[description, amount]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "Vec<Value>")]
pub struct LineItem {
    pub description: String,
    pub amount: f64,
}

pub type Deduction = LineItem;
pub type Credit = LineItem;

impl LineItem {
    pub fn new(description: impl Into<String>, amount: f64) -> Self {
        Self {
            description: description.into(),
            amount,
        }
    }
}

impl TryFrom<Vec<Value>> for LineItem {
    type Error = TaxError;

    fn try_from(row: Vec<Value>) -> Result<Self> {
        if row.len() < 2 {
            return Err(TaxError::decode(format!(
                "line item row needs 2 cells, got {}",
                row.len()
            )));
        }
        Ok(Self {
            description: text(&row, 0, "description")?,
            amount: non_negative(&row, 1, "amount")?,
        })
    }
}
