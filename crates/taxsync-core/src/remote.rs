//! Remote calculation service seam.
//!
//! The tax service owns all arithmetic; the client only names an operation,
//! hands over scalar parameters and gets a mapping of fields back. This module
//! defines that contract. The HTTP implementation lives in
//! `taxsync-interaction`.

use crate::error::{Result, TaxError};
use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Access semantics of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// Parameters travel in the query string.
    Read,
    /// Parameters travel as a JSON body.
    Write,
}

/// Every operation the remote service exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetFilingStatus,
    SetStatus,
    GetJobs,
    AddJob,
    RemoveJob,
    GetDeductions,
    AddDeduct,
    RemoveDeduct,
    GetRefundableCredits,
    AddRcredit,
    RemoveRcredit,
    GetNonRefundableCredits,
    AddNrcredit,
    RemoveNrcredit,
    GetPeriodMultiplier,
    GetStandardDeductionAmount,
    GetStandardDeductionAdded,
    GetStatusNames,
    Calculate,
}

impl Operation {
    /// Endpoint name on the remote service.
    pub const fn name(self) -> &'static str {
        match self {
            Operation::GetFilingStatus => "get_filing_status",
            Operation::SetStatus => "set_status",
            Operation::GetJobs => "get_jobs",
            Operation::AddJob => "add_job",
            Operation::RemoveJob => "remove_job",
            Operation::GetDeductions => "get_deductions",
            Operation::AddDeduct => "add_deduct",
            Operation::RemoveDeduct => "remove_deduct",
            Operation::GetRefundableCredits => "get_refundable_credits",
            Operation::AddRcredit => "add_rcredit",
            Operation::RemoveRcredit => "remove_rcredit",
            Operation::GetNonRefundableCredits => "get_non_refundable_credits",
            Operation::AddNrcredit => "add_nrcredit",
            Operation::RemoveNrcredit => "remove_nrcredit",
            Operation::GetPeriodMultiplier => "get_period_multiplier",
            Operation::GetStandardDeductionAmount => "get_standard_deduction_amount",
            Operation::GetStandardDeductionAdded => "get_standard_deduction_added",
            Operation::GetStatusNames => "get_status_names",
            Operation::Calculate => "calculate",
        }
    }

    pub const fn method(self) -> Method {
        match self {
            Operation::SetStatus
            | Operation::AddJob
            | Operation::RemoveJob
            | Operation::AddDeduct
            | Operation::RemoveDeduct
            | Operation::AddRcredit
            | Operation::RemoveRcredit
            | Operation::AddNrcredit
            | Operation::RemoveNrcredit => Method::Write,
            _ => Method::Read,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scalar request parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    Text(String),
    Int(i64),
    Number(f64),
    Flag(bool),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<usize> for ParamValue {
    fn from(value: usize) -> Self {
        Self::Int(value as i64)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Flag(value)
    }
}

/// Named request parameters, serialized in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Params(BTreeMap<String, ParamValue>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter, builder style.
    pub fn with(mut self, name: &str, value: impl Into<ParamValue>) -> Self {
        self.0.insert(name.to_string(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.0.get(name)
    }
}

/// Decoded response body of a successful call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseFields(Map<String, Value>);

impl ResponseFields {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn raw(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Decodes one named field.
    ///
    /// # Errors
    ///
    /// Returns a serialization error if the field is missing or has the wrong shape.
    pub fn get<T: DeserializeOwned>(&self, name: &str) -> Result<T> {
        let value = self
            .0
            .get(name)
            .ok_or_else(|| TaxError::decode(format!("response is missing field '{}'", name)))?;
        serde_json::from_value(value.clone())
            .map_err(|e| TaxError::decode(format!("field '{}': {}", name, e)))
    }

    /// Decodes the whole mapping as one struct.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }
}

/// Outcome of one exchange, decided once at the client boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Ok(ResponseFields),
    Failure(String),
}

impl Outcome {
    /// Classifies a decoded 2xx body.
    ///
    /// Any body carrying `success: false` is a failure. A write must
    /// additionally carry `success: true`; reads may omit the flag.
    pub fn from_body(method: Method, body: Value) -> Self {
        let fields = match body {
            Value::Object(fields) => fields,
            Value::Null if method == Method::Write => {
                return Outcome::Failure("response did not confirm success".to_string());
            }
            other => {
                return Outcome::Failure(format!(
                    "expected a field mapping, got {}",
                    json_kind(&other)
                ));
            }
        };

        match fields.get("success") {
            Some(Value::Bool(false)) => {
                let reason = ["detail", "message", "error"]
                    .iter()
                    .find_map(|key| fields.get(*key).and_then(Value::as_str))
                    .unwrap_or("server reported success=false")
                    .to_string();
                Outcome::Failure(reason)
            }
            Some(Value::Bool(true)) => Outcome::Ok(ResponseFields(fields)),
            _ if method == Method::Write => {
                Outcome::Failure("response did not confirm success".to_string())
            }
            _ => Outcome::Ok(ResponseFields(fields)),
        }
    }

    /// Maps `Failure` onto the application error for `operation`.
    pub fn into_result(self, operation: &str) -> Result<ResponseFields> {
        match self {
            Outcome::Ok(fields) => Ok(fields),
            Outcome::Failure(reason) => Err(TaxError::application(operation, reason)),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Request/response wrapper around the remote service.
///
/// Implementations are stateless: they hold no session data and never retry.
#[async_trait]
pub trait StateSyncClient: Send + Sync {
    /// Issues one named operation and normalizes its outcome.
    ///
    /// # Errors
    ///
    /// - `Transport` when the exchange could not be completed
    /// - `Protocol` on a non-2xx status
    /// - `Application` when the body reports failure
    async fn invoke(&self, operation: &str, method: Method, params: Params)
    -> Result<ResponseFields>;

    /// Convenience wrapper taking a typed [`Operation`].
    async fn call(&self, operation: Operation, params: Params) -> Result<ResponseFields> {
        self.invoke(operation.name(), operation.method(), params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const EVERY_OPERATION: [Operation; 19] = [
        Operation::GetFilingStatus,
        Operation::SetStatus,
        Operation::GetJobs,
        Operation::AddJob,
        Operation::RemoveJob,
        Operation::GetDeductions,
        Operation::AddDeduct,
        Operation::RemoveDeduct,
        Operation::GetRefundableCredits,
        Operation::AddRcredit,
        Operation::RemoveRcredit,
        Operation::GetNonRefundableCredits,
        Operation::AddNrcredit,
        Operation::RemoveNrcredit,
        Operation::GetPeriodMultiplier,
        Operation::GetStandardDeductionAmount,
        Operation::GetStandardDeductionAdded,
        Operation::GetStatusNames,
        Operation::Calculate,
    ];

    #[test]
    fn test_operation_names_are_unique() {
        let names: std::collections::HashSet<&str> =
            EVERY_OPERATION.iter().map(|op| op.name()).collect();
        assert_eq!(names.len(), EVERY_OPERATION.len());
        assert_eq!(Operation::SetStatus.to_string(), "set_status");
    }

    #[test]
    fn test_write_operations() {
        assert_eq!(Operation::AddJob.method(), Method::Write);
        assert_eq!(Operation::RemoveNrcredit.method(), Method::Write);
        assert_eq!(Operation::GetPeriodMultiplier.method(), Method::Read);
        assert_eq!(Operation::Calculate.method(), Method::Read);
    }

    #[test]
    fn test_read_without_success_flag_is_ok() {
        let outcome = Outcome::from_body(Method::Read, json!({"jobs": []}));
        assert!(matches!(outcome, Outcome::Ok(_)));
    }

    #[test]
    fn test_explicit_false_fails_for_reads_and_writes() {
        for method in [Method::Read, Method::Write] {
            let outcome = Outcome::from_body(method, json!({"success": false}));
            assert_eq!(
                outcome,
                Outcome::Failure("server reported success=false".to_string())
            );
        }
    }

    #[test]
    fn test_failure_reason_taken_from_detail() {
        let outcome = Outcome::from_body(
            Method::Write,
            json!({"success": false, "detail": "index out of range"}),
        );
        assert_eq!(outcome, Outcome::Failure("index out of range".to_string()));
    }

    #[test]
    fn test_write_requires_success_true() {
        assert!(matches!(
            Outcome::from_body(Method::Write, json!({})),
            Outcome::Failure(_)
        ));
        assert!(matches!(
            Outcome::from_body(Method::Write, Value::Null),
            Outcome::Failure(_)
        ));
        assert!(matches!(
            Outcome::from_body(Method::Write, json!({"success": true})),
            Outcome::Ok(_)
        ));
    }

    #[test]
    fn test_non_object_body_is_failure() {
        let outcome = Outcome::from_body(Method::Read, json!(26));
        assert_eq!(
            outcome,
            Outcome::Failure("expected a field mapping, got a number".to_string())
        );
    }

    #[test]
    fn test_into_result_maps_to_application_error() {
        let err = Outcome::Failure("nope".to_string())
            .into_result("add_job")
            .unwrap_err();
        assert_eq!(err, TaxError::application("add_job", "nope"));
    }

    #[test]
    fn test_response_field_decoding() {
        let Outcome::Ok(fields) = Outcome::from_body(Method::Read, json!({"multiplier": 26}))
        else {
            panic!("expected Ok");
        };
        assert_eq!(fields.get::<i64>("multiplier").unwrap(), 26);
        assert!(fields.get::<i64>("amount").is_err());
        assert!(fields.get::<String>("multiplier").is_err());
    }

    #[test]
    fn test_params_serialize_in_key_order() {
        let params = Params::new()
            .with("salary", 1i64)
            .with("desc", "Engineer")
            .with("amount", 120000.0);
        let body = serde_json::to_value(&params).unwrap();
        assert_eq!(body, json!({"amount": 120000.0, "desc": "Engineer", "salary": 1}));
    }
}
