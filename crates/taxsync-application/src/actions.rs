//! Declarative action bindings.
//!
//! Front ends never call the controller directly: they name an action, pass
//! the raw form fields and get exactly one notification back per dispatch.
//! [`ACTION_TABLE`] is the single place that says which fields an action
//! needs and which messages it reports.

use crate::notification::NotificationCenter;
use crate::session::TaxSessionController;
use std::collections::BTreeMap;
use std::fmt;
use taxsync_core::error::{Result, TaxError};
use taxsync_core::model::{FilingStatus, JobKind, TaxResult};
use taxsync_core::render::format_currency;

/// Raw form input, keyed by field name.
pub type Fields = BTreeMap<String, String>;

pub const REQUIRED_FIELDS_MESSAGE: &str = "Please fill in all required fields.";
pub const HOURS_REQUIRED_MESSAGE: &str = "Please enter hours worked for hourly jobs.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Refresh,
    SetStatus,
    AddJob,
    RemoveJob,
    AddDeduction,
    RemoveDeduction,
    AddStandardDeduction,
    AddRefundableCredit,
    RemoveRefundableCredit,
    AddNonRefundableCredit,
    RemoveNonRefundableCredit,
    Calculate,
}

/// One row of the binding table.
#[derive(Debug)]
pub struct Binding {
    pub action: Action,
    /// Name used by front ends (REPL command, button id, ...)
    pub name: &'static str,
    pub required: &'static [&'static str],
    pub optional: &'static [&'static str],
    pub summary: &'static str,
    /// Fixed success message; `None` when the message depends on the result
    success: Option<&'static str>,
    /// Prefix for failure messages
    failure: &'static str,
}

pub const ACTION_TABLE: &[Binding] = &[
    Binding {
        action: Action::Refresh,
        name: "refresh",
        required: &[],
        optional: &[],
        summary: "Reload the whole session from the server",
        success: Some("Session loaded."),
        failure: "Failed to load state",
    },
    Binding {
        action: Action::SetStatus,
        name: "status",
        required: &["status"],
        optional: &[],
        summary: "Set the filing status (U, J, S or H)",
        success: Some("Filing status updated."),
        failure: "Failed to set filing status",
    },
    Binding {
        action: Action::AddJob,
        name: "add-job",
        required: &["desc", "type", "amount", "period"],
        optional: &["hours"],
        summary: "Add a job; type is salary or hourly, period is annually, monthly, semimonthly, biweekly or weekly",
        success: Some("Job added successfully!"),
        failure: "Failed to add job",
    },
    Binding {
        action: Action::RemoveJob,
        name: "remove-job",
        required: &["index"],
        optional: &[],
        summary: "Remove the job at a position",
        success: Some("Job removed."),
        failure: "Failed to remove job",
    },
    Binding {
        action: Action::AddDeduction,
        name: "add-deduction",
        required: &["desc", "amount"],
        optional: &[],
        summary: "Add a deduction",
        success: Some("Deduction added successfully!"),
        failure: "Failed to add deduction",
    },
    Binding {
        action: Action::RemoveDeduction,
        name: "remove-deduction",
        required: &["index"],
        optional: &[],
        summary: "Remove the deduction at a position",
        success: Some("Deduction removed."),
        failure: "Failed to remove deduction",
    },
    Binding {
        action: Action::AddStandardDeduction,
        name: "add-standard-deduction",
        required: &[],
        optional: &[],
        summary: "Add the standard deduction for the current filing status",
        success: None,
        failure: "Failed to add standard deduction",
    },
    Binding {
        action: Action::AddRefundableCredit,
        name: "add-refundable-credit",
        required: &["desc", "amount"],
        optional: &[],
        summary: "Add a refundable credit",
        success: Some("Refundable credit added successfully!"),
        failure: "Failed to add refundable credit",
    },
    Binding {
        action: Action::RemoveRefundableCredit,
        name: "remove-refundable-credit",
        required: &["index"],
        optional: &[],
        summary: "Remove the refundable credit at a position",
        success: Some("Refundable credit removed."),
        failure: "Failed to remove refundable credit",
    },
    Binding {
        action: Action::AddNonRefundableCredit,
        name: "add-non-refundable-credit",
        required: &["desc", "amount"],
        optional: &[],
        summary: "Add a non-refundable credit",
        success: Some("Non-refundable credit added successfully!"),
        failure: "Failed to add non-refundable credit",
    },
    Binding {
        action: Action::RemoveNonRefundableCredit,
        name: "remove-non-refundable-credit",
        required: &["index"],
        optional: &[],
        summary: "Remove the non-refundable credit at a position",
        success: Some("Non-refundable credit removed."),
        failure: "Failed to remove non-refundable credit",
    },
    Binding {
        action: Action::Calculate,
        name: "calculate",
        required: &[],
        optional: &[],
        summary: "Ask the server for the tax estimate",
        success: Some("Tax calculation completed successfully!"),
        failure: "Failed to calculate taxes",
    },
];

impl Action {
    pub fn binding(self) -> &'static Binding {
        ACTION_TABLE
            .iter()
            .find(|binding| binding.action == self)
            .unwrap_or(&ACTION_TABLE[0])
    }

    pub fn name(self) -> &'static str {
        self.binding().name
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ACTION_TABLE
            .iter()
            .find(|binding| binding.name == name)
            .map(|binding| binding.action)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a successful dispatch produced besides the notification.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The mirror was updated; re-render it
    Updated,
    Calculated(TaxResult),
}

/// Runs `action` with `fields` and pushes exactly one notification.
///
/// Field-level checks run first and are reported verbatim; anything that
/// fails afterwards is reported with the binding's failure prefix.
pub async fn dispatch(
    controller: &TaxSessionController,
    notifications: &mut NotificationCenter,
    action: Action,
    fields: &Fields,
) -> Result<ActionOutcome> {
    let binding = action.binding();

    if let Err(e) = check_fields(binding, fields) {
        notifications.error(e.to_string());
        return Err(e);
    }

    match run(controller, action, fields).await {
        Ok((outcome, message)) => {
            tracing::info!(action = binding.name, "action completed");
            notifications.success(message);
            Ok(outcome)
        }
        Err(e) => {
            tracing::warn!(action = binding.name, error = %e, "action failed");
            notifications.error(format!("{}: {}", binding.failure, e));
            Err(e.context(binding.failure))
        }
    }
}

fn check_fields(binding: &Binding, fields: &Fields) -> Result<()> {
    let missing = binding
        .required
        .iter()
        .any(|name| field(fields, name).is_none());
    if missing {
        return Err(TaxError::validation(REQUIRED_FIELDS_MESSAGE));
    }

    if binding.action == Action::AddJob {
        let kind: JobKind = field(fields, "type").unwrap_or_default().parse()?;
        if !kind.is_salaried() && field(fields, "hours").is_none() {
            return Err(TaxError::validation(HOURS_REQUIRED_MESSAGE));
        }
    }
    Ok(())
}

async fn run(
    controller: &TaxSessionController,
    action: Action,
    fields: &Fields,
) -> Result<(ActionOutcome, String)> {
    let text = |name: &str| field(fields, name).unwrap_or_default();

    match action {
        Action::Refresh => {
            controller.load_all().await?;
        }
        Action::SetStatus => {
            controller
                .set_filing_status(FilingStatus::new(text("status")))
                .await?;
        }
        Action::AddJob => {
            let kind: JobKind = text("type").parse()?;
            controller
                .add_job(
                    text("desc"),
                    kind.is_salaried(),
                    text("amount"),
                    text("period"),
                    field(fields, "hours"),
                )
                .await?;
        }
        Action::RemoveJob => controller.remove_job(index(fields)?).await?,
        Action::AddDeduction => {
            controller
                .add_deduction(text("desc"), text("amount"))
                .await?
        }
        Action::RemoveDeduction => controller.remove_deduction(index(fields)?).await?,
        Action::AddStandardDeduction => {
            let amount = controller.add_standard_deduction().await?;
            let message = format!(
                "Standard deduction of {} added successfully!",
                format_currency(amount)
            );
            return Ok((ActionOutcome::Updated, message));
        }
        Action::AddRefundableCredit => {
            controller
                .add_refundable_credit(text("desc"), text("amount"))
                .await?
        }
        Action::RemoveRefundableCredit => {
            controller
                .remove_refundable_credit(index(fields)?)
                .await?
        }
        Action::AddNonRefundableCredit => {
            controller
                .add_non_refundable_credit(text("desc"), text("amount"))
                .await?
        }
        Action::RemoveNonRefundableCredit => {
            controller
                .remove_non_refundable_credit(index(fields)?)
                .await?
        }
        Action::Calculate => {
            let result = controller.calculate().await?;
            return Ok((
                ActionOutcome::Calculated(result),
                success_message(action),
            ));
        }
    }
    Ok((ActionOutcome::Updated, success_message(action)))
}

fn success_message(action: Action) -> String {
    action.binding().success.unwrap_or("Done.").to_string()
}

/// A field counts as present only when it holds something besides whitespace.
fn field<'a>(fields: &'a Fields, name: &str) -> Option<&'a str> {
    fields
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn index(fields: &Fields) -> Result<usize> {
    let raw = field(fields, "index").unwrap_or_default();
    raw.parse().map_err(|_| {
        TaxError::validation(format!(
            "Index must be a non-negative whole number, got '{}'.",
            raw
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::NotificationLevel;
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use taxsync_core::remote::{Method, Outcome, ParamValue, Params, ResponseFields, StateSyncClient};

    // Minimal server: jobs and deductions only
    #[derive(Default)]
    struct MemoryServer {
        jobs: Mutex<Vec<Value>>,
        deductions: Mutex<Vec<Value>>,
        requests: Mutex<Vec<String>>,
    }

    fn param(params: &Params, name: &str) -> Value {
        match params.get(name) {
            Some(ParamValue::Text(v)) => json!(v),
            Some(ParamValue::Int(v)) => json!(v),
            Some(ParamValue::Number(v)) => json!(v),
            Some(ParamValue::Flag(v)) => json!(v),
            None => Value::Null,
        }
    }

    #[async_trait]
    impl StateSyncClient for MemoryServer {
        async fn invoke(
            &self,
            operation: &str,
            method: Method,
            params: Params,
        ) -> taxsync_core::Result<ResponseFields> {
            self.requests.lock().unwrap().push(operation.to_string());
            let body = match operation {
                "get_period_multiplier" => match param(&params, "period").as_str() {
                    Some("annually") => json!({"multiplier": 1}),
                    Some("weekly") => json!({"multiplier": 52}),
                    _ => json!({"multiplier": -1}),
                },
                "add_job" => {
                    self.jobs.lock().unwrap().push(json!([
                        param(&params, "desc"),
                        param(&params, "salary"),
                        param(&params, "amount"),
                        param(&params, "periods"),
                        param(&params, "hours"),
                    ]));
                    json!({"success": true})
                }
                "get_jobs" => json!({"jobs": *self.jobs.lock().unwrap()}),
                "remove_job" => {
                    let mut jobs = self.jobs.lock().unwrap();
                    let index = param(&params, "index").as_u64().unwrap_or(u64::MAX) as usize;
                    if index < jobs.len() {
                        jobs.remove(index);
                    }
                    json!({"success": true})
                }
                "add_deduct" => {
                    self.deductions
                        .lock()
                        .unwrap()
                        .push(json!([param(&params, "desc"), param(&params, "amount")]));
                    json!({"success": true})
                }
                "get_deductions" => json!({"deductions": *self.deductions.lock().unwrap()}),
                "get_standard_deduction_amount" => json!({"amount": 15000.0}),
                "calculate" => json!({
                    "gross_income": 0.0,
                    "taxable_income": 0.0,
                    "fica_tax": 0.0,
                    "income_tax": 0.0,
                    "refundable_credits": 0.0,
                    "total_tax": 0.0
                }),
                "set_status" => json!({"success": false}),
                _ => return Err(TaxError::transport("connection refused")),
            };
            Outcome::from_body(method, body).into_result(operation)
        }
    }

    fn setup() -> (Arc<MemoryServer>, TaxSessionController, NotificationCenter) {
        let server = Arc::new(MemoryServer::default());
        let controller = TaxSessionController::new(server.clone());
        let notifications = NotificationCenter::new(Duration::from_secs(5));
        (server, controller, notifications)
    }

    fn fields(pairs: &[(&str, &str)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_binding_table_is_complete() {
        let actions = [
            Action::Refresh,
            Action::SetStatus,
            Action::AddJob,
            Action::RemoveJob,
            Action::AddDeduction,
            Action::RemoveDeduction,
            Action::AddStandardDeduction,
            Action::AddRefundableCredit,
            Action::RemoveRefundableCredit,
            Action::AddNonRefundableCredit,
            Action::RemoveNonRefundableCredit,
            Action::Calculate,
        ];
        assert_eq!(ACTION_TABLE.len(), actions.len());
        for action in actions {
            assert_eq!(action.binding().action, action);
            assert_eq!(Action::from_name(action.name()), Some(action));
        }
        assert_eq!(Action::from_name("launch-rockets"), None);
    }

    #[tokio::test]
    async fn test_missing_fields_reported_without_requests() {
        let (server, controller, mut notifications) = setup();

        let err = dispatch(
            &controller,
            &mut notifications,
            Action::AddDeduction,
            &fields(&[("desc", "Charity"), ("amount", "  ")]),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), REQUIRED_FIELDS_MESSAGE);
        let shown = notifications.active();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].message, REQUIRED_FIELDS_MESSAGE);
        assert!(server.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hourly_job_requires_hours() {
        let (server, controller, mut notifications) = setup();

        dispatch(
            &controller,
            &mut notifications,
            Action::AddJob,
            &fields(&[
                ("desc", "Barista"),
                ("type", "hourly"),
                ("amount", "18"),
                ("period", "weekly"),
            ]),
        )
        .await
        .unwrap_err();

        assert_eq!(notifications.active()[0].message, HOURS_REQUIRED_MESSAGE);
        assert!(server.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_job_reports_success() {
        let (_server, controller, mut notifications) = setup();

        let outcome = dispatch(
            &controller,
            &mut notifications,
            Action::AddJob,
            &fields(&[
                ("desc", "Engineer"),
                ("type", "salary"),
                ("amount", "120000"),
                ("period", "annually"),
            ]),
        )
        .await
        .unwrap();

        assert_eq!(outcome, ActionOutcome::Updated);
        let shown = notifications.active();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].level, NotificationLevel::Success);
        assert_eq!(shown[0].message, "Job added successfully!");
        assert_eq!(controller.snapshot().await.jobs.len(), 1);
    }

    #[tokio::test]
    async fn test_failures_are_prefixed() {
        let (server, controller, mut notifications) = setup();

        let err = dispatch(
            &controller,
            &mut notifications,
            Action::AddJob,
            &fields(&[
                ("desc", "Engineer"),
                ("type", "salary"),
                ("amount", "120000"),
                ("period", "fortnightly"),
            ]),
        )
        .await
        .unwrap_err();

        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Failed to add job: Invalid period.");
        assert_eq!(
            notifications.active()[0].message,
            "Failed to add job: Invalid period."
        );
        assert!(!server.requests.lock().unwrap().contains(&"add_job".to_string()));

        notifications.drain();
        let err = dispatch(
            &controller,
            &mut notifications,
            Action::RemoveJob,
            &fields(&[("index", "first")]),
        )
        .await
        .unwrap_err();
        assert!(err.is_validation());
        assert!(notifications.active()[0]
            .message
            .starts_with("Failed to remove job: Index must be"));
    }

    #[tokio::test]
    async fn test_standard_deduction_message_names_amount() {
        let (_server, controller, mut notifications) = setup();

        dispatch(
            &controller,
            &mut notifications,
            Action::AddStandardDeduction,
            &Fields::new(),
        )
        .await
        .unwrap();

        assert_eq!(
            notifications.active()[0].message,
            "Standard deduction of $15,000.00 added successfully!"
        );
        assert!(controller.snapshot().await.standard_deduction_applied);
    }

    #[tokio::test]
    async fn test_calculate_returns_result() {
        let (_server, controller, mut notifications) = setup();

        let outcome = dispatch(
            &controller,
            &mut notifications,
            Action::Calculate,
            &Fields::new(),
        )
        .await
        .unwrap();

        assert_eq!(outcome, ActionOutcome::Calculated(TaxResult::default()));
        assert_eq!(
            notifications.active()[0].message,
            "Tax calculation completed successfully!"
        );
    }

    #[tokio::test]
    async fn test_one_notification_per_dispatch() {
        let (_server, controller, mut notifications) = setup();

        let _ = dispatch(
            &controller,
            &mut notifications,
            Action::SetStatus,
            &fields(&[("status", "Q")]),
        )
        .await;
        let _ = dispatch(
            &controller,
            &mut notifications,
            Action::Refresh,
            &Fields::new(),
        )
        .await;

        let shown = notifications.active();
        assert_eq!(shown.len(), 2);
        assert!(shown.iter().all(|n| n.is_error()));
        assert!(shown[0].message.starts_with("Failed to set filing status"));
        assert!(shown[1].message.starts_with("Failed to load state"));
    }
}
