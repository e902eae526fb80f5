//! Pure projection of the session mirror into display-ready structures.
//!
//! Nothing here touches the network or mutates the mirror; the status-name
//! lookup is performed by the caller and passed in.

use crate::model::{Collection, Job, JobKind, LineItem, StatusNames, TaxResult};
use crate::session::SessionSnapshot;

pub const STATUS_NOT_SET: &str = "Not set";

/// One rendered row of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    /// Position in the mirror at render time; the handle for removal.
    pub index: usize,
    pub description: String,
    pub detail: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionView {
    pub collection: Collection,
    pub items: Vec<ItemView>,
}

impl CollectionView {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn empty_message(&self) -> &'static str {
        self.collection.empty_message()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusOption {
    pub code: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusView {
    pub label: String,
    pub options: Vec<StatusOption>,
}

/// Everything the front end needs to draw the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub status: StatusView,
    pub jobs: CollectionView,
    pub deductions: CollectionView,
    pub refundable_credits: CollectionView,
    pub non_refundable_credits: CollectionView,
    /// True iff a filing status is set and no standard deduction is applied yet.
    pub show_add_standard_deduction: bool,
}

impl SessionView {
    pub fn collections(&self) -> [&CollectionView; 4] {
        [
            &self.jobs,
            &self.deductions,
            &self.refundable_credits,
            &self.non_refundable_credits,
        ]
    }
}

pub fn render(snapshot: &SessionSnapshot, names: &StatusNames) -> SessionView {
    let label = snapshot
        .filing_status
        .as_ref()
        .map(|status| names.label_for(status))
        .unwrap_or_else(|| STATUS_NOT_SET.to_string());

    let options = names
        .codes()
        .map(|code| StatusOption {
            active: snapshot.filing_status.as_ref() == Some(&code),
            label: names.label_for(&code),
            code: code.code().to_string(),
        })
        .collect();

    SessionView {
        status: StatusView { label, options },
        jobs: CollectionView {
            collection: Collection::Jobs,
            items: snapshot.jobs.iter().enumerate().map(job_view).collect(),
        },
        deductions: line_items(Collection::Deductions, &snapshot.deductions),
        refundable_credits: line_items(Collection::RefundableCredits, &snapshot.refundable_credits),
        non_refundable_credits: line_items(
            Collection::NonRefundableCredits,
            &snapshot.non_refundable_credits,
        ),
        show_add_standard_deduction: snapshot.filing_status.is_some()
            && !snapshot.standard_deduction_applied,
    }
}

fn job_view((index, job): (usize, &Job)) -> ItemView {
    let periods = format_quantity(job.period_multiplier);
    // Hourly rates are shown without thousands separators
    let detail = match job.kind() {
        JobKind::Salary => format!("{} ({} periods)", format_currency(job.amount), periods),
        JobKind::Hourly => format!(
            "${:.2}/hour ({} hours, {} periods)",
            job.amount,
            format_quantity(job.hours_per_period),
            periods
        ),
    };
    ItemView {
        index,
        description: job.description.clone(),
        detail,
    }
}

fn line_items(collection: Collection, items: &[LineItem]) -> CollectionView {
    CollectionView {
        collection,
        items: items
            .iter()
            .enumerate()
            .map(|(index, item)| ItemView {
                index,
                description: item.description.clone(),
                detail: format_currency(item.amount),
            })
            .collect(),
    }
}

/// Labelled lines for a calculation result, in display order.
pub fn render_result(result: &TaxResult) -> Vec<(&'static str, String)> {
    vec![
        ("Gross income", format_currency(result.gross_income)),
        ("Taxable income", format_currency(result.taxable_income)),
        ("FICA tax", format_currency(result.fica_tax)),
        ("Income tax", format_currency(result.income_tax)),
        ("Refundable credits", format_currency(result.refundable_credits)),
        ("Total tax", format_currency(result.total_tax)),
    ]
}

/// `$` + thousands separators + two decimals, e.g. `$120,000.00`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}

fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        value.to_string()
    }
}
