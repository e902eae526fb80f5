use crate::remote::Operation;
use std::fmt;

/// The four server-owned collections the session mirrors.
///
/// Each one is mutated and refetched independently; items are identified by
/// position within their own collection only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Jobs,
    Deductions,
    RefundableCredits,
    NonRefundableCredits,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Jobs,
        Collection::Deductions,
        Collection::RefundableCredits,
        Collection::NonRefundableCredits,
    ];

    /// Stable position of this collection in `ALL`.
    pub const fn index(self) -> usize {
        match self {
            Collection::Jobs => 0,
            Collection::Deductions => 1,
            Collection::RefundableCredits => 2,
            Collection::NonRefundableCredits => 3,
        }
    }

    pub const fn fetch_operation(self) -> Operation {
        match self {
            Collection::Jobs => Operation::GetJobs,
            Collection::Deductions => Operation::GetDeductions,
            Collection::RefundableCredits => Operation::GetRefundableCredits,
            Collection::NonRefundableCredits => Operation::GetNonRefundableCredits,
        }
    }

    pub const fn add_operation(self) -> Operation {
        match self {
            Collection::Jobs => Operation::AddJob,
            Collection::Deductions => Operation::AddDeduct,
            Collection::RefundableCredits => Operation::AddRcredit,
            Collection::NonRefundableCredits => Operation::AddNrcredit,
        }
    }

    pub const fn remove_operation(self) -> Operation {
        match self {
            Collection::Jobs => Operation::RemoveJob,
            Collection::Deductions => Operation::RemoveDeduct,
            Collection::RefundableCredits => Operation::RemoveRcredit,
            Collection::NonRefundableCredits => Operation::RemoveNrcredit,
        }
    }

    /// Name of the response field carrying the fetched rows.
    pub const fn response_field(self) -> &'static str {
        match self {
            Collection::Jobs => "jobs",
            Collection::Deductions => "deductions",
            Collection::RefundableCredits => "refundable_credits",
            Collection::NonRefundableCredits => "non_refundable_credits",
        }
    }

    /// Singular noun used in user-facing messages.
    pub const fn noun(self) -> &'static str {
        match self {
            Collection::Jobs => "job",
            Collection::Deductions => "deduction",
            Collection::RefundableCredits => "refundable credit",
            Collection::NonRefundableCredits => "non-refundable credit",
        }
    }

    pub const fn empty_message(self) -> &'static str {
        match self {
            Collection::Jobs => "No jobs added yet.",
            Collection::Deductions => "No deductions added yet.",
            Collection::RefundableCredits => "No refundable credits added yet.",
            Collection::NonRefundableCredits => "No non-refundable credits added yet.",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.response_field())
    }
}
