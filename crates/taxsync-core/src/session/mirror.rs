use super::sync::{SyncPhase, SyncTracker, Ticket};
use crate::error::Result;
use crate::model::{Collection, Credit, Deduction, FilingStatus, Job};
use crate::remote::ResponseFields;
use crate::standard_deduction::{contains_standard_deduction, count_standard_deductions};

/// Canonical rows for one collection, as fetched from the server.
#[derive(Debug, Clone, PartialEq)]
pub enum Rows {
    Jobs(Vec<Job>),
    Deductions(Vec<Deduction>),
    RefundableCredits(Vec<Credit>),
    NonRefundableCredits(Vec<Credit>),
}

impl Rows {
    /// Decodes the rows of `collection` out of a fetch response.
    pub fn decode(collection: Collection, fields: &ResponseFields) -> Result<Self> {
        let field = collection.response_field();
        Ok(match collection {
            Collection::Jobs => Rows::Jobs(fields.get(field)?),
            Collection::Deductions => Rows::Deductions(fields.get(field)?),
            Collection::RefundableCredits => Rows::RefundableCredits(fields.get(field)?),
            Collection::NonRefundableCredits => Rows::NonRefundableCredits(fields.get(field)?),
        })
    }

    pub fn collection(&self) -> Collection {
        match self {
            Rows::Jobs(_) => Collection::Jobs,
            Rows::Deductions(_) => Collection::Deductions,
            Rows::RefundableCredits(_) => Collection::RefundableCredits,
            Rows::NonRefundableCredits(_) => Collection::NonRefundableCredits,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Rows::Jobs(rows) => rows.len(),
            Rows::Deductions(rows)
            | Rows::RefundableCredits(rows)
            | Rows::NonRefundableCredits(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Read-only copy of the mirror handed to the render pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub filing_status: Option<FilingStatus>,
    pub jobs: Vec<Job>,
    pub deductions: Vec<Deduction>,
    pub refundable_credits: Vec<Credit>,
    pub non_refundable_credits: Vec<Credit>,
    pub standard_deduction_applied: bool,
}

/// In-memory mirror of the server's session state.
///
/// Collections are only ever replaced wholesale through [`SessionMirror::apply`]
/// with the ticket their refresh was started under.
#[derive(Debug, Clone, Default)]
pub struct SessionMirror {
    filing_status: Option<FilingStatus>,
    jobs: Vec<Job>,
    deductions: Vec<Deduction>,
    refundable_credits: Vec<Credit>,
    non_refundable_credits: Vec<Credit>,
    trackers: [SyncTracker; 4],
    /// Server's own standard-deduction flag from the last load. Cleared once a
    /// deduction matching the heuristic disappears.
    server_standard_flag: bool,
}

impl SessionMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tracker(&self, collection: Collection) -> &SyncTracker {
        &self.trackers[collection.index()]
    }

    fn tracker_mut(&mut self, collection: Collection) -> &mut SyncTracker {
        &mut self.trackers[collection.index()]
    }

    pub fn phase(&self, collection: Collection) -> SyncPhase {
        self.tracker(collection).phase()
    }

    pub fn filing_status(&self) -> Option<&FilingStatus> {
        self.filing_status.as_ref()
    }

    pub fn set_filing_status(&mut self, status: Option<FilingStatus>) {
        self.filing_status = status;
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn deductions(&self) -> &[Deduction] {
        &self.deductions
    }

    pub fn refundable_credits(&self) -> &[Credit] {
        &self.refundable_credits
    }

    pub fn non_refundable_credits(&self) -> &[Credit] {
        &self.non_refundable_credits
    }

    pub fn len(&self, collection: Collection) -> usize {
        match collection {
            Collection::Jobs => self.jobs.len(),
            Collection::Deductions => self.deductions.len(),
            Collection::RefundableCredits => self.refundable_credits.len(),
            Collection::NonRefundableCredits => self.non_refundable_credits.len(),
        }
    }

    pub fn begin_mutation(&mut self, collection: Collection) -> Ticket {
        self.tracker_mut(collection).begin_mutation()
    }

    pub fn begin_load(&mut self, collection: Collection) -> Ticket {
        self.tracker_mut(collection).begin_load()
    }

    pub fn mark_refetching(&mut self, collection: Collection, ticket: Ticket) {
        self.tracker_mut(collection).mark_refetching(ticket);
    }

    pub fn fail(&mut self, collection: Collection, ticket: Ticket) -> SyncPhase {
        self.tracker_mut(collection).fail(ticket)
    }

    /// Replaces a collection with freshly fetched rows.
    ///
    /// Returns `false` (and leaves the mirror alone) when a newer ticket has
    /// already been applied to that collection.
    pub fn apply(&mut self, ticket: Ticket, rows: Rows) -> bool {
        let collection = rows.collection();
        if !self.tracker_mut(collection).accept(ticket) {
            return false;
        }
        match rows {
            Rows::Jobs(rows) => self.jobs = rows,
            Rows::Deductions(rows) => {
                if count_standard_deductions(&rows) < count_standard_deductions(&self.deductions) {
                    self.server_standard_flag = false;
                }
                self.deductions = rows;
            }
            Rows::RefundableCredits(rows) => self.refundable_credits = rows,
            Rows::NonRefundableCredits(rows) => self.non_refundable_credits = rows,
        }
        true
    }

    /// Latches the server's own standard-deduction flag.
    ///
    /// It survives unrelated deduction changes and is only cleared when a
    /// refetch drops a deduction that matches the heuristic.
    pub fn record_server_standard_flag(&mut self, added: bool) {
        self.server_standard_flag = added;
    }

    pub fn standard_deduction_applied(&self) -> bool {
        self.server_standard_flag || contains_standard_deduction(&self.deductions)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            filing_status: self.filing_status.clone(),
            jobs: self.jobs.clone(),
            deductions: self.deductions.clone(),
            refundable_credits: self.refundable_credits.clone(),
            non_refundable_credits: self.non_refundable_credits.clone(),
            standard_deduction_applied: self.standard_deduction_applied(),
        }
    }
}
