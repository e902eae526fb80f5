use super::input;
use serde_json::Value;
use std::sync::Arc;
use taxsync_core::error::{Result, TaxError};
use taxsync_core::model::{Collection, FilingStatus, PeriodLookup, StatusNames, TaxResult};
use taxsync_core::remote::{Operation, Params, StateSyncClient};
use taxsync_core::render::{SessionView, render};
use taxsync_core::session::{Rows, SessionMirror, SessionSnapshot, SyncPhase, Ticket};
use taxsync_core::standard_deduction::{
    STANDARD_DEDUCTION_DESCRIPTION, contains_standard_deduction, looks_like_standard_deduction,
};
use tokio::sync::{Mutex, MutexGuard, RwLock};

/// Owns the session mirror and keeps it in lockstep with the server.
///
/// Every collection mutation follows the same protocol:
/// 1. Validate input locally
/// 2. Issue the write
/// 3. Refetch the whole collection
/// 4. Replace the mirror's copy wholesale
///
/// A failure at any step leaves the mirror untouched. Mutations of the same
/// collection are serialized; refetch results are tagged with a ticket so an
/// out-of-order result can never overwrite newer data.
pub struct TaxSessionController {
    client: Arc<dyn StateSyncClient>,
    mirror: RwLock<SessionMirror>,
    /// One lock per collection, indexed by `Collection::index`
    collection_locks: [Mutex<()>; 4],
    status_lock: Mutex<()>,
}

impl TaxSessionController {
    /// Creates a controller with an empty mirror. Call [`Self::load_all`] to hydrate it.
    pub fn new(client: Arc<dyn StateSyncClient>) -> Self {
        Self {
            client,
            mirror: RwLock::new(SessionMirror::new()),
            collection_locks: Default::default(),
            status_lock: Mutex::new(()),
        }
    }

    /// Returns a copy of the current mirror.
    pub async fn snapshot(&self) -> SessionSnapshot {
        self.mirror.read().await.snapshot()
    }

    pub async fn phase(&self, collection: Collection) -> SyncPhase {
        self.mirror.read().await.phase(collection)
    }

    pub async fn standard_deduction_applied(&self) -> bool {
        self.mirror.read().await.standard_deduction_applied()
    }

    // ============================================================================
    // Startup load
    // ============================================================================

    /// Hydrates the mirror from scratch with six independent reads.
    ///
    /// All-or-nothing: the reads run concurrently, the first failure drops the
    /// rest and the mirror is left exactly as it was.
    ///
    /// Holds the status lock and every collection lock until the results are
    /// applied, so no write can land between a read and its apply.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any of the six reads.
    pub async fn load_all(&self) -> Result<SessionSnapshot> {
        let _status_guard = self.status_lock.lock().await;
        let mut collection_guards = Vec::with_capacity(Collection::ALL.len());
        for collection in Collection::ALL {
            collection_guards.push(self.lock(collection).await);
        }

        let tickets = {
            let mut mirror = self.mirror.write().await;
            Collection::ALL.map(|collection| mirror.begin_load(collection))
        };

        let loaded = futures::try_join!(
            self.fetch_filing_status(),
            self.fetch_rows(Collection::Jobs),
            self.fetch_rows(Collection::Deductions),
            self.fetch_rows(Collection::RefundableCredits),
            self.fetch_rows(Collection::NonRefundableCredits),
            self.fetch_standard_deduction_added(),
        );

        let mut mirror = self.mirror.write().await;
        let (status, jobs, deductions, refundable, non_refundable, server_flag) = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                for (collection, ticket) in Collection::ALL.into_iter().zip(tickets) {
                    mirror.fail(collection, ticket);
                }
                tracing::error!(error = %e, "initial load aborted, mirror left unchanged");
                return Err(e);
            }
        };

        mirror.set_filing_status(status);
        let mut deductions_applied = false;
        for (ticket, rows) in tickets
            .into_iter()
            .zip([jobs, deductions, refundable, non_refundable])
        {
            let collection = rows.collection();
            if mirror.apply(ticket, rows) {
                deductions_applied |= collection == Collection::Deductions;
            } else {
                let held = mirror.tracker(collection).version();
                tracing::warn!(?collection, %ticket, held, "load result older than mirror, discarded");
            }
        }

        if deductions_applied {
            mirror.record_server_standard_flag(server_flag);
            if server_flag != contains_standard_deduction(mirror.deductions()) {
                tracing::warn!(
                    server_flag,
                    "server standard-deduction flag disagrees with the deductions on record"
                );
            }
        }

        tracing::info!(
            jobs = mirror.jobs().len(),
            deductions = mirror.deductions().len(),
            refundable_credits = mirror.refundable_credits().len(),
            non_refundable_credits = mirror.non_refundable_credits().len(),
            "session loaded"
        );
        Ok(mirror.snapshot())
    }

    async fn fetch_filing_status(&self) -> Result<Option<FilingStatus>> {
        let fields = self
            .client
            .call(Operation::GetFilingStatus, Params::new())
            .await?;
        if fields.raw("status").is_none_or(Value::is_null) {
            return Ok(None);
        }
        let status: FilingStatus = fields.get("status")?;
        Ok((!status.code().is_empty()).then_some(status))
    }

    async fn fetch_standard_deduction_added(&self) -> Result<bool> {
        let fields = self
            .client
            .call(Operation::GetStandardDeductionAdded, Params::new())
            .await?;
        fields.get("standard_deduction_added")
    }

    async fn fetch_rows(&self, collection: Collection) -> Result<Rows> {
        let fields = self
            .client
            .call(collection.fetch_operation(), Params::new())
            .await?;
        Rows::decode(collection, &fields)
    }

    // ============================================================================
    // Filing status
    // ============================================================================

    /// Sets the filing status.
    ///
    /// The code is not checked locally; the server rejects unknown codes.
    /// On success the mirror takes the requested value directly.
    pub async fn set_filing_status(&self, status: FilingStatus) -> Result<()> {
        if status.code().trim().is_empty() {
            return Err(TaxError::validation("Filing status must not be empty."));
        }

        let _guard = self.status_lock.lock().await;
        self.client
            .call(
                Operation::SetStatus,
                Params::new().with("status", status.code()),
            )
            .await
            .inspect_err(|e| tracing::error!(error = %e, %status, "set_status failed"))?;

        tracing::info!(%status, "filing status set");
        self.mirror.write().await.set_filing_status(Some(status));
        Ok(())
    }

    // ============================================================================
    // Jobs
    // ============================================================================

    /// Adds a job after resolving `period_label` to a multiplier on the server.
    ///
    /// `hours` is required for hourly jobs and ignored for salaried ones.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty description, unparseable numbers, missing
    ///   hours or an unrecognized period label; no write is issued
    /// - any client error from the lookup, the write or the refetch
    pub async fn add_job(
        &self,
        description: &str,
        is_salaried: bool,
        amount: &str,
        period_label: &str,
        hours: Option<&str>,
    ) -> Result<()> {
        let description = input::description(description)?;
        let amount = input::decimal(amount, "Amount")?;
        let hours = input::hours(is_salaried, hours)?;

        let periods = match self.resolve_period(period_label).await? {
            PeriodLookup::Periods(periods) => periods,
            PeriodLookup::Invalid => {
                tracing::debug!(period_label, "server rejected period label");
                return Err(TaxError::validation("Invalid period."));
            }
        };

        let params = Params::new()
            .with("desc", description)
            .with("salary", i64::from(is_salaried))
            .with("amount", amount)
            .with("periods", periods)
            .with("hours", hours);

        let guard = self.lock(Collection::Jobs).await;
        self.mutate(guard, Collection::Jobs, Operation::AddJob, params)
            .await
    }

    /// Resolves a human pay-period label ("weekly", "annually", ...).
    pub async fn resolve_period(&self, period_label: &str) -> Result<PeriodLookup> {
        let fields = self
            .client
            .call(
                Operation::GetPeriodMultiplier,
                Params::new().with("period", period_label.trim()),
            )
            .await?;
        Ok(PeriodLookup::from_wire(fields.get("multiplier")?))
    }

    pub async fn remove_job(&self, index: usize) -> Result<()> {
        self.remove(Collection::Jobs, index).await
    }

    // ============================================================================
    // Deductions and credits
    // ============================================================================

    pub async fn add_deduction(&self, description: &str, amount: &str) -> Result<()> {
        self.add_line_item(Collection::Deductions, description, amount)
            .await
    }

    pub async fn remove_deduction(&self, index: usize) -> Result<()> {
        self.remove(Collection::Deductions, index).await
    }

    pub async fn add_refundable_credit(&self, description: &str, amount: &str) -> Result<()> {
        self.add_line_item(Collection::RefundableCredits, description, amount)
            .await
    }

    pub async fn remove_refundable_credit(&self, index: usize) -> Result<()> {
        self.remove(Collection::RefundableCredits, index).await
    }

    pub async fn add_non_refundable_credit(&self, description: &str, amount: &str) -> Result<()> {
        self.add_line_item(Collection::NonRefundableCredits, description, amount)
            .await
    }

    pub async fn remove_non_refundable_credit(&self, index: usize) -> Result<()> {
        self.remove(Collection::NonRefundableCredits, index).await
    }

    /// Fetches the server's standard-deduction amount for the active filing status.
    pub async fn fetch_standard_deduction_amount(&self) -> Result<f64> {
        let fields = self
            .client
            .call(Operation::GetStandardDeductionAmount, Params::new())
            .await?;
        fields.get("amount")
    }

    /// One-click action: fetch the standard amount and add it as a deduction.
    ///
    /// Returns the amount that was added.
    pub async fn add_standard_deduction(&self) -> Result<f64> {
        let amount = self.fetch_standard_deduction_amount().await?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(TaxError::decode(format!(
                "standard deduction amount must be non-negative, got {}",
                amount
            )));
        }
        self.add_line_item_value(
            Collection::Deductions,
            STANDARD_DEDUCTION_DESCRIPTION.to_string(),
            amount,
        )
        .await?;
        Ok(amount)
    }

    async fn add_line_item(&self, collection: Collection, description: &str, amount: &str) -> Result<()> {
        let description = input::description(description)?;
        let amount = input::decimal(amount, "Amount")?;
        self.add_line_item_value(collection, description, amount)
            .await
    }

    async fn add_line_item_value(
        &self,
        collection: Collection,
        description: String,
        amount: f64,
    ) -> Result<()> {
        let is_standard = collection == Collection::Deductions
            && looks_like_standard_deduction(&description, amount);

        let params = Params::new()
            .with("desc", description)
            .with("amount", amount);

        let guard = self.lock(collection).await;
        self.mutate(guard, collection, collection.add_operation(), params)
            .await?;

        if is_standard {
            tracing::info!(amount, "standard deduction recorded");
        }
        Ok(())
    }

    // ============================================================================
    // Pure reads
    // ============================================================================

    /// Asks the server to compute the estimate from its own state.
    pub async fn calculate(&self) -> Result<TaxResult> {
        let fields = self
            .client
            .call(Operation::Calculate, Params::new())
            .await?;
        fields.decode()
    }

    pub async fn fetch_status_names(&self) -> Result<StatusNames> {
        let fields = self
            .client
            .call(Operation::GetStatusNames, Params::new())
            .await?;
        fields.get("status_names")
    }

    /// Renders the current mirror.
    ///
    /// The status-name lookup is the only request made; when it fails the
    /// raw status code is shown instead.
    pub async fn render_view(&self) -> SessionView {
        let names = self.fetch_status_names().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "status names unavailable, showing raw codes");
            StatusNames::default()
        });
        render(&self.snapshot().await, &names)
    }

    // ============================================================================
    // Mutation protocol
    // ============================================================================

    async fn lock(&self, collection: Collection) -> MutexGuard<'_, ()> {
        self.collection_locks[collection.index()].lock().await
    }

    async fn remove(&self, collection: Collection, index: usize) -> Result<()> {
        let guard = self.lock(collection).await;

        let len = self.mirror.read().await.len(collection);
        if index >= len {
            return Err(TaxError::validation(format!(
                "No {} at position {} ({} on record).",
                collection.noun(),
                index,
                len
            )));
        }

        self.mutate(
            guard,
            collection,
            collection.remove_operation(),
            Params::new().with("index", index),
        )
        .await
    }

    /// Write, then refetch, then replace. Runs with the collection lock held.
    async fn mutate(
        &self,
        _guard: MutexGuard<'_, ()>,
        collection: Collection,
        operation: Operation,
        params: Params,
    ) -> Result<()> {
        let ticket = self.mirror.write().await.begin_mutation(collection);
        tracing::debug!(?collection, %operation, %ticket, "mutating");

        match self.write_then_refetch(collection, operation, params, ticket).await {
            Ok(rows) => {
                let count = rows.len();
                let mut mirror = self.mirror.write().await;
                if mirror.apply(ticket, rows) {
                    tracing::info!(?collection, %operation, count, "collection refreshed");
                } else {
                    let held = mirror.tracker(collection).version();
                    tracing::warn!(?collection, %ticket, held, "refetch superseded by newer data, discarded");
                }
                Ok(())
            }
            Err(e) => {
                let phase = self.mirror.write().await.fail(collection, ticket);
                tracing::error!(?collection, %operation, %phase, error = %e, "mutation failed, mirror unchanged");
                Err(e)
            }
        }
    }

    async fn write_then_refetch(
        &self,
        collection: Collection,
        operation: Operation,
        params: Params,
        ticket: Ticket,
    ) -> Result<Rows> {
        self.client.call(operation, params).await?;

        self.mirror.write().await.mark_refetching(collection, ticket);
        tracing::debug!(?collection, %ticket, "refetching");

        self.fetch_rows(collection).await
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod tests;
