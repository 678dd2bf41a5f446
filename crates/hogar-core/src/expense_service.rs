//! Append-only expense ledger.

use std::sync::Arc;

use tracing::{debug, warn};

use hogar_domain::{Expense, ExpenseDraft, Period, Record};

use crate::{
    storage::{decode, encode, Direction, HouseholdStore, Query},
    time::Clock,
    CoreError,
};

/// Default size of a "recent expenses" listing.
pub const DEFAULT_RECENT_LIMIT: usize = 60;
/// Retrieval cap used when computing period totals.
pub const DEFAULT_AGGREGATION_LIMIT: usize = 1000;

const CREATED_AT_FIELD: &str = "created_at";

pub struct ExpenseService {
    store: HouseholdStore,
    clock: Arc<dyn Clock>,
    aggregation_limit: usize,
}

impl ExpenseService {
    pub fn new(store: HouseholdStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            aggregation_limit: DEFAULT_AGGREGATION_LIMIT,
        }
    }

    pub fn with_aggregation_limit(mut self, limit: usize) -> Self {
        self.aggregation_limit = limit.max(1);
        self
    }

    /// Validates and appends an expense; the period is derived from its date.
    pub async fn add(&self, draft: ExpenseDraft) -> Result<Record<Expense>, CoreError> {
        let expense = draft.into_expense(self.clock.today(), self.clock.now())?;
        let collection = self.store.paths().expenses();
        let id = self
            .store
            .store()
            .insert(&collection, encode(&expense)?)
            .await?;
        debug!(%id, period = %expense.period, amount = expense.amount, "expense added");
        Ok(Record::new(id, expense))
    }

    /// Newest expenses first, at most `max_count`.
    pub async fn list_recent(&self, max_count: usize) -> Result<Vec<Record<Expense>>, CoreError> {
        let collection = self.store.paths().expenses();
        let query = Query::new()
            .order_by(CREATED_AT_FIELD, Direction::Descending)
            .limit(max_count);
        let docs = self.store.store().query(&collection, &query).await?;
        docs.into_iter()
            .map(|doc| decode(&collection, doc))
            .collect()
    }

    /// Expenses of `period`, filtered from the aggregation-sized listing.
    pub async fn list_for_period(&self, period: Period) -> Result<Vec<Record<Expense>>, CoreError> {
        let listed = self.list_recent(self.aggregation_limit).await?;
        if listed.len() >= self.aggregation_limit {
            warn!(
                limit = self.aggregation_limit,
                %period,
                "expense listing hit the aggregation cap; older expenses are not counted"
            );
        }
        Ok(listed
            .into_iter()
            .filter(|record| record.value.period == period)
            .collect())
    }

    pub async fn remove(&self, id: &str) -> Result<(), CoreError> {
        let collection = self.store.paths().expenses();
        self.store.store().delete(&collection, id).await?;
        debug!(%id, "expense removed");
        Ok(())
    }
}
