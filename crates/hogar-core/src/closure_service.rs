//! OPEN/CLOSED state per period and the close → rollover / reopen transitions.
//!
//! A period is CLOSED exactly when a closure mark is stored under its key.
//! Closing writes the mark first and then copies budgets and income into the
//! next period with separate writes; a failure part way leaves the earlier
//! writes in place.

use std::{collections::BTreeSet, fmt};

use serde_json::Value;
use tracing::{debug, error, info, warn};

use hogar_domain::{Income, Period};

use crate::{
    budget_service::BudgetService,
    income_service::IncomeService,
    storage::{Document, HouseholdStore, WriteMode},
    CoreError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodStatus {
    Open,
    Closed,
}

impl fmt::Display for PeriodStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PeriodStatus::Open => "OPEN",
            PeriodStatus::Closed => "CLOSED",
        };
        f.write_str(label)
    }
}

/// Result of a successful close.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseOutcome {
    pub closed: Period,
    pub next: Period,
    pub budgets_copied: usize,
    pub income: Income,
}

pub struct ClosureService {
    store: HouseholdStore,
    incomes: IncomeService,
    budgets: BudgetService,
}

impl ClosureService {
    pub fn new(store: HouseholdStore) -> Self {
        Self {
            incomes: IncomeService::new(store.clone()),
            budgets: BudgetService::new(store.clone()),
            store,
        }
    }

    pub async fn status(&self, period: Period) -> Result<PeriodStatus, CoreError> {
        if self.is_closed(period).await? {
            Ok(PeriodStatus::Closed)
        } else {
            Ok(PeriodStatus::Open)
        }
    }

    pub async fn is_closed(&self, period: Period) -> Result<bool, CoreError> {
        let collection = self.store.paths().closures();
        Ok(self
            .store
            .store()
            .get(&collection, &period.key())
            .await?
            .is_some())
    }

    /// Every period currently marked closed.
    pub async fn closed_periods(&self) -> Result<BTreeSet<Period>, CoreError> {
        let collection = self.store.paths().closures();
        let docs = self.store.store().get_all(&collection).await?;
        Ok(docs
            .iter()
            .filter_map(|doc| Period::parse(&doc.id).ok())
            .collect())
    }

    /// Marks `period` closed and rolls its budgets (overwriting) and resolved
    /// income (replacing) into the next period.
    ///
    /// The closed check and the mark write are not atomic.
    pub async fn close(&self, period: Period) -> Result<CloseOutcome, CoreError> {
        if self.is_closed(period).await? {
            return Err(CoreError::AlreadyClosed(period));
        }
        self.mark_closed(period).await?;

        let next = period.next();
        match self.roll_forward(period, next).await {
            Ok((budgets_copied, income)) => {
                info!(%period, %next, budgets_copied, "period closed");
                Ok(CloseOutcome {
                    closed: period,
                    next,
                    budgets_copied,
                    income,
                })
            }
            Err(err) => {
                error!(%period, %next, error = %err, "close interrupted after the closure mark was written");
                Err(err)
            }
        }
    }

    /// Removes the closure mark of `period`.
    pub async fn reopen(&self, period: Period) -> Result<(), CoreError> {
        if !self.is_closed(period).await? {
            return Err(CoreError::NotClosed(period));
        }
        let collection = self.store.paths().closures();
        match self.store.store().delete(&collection, &period.key()).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => {
                warn!(%period, "closure mark already removed");
            }
            Err(err) => return Err(err.into()),
        }
        info!(%period, "period reopened");
        Ok(())
    }

    async fn mark_closed(&self, period: Period) -> Result<(), CoreError> {
        let collection = self.store.paths().closures();
        let mut mark = Document::new();
        mark.insert("closed".into(), Value::Bool(true));
        self.store
            .store()
            .set(&collection, &period.key(), mark, WriteMode::Replace)
            .await?;
        debug!(%period, "closure mark written");
        Ok(())
    }

    async fn roll_forward(&self, period: Period, next: Period) -> Result<(usize, Income), CoreError> {
        let budgets_copied = self.budgets.copy_all(period, next).await?;
        let income = self.incomes.resolve(period).await?;
        let income = self.incomes.replace(next, income).await?;
        Ok((budgets_copied, income))
    }
}
