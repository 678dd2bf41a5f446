//! Per-period category caps stored under opaque ids.
//!
//! `(period, category)` is a logical key the store does not enforce. Upserts
//! look the key up and then write, which is best effort under concurrent
//! sessions: two racing upserts can both insert.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use hogar_domain::{category_key, Budget, Period, Record, ValidationError};

use crate::{
    storage::{coerce_amount, decode, encode, Document, HouseholdStore, Query, StoredDocument},
    CoreError,
};

const PERIOD_FIELD: &str = "periodo";
const CATEGORY_FIELD: &str = "category";
const CAP_FIELD: &str = "cap";

/// What an upsert did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    Inserted { id: String },
    /// The first match was updated; `stale_duplicates` other matches kept their old cap.
    Updated { id: String, stale_duplicates: usize },
}

impl UpsertOutcome {
    pub fn id(&self) -> &str {
        match self {
            UpsertOutcome::Inserted { id } | UpsertOutcome::Updated { id, .. } => id,
        }
    }
}

pub struct BudgetService {
    store: HouseholdStore,
}

impl BudgetService {
    pub fn new(store: HouseholdStore) -> Self {
        Self { store }
    }

    /// Inserts the `(period, category)` budget or updates the cap of the first match.
    pub async fn upsert(
        &self,
        period: Period,
        category: &str,
        cap: f64,
    ) -> Result<UpsertOutcome, CoreError> {
        let category = category.trim();
        if category.is_empty() {
            return Err(ValidationError::EmptyCategory.into());
        }
        let budget = Budget::new(period, category, cap);
        if budget.cap < 0.0 {
            return Err(ValidationError::NegativeCap(budget.cap).into());
        }

        let collection = self.store.paths().budgets();
        let matches = self.matching(period, category).await?;
        match matches.split_first() {
            None => {
                let id = self.store.store().insert(&collection, encode(&budget)?).await?;
                debug!(%period, category, cap = budget.cap, %id, "budget inserted");
                Ok(UpsertOutcome::Inserted { id })
            }
            Some((first, rest)) => {
                let mut patch = Document::new();
                patch.insert(CAP_FIELD.into(), budget.cap.into());
                self.store
                    .store()
                    .update(&collection, &first.id, patch)
                    .await?;
                if !rest.is_empty() {
                    warn!(
                        %period,
                        category,
                        duplicates = rest.len(),
                        "duplicate budgets found; only the first was updated"
                    );
                }
                debug!(%period, category, cap = budget.cap, id = %first.id, "budget updated");
                Ok(UpsertOutcome::Updated {
                    id: first.id.clone(),
                    stale_duplicates: rest.len(),
                })
            }
        }
    }

    /// Every budget whose period equals `period`. Caps are read leniently, so a
    /// missing or textual cap does not fail the listing.
    pub async fn list_for(&self, period: Period) -> Result<Vec<Record<Budget>>, CoreError> {
        let collection = self.store.paths().budgets();
        let query = Query::new().where_eq(PERIOD_FIELD, period.key());
        let docs = self.store.store().query(&collection, &query).await?;
        docs.into_iter()
            .map(|mut doc| {
                let cap = coerce_amount(doc.data.get(CAP_FIELD));
                doc.data.insert(CAP_FIELD.into(), cap.into());
                decode(&collection, doc)
            })
            .collect()
    }

    /// Deletes every record matching `(period, category)` and returns how many went away.
    pub async fn remove(&self, period: Period, category: &str) -> Result<usize, CoreError> {
        let category = category.trim();
        let collection = self.store.paths().budgets();
        let matches = self.matching(period, category).await?;
        let mut removed = 0;
        for doc in matches {
            match self.store.store().delete(&collection, &doc.id).await {
                Ok(()) => removed += 1,
                Err(err) if err.is_not_found() => {
                    debug!(id = %doc.id, "budget already gone");
                }
                Err(err) => return Err(err.into()),
            }
        }
        debug!(%period, category, removed, "budgets removed");
        Ok(removed)
    }

    /// Copies budgets from `source` into `target` for categories `target` lacks
    /// (compared case-insensitively). Never overwrites; returns the number added.
    pub async fn import_from(&self, source: Period, target: Period) -> Result<usize, CoreError> {
        let mut present: HashSet<String> = self
            .list_for(target)
            .await?
            .iter()
            .map(|record| record.value.category_key())
            .collect();
        let mut added = 0;
        for record in self.list_for(source).await? {
            let budget = record.value;
            if present.insert(category_key(&budget.category)) {
                self.upsert(target, &budget.category, budget.cap).await?;
                added += 1;
            }
        }
        info!(%source, %target, added, "budgets imported");
        Ok(added)
    }

    /// Upserts every budget of `source` into `target`, overwriting existing caps.
    pub async fn copy_all(&self, source: Period, target: Period) -> Result<usize, CoreError> {
        let budgets = self.list_for(source).await?;
        for record in &budgets {
            self.upsert(target, &record.value.category, record.value.cap)
                .await?;
        }
        Ok(budgets.len())
    }

    /// Distinct periods referenced by any stored budget.
    pub async fn periods_with_budgets(&self) -> Result<Vec<Period>, CoreError> {
        let collection = self.store.paths().budgets();
        let docs = self.store.store().get_all(&collection).await?;
        let mut periods: Vec<Period> = docs
            .iter()
            .filter_map(|doc| doc.data.get(PERIOD_FIELD))
            .filter_map(|value| value.as_str())
            .filter_map(|key| Period::parse(key).ok())
            .collect();
        periods.sort();
        periods.dedup();
        Ok(periods)
    }

    async fn matching(
        &self,
        period: Period,
        category: &str,
    ) -> Result<Vec<StoredDocument>, CoreError> {
        let collection = self.store.paths().budgets();
        let query = Query::new()
            .where_eq(PERIOD_FIELD, period.key())
            .where_eq(CATEGORY_FIELD, category);
        Ok(self.store.store().query(&collection, &query).await?)
    }
}
