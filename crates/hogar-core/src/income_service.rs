//! Effective income per period, with a one-level fallback to the previous
//! period and a fixed system default.

use tracing::debug;

use hogar_domain::{Income, IncomeSource, Period, DEFAULT_INCOME};

use crate::{
    storage::{coerce_amount, encode, Document, HouseholdStore, WriteMode},
    CoreError,
};

/// An income value and where it was found.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedIncome {
    pub income: Income,
    pub source: IncomeSource,
}

pub struct IncomeService {
    store: HouseholdStore,
}

impl IncomeService {
    pub fn new(store: HouseholdStore) -> Self {
        Self { store }
    }

    /// The income stored for exactly `period`, if any.
    pub async fn stored(&self, period: Period) -> Result<Option<Income>, CoreError> {
        let collection = self.store.paths().incomes();
        let found = self.store.store().get(&collection, &period.key()).await?;
        Ok(found.map(|doc| income_from_document(&doc.data)))
    }

    /// Effective income for `period`.
    pub async fn resolve(&self, period: Period) -> Result<Income, CoreError> {
        Ok(self.resolve_detailed(period).await?.income)
    }

    /// Looks at `period`, then `period.previous()` (one level only), then the default.
    pub async fn resolve_detailed(&self, period: Period) -> Result<ResolvedIncome, CoreError> {
        if let Some(income) = self.stored(period).await? {
            return Ok(ResolvedIncome {
                income,
                source: IncomeSource::Explicit,
            });
        }
        let previous = period.previous();
        if let Some(income) = self.stored(previous).await? {
            debug!(%period, %previous, "income inherited from previous period");
            return Ok(ResolvedIncome {
                income,
                source: IncomeSource::Inherited(previous),
            });
        }
        debug!(%period, "income falls back to system default");
        Ok(ResolvedIncome {
            income: DEFAULT_INCOME,
            source: IncomeSource::SystemDefault,
        })
    }

    /// Upserts the income for `period`, merging into any existing record.
    pub async fn save(&self, period: Period, income: Income) -> Result<Income, CoreError> {
        self.write(period, income, WriteMode::Merge).await
    }

    /// Writes the income for `period`, discarding whatever was stored before.
    pub async fn replace(&self, period: Period, income: Income) -> Result<Income, CoreError> {
        self.write(period, income, WriteMode::Replace).await
    }

    /// Periods that have an explicit income record.
    pub async fn periods_with_income(&self) -> Result<Vec<Period>, CoreError> {
        let collection = self.store.paths().incomes();
        let docs = self.store.store().get_all(&collection).await?;
        let mut periods: Vec<Period> = docs
            .iter()
            .filter_map(|doc| Period::parse(&doc.id).ok())
            .collect();
        periods.sort();
        Ok(periods)
    }

    async fn write(&self, period: Period, income: Income, mode: WriteMode) -> Result<Income, CoreError> {
        let income = Income::new(income.esposa, income.esposo);
        let collection = self.store.paths().incomes();
        self.store
            .store()
            .set(&collection, &period.key(), encode(&income)?, mode)
            .await?;
        debug!(%period, esposa = income.esposa, esposo = income.esposo, "income saved");
        Ok(income)
    }
}

fn income_from_document(data: &Document) -> Income {
    Income::new(
        coerce_amount(data.get("esposa")),
        coerce_amount(data.get("esposo")),
    )
}
