//! Read-only aggregates over a period: budget usage, the settlement report,
//! and the list of periods worth offering for navigation.

use std::{collections::BTreeSet, sync::Arc};

use hogar_domain::{months_around, Budget, Expense, Period, Record};

use crate::{
    budget_service::BudgetService,
    closure_service::{ClosureService, PeriodStatus},
    expense_service::ExpenseService,
    income_service::{IncomeService, ResolvedIncome},
    settlement::{settle, Settlement},
    storage::HouseholdStore,
    time::Clock,
    CoreError,
};

/// Months shown on either side of the current period in navigation choices.
pub const CHOICE_RADIUS: u32 = 2;

/// Spending against one category cap.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetUsage {
    pub category: String,
    pub cap: f64,
    pub used: f64,
    /// Whole percent of the cap spent, capped at 100.
    pub percent: u32,
}

impl BudgetUsage {
    pub fn new(category: impl Into<String>, cap: f64, used: f64) -> Self {
        Self {
            category: category.into(),
            cap,
            used,
            percent: usage_percent(used, cap),
        }
    }

    pub fn remaining(&self) -> f64 {
        self.cap - self.used
    }

    pub fn is_exceeded(&self) -> bool {
        self.used > self.cap
    }
}

/// `min(100, round(used * 100 / cap))`, or 0 without a positive cap.
pub fn usage_percent(used: f64, cap: f64) -> u32 {
    if cap.is_nan() || cap <= 0.0 || !used.is_finite() || used <= 0.0 {
        return 0;
    }
    (used * 100.0 / cap).round().min(100.0) as u32
}

/// Everything shown for one period.
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodReport {
    pub period: Period,
    pub status: PeriodStatus,
    pub income: ResolvedIncome,
    pub settlement: Settlement,
    pub usage: Vec<BudgetUsage>,
    pub expense_count: usize,
}

pub struct SummaryService {
    incomes: IncomeService,
    budgets: BudgetService,
    expenses: ExpenseService,
    closures: ClosureService,
}

impl SummaryService {
    pub fn new(store: HouseholdStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            incomes: IncomeService::new(store.clone()),
            budgets: BudgetService::new(store.clone()),
            expenses: ExpenseService::new(store.clone(), clock),
            closures: ClosureService::new(store),
        }
    }

    pub fn with_aggregation_limit(mut self, limit: usize) -> Self {
        self.expenses = self.expenses.with_aggregation_limit(limit);
        self
    }

    /// Usage of every budget of `period`, matching expense categories exactly.
    pub async fn budget_usage(&self, period: Period) -> Result<Vec<BudgetUsage>, CoreError> {
        let expenses = self.expenses.list_for_period(period).await?;
        let budgets = self.budgets.list_for(period).await?;
        Ok(usage_of(&budgets, &expenses))
    }

    pub async fn settlement(&self, period: Period) -> Result<Settlement, CoreError> {
        let income = self.incomes.resolve(period).await?;
        let expenses = self.expenses.list_for_period(period).await?;
        Ok(settle(&income, &expenses))
    }

    pub async fn period_report(&self, period: Period) -> Result<PeriodReport, CoreError> {
        let status = self.closures.status(period).await?;
        let income = self.incomes.resolve_detailed(period).await?;
        let expenses = self.expenses.list_for_period(period).await?;
        let budgets = self.budgets.list_for(period).await?;

        Ok(PeriodReport {
            period,
            status,
            settlement: settle(&income.income, &expenses),
            usage: usage_of(&budgets, &expenses),
            expense_count: expenses.len(),
            income,
        })
    }

    /// `current` plus every period with an income record or a budget, ascending.
    pub async fn known_periods(&self, current: Period) -> Result<Vec<Period>, CoreError> {
        let mut periods = BTreeSet::from([current]);
        periods.extend(self.incomes.periods_with_income().await?);
        periods.extend(self.budgets.periods_with_budgets().await?);
        Ok(periods.into_iter().collect())
    }

    /// Known periods together with the months around `current`, ascending.
    pub async fn period_choices(&self, current: Period) -> Result<Vec<Period>, CoreError> {
        let mut periods: BTreeSet<Period> = self.known_periods(current).await?.into_iter().collect();
        periods.extend(months_around(current, CHOICE_RADIUS, CHOICE_RADIUS));
        Ok(periods.into_iter().collect())
    }
}

fn usage_of(budgets: &[Record<Budget>], expenses: &[Record<Expense>]) -> Vec<BudgetUsage> {
    budgets
        .iter()
        .map(|budget| {
            let used = expenses
                .iter()
                .filter(|expense| expense.value.category == budget.value.category)
                .map(|expense| expense.value.amount)
                .sum();
            BudgetUsage::new(budget.value.category.clone(), budget.value.cap, used)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_percent_is_rounded_and_capped() {
        assert_eq!(usage_percent(50.0, 200.0), 25);
        assert_eq!(usage_percent(1.0, 3.0), 33);
        assert_eq!(usage_percent(2.0, 3.0), 67);
        assert_eq!(usage_percent(500.0, 200.0), 100);
        assert_eq!(usage_percent(10.0, 0.0), 0);
    }

    #[test]
    fn usage_flags_overspending() {
        let usage = BudgetUsage::new("Comida", 100.0, 130.0);
        assert!(usage.is_exceeded());
        assert_eq!(usage.remaining(), -30.0);
        assert_eq!(usage.percent, 100);
    }
}
