use std::sync::Arc;

use hogar_core::{
    BudgetService, ClosureService, CoreError, DocumentStore, HouseholdStore, IncomeService,
    MemoryDocumentStore, PeriodStatus,
};
use hogar_domain::{months_around, next_period, previous_period, Income, Period};

fn household() -> HouseholdStore {
    let backend: Arc<dyn DocumentStore> = Arc::new(MemoryDocumentStore::new());
    HouseholdStore::new(backend, "hogar-principal")
}

#[test]
fn period_navigation_round_trips_across_years() {
    for key in ["2023-12", "2024-01", "2024-06", "1999-12", "2100-01"] {
        let p = Period::parse(key).unwrap();
        assert_eq!(previous_period(next_period(p)), p);
        assert_eq!(next_period(previous_period(p)), p);
    }

    let around: Vec<String> = months_around(Period::parse("2024-06").unwrap(), 2, 2)
        .iter()
        .map(Period::key)
        .collect();
    assert_eq!(around, ["2024-04", "2024-05", "2024-06", "2024-07", "2024-08"]);
}

#[tokio::test]
async fn a_year_of_closures_carries_settings_forward() {
    let store = household();
    let closures = ClosureService::new(store.clone());
    let budgets = BudgetService::new(store.clone());
    let incomes = IncomeService::new(store);

    let mut period = Period::parse("2024-01").unwrap();
    incomes.save(period, Income::new(10000.0, 20000.0)).await.unwrap();
    budgets.upsert(period, "Renta", 8000.0).await.unwrap();

    for _ in 0..12 {
        let outcome = closures.close(period).await.unwrap();
        assert_eq!(outcome.income, Income::new(10000.0, 20000.0));
        period = outcome.next;
    }

    assert_eq!(period, Period::parse("2025-01").unwrap());
    assert_eq!(closures.closed_periods().await.unwrap().len(), 12);
    assert_eq!(closures.status(period).await.unwrap(), PeriodStatus::Open);
    let carried = budgets.list_for(period).await.unwrap();
    assert_eq!(carried.len(), 1);
    assert_eq!(carried[0].value.cap, 8000.0);
}

#[tokio::test]
async fn reopened_periods_can_be_closed_again() {
    let closures = ClosureService::new(household());
    let june = Period::parse("2024-06").unwrap();

    closures.close(june).await.unwrap();
    closures.reopen(june).await.unwrap();
    closures.close(june).await.unwrap();
    assert!(matches!(
        closures.close(june).await,
        Err(CoreError::AlreadyClosed(_))
    ));
}
