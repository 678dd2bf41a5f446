mod common;

use std::sync::Arc;

use common::{open_app, setup_test_env};
use hogar::HogarError;
use hogar_core::{
    AuthProvider, CoreError, Credentials, LocalAuthProvider, PeriodStatus, StoreError,
};
use hogar_domain::{ExpenseDraft, Income, IncomeSource, Party, Period, Task};

fn period(value: &str) -> Period {
    Period::parse(value).expect("valid period")
}

#[tokio::test]
async fn fresh_household_starts_in_the_current_month_with_default_income() {
    let (app, _manager) = setup_test_env();

    assert_eq!(app.current_period(), period("2024-06"));
    assert_eq!(app.household_id(), "hogar-principal");
    let report = app.report(app.current_period()).await.expect("report");
    assert_eq!(report.status, PeriodStatus::Open);
    assert_eq!(report.income.source, IncomeSource::SystemDefault);
    assert_eq!(report.settlement.total_income, 45800.0);
}

#[tokio::test]
async fn closing_advances_the_session_and_survives_a_restart() {
    let (mut app, manager) = setup_test_env();
    let june = app.current_period();

    app.incomes()
        .save(june, Income::new(20000.0, 30000.0))
        .await
        .unwrap();
    app.budgets().upsert(june, "Comida", 6000.0).await.unwrap();
    app.budgets().upsert(june, "Luz", 900.0).await.unwrap();

    let outcome = app.close_current_period().await.expect("close june");
    assert_eq!(outcome.next, period("2024-07"));
    assert_eq!(outcome.budgets_copied, 2);
    assert_eq!(app.current_period(), period("2024-07"));

    // A second session on the same device picks up the advanced pointer.
    let restarted = open_app(&manager);
    assert_eq!(restarted.current_period(), period("2024-07"));
    assert!(restarted.closures().is_closed(june).await.unwrap());
    assert_eq!(
        restarted.incomes().resolve_detailed(period("2024-07")).await.unwrap().source,
        IncomeSource::Explicit
    );
    assert_eq!(
        restarted.budgets().list_for(period("2024-07")).await.unwrap().len(),
        2
    );
}

#[tokio::test]
async fn closing_twice_is_rejected_without_moving_the_pointer() {
    let (mut app, _manager) = setup_test_env();

    app.close_current_period().await.unwrap();
    app.session_mut().go_to("2024-06").unwrap();

    let err = app.close_current_period().await.unwrap_err();
    assert!(matches!(err, HogarError::Core(CoreError::AlreadyClosed(_))));
    assert_eq!(app.current_period(), period("2024-06"));

    app.reopen_current_period().await.unwrap();
    assert_eq!(
        app.closures().status(period("2024-06")).await.unwrap(),
        PeriodStatus::Open
    );
    let err = app.reopen_current_period().await.unwrap_err();
    assert!(matches!(err, HogarError::Core(CoreError::NotClosed(_))));
}

#[tokio::test]
async fn import_previous_brings_income_and_missing_budgets() {
    let (app, _manager) = setup_test_env();
    let may = period("2024-05");
    let june = period("2024-06");

    app.incomes().save(may, Income::new(15000.0, 15000.0)).await.unwrap();
    app.budgets().upsert(may, "Comida", 5000.0).await.unwrap();
    app.budgets().upsert(may, "Gas", 400.0).await.unwrap();
    app.budgets().upsert(june, "GAS", 450.0).await.unwrap();

    let outcome = app.import_previous(june).await.unwrap();
    assert_eq!(outcome.source, may);
    assert_eq!(outcome.budgets_added, 1);
    assert_eq!(app.incomes().stored(june).await.unwrap(), Some(Income::new(15000.0, 15000.0)));

    let again = app.import_previous(june).await.unwrap();
    assert_eq!(again.budgets_added, 0);
    assert_eq!(app.budgets().list_for(june).await.unwrap().len(), 2);
}

#[tokio::test]
async fn report_text_uses_the_configured_currency() {
    let (app, _manager) = setup_test_env();
    let june = app.current_period();

    app.expenses()
        .add(ExpenseDraft::new("Comida", 1000.0, Party::Esposa))
        .await
        .unwrap();
    app.expenses()
        .add(ExpenseDraft::new("Luz", 500.0, Party::Esposo))
        .await
        .unwrap();
    app.budgets().upsert(june, "Comida", 2000.0).await.unwrap();

    assert_eq!(app.recent_expenses().await.unwrap().len(), 2);
    let text = app.current_report_text().await.unwrap();
    assert!(text.contains("Income: L 45800.00 (default)"), "{text}");
    assert!(text.contains("  esposa: L 18800.00 (41.0%)"), "{text}");
    assert!(text.contains("  esposo: L 27000.00 (59.0%)"), "{text}");
    assert!(text.contains("esposa: paid L 1000.00, share L 615.72, in favor L 384.28"), "{text}");
    assert!(text.contains("esposo: paid L 500.00, share L 884.28, against L 384.28"), "{text}");
    assert!(text.contains("Comida: L 1000.00 of L 2000.00 (50%)"), "{text}");
}

#[tokio::test]
async fn only_members_pass_the_guard() {
    let (app, _manager) = setup_test_env();
    let auth = Arc::new(
        LocalAuthProvider::new().with_account("ana@example.com", "clave", "user-ana"),
    );

    let session = auth
        .sign_in_with_credentials(&Credentials::new("ana@example.com", "clave"))
        .await
        .unwrap();
    assert!(matches!(
        app.ensure_member(&session).await,
        Err(HogarError::NotAMember { .. })
    ));

    app.members().add_member(&session.user_id).await.unwrap();
    app.ensure_member(&session).await.expect("member passes");

    let guest = auth.sign_in_anonymous().await.unwrap();
    assert!(app.ensure_member(&guest).await.is_err());
}

#[tokio::test]
async fn tasks_round_trip_through_the_json_store() {
    let (app, manager) = setup_test_env();
    let created = app
        .tasks()
        .add(Task::new("Lavar ropa", 2.0, Party::Esposo, common::frozen_now()))
        .await
        .unwrap();
    app.tasks().complete(&created.id).await.unwrap();

    let restarted = open_app(&manager);
    let tasks = restarted.tasks().list().await.unwrap();
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].value.is_done());
    let metrics = restarted.tasks().weekly_metrics().await.unwrap();
    assert_eq!(metrics.done.esposo, 2.0);

    restarted.tasks().remove(&created.id).await.unwrap();
    let err = restarted.tasks().remove(&created.id).await.unwrap_err();
    assert!(matches!(err, CoreError::Store(StoreError::NotFound { .. })));
}

#[tokio::test]
async fn start_applies_the_configured_log_filter() {
    let manager = common::temp_manager();
    let mut config = manager.load().expect("load config");
    config.log_filter = "hogar=debug,hogar_core=trace".into();
    config.household_id = "Casa Uno".into();
    manager.save(&config).expect("save config");

    let app = hogar::start(manager.clone()).expect("start app");
    assert_eq!(app.settings().log_filter, "hogar=debug,hogar_core=trace");
    assert_eq!(app.household_id(), "Casa Uno");
    assert!(app
        .budgets()
        .list_for(app.current_period())
        .await
        .unwrap()
        .is_empty());
}
