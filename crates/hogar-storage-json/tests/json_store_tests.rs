use std::{fs, sync::Arc};

use hogar_core::{
    storage::{CollectionPath, Document, DocumentStore, HouseholdStore, WriteMode},
    BudgetService, ClosureService, IncomeService,
};
use hogar_domain::{Income, Period};
use hogar_storage_json::JsonDocumentStore;
use serde_json::{json, Value};
use tempfile::tempdir;

fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => panic!("object expected"),
    }
}

fn period(value: &str) -> Period {
    Period::parse(value).expect("valid period")
}

#[tokio::test]
async fn documents_survive_a_new_store_instance() {
    let dir = tempdir().expect("tempdir");
    let collection = CollectionPath::new(["households", "main", "incomes"]);

    let store = JsonDocumentStore::new(dir.path()).expect("create store");
    store
        .set(
            &collection,
            "2024-06",
            document(json!({"esposa": 18800.0, "esposo": 27000.0})),
            WriteMode::Replace,
        )
        .await
        .expect("set income");

    let path = store.collection_path(&collection);
    assert_eq!(path, dir.path().join("households/main/incomes.json"));
    assert!(path.exists());

    let reopened = JsonDocumentStore::new(dir.path()).expect("reopen store");
    let stored = reopened
        .get(&collection, "2024-06")
        .await
        .expect("get income")
        .expect("income present");
    assert_eq!(stored.data["esposo"], json!(27000.0));
}

#[tokio::test]
async fn merge_keeps_fields_and_replace_drops_them() {
    let dir = tempdir().expect("tempdir");
    let store = JsonDocumentStore::new(dir.path()).expect("create store");
    let collection = CollectionPath::new(["households", "main", "incomes"]);

    store
        .set(&collection, "k", document(json!({"a": 1, "b": 2})), WriteMode::Replace)
        .await
        .unwrap();
    store
        .set(&collection, "k", document(json!({"b": 3})), WriteMode::Merge)
        .await
        .unwrap();
    let merged = store.get(&collection, "k").await.unwrap().unwrap();
    assert_eq!(Value::Object(merged.data), json!({"a": 1, "b": 3}));

    store
        .set(&collection, "k", document(json!({"c": 4})), WriteMode::Replace)
        .await
        .unwrap();
    let replaced = store.get(&collection, "k").await.unwrap().unwrap();
    assert_eq!(Value::Object(replaced.data), json!({"c": 4}));
}

#[tokio::test]
async fn update_and_delete_report_missing_documents() {
    let dir = tempdir().expect("tempdir");
    let store = JsonDocumentStore::new(dir.path()).expect("create store");
    let collection = CollectionPath::new(["households", "main", "tasks"]);

    let err = store
        .update(&collection, "missing", document(json!({"x": 1})))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(store.delete(&collection, "missing").await.unwrap_err().is_not_found());

    let id = store
        .insert(&collection, document(json!({"title": "Barrer"})))
        .await
        .unwrap();
    store
        .update(&collection, &id, document(json!({"status": "done"})))
        .await
        .unwrap();
    let all = store.get_all(&collection).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].data["title"], "Barrer");
    assert_eq!(all[0].data["status"], "done");

    store.delete(&collection, &id).await.unwrap();
    assert!(store.get_all(&collection).await.unwrap().is_empty());
    let leftovers: Vec<_> = fs::read_dir(dir.path().join("households/main"))
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn corrupted_collection_is_a_serialization_error() {
    let dir = tempdir().expect("tempdir");
    let store = JsonDocumentStore::new(dir.path()).expect("create store");
    let collection = CollectionPath::new(["households", "main", "budgets"]);
    let path = store.collection_path(&collection);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "{ not json").unwrap();

    let err = store.get_all(&collection).await.unwrap_err();
    assert!(matches!(err, hogar_core::StoreError::Serialization(_)));
}

#[tokio::test]
async fn services_close_a_period_on_disk() {
    let dir = tempdir().expect("tempdir");
    let backend = Arc::new(JsonDocumentStore::new(dir.path()).expect("create store"));
    let store = HouseholdStore::new(backend as Arc<dyn DocumentStore>, "hogar-principal");

    let budgets = BudgetService::new(store.clone());
    let incomes = IncomeService::new(store.clone());
    let closures = ClosureService::new(store);

    budgets.upsert(period("2024-06"), "Comida", 5000.0).await.unwrap();
    incomes
        .save(period("2024-06"), Income::new(18000.0, 28000.0))
        .await
        .unwrap();
    closures.close(period("2024-06")).await.unwrap();

    let reopened: Arc<dyn DocumentStore> =
        Arc::new(JsonDocumentStore::new(dir.path()).expect("reopen store"));
    let store = HouseholdStore::new(reopened, "hogar-principal");
    assert!(ClosureService::new(store.clone())
        .is_closed(period("2024-06"))
        .await
        .unwrap());
    assert_eq!(
        BudgetService::new(store.clone())
            .list_for(period("2024-07"))
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        IncomeService::new(store)
            .resolve(period("2024-07"))
            .await
            .unwrap(),
        Income::new(18000.0, 28000.0)
    );
}

#[tokio::test]
async fn similar_household_ids_keep_separate_data() {
    let dir = tempdir().expect("tempdir");
    let backend: Arc<dyn DocumentStore> =
        Arc::new(JsonDocumentStore::new(dir.path()).expect("create store"));
    let spaced = BudgetService::new(HouseholdStore::new(backend.clone(), "Casa Uno"));
    let underscored = BudgetService::new(HouseholdStore::new(backend, "casa_uno"));

    spaced.upsert(period("2024-06"), "Comida", 5000.0).await.unwrap();

    assert!(underscored.list_for(period("2024-06")).await.unwrap().is_empty());
    assert_eq!(spaced.list_for(period("2024-06")).await.unwrap().len(), 1);
}
