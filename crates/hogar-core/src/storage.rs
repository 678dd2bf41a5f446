//! Document-store collaborator: collection paths, queries, and the async
//! backend trait every persistence adapter implements.

use std::{cmp::Ordering, fmt, sync::Arc};

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use hogar_domain::Record;

use crate::CoreError;

/// Field map of a stored document.
pub type Document = Map<String, Value>;

/// Transport, permission and lookup failures reported by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("document `{id}` not found in `{collection}`")]
    NotFound { collection: String, id: String },
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("serialization failure: {0}")]
    Serialization(String),
}

impl StoreError {
    pub fn not_found(collection: &CollectionPath, id: &str) -> Self {
        StoreError::NotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Slash-separated path of a collection, e.g. `households/main/budgets`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(Vec<String>);

impl CollectionPath {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

/// Tenant-scoped layout under `households/{householdId}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HouseholdPaths {
    household_id: String,
    base: CollectionPath,
}

impl HouseholdPaths {
    pub fn new(household_id: impl Into<String>) -> Self {
        let household_id = household_id.into();
        let base = CollectionPath::new(["households", household_id.as_str()]);
        Self { household_id, base }
    }

    pub fn household_id(&self) -> &str {
        &self.household_id
    }

    pub fn tasks(&self) -> CollectionPath {
        self.base.child("tasks")
    }

    pub fn expenses(&self) -> CollectionPath {
        self.base.child("expenses")
    }

    pub fn budgets(&self) -> CollectionPath {
        self.base.child("budgets")
    }

    /// Keyed by period.
    pub fn incomes(&self) -> CollectionPath {
        self.base.child("incomes")
    }

    /// Keyed by period, presence-only.
    pub fn closures(&self) -> CollectionPath {
        self.base.child("closures")
    }

    /// Keyed by user id, presence-only.
    pub fn members(&self) -> CollectionPath {
        self.base.child("members")
    }
}

/// A document together with its key.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub data: Document,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, data: Document) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// How `set` treats an existing document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace every field.
    Replace,
    /// Overwrite only the supplied fields.
    Merge,
}

/// Equality filters, one optional ordering, and an optional limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    filters: Vec<(String, Value)>,
    order_by: Option<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }

    pub fn filters(&self) -> &[(String, Value)] {
        &self.filters
    }

    pub fn matches(&self, document: &Document) -> bool {
        self.filters
            .iter()
            .all(|(field, expected)| document.get(field) == Some(expected))
    }

    /// Evaluates the query over an unordered set of documents.
    ///
    /// Documents lacking the ordering field are excluded from ordered results.
    pub fn apply(&self, documents: Vec<StoredDocument>) -> Vec<StoredDocument> {
        let mut selected: Vec<StoredDocument> = documents
            .into_iter()
            .filter(|doc| self.matches(&doc.data))
            .collect();
        if let Some((field, direction)) = &self.order_by {
            selected.retain(|doc| doc.data.contains_key(field));
            selected.sort_by(|a, b| {
                let ordering = compare_values(&a.data[field], &b.data[field]);
                match direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }
        if let Some(limit) = self.limit {
            selected.truncate(limit);
        }
        selected
    }
}

fn value_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or(f64::NAN);
            let y = y.as_f64().unwrap_or(f64::NAN);
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => value_rank(a).cmp(&value_rank(b)),
    }
}

/// Abstraction over a remote, networked key/document service.
///
/// Every call may suspend; none is transactional across documents.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<Option<StoredDocument>, StoreError>;

    async fn get_all(&self, collection: &CollectionPath) -> Result<Vec<StoredDocument>, StoreError>;

    async fn query(
        &self,
        collection: &CollectionPath,
        query: &Query,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let documents = self.get_all(collection).await?;
        Ok(query.apply(documents))
    }

    /// Stores a new document under a backend-assigned id and returns it.
    async fn insert(&self, collection: &CollectionPath, data: Document) -> Result<String, StoreError>;

    /// Merges `patch` into an existing document. Fails with `NotFound` if absent.
    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        patch: Document,
    ) -> Result<(), StoreError>;

    /// Creates or overwrites the document at `id`.
    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: Document,
        mode: WriteMode,
    ) -> Result<(), StoreError>;

    /// Removes the document at `id`. Fails with `NotFound` if absent.
    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError>;
}

/// Store handle scoped to one household, shared by every service.
#[derive(Clone)]
pub struct HouseholdStore {
    store: Arc<dyn DocumentStore>,
    paths: HouseholdPaths,
}

impl HouseholdStore {
    pub fn new(store: Arc<dyn DocumentStore>, household_id: impl Into<String>) -> Self {
        Self {
            store,
            paths: HouseholdPaths::new(household_id),
        }
    }

    pub fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    pub fn paths(&self) -> &HouseholdPaths {
        &self.paths
    }
}

/// Serializes a domain value into a document.
pub fn encode<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value).map_err(|err| StoreError::Serialization(err.to_string()))? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(format!(
            "expected an object, got `{other}`"
        ))),
    }
}

/// Deserializes a stored document into a [`Record`].
pub fn decode<T: DeserializeOwned>(
    collection: &CollectionPath,
    stored: StoredDocument,
) -> Result<Record<T>, CoreError> {
    let StoredDocument { id, data } = stored;
    match serde_json::from_value(Value::Object(data)) {
        Ok(value) => Ok(Record::new(id, value)),
        Err(err) => Err(CoreError::MalformedDocument {
            collection: collection.to_string(),
            id,
            reason: err.to_string(),
        }),
    }
}

/// Reads a numeric field leniently: numbers and numeric strings are accepted,
/// anything else (including negatives and non-finite values) becomes zero.
pub fn coerce_amount(value: Option<&Value>) -> f64 {
    let raw = match value {
        Some(Value::Number(number)) => number.as_f64().unwrap_or(0.0),
        Some(Value::String(text)) => text.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    hogar_domain::non_negative(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, value: Value) -> StoredDocument {
        match value {
            Value::Object(map) => StoredDocument::new(id, map),
            _ => panic!("object expected"),
        }
    }

    #[test]
    fn household_paths_are_tenant_scoped() {
        let paths = HouseholdPaths::new("hogar-principal");
        assert_eq!(paths.budgets().to_string(), "households/hogar-principal/budgets");
        assert_eq!(paths.closures().to_string(), "households/hogar-principal/closures");
        assert_eq!(paths.members().segments().len(), 3);
    }

    #[test]
    fn query_filters_orders_and_limits() {
        let docs = vec![
            doc("a", json!({"kind": "x", "at": "2024-01-02"})),
            doc("b", json!({"kind": "y", "at": "2024-01-03"})),
            doc("c", json!({"kind": "x", "at": "2024-01-05"})),
            doc("d", json!({"kind": "x"})),
        ];
        let query = Query::new()
            .where_eq("kind", "x")
            .order_by("at", Direction::Descending)
            .limit(1);
        let ids: Vec<String> = query.apply(docs.clone()).into_iter().map(|d| d.id).collect();
        assert_eq!(ids, ["c"]);

        let all_x = Query::new().where_eq("kind", "x").apply(docs);
        assert_eq!(all_x.len(), 3);
    }

    #[test]
    fn coerce_amount_accepts_numeric_strings() {
        assert_eq!(coerce_amount(Some(&json!(12.5))), 12.5);
        assert_eq!(coerce_amount(Some(&json!(" 300 "))), 300.0);
        assert_eq!(coerce_amount(Some(&json!("abc"))), 0.0);
        assert_eq!(coerce_amount(Some(&json!(-5))), 0.0);
        assert_eq!(coerce_amount(None), 0.0);
    }
}
