//! Chore ledger and the trailing-week effort aggregate.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use hogar_domain::{PartySplit, Record, Task, TaskFilter, TaskPatch};

use crate::{
    storage::{decode, encode, Direction, HouseholdStore, Query, StoreError, WriteMode},
    time::Clock,
    CoreError,
};

const CREATED_AT_FIELD: &str = "created_at";
const METRICS_WINDOW_DAYS: i64 = 7;

/// Effort per assignee for tasks created in the trailing week.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WeeklyMetrics {
    pub done: PartySplit<f64>,
    pub pending: PartySplit<f64>,
}

impl WeeklyMetrics {
    pub fn total_done(&self) -> f64 {
        self.done.total()
    }

    pub fn total_pending(&self) -> f64 {
        self.pending.total()
    }
}

/// Sums effort of tasks created less than seven days before `now`, bucketed
/// by status and assignee.
pub fn weekly_metrics<'a, I>(tasks: I, now: DateTime<Utc>) -> WeeklyMetrics
where
    I: IntoIterator<Item = &'a Task>,
{
    let since = now - Duration::days(METRICS_WINDOW_DAYS);
    let mut metrics = WeeklyMetrics::default();
    for task in tasks.into_iter().filter(|task| task.created_at > since) {
        let bucket = if task.is_done() {
            &mut metrics.done
        } else {
            &mut metrics.pending
        };
        *bucket.get_mut(task.assigned_to) += task.effort;
    }
    metrics
}

pub struct TaskService {
    store: HouseholdStore,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    pub fn new(store: HouseholdStore, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub async fn add(&self, task: Task) -> Result<Record<Task>, CoreError> {
        task.validate()?;
        let collection = self.store.paths().tasks();
        let id = self.store.store().insert(&collection, encode(&task)?).await?;
        debug!(%id, title = %task.title, assignee = %task.assigned_to, "task added");
        Ok(Record::new(id, task))
    }

    /// Every task, newest first.
    pub async fn list(&self) -> Result<Vec<Record<Task>>, CoreError> {
        let collection = self.store.paths().tasks();
        let query = Query::new().order_by(CREATED_AT_FIELD, Direction::Descending);
        let docs = self.store.store().query(&collection, &query).await?;
        docs.into_iter()
            .map(|doc| decode(&collection, doc))
            .collect()
    }

    pub async fn list_filtered(&self, filter: TaskFilter) -> Result<Vec<Record<Task>>, CoreError> {
        let mut tasks = self.list().await?;
        tasks.retain(|record| filter.matches(&record.value));
        Ok(tasks)
    }

    pub async fn get(&self, id: &str) -> Result<Record<Task>, CoreError> {
        let collection = self.store.paths().tasks();
        match self.store.store().get(&collection, id).await? {
            Some(doc) => decode(&collection, doc),
            None => Err(StoreError::not_found(&collection, id).into()),
        }
    }

    /// Applies `patch` to the stored task and writes the result back.
    pub async fn update(&self, id: &str, patch: &TaskPatch) -> Result<Record<Task>, CoreError> {
        let mut record = self.get(id).await?;
        if patch.is_empty() {
            return Ok(record);
        }
        record.value.apply(patch);
        record.value.validate()?;

        let collection = self.store.paths().tasks();
        self.store
            .store()
            .set(&collection, id, encode(&record.value)?, WriteMode::Replace)
            .await?;
        debug!(%id, status = %record.value.status, "task updated");
        Ok(record)
    }

    /// Marks the task done now.
    pub async fn complete(&self, id: &str) -> Result<Record<Task>, CoreError> {
        self.update(id, &TaskPatch::done_at(self.clock.now())).await
    }

    /// Hands the task to the other party.
    pub async fn reassign(&self, id: &str) -> Result<Record<Task>, CoreError> {
        let current = self.get(id).await?;
        let patch = TaskPatch::assign(current.value.assigned_to.other());
        self.update(id, &patch).await
    }

    pub async fn remove(&self, id: &str) -> Result<(), CoreError> {
        let collection = self.store.paths().tasks();
        self.store.store().delete(&collection, id).await?;
        debug!(%id, "task removed");
        Ok(())
    }

    /// Metrics over the stored tasks as of the service clock.
    pub async fn weekly_metrics(&self) -> Result<WeeklyMetrics, CoreError> {
        let tasks = self.list().await?;
        Ok(weekly_metrics(
            tasks.iter().map(|record| &record.value),
            self.clock.now(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use hogar_domain::{Party, TaskStatus};

    #[test]
    fn weekly_metrics_skip_old_tasks() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let recent = now - Duration::days(2);
        let old = now - Duration::days(8);

        let mut done = Task::new("Cocinar", 3.0, Party::Esposa, recent);
        done.status = TaskStatus::Done;
        let tasks = vec![
            done,
            Task::new("Planchar", 2.0, Party::Esposo, recent),
            Task::new("Jardín", 1.5, Party::Esposo, recent),
            Task::new("Ático", 10.0, Party::Esposa, old),
        ];

        let metrics = weekly_metrics(&tasks, now);
        assert_eq!(metrics.done, PartySplit::new(3.0, 0.0));
        assert_eq!(metrics.pending, PartySplit::new(0.0, 3.5));
        assert_eq!(metrics.total_pending(), 3.5);
    }

    #[test]
    fn weekly_metrics_exclude_tasks_exactly_one_week_old() {
        let now = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let tasks = vec![
            Task::new("Ventanas", 5.0, Party::Esposa, now - Duration::days(7)),
            Task::new(
                "Basura",
                1.0,
                Party::Esposa,
                now - Duration::days(7) + Duration::milliseconds(1),
            ),
        ];

        let metrics = weekly_metrics(&tasks, now);
        assert_eq!(metrics.pending, PartySplit::new(1.0, 0.0));
        assert_eq!(metrics.total_done(), 0.0);
    }
}
