//! Household chores with effort weights.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{common::timestamp, party::Party, validation::ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Done,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Done => "done",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub effort: f64,
    pub assigned_to: Party,
    pub status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default, with = "timestamp::option")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(
        title: impl Into<String>,
        effort: f64,
        assigned_to: Party,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            effort,
            assigned_to,
            status: TaskStatus::Pending,
            due_date: None,
            created_at,
            completed_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn due_on(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if !(self.effort.is_finite() && self.effort >= 0.0) {
            return Err(ValidationError::InvalidEffort(self.effort));
        }
        Ok(())
    }

    /// Applies the fields set in `patch`.
    pub fn apply(&mut self, patch: &TaskPatch) {
        if let Some(title) = &patch.title {
            self.title = title.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(effort) = patch.effort {
            self.effort = effort;
        }
        if let Some(assigned_to) = patch.assigned_to {
            self.assigned_to = assigned_to;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = completed_at;
        }
    }
}

/// Partial update for a task. `None` leaves a field untouched; the nested
/// options clear `due_date` / `completed_at` when set to `Some(None)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub effort: Option<f64>,
    pub assigned_to: Option<Party>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<NaiveDate>>,
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl TaskPatch {
    pub fn done_at(at: DateTime<Utc>) -> Self {
        Self {
            status: Some(TaskStatus::Done),
            completed_at: Some(Some(at)),
            ..Self::default()
        }
    }

    pub fn assign(party: Party) -> Self {
        Self {
            assigned_to: Some(party),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Restricts task listings by assignee and/or status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub assignee: Option<Party>,
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.assignee.map_or(true, |party| task.assigned_to == party)
            && self.status.map_or(true, |status| task.status == status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn created() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn patch_applies_only_set_fields() {
        let mut task = Task::new("Lavar platos", 2.0, Party::Esposo, created());
        let done = Utc.with_ymd_and_hms(2024, 6, 2, 8, 0, 0).unwrap();
        task.apply(&TaskPatch::done_at(done));
        assert!(task.is_done());
        assert_eq!(task.completed_at, Some(done));
        assert_eq!(task.assigned_to, Party::Esposo);
        assert_eq!(task.title, "Lavar platos");
    }

    #[test]
    fn filter_matches_assignee_and_status() {
        let task = Task::new("Barrer", 1.0, Party::Esposa, created());
        assert!(TaskFilter::default().matches(&task));
        let by_party = TaskFilter {
            assignee: Some(Party::Esposa),
            status: Some(TaskStatus::Pending),
        };
        assert!(by_party.matches(&task));
        let other = TaskFilter {
            assignee: Some(Party::Esposo),
            status: None,
        };
        assert!(!other.matches(&task));
    }

    #[test]
    fn tasks_need_a_title() {
        let task = Task::new("   ", 1.0, Party::Esposa, created());
        assert_eq!(task.validate(), Err(ValidationError::EmptyTitle));
        let heavy = Task::new("Mudanza", -3.0, Party::Esposa, created());
        assert_eq!(heavy.validate(), Err(ValidationError::InvalidEffort(-3.0)));
    }

    #[test]
    fn task_documents_round_trip_without_completion() {
        let task = Task::new("Compras", 3.0, Party::Esposa, created());
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "pending");
        assert!(json["completed_at"].is_null());
        let back: Task = serde_json::from_value(json).unwrap();
        assert_eq!(back, task);
    }
}
