//! Shared expenses recorded against a period.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    common::{timestamp, Amounted, PaidBy},
    party::Party,
    period::Period,
    validation::ValidationError,
};

/// An immutable expense entry.
///
/// `period` is derived from `date` when the expense is created and is never
/// recomputed afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub date: NaiveDate,
    #[serde(rename = "periodo")]
    pub period: Period,
    pub category: String,
    #[serde(default)]
    pub description: String,
    pub amount: f64,
    pub paid_by: Party,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        date: NaiveDate,
        category: impl Into<String>,
        description: impl Into<String>,
        amount: f64,
        paid_by: Party,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            date,
            period: Period::from_date(date),
            category: category.into(),
            description: description.into(),
            amount,
            paid_by,
            created_at,
        }
    }
}

impl Amounted for Expense {
    fn amount(&self) -> f64 {
        self.amount
    }
}

impl PaidBy for Expense {
    fn paid_by(&self) -> Party {
        self.paid_by
    }
}

/// Caller input for a new expense. A missing date means "today".
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub date: Option<NaiveDate>,
    pub category: String,
    pub description: String,
    pub amount: f64,
    pub paid_by: Party,
}

impl ExpenseDraft {
    pub fn new(category: impl Into<String>, amount: f64, paid_by: Party) -> Self {
        Self {
            date: None,
            category: category.into(),
            description: String::new(),
            amount,
            paid_by,
        }
    }

    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.category.trim().is_empty() {
            return Err(ValidationError::EmptyCategory);
        }
        if !(self.amount.is_finite() && self.amount > 0.0) {
            return Err(ValidationError::NonPositiveAmount(self.amount));
        }
        Ok(())
    }

    /// Validates the draft and stamps it into an [`Expense`].
    pub fn into_expense(
        self,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Expense, ValidationError> {
        self.validate()?;
        Ok(Expense::new(
            self.date.unwrap_or(today),
            self.category.trim(),
            self.description.trim(),
            self.amount,
            self.paid_by,
            now,
        ))
    }
}
