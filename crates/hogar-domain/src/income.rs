//! Monthly income records for the two household members.

use serde::{Deserialize, Serialize};

use crate::{
    common::non_negative,
    party::{Party, PartySplit},
    period::Period,
};

/// Income used when neither the period nor its predecessor has a record.
pub const DEFAULT_INCOME: Income = Income {
    esposa: 18800.0,
    esposo: 27000.0,
};

/// Income of each party for one period. Amounts are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Income {
    #[serde(default)]
    pub esposa: f64,
    #[serde(default)]
    pub esposo: f64,
}

impl Income {
    /// Builds an income, coercing negative or non-finite amounts to zero.
    pub fn new(esposa: f64, esposo: f64) -> Self {
        Self {
            esposa: non_negative(esposa),
            esposo: non_negative(esposo),
        }
    }

    pub fn of(&self, party: Party) -> f64 {
        match party {
            Party::Esposa => self.esposa,
            Party::Esposo => self.esposo,
        }
    }

    pub fn total(&self) -> f64 {
        self.esposa + self.esposo
    }

    /// Each party's fraction of the household income, even when the total is zero.
    pub fn fractions(&self) -> PartySplit<f64> {
        let total = self.total();
        if total > 0.0 {
            PartySplit::new(self.esposa / total, self.esposo / total)
        } else {
            PartySplit::new(0.5, 0.5)
        }
    }

    /// Fractions expressed as percentages.
    pub fn proportions(&self) -> PartySplit<f64> {
        self.fractions().map(|fraction| fraction * 100.0)
    }

    pub fn as_split(&self) -> PartySplit<f64> {
        PartySplit::new(self.esposa, self.esposo)
    }
}

impl From<PartySplit<f64>> for Income {
    fn from(split: PartySplit<f64>) -> Self {
        Income::new(split.esposa, split.esposo)
    }
}

/// Where a resolved income came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IncomeSource {
    /// Stored for the requested period.
    Explicit,
    /// Inherited from the stored record of the given (previous) period.
    Inherited(Period),
    /// Neither period had a record.
    SystemDefault,
}
