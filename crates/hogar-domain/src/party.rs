//! The two household members and per-member value pairs.

use std::{fmt, ops::Add, str::FromStr};

use serde::{Deserialize, Serialize};

/// One of the two household members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Party {
    Esposa,
    Esposo,
}

impl Party {
    pub const ALL: [Party; 2] = [Party::Esposa, Party::Esposo];

    /// The other member of the household.
    pub fn other(self) -> Party {
        match self {
            Party::Esposa => Party::Esposo,
            Party::Esposo => Party::Esposa,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Party::Esposa => "esposa",
            Party::Esposo => "esposo",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Party {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "esposa" => Ok(Party::Esposa),
            "esposo" => Ok(Party::Esposo),
            other => Err(format!("unknown party `{other}`")),
        }
    }
}

/// A value held for each party.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartySplit<T> {
    pub esposa: T,
    pub esposo: T,
}

impl<T> PartySplit<T> {
    pub fn new(esposa: T, esposo: T) -> Self {
        Self { esposa, esposo }
    }

    pub fn get(&self, party: Party) -> &T {
        match party {
            Party::Esposa => &self.esposa,
            Party::Esposo => &self.esposo,
        }
    }

    pub fn get_mut(&mut self, party: Party) -> &mut T {
        match party {
            Party::Esposa => &mut self.esposa,
            Party::Esposo => &mut self.esposo,
        }
    }

    pub fn map<U>(self, mut f: impl FnMut(T) -> U) -> PartySplit<U> {
        PartySplit {
            esposa: f(self.esposa),
            esposo: f(self.esposo),
        }
    }
}

impl<T: Copy + Add<Output = T>> PartySplit<T> {
    pub fn total(&self) -> T {
        self.esposa + self.esposo
    }
}
