//! The "current period" pointer, held by the session instead of a global and
//! saved through a [`PeriodStorage`] on every change.

use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use hogar_config::ConfigManager;
use hogar_core::Clock;
use hogar_domain::Period;

use crate::errors::HogarResult;

/// Where the current-period pointer is persisted between sessions.
pub trait PeriodStorage: Send + Sync {
    fn load_period(&self) -> HogarResult<Option<String>>;
    fn save_period(&self, period: Period) -> HogarResult<()>;
}

impl PeriodStorage for ConfigManager {
    fn load_period(&self) -> HogarResult<Option<String>> {
        Ok(self.load()?.current_period)
    }

    fn save_period(&self, period: Period) -> HogarResult<()> {
        self.record_current_period(Some(period.key()))?;
        Ok(())
    }
}

/// Keeps the pointer in memory only.
#[derive(Debug, Default)]
pub struct MemoryPeriodStorage {
    value: Mutex<Option<String>>,
}

impl MemoryPeriodStorage {
    pub fn new(initial: Option<&str>) -> Self {
        Self {
            value: Mutex::new(initial.map(str::to_string)),
        }
    }
}

impl PeriodStorage for MemoryPeriodStorage {
    fn load_period(&self) -> HogarResult<Option<String>> {
        Ok(self
            .value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone())
    }

    fn save_period(&self, period: Period) -> HogarResult<()> {
        *self
            .value
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(period.key());
        Ok(())
    }
}

pub struct PeriodSession {
    storage: Arc<dyn PeriodStorage>,
    clock: Arc<dyn Clock>,
    current: Period,
}

impl PeriodSession {
    /// Restores the saved pointer; a missing or unreadable value means the
    /// current calendar month.
    pub fn load(storage: Arc<dyn PeriodStorage>, clock: Arc<dyn Clock>) -> HogarResult<Self> {
        let current = match storage.load_period()? {
            Some(saved) => match Period::parse(saved.trim()) {
                Ok(period) => period,
                Err(err) => {
                    warn!(saved = %saved, error = %err, "ignoring invalid saved period");
                    clock.current_period()
                }
            },
            None => clock.current_period(),
        };
        debug!(%current, "session period loaded");
        Ok(Self {
            storage,
            clock,
            current,
        })
    }

    pub fn current(&self) -> Period {
        self.current
    }

    pub fn set_current(&mut self, period: Period) -> HogarResult<()> {
        self.storage.save_period(period)?;
        self.current = period;
        debug!(%period, "session period changed");
        Ok(())
    }

    /// Validates `value` as `YYYY-MM` and makes it current.
    pub fn go_to(&mut self, value: &str) -> HogarResult<Period> {
        let period = Period::parse(value.trim())?;
        self.set_current(period)?;
        Ok(period)
    }

    pub fn go_to_current_month(&mut self) -> HogarResult<Period> {
        let period = self.clock.current_period();
        self.set_current(period)?;
        Ok(period)
    }
}
