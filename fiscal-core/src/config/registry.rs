use std::collections::HashMap;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;

use crate::models::{BracketTable, Jurisdiction, ScheduleKey, TaxSchedule, TaxType};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("no schedule configured for {0}")]
    NotFound(ScheduleKey),

    #[error("schedule {key} has no parameter '{name}'")]
    MissingParameter { key: ScheduleKey, name: String },

    #[error("schedule {0} must be a single flat rate")]
    NotFlat(ScheduleKey),
}

/// Lookup of [`TaxSchedule`]s keyed by jurisdiction, tax type and sub-key.
///
/// Typical lifetime:
/// 1. Build the built-in tables (or start empty with `ScheduleRegistry::new()`).
/// 2. Layer override files on top with `upsert_table` / `set_parameter`.
/// 3. Hand a shared reference to the calculators.
#[derive(Debug, Clone, Default)]
pub struct ScheduleRegistry {
    schedules: HashMap<ScheduleKey, TaxSchedule>,
}

impl ScheduleRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            schedules: HashMap::new(),
        }
    }

    /// Register a schedule.
    ///
    /// A schedule already registered under the same key is replaced.
    pub fn register(&mut self, schedule: TaxSchedule) {
        debug!(key = %schedule.key, "registering schedule");
        self.schedules.insert(schedule.key.clone(), schedule);
    }

    /// Replace the bracket table for `key`, keeping any parameters already
    /// configured. Creates the schedule if it does not exist.
    pub fn upsert_table(&mut self, key: ScheduleKey, table: BracketTable) {
        match self.schedules.get_mut(&key) {
            Some(schedule) => schedule.table = table,
            None => self.register(TaxSchedule::new(key, table)),
        }
    }

    /// Set one named parameter for `key`. Creates an exempt schedule if the
    /// key does not exist yet.
    pub fn set_parameter(&mut self, key: ScheduleKey, name: impl Into<String>, value: Decimal) {
        self.schedules
            .entry(key.clone())
            .or_insert_with(|| TaxSchedule::new(key, BracketTable::exempt()))
            .parameters
            .insert(name.into(), value);
    }

    /// Look up the schedule for `key`.
    ///
    /// # Errors
    /// * [`ScheduleError::NotFound`] when nothing is registered for `key`.
    pub fn get(&self, key: &ScheduleKey) -> Result<&TaxSchedule, ScheduleError> {
        self.schedules
            .get(key)
            .ok_or_else(|| ScheduleError::NotFound(key.clone()))
    }

    /// Shorthand for [`Self::get`] with a key built from its parts.
    pub fn lookup(
        &self,
        jurisdiction: Jurisdiction,
        tax_type: TaxType,
        sub_key: Option<&str>,
    ) -> Result<&TaxSchedule, ScheduleError> {
        self.get(&ScheduleKey {
            jurisdiction,
            tax_type,
            sub_key: sub_key.map(str::to_string),
        })
    }

    pub fn contains(&self, key: &ScheduleKey) -> bool {
        self.schedules.contains_key(key)
    }

    /// Every registered key, sorted.
    pub fn keys(&self) -> Vec<&ScheduleKey> {
        let mut keys: Vec<_> = self.schedules.keys().collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.schedules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schedules.is_empty()
    }
}
