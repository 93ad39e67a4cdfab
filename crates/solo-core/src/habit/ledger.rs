//! Append-only check-in ledger.
//!
//! The ledger is the source of truth for streaks and historical counts:
//! records are never mutated or deleted, so every derived number can be
//! recomputed from history at any time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ConflictError, Result};

/// One record of "this user performed their task on this calendar day".
///
/// At most one record exists per `(email, date)` regardless of habit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinRecord {
    pub email: String,
    pub date: NaiveDate,
    pub habit_name: String,
    pub level: u32,
    pub task: String,
}

/// Contract between the progression engine and check-in storage.
pub trait Ledger {
    /// Append a record. Fails with `AlreadyCheckedIn` if a record for
    /// `(email, date)` already exists; callers check `has_checked_in`
    /// first, the ledger never silently overwrites.
    fn append(&mut self, record: CheckinRecord) -> Result<CheckinRecord>;

    /// Whether the user has a record on the given day.
    fn has_checked_in(&self, email: &str, date: NaiveDate) -> Result<bool>;

    /// All records for a user, in no particular order.
    fn all_for(&self, email: &str) -> Result<Vec<CheckinRecord>>;

    /// Check-ins for a user at a specific level of a habit.
    fn count_for(&self, email: &str, habit_name: &str, level: u32) -> Result<u32>;

    /// Check-ins for a user across all levels of a habit.
    fn count_for_habit(&self, email: &str, habit_name: &str) -> Result<u32>;
}

/// In-memory ledger used by unit tests and the engine's test doubles.
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    records: Vec<CheckinRecord>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[CheckinRecord] {
        &self.records
    }
}

impl Ledger for MemoryLedger {
    fn append(&mut self, record: CheckinRecord) -> Result<CheckinRecord> {
        if self.has_checked_in(&record.email, record.date)? {
            return Err(ConflictError::AlreadyCheckedIn { date: record.date }.into());
        }
        self.records.push(record.clone());
        Ok(record)
    }

    fn has_checked_in(&self, email: &str, date: NaiveDate) -> Result<bool> {
        Ok(self
            .records
            .iter()
            .any(|r| r.email == email && r.date == date))
    }

    fn all_for(&self, email: &str) -> Result<Vec<CheckinRecord>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.email == email)
            .cloned()
            .collect())
    }

    fn count_for(&self, email: &str, habit_name: &str, level: u32) -> Result<u32> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.email == email && r.habit_name == habit_name && r.level == level)
            .count() as u32)
    }

    fn count_for_habit(&self, email: &str, habit_name: &str) -> Result<u32> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.email == email && r.habit_name == habit_name)
            .count() as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str, date: NaiveDate, level: u32) -> CheckinRecord {
        CheckinRecord {
            email: email.into(),
            date,
            habit_name: "Read".into(),
            level,
            task: "Read just 1 page of any book".into(),
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn append_then_query() {
        let mut ledger = MemoryLedger::new();
        ledger.append(record("a@b.c", d(1), 1)).unwrap();
        ledger.append(record("a@b.c", d(2), 1)).unwrap();
        ledger.append(record("x@y.z", d(2), 1)).unwrap();

        assert!(ledger.has_checked_in("a@b.c", d(1)).unwrap());
        assert!(!ledger.has_checked_in("a@b.c", d(3)).unwrap());
        assert_eq!(ledger.all_for("a@b.c").unwrap().len(), 2);
        assert_eq!(ledger.count_for("a@b.c", "Read", 1).unwrap(), 2);
        assert_eq!(ledger.count_for_habit("a@b.c", "Read").unwrap(), 2);
    }

    #[test]
    fn duplicate_day_is_rejected() {
        let mut ledger = MemoryLedger::new();
        ledger.append(record("a@b.c", d(1), 1)).unwrap();
        let err = ledger.append(record("a@b.c", d(1), 1)).unwrap_err();
        assert!(err.is_already_checked_in());
        assert_eq!(ledger.records().len(), 1);
    }

    #[test]
    fn one_record_per_day_even_across_habits() {
        let mut ledger = MemoryLedger::new();
        ledger.append(record("a@b.c", d(1), 1)).unwrap();
        let mut other = record("a@b.c", d(1), 1);
        other.habit_name = "Meditate".into();
        assert!(ledger.append(other).is_err());
    }
}
