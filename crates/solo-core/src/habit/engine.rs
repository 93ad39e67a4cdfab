//! Habit progression engine.
//!
//! The engine is the sole writer of a user's habit state. Each check-in
//! walks the same sequence: read the user, reject duplicates, append to
//! the ledger, re-derive the level count from the ledger, then apply at
//! most one transition (stay, level up, or graduate).
//!
//! ## State transitions
//!
//! ```text
//! InProgress(level, completions) -> InProgress(level, completions + 1)
//! InProgress(level, required-1)  -> InProgress(level + 1, 0)   level up
//! InProgress(N, required-1)      -> Graduated                  terminal
//! ```
//!
//! The ledger append strictly precedes the store update. A crash between
//! the two is harmless: `completions_at_level` is recomputed from ledger
//! counts on the next check-in instead of being incremented blindly, so
//! the stored record heals without a repair pass.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::error::{ConflictError, CoreError, Result, ValidationError};
use crate::events::Event;
use crate::habit::ladder::{normalize_email, ActiveHabit, GraduatedHabit, HabitDefinition, User};
use crate::habit::ledger::{CheckinRecord, Ledger, MemoryLedger};
use crate::habit::store::{MemoryStore, UserStore};
use crate::habit::streak::streak;

/// Result of a successful check-in: the updated user, the recomputed
/// streak, and at most one transition event.
#[derive(Debug, Clone, Serialize)]
pub struct CheckinOutcome {
    pub user: User,
    pub streak: u32,
    pub event: Option<Event>,
}

/// Per-user mutual exclusion. Two concurrent check-ins for the same user
/// must not both observe "not yet checked in today"; operations on
/// different users stay independent.
#[derive(Default)]
struct UserLocks {
    cells: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl UserLocks {
    fn cell(&self, email: &str) -> Arc<Mutex<()>> {
        let mut cells = self.cells.lock().unwrap_or_else(|e| e.into_inner());
        cells.entry(email.to_string()).or_default().clone()
    }
}

/// The progression state machine over a ledger + user store backend.
///
/// The backend mutex is held per call, not across a whole check-in; the
/// per-user lock is what serializes the read-check-append-write sequence
/// end-to-end.
pub struct ProgressionEngine<B> {
    backend: Mutex<B>,
    locks: UserLocks,
}

impl<B: Ledger + UserStore> ProgressionEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend: Mutex::new(backend),
            locks: UserLocks::default(),
        }
    }

    /// Take the backend back out, e.g. to hand it to the reminder sweep.
    pub fn into_inner(self) -> B {
        self.backend.into_inner().unwrap_or_else(|e| e.into_inner())
    }

    fn backend(&self) -> MutexGuard<'_, B> {
        self.backend.lock().unwrap_or_else(|e| e.into_inner())
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Fetch a user by email.
    pub fn user(&self, email: &str) -> Result<User> {
        let email = normalize_email(email);
        self.backend()
            .get(&email)?
            .ok_or(CoreError::NotFound { email })
    }

    /// Current streak for a user, derived from ledger history.
    pub fn streak_for(&self, email: &str, today: NaiveDate) -> Result<u32> {
        let email = normalize_email(email);
        let dates: Vec<NaiveDate> = self
            .backend()
            .all_for(&email)?
            .into_iter()
            .map(|r| r.date)
            .collect();
        Ok(streak(&dates, today))
    }

    /// Whether the user already has a check-in on the given day.
    pub fn checked_in_on(&self, email: &str, date: NaiveDate) -> Result<bool> {
        let email = normalize_email(email);
        self.backend().has_checked_in(&email, date)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Create a user and install their first habit.
    pub fn create_user(
        &self,
        email: &str,
        definition: &HabitDefinition,
        reminder_time: Option<&str>,
        today: NaiveDate,
    ) -> Result<User> {
        let email = normalize_email(email);
        if !email.contains('@') || email.is_empty() {
            return Err(ValidationError::InvalidEmail(email).into());
        }
        let reminder_time = match reminder_time {
            Some(t) => parse_reminder_time(t)?,
            None => "08:00".to_string(),
        };

        let cell = self.locks.cell(&email);
        let _guard = cell.lock().unwrap_or_else(|e| e.into_inner());

        let mut backend = self.backend();
        if backend.get(&email)?.is_some() {
            return Err(ConflictError::AlreadyExists { email }.into());
        }
        let user = User {
            id: format!("u{:04}", backend.count()? + 1),
            email,
            reminder_time,
            active_habit: Some(ActiveHabit::start(definition, today)),
            graduated_habits: vec![],
            created_at: today,
        };
        backend.create(&user)?;
        Ok(user)
    }

    /// Start the next habit after graduating (or for an idle user).
    pub fn start_habit(
        &self,
        email: &str,
        definition: &HabitDefinition,
        today: NaiveDate,
    ) -> Result<User> {
        let email = normalize_email(email);
        let cell = self.locks.cell(&email);
        let _guard = cell.lock().unwrap_or_else(|e| e.into_inner());

        let user = self
            .backend()
            .get(&email)?
            .ok_or_else(|| CoreError::NotFound {
                email: email.clone(),
            })?;
        if let Some(active) = &user.active_habit {
            return Err(ConflictError::HabitAlreadyActive {
                name: active.name.clone(),
            }
            .into());
        }

        self.backend().update(&email, &mut |u| {
            u.active_habit = Some(ActiveHabit::start(definition, today));
        })
    }

    /// Record a daily check-in and apply at most one transition.
    pub fn record_checkin(&self, email: &str, today: NaiveDate) -> Result<CheckinOutcome> {
        let email = normalize_email(email);
        let cell = self.locks.cell(&email);
        let _guard = cell.lock().unwrap_or_else(|e| e.into_inner());

        let user = self
            .backend()
            .get(&email)?
            .ok_or_else(|| CoreError::NotFound {
                email: email.clone(),
            })?;
        let habit = user
            .active_habit
            .as_ref()
            .ok_or(ConflictError::NoActiveHabit)?;
        if self.backend().has_checked_in(&email, today)? {
            return Err(ConflictError::AlreadyCheckedIn { date: today }.into());
        }

        // Ledger first. If we crash after this point the next check-in
        // re-derives the count below and the store catches up.
        let level = habit.current_level;
        let level_data = habit.current_level_data().clone();
        self.backend().append(CheckinRecord {
            email: email.clone(),
            date: today,
            habit_name: habit.name.clone(),
            level,
            task: level_data.task.clone(),
        })?;

        let completions = self.backend().count_for(&email, &habit.name, level)?;
        let total_days = self.backend().count_for_habit(&email, &habit.name)?;

        let mut event = None;
        let updated = self.backend().update(&email, &mut |u| {
            let Some(h) = u.active_habit.as_mut() else {
                return;
            };
            if completions < level_data.days_required {
                h.completions_at_level = completions;
            } else if h.on_final_level() {
                u.graduated_habits.push(GraduatedHabit {
                    name: h.name.clone(),
                    emoji: h.emoji.clone(),
                    completed_at: today,
                    total_days,
                    final_level: level_data.task.clone(),
                });
                event = Some(Event::Graduated {
                    habit_name: h.name.clone(),
                    total_days,
                    at: Utc::now(),
                });
                u.active_habit = None;
            } else {
                h.current_level += 1;
                h.completions_at_level = 0;
                let next = h.current_level_data();
                event = Some(Event::LevelUp {
                    habit_name: h.name.clone(),
                    new_level: h.current_level,
                    new_task: next.task.clone(),
                    at: Utc::now(),
                });
            }
        })?;

        let streak = {
            let dates: Vec<NaiveDate> = self
                .backend()
                .all_for(&email)?
                .into_iter()
                .map(|r| r.date)
                .collect();
            streak(&dates, today)
        };

        Ok(CheckinOutcome {
            user: updated,
            streak,
            event,
        })
    }
}

/// Today as a calendar day in the fixed reference zone (UTC).
pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

/// Ledger + store composed in memory. Useful as an engine backend in
/// tests and tools that don't want a database file.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    pub ledger: MemoryLedger,
    pub store: MemoryStore,
}

impl Ledger for MemoryBackend {
    fn append(&mut self, record: CheckinRecord) -> Result<CheckinRecord> {
        self.ledger.append(record)
    }
    fn has_checked_in(&self, email: &str, date: NaiveDate) -> Result<bool> {
        self.ledger.has_checked_in(email, date)
    }
    fn all_for(&self, email: &str) -> Result<Vec<CheckinRecord>> {
        self.ledger.all_for(email)
    }
    fn count_for(&self, email: &str, habit_name: &str, level: u32) -> Result<u32> {
        self.ledger.count_for(email, habit_name, level)
    }
    fn count_for_habit(&self, email: &str, habit_name: &str) -> Result<u32> {
        self.ledger.count_for_habit(email, habit_name)
    }
}

impl UserStore for MemoryBackend {
    fn get(&self, email: &str) -> Result<Option<User>> {
        self.store.get(email)
    }
    fn create(&mut self, user: &User) -> Result<()> {
        self.store.create(user)
    }
    fn update(&mut self, email: &str, mutate: &mut dyn FnMut(&mut User)) -> Result<User> {
        self.store.update(email, mutate)
    }
    fn count(&self) -> Result<u32> {
        self.store.count()
    }
    fn all(&self) -> Result<Vec<User>> {
        self.store.all()
    }
}

fn parse_reminder_time(raw: &str) -> Result<String> {
    let invalid = || ValidationError::InvalidReminderTime(raw.to_string());
    let (h, m) = raw.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = h.parse().map_err(|_| invalid())?;
    let minute: u32 = m.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid().into());
    }
    Ok(format!("{hour:02}:{minute:02}"))
}
