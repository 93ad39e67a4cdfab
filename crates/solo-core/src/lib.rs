//! # Solo Core Library
//!
//! This library provides the core business logic for Solo, a
//! one-habit-at-a-time habit tracker. It implements a CLI-first
//! philosophy where all operations are available via a standalone CLI
//! binary; any richer front end is a thin layer over the same core.
//!
//! ## Architecture
//!
//! - **Progression Engine**: A per-user state machine over daily
//!   check-ins: stay at the current level, level up, or graduate
//! - **Streak Calculator**: A pure function from check-in history to the
//!   current consecutive-day streak
//! - **Storage**: SQLite-backed check-in ledger and user store, plus
//!   TOML-based configuration
//! - **Notifications**: Queued fire-and-forget email delivery (Resend)
//!
//! ## Key Components
//!
//! - [`ProgressionEngine`]: The habit progression state machine
//! - [`Database`]: Ledger, user, and idea-board persistence
//! - [`Config`]: Application configuration management
//! - [`Mailer`]: Trait for notification delivery channels

pub mod error;
pub mod events;
pub mod habit;
pub mod ideas;
pub mod notify;
pub mod reminders;
pub mod storage;
pub mod templates;

pub use error::{ConflictError, CoreError, StorageError, ValidationError};
pub use events::Event;
pub use habit::{
    today_utc, ActiveHabit, CheckinOutcome, CheckinRecord, GraduatedHabit, HabitDefinition,
    HabitLevel, Ledger, ProgressionEngine, User, UserStore,
};
pub use notify::{Dispatcher, Mailer, Notification, ResendMailer, SimulatedMailer};
pub use storage::{Config, Database};
pub use templates::HabitTemplate;
