pub mod engine;
pub mod ladder;
pub mod ledger;
pub mod store;
pub mod streak;

pub use engine::{today_utc, CheckinOutcome, MemoryBackend, ProgressionEngine};
pub use ladder::{normalize_email, ActiveHabit, GraduatedHabit, HabitDefinition, HabitLevel, User};
pub use ledger::{CheckinRecord, Ledger, MemoryLedger};
pub use store::{MemoryStore, UserStore};
pub use streak::streak;
