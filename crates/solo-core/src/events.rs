use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A progression transition produces at most one Event per check-in.
/// Level-up and graduation are mutually exclusive; callers match
/// exhaustively and forward the payload to the notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    LevelUp {
        habit_name: String,
        new_level: u32,
        new_task: String,
        at: DateTime<Utc>,
    },
    Graduated {
        habit_name: String,
        total_days: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn habit_name(&self) -> &str {
        match self {
            Event::LevelUp { habit_name, .. } => habit_name,
            Event::Graduated { habit_name, .. } => habit_name,
        }
    }
}
