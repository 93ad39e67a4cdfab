use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One rung of a habit's difficulty ladder.
///
/// Immutable once a habit starts: the levels are copied out of the
/// catalog at start time, so later catalog edits never change a ladder
/// already in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitLevel {
    /// 1-based position on the ladder.
    pub level: u32,
    /// The daily micro-task at this level.
    pub task: String,
    /// Check-ins required at this level before advancing.
    pub days_required: u32,
}

/// A habit ready to be started: a name, an emoji, and a full ladder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitDefinition {
    pub template_id: String,
    pub name: String,
    pub emoji: String,
    pub levels: Vec<HabitLevel>,
}

/// The habit a user is currently working through.
///
/// Invariant at rest: `current_level` is within `[1, levels.len()]` and
/// `completions_at_level` is strictly below the current level's
/// `days_required` (a transition fires the moment it would reach it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveHabit {
    pub template_id: String,
    pub name: String,
    pub emoji: String,
    pub levels: Vec<HabitLevel>,
    pub current_level: u32,
    pub completions_at_level: u32,
    pub started_at: NaiveDate,
}

impl ActiveHabit {
    /// Install a fresh habit from a definition, starting at level 1.
    pub fn start(definition: &HabitDefinition, today: NaiveDate) -> Self {
        Self {
            template_id: definition.template_id.clone(),
            name: definition.name.clone(),
            emoji: definition.emoji.clone(),
            levels: definition.levels.clone(),
            current_level: 1,
            completions_at_level: 0,
            started_at: today,
        }
    }

    /// The ladder rung the user is currently on.
    pub fn current_level_data(&self) -> &HabitLevel {
        &self.levels[(self.current_level - 1) as usize]
    }

    pub fn level_count(&self) -> u32 {
        self.levels.len() as u32
    }

    /// Whether the current level is the last rung of the ladder.
    pub fn on_final_level(&self) -> bool {
        self.current_level >= self.level_count()
    }

    /// 0.0 .. 1.0 progress within the current level.
    pub fn level_progress(&self) -> f64 {
        let required = self.current_level_data().days_required;
        if required == 0 {
            return 0.0;
        }
        (self.completions_at_level as f64 / required as f64).min(1.0)
    }
}

/// Archive entry appended when a habit completes all levels.
/// Never mutated or removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraduatedHabit {
    pub name: String,
    pub emoji: String,
    pub completed_at: NaiveDate,
    /// Total check-ins ever recorded for this habit.
    pub total_days: u32,
    /// Task text of the final level.
    pub final_level: String,
}

/// A user owns at most one active habit and an ordered graduation
/// history. Habit state is mutated exclusively through the progression
/// engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    /// Preferred reminder time, "HH:MM".
    pub reminder_time: String,
    pub active_habit: Option<ActiveHabit>,
    pub graduated_habits: Vec<GraduatedHabit>,
    pub created_at: NaiveDate,
}

impl User {
    /// Hour component of the reminder time, for the sweep's hour filter.
    pub fn reminder_hour(&self) -> Option<u32> {
        self.reminder_time
            .split(':')
            .next()
            .and_then(|h| h.parse().ok())
    }
}

/// Emails are compared lowercased and trimmed everywhere.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_level_definition() -> HabitDefinition {
        HabitDefinition {
            template_id: "test".into(),
            name: "Test".into(),
            emoji: "T".into(),
            levels: vec![
                HabitLevel {
                    level: 1,
                    task: "small".into(),
                    days_required: 7,
                },
                HabitLevel {
                    level: 2,
                    task: "bigger".into(),
                    days_required: 7,
                },
            ],
        }
    }

    #[test]
    fn start_installs_level_one() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let habit = ActiveHabit::start(&two_level_definition(), today);
        assert_eq!(habit.current_level, 1);
        assert_eq!(habit.completions_at_level, 0);
        assert_eq!(habit.started_at, today);
        assert_eq!(habit.current_level_data().task, "small");
        assert!(!habit.on_final_level());
    }

    #[test]
    fn levels_are_copied_not_shared() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut definition = two_level_definition();
        let habit = ActiveHabit::start(&definition, today);
        definition.levels[0].task = "edited later".into();
        assert_eq!(habit.current_level_data().task, "small");
    }

    #[test]
    fn final_level_detection() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut habit = ActiveHabit::start(&two_level_definition(), today);
        habit.current_level = 2;
        assert!(habit.on_final_level());
    }

    #[test]
    fn level_progress_is_bounded() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let mut habit = ActiveHabit::start(&two_level_definition(), today);
        assert_eq!(habit.level_progress(), 0.0);
        habit.completions_at_level = 3;
        assert!((habit.level_progress() - 3.0 / 7.0).abs() < 1e-9);
    }

    #[test]
    fn reminder_hour_parses() {
        let user = User {
            id: "u0001".into(),
            email: "a@b.c".into(),
            reminder_time: "08:30".into(),
            active_habit: None,
            graduated_habits: vec![],
            created_at: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        };
        assert_eq!(user.reminder_hour(), Some(8));
    }

    #[test]
    fn email_normalization() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
    }
}
