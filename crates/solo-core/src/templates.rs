//! Built-in habit template catalog.
//!
//! Eight fixed five-level ladders plus a generic builder for
//! user-authored habits. Starting a habit copies the levels out of the
//! catalog, so editing this file never changes a ladder already in
//! progress.

use serde::Serialize;

use crate::habit::ladder::{HabitDefinition, HabitLevel};

/// Every built-in ladder requires a week at each level.
pub const DAYS_PER_LEVEL: u32 = 7;

/// Emoji used for user-authored habits.
pub const CUSTOM_EMOJI: &str = "\u{1F3AF}";

/// A catalog entry: an id for selection plus the full ladder.
#[derive(Debug, Clone, Serialize)]
pub struct HabitTemplate {
    pub id: String,
    pub name: String,
    pub emoji: String,
    pub description: String,
    pub levels: Vec<HabitLevel>,
}

impl HabitTemplate {
    /// The startable definition for this template.
    pub fn definition(&self) -> HabitDefinition {
        HabitDefinition {
            template_id: self.id.clone(),
            name: self.name.clone(),
            emoji: self.emoji.clone(),
            levels: self.levels.clone(),
        }
    }
}

fn entry(id: &str, name: &str, emoji: &str, description: &str, tasks: [&str; 5]) -> HabitTemplate {
    HabitTemplate {
        id: id.into(),
        name: name.into(),
        emoji: emoji.into(),
        description: description.into(),
        levels: tasks
            .iter()
            .enumerate()
            .map(|(i, task)| HabitLevel {
                level: i as u32 + 1,
                task: (*task).into(),
                days_required: DAYS_PER_LEVEL,
            })
            .collect(),
    }
}

/// The full built-in catalog.
pub fn all() -> Vec<HabitTemplate> {
    vec![
        entry(
            "meditate",
            "Meditate",
            "\u{1F9D8}",
            "Build a daily meditation practice, starting from just 60 seconds",
            [
                "Sit quietly for 60 seconds",
                "Focus on your breath for 2 minutes",
                "Guided meditation for 5 minutes",
                "Meditate for 10 minutes",
                "Meditate for 20 minutes",
            ],
        ),
        entry(
            "read",
            "Read",
            "\u{1F4D6}",
            "Develop a reading habit, one page at a time",
            [
                "Read just 1 page of any book",
                "Read for 5 minutes",
                "Read for 10 minutes",
                "Read for 15 minutes",
                "Read for 20 minutes",
            ],
        ),
        entry(
            "exercise",
            "Exercise",
            "\u{1F4AA}",
            "Get moving every day, starting ridiculously small",
            [
                "Do 5 pushups or stretch for 2 minutes",
                "Take a 10-minute walk",
                "15-minute workout of any kind",
                "20-minute focused workout",
                "30-minute workout session",
            ],
        ),
        entry(
            "journal",
            "Journal",
            "\u{270D}\u{FE0F}",
            "Start writing about your life, one sentence at a time",
            [
                "Write 1 sentence about your day",
                "Write 3 sentences about your day",
                "Write a full paragraph",
                "Free-write for 5 minutes",
                "Journal for 10 minutes",
            ],
        ),
        entry(
            "hydrate",
            "Hydrate",
            "\u{1F4A7}",
            "Drink more water, building up glass by glass",
            [
                "Drink 1 glass of water in the morning",
                "Drink 3 glasses throughout the day",
                "Drink 5 glasses throughout the day",
                "Drink 7 glasses throughout the day",
                "Drink 8 glasses throughout the day",
            ],
        ),
        entry(
            "gratitude",
            "Gratitude",
            "\u{1F64F}",
            "Cultivate thankfulness as a daily practice",
            [
                "Think of 1 thing you're grateful for",
                "Write down 1 thing you're grateful for",
                "Write down 3 things you're grateful for",
                "Write a short thank-you note to someone",
                "Gratitude journal for 5 minutes",
            ],
        ),
        entry(
            "sleep",
            "Better Sleep",
            "\u{1F319}",
            "Improve your sleep one small change at a time",
            [
                "Set a consistent bedtime alarm",
                "No screens 15 minutes before bed",
                "No screens 30 minutes before bed",
                "Create a 10-minute wind-down routine",
                "Full sleep hygiene routine nightly",
            ],
        ),
        entry(
            "declutter",
            "Declutter",
            "\u{2728}",
            "Create order in your space, one surface at a time",
            [
                "Tidy one small surface",
                "Organize one drawer or shelf",
                "Clean one area for 10 minutes",
                "Declutter 5 items you don't need",
                "15-minute daily tidy routine",
            ],
        ),
    ]
}

/// Look up a built-in template by id.
pub fn template(id: &str) -> Option<HabitTemplate> {
    all().into_iter().find(|t| t.id == id)
}

/// Five generically-scaled levels for a user-authored habit.
pub fn custom_levels(habit_name: &str) -> Vec<HabitLevel> {
    let scale = [
        "smallest possible version",
        "slightly more effort",
        "moderate effort",
        "solid effort",
        "full target version",
    ];
    scale
        .iter()
        .enumerate()
        .map(|(i, suffix)| HabitLevel {
            level: i as u32 + 1,
            task: format!("{habit_name} \u{2014} {suffix}"),
            days_required: DAYS_PER_LEVEL,
        })
        .collect()
}

/// A startable definition for a user-authored habit.
pub fn custom_definition(habit_name: &str) -> HabitDefinition {
    let name = habit_name.trim().to_string();
    HabitDefinition {
        template_id: "custom".into(),
        name: name.clone(),
        emoji: CUSTOM_EMOJI.into(),
        levels: custom_levels(&name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_eight_five_level_ladders() {
        let catalog = all();
        assert_eq!(catalog.len(), 8);
        for template in &catalog {
            assert_eq!(template.levels.len(), 5);
            for (i, level) in template.levels.iter().enumerate() {
                assert_eq!(level.level, i as u32 + 1);
                assert_eq!(level.days_required, DAYS_PER_LEVEL);
            }
        }
    }

    #[test]
    fn template_lookup() {
        assert_eq!(template("read").unwrap().name, "Read");
        assert!(template("unicycle").is_none());
    }

    #[test]
    fn custom_levels_scale_the_name() {
        let levels = custom_levels("Floss");
        assert_eq!(levels.len(), 5);
        assert_eq!(levels[0].task, "Floss \u{2014} smallest possible version");
        assert_eq!(levels[4].task, "Floss \u{2014} full target version");
    }

    #[test]
    fn custom_definition_trims_and_tags() {
        let definition = custom_definition("  Floss  ");
        assert_eq!(definition.name, "Floss");
        assert_eq!(definition.template_id, "custom");
        assert_eq!(definition.emoji, CUSTOM_EMOJI);
    }
}
