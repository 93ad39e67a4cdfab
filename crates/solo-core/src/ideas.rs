//! Community habit idea board.
//!
//! A public wall of habit suggestions anyone can add to and upvote.
//! Ideas feed habit selection only; they are not habits and never touch
//! the progression engine.

use chrono::NaiveDate;
use rusqlite::params;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result, ValidationError};
use crate::storage::Database;

/// Longest accepted idea text.
pub const MAX_IDEA_LEN: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Idea {
    pub id: String,
    pub text: String,
    pub author: String,
    pub votes: u32,
    pub created_at: NaiveDate,
}

/// All ideas, most-voted first.
pub fn list(db: &Database) -> Result<Vec<Idea>> {
    let mut stmt = db.conn().prepare(
        "SELECT id, text, author, votes, created_at FROM ideas
         ORDER BY votes DESC, id ASC",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, u32>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut ideas = Vec::new();
    for row in rows {
        let (id, text, author, votes, created_at) = row?;
        ideas.push(Idea {
            id,
            text,
            author,
            votes,
            created_at: parse_date(&created_at)?,
        });
    }
    Ok(ideas)
}

/// Add a new idea to the board.
pub fn add(db: &Database, text: &str, today: NaiveDate) -> Result<Idea> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ValidationError::MissingField("Habit text").into());
    }
    if text.chars().count() > MAX_IDEA_LEN {
        return Err(ValidationError::TooLong {
            field: "text",
            len: text.chars().count(),
            max: MAX_IDEA_LEN,
        }
        .into());
    }

    let count: u32 = db
        .conn()
        .query_row("SELECT COUNT(*) FROM ideas", [], |row| row.get(0))?;
    let idea = Idea {
        id: format!("h{:03}", count + 1),
        text: text.to_string(),
        author: "Anonymous".to_string(),
        votes: 0,
        created_at: today,
    };
    db.conn().execute(
        "INSERT INTO ideas (id, text, author, votes, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            idea.id,
            idea.text,
            idea.author,
            idea.votes,
            idea.created_at.to_string(),
        ],
    )?;
    Ok(idea)
}

/// Upvote an idea, returning its new state.
pub fn vote(db: &Database, id: &str) -> Result<Idea> {
    let changed = db
        .conn()
        .execute("UPDATE ideas SET votes = votes + 1 WHERE id = ?1", params![id])?;
    if changed == 0 {
        return Err(CoreError::IdeaNotFound { id: id.to_string() });
    }

    let mut stmt = db
        .conn()
        .prepare("SELECT id, text, author, votes, created_at FROM ideas WHERE id = ?1")?;
    let (id, text, author, votes, created_at) = stmt.query_row(params![id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, u32>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;
    Ok(Idea {
        id,
        text,
        author,
        votes,
        created_at: parse_date(&created_at)?,
    })
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    raw.parse().map_err(|_| {
        crate::error::StorageError::QueryFailed(format!("bad date on idea board: {raw}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn add_assigns_sequential_ids() {
        let db = Database::open_memory().unwrap();
        let first = add(&db, "Stretch before bed", d(1)).unwrap();
        let second = add(&db, "Call a friend weekly", d(2)).unwrap();
        assert_eq!(first.id, "h001");
        assert_eq!(second.id, "h002");
        assert_eq!(first.author, "Anonymous");
        assert_eq!(first.votes, 0);
    }

    #[test]
    fn add_rejects_empty_and_oversized_text() {
        let db = Database::open_memory().unwrap();
        assert!(matches!(
            add(&db, "   ", d(1)).unwrap_err(),
            CoreError::Validation(ValidationError::MissingField(_))
        ));
        let long = "x".repeat(MAX_IDEA_LEN + 1);
        assert!(matches!(
            add(&db, &long, d(1)).unwrap_err(),
            CoreError::Validation(ValidationError::TooLong { .. })
        ));
        assert!(list(&db).unwrap().is_empty());
    }

    #[test]
    fn vote_bumps_and_reorders() {
        let db = Database::open_memory().unwrap();
        add(&db, "Stretch before bed", d(1)).unwrap();
        add(&db, "Call a friend weekly", d(1)).unwrap();

        vote(&db, "h002").unwrap();
        let voted = vote(&db, "h002").unwrap();
        assert_eq!(voted.votes, 2);

        let ideas = list(&db).unwrap();
        assert_eq!(ideas[0].id, "h002");
        assert_eq!(ideas[1].id, "h001");
    }

    #[test]
    fn vote_on_unknown_id_is_not_found() {
        let db = Database::open_memory().unwrap();
        let err = vote(&db, "h999").unwrap_err();
        assert!(matches!(err, CoreError::IdeaNotFound { .. }));
    }
}
