//! User habit store contract.
//!
//! Holds each user's current habit state and graduation history. The
//! progression engine is the sole writer; `update` is a per-user
//! read-modify-write that implementations must serialize per key rather
//! than rewriting a whole collection.

use std::collections::HashMap;

use crate::error::{ConflictError, CoreError, Result};
use crate::habit::ladder::User;

/// Contract between the progression engine and user storage.
pub trait UserStore {
    /// Fetch a user by normalized email.
    fn get(&self, email: &str) -> Result<Option<User>>;

    /// Insert a new user. Fails with `AlreadyExists` if the email is taken.
    fn create(&mut self, user: &User) -> Result<()>;

    /// Read-modify-write a single user's record.
    fn update(&mut self, email: &str, mutate: &mut dyn FnMut(&mut User)) -> Result<User>;

    /// Number of stored users, used for sequential id assignment.
    fn count(&self) -> Result<u32>;

    /// All users, for the reminder sweep.
    fn all(&self) -> Result<Vec<User>>;
}

/// In-memory store used by unit tests and the engine's test doubles.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    users: HashMap<String, User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserStore for MemoryStore {
    fn get(&self, email: &str) -> Result<Option<User>> {
        Ok(self.users.get(email).cloned())
    }

    fn create(&mut self, user: &User) -> Result<()> {
        if self.users.contains_key(&user.email) {
            return Err(ConflictError::AlreadyExists {
                email: user.email.clone(),
            }
            .into());
        }
        self.users.insert(user.email.clone(), user.clone());
        Ok(())
    }

    fn update(&mut self, email: &str, mutate: &mut dyn FnMut(&mut User)) -> Result<User> {
        let user = self.users.get_mut(email).ok_or_else(|| CoreError::NotFound {
            email: email.to_string(),
        })?;
        mutate(user);
        Ok(user.clone())
    }

    fn count(&self) -> Result<u32> {
        Ok(self.users.len() as u32)
    }

    fn all(&self) -> Result<Vec<User>> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn user(email: &str) -> User {
        User {
            id: "u0001".into(),
            email: email.into(),
            reminder_time: "08:00".into(),
            active_habit: None,
            graduated_habits: vec![],
            created_at: NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(),
        }
    }

    #[test]
    fn create_and_get() {
        let mut store = MemoryStore::new();
        store.create(&user("a@b.c")).unwrap();
        assert!(store.get("a@b.c").unwrap().is_some());
        assert!(store.get("x@y.z").unwrap().is_none());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn duplicate_create_conflicts() {
        let mut store = MemoryStore::new();
        store.create(&user("a@b.c")).unwrap();
        let err = store.create(&user("a@b.c")).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Conflict(ConflictError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn update_mutates_in_place() {
        let mut store = MemoryStore::new();
        store.create(&user("a@b.c")).unwrap();
        let updated = store
            .update("a@b.c", &mut |u| u.reminder_time = "21:00".into())
            .unwrap();
        assert_eq!(updated.reminder_time, "21:00");
        assert_eq!(store.get("a@b.c").unwrap().unwrap().reminder_time, "21:00");
    }

    #[test]
    fn update_unknown_user_is_not_found() {
        let mut store = MemoryStore::new();
        let err = store.update("ghost@b.c", &mut |_| {}).unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }
}
