//! Daily reminder sweep.
//!
//! Meant to be driven by a cron job, typically hourly with the current
//! hour as the filter so each user is mailed at their chosen time.
//! Unlike progression notifications, reminder delivery is synchronous:
//! the cron caller wants the per-user results back.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::Result;
use crate::habit::ledger::Ledger;
use crate::habit::store::UserStore;
use crate::habit::streak::streak;
use crate::notify::{Mailer, Notification};

/// Per-user outcome of one sweep.
#[derive(Debug, Clone, Serialize)]
pub struct ReminderResult {
    pub email: String,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Summary of one sweep run.
#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub sent: usize,
    pub results: Vec<ReminderResult>,
}

/// Send today's task reminder to every user due one.
///
/// Users without an active habit are skipped; with `hour` set, so is
/// anyone whose reminder time falls in a different hour. Delivery
/// failures are recorded per user and never abort the sweep.
pub fn sweep<B: Ledger + UserStore>(
    backend: &B,
    mailer: &dyn Mailer,
    hour: Option<u32>,
    today: NaiveDate,
) -> Result<SweepReport> {
    let mut results = Vec::new();

    for user in backend.all()? {
        let Some(habit) = &user.active_habit else {
            continue;
        };
        if let Some(hour) = hour {
            if user.reminder_hour() != Some(hour) {
                continue;
            }
        }

        let dates: Vec<NaiveDate> = backend
            .all_for(&user.email)?
            .into_iter()
            .map(|r| r.date)
            .collect();
        let notification = Notification::Reminder {
            to: user.email.clone(),
            habit_name: habit.name.clone(),
            task: habit.current_level_data().task.clone(),
            streak: streak(&dates, today),
            level: habit.current_level,
        };

        let result = match mailer.deliver(&notification) {
            Ok(()) => ReminderResult {
                email: user.email,
                delivered: true,
                error: None,
            },
            Err(e) => ReminderResult {
                email: user.email,
                delivered: false,
                error: Some(e.to_string()),
            },
        };
        results.push(result);
    }

    Ok(SweepReport {
        sent: results.len(),
        results,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::engine::{MemoryBackend, ProgressionEngine};
    use crate::templates;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        delivered: Mutex<Vec<Notification>>,
        fail_for: Option<String>,
    }

    impl Mailer for RecordingMailer {
        fn deliver(&self, notification: &Notification) -> Result<(), Box<dyn std::error::Error>> {
            if self.fail_for.as_deref() == Some(notification.to()) {
                return Err("mailbox full".into());
            }
            self.delivered.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    /// Build a backend with three users: two active (08:00 and 21:00
    /// reminders), one graduated-and-idle.
    fn seeded() -> MemoryBackend {
        let engine = ProgressionEngine::new(MemoryBackend::default());
        let read = templates::template("read").unwrap().definition();
        engine
            .create_user("morning@example.com", &read, Some("08:00"), d(1))
            .unwrap();
        engine
            .create_user("evening@example.com", &read, Some("21:00"), d(1))
            .unwrap();
        engine
            .create_user("idle@example.com", &read, None, d(1))
            .unwrap();
        engine.record_checkin("morning@example.com", d(1)).unwrap();
        engine.record_checkin("morning@example.com", d(2)).unwrap();

        let mut backend = engine.into_inner();
        backend
            .update("idle@example.com", &mut |u| u.active_habit = None)
            .unwrap();
        backend
    }

    #[test]
    fn sweeps_every_active_user_without_filter() {
        let backend = seeded();
        let mailer = RecordingMailer::default();
        let report = sweep(&backend, &mailer, None, d(2)).unwrap();

        assert_eq!(report.sent, 2);
        let delivered = mailer.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 2);
        match &delivered[0] {
            Notification::Reminder { streak, level, .. } => {
                assert_eq!(*streak, 2);
                assert_eq!(*level, 1);
            }
            other => panic!("expected reminder, got {other:?}"),
        }
    }

    #[test]
    fn hour_filter_narrows_recipients() {
        let backend = seeded();
        let mailer = RecordingMailer::default();
        let report = sweep(&backend, &mailer, Some(21), d(2)).unwrap();

        assert_eq!(report.sent, 1);
        assert_eq!(report.results[0].email, "evening@example.com");
    }

    #[test]
    fn delivery_failure_is_recorded_not_fatal() {
        let backend = seeded();
        let mailer = RecordingMailer {
            fail_for: Some("morning@example.com".into()),
            ..Default::default()
        };
        let report = sweep(&backend, &mailer, None, d(2)).unwrap();

        assert_eq!(report.sent, 2);
        let failed = report
            .results
            .iter()
            .find(|r| r.email == "morning@example.com")
            .unwrap();
        assert!(!failed.delivered);
        assert!(failed.error.as_deref().unwrap().contains("mailbox full"));
        assert!(report
            .results
            .iter()
            .any(|r| r.email == "evening@example.com" && r.delivered));
    }
}
