//! Outbound notifications.
//!
//! The progression engine never waits on delivery: callers map a
//! transition event to a [`Notification`] and hand it to a
//! [`Dispatcher`], which queues it for a background worker. Delivery
//! failures are logged by the worker and never reach the transition
//! that produced them.

pub mod emails;
mod resend;

pub use resend::ResendMailer;

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};

use crate::events::Event;

/// Everything the sink can be asked to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Welcome {
        to: String,
        habit_name: String,
        first_task: String,
    },
    Reminder {
        to: String,
        habit_name: String,
        task: String,
        streak: u32,
        level: u32,
    },
    LevelUp {
        to: String,
        habit_name: String,
        new_level: u32,
        new_task: String,
    },
    Graduation {
        to: String,
        habit_name: String,
        total_days: u32,
    },
}

impl Notification {
    pub fn to(&self) -> &str {
        match self {
            Notification::Welcome { to, .. } => to,
            Notification::Reminder { to, .. } => to,
            Notification::LevelUp { to, .. } => to,
            Notification::Graduation { to, .. } => to,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Notification::Welcome { .. } => "welcome",
            Notification::Reminder { .. } => "reminder",
            Notification::LevelUp { .. } => "level_up",
            Notification::Graduation { .. } => "graduation",
        }
    }

    /// Map a progression event to the notification it should produce.
    pub fn for_event(to: &str, event: &Event) -> Self {
        match event {
            Event::LevelUp {
                habit_name,
                new_level,
                new_task,
                ..
            } => Notification::LevelUp {
                to: to.to_string(),
                habit_name: habit_name.clone(),
                new_level: *new_level,
                new_task: new_task.clone(),
            },
            Event::Graduated {
                habit_name,
                total_days,
                ..
            } => Notification::Graduation {
                to: to.to_string(),
                habit_name: habit_name.clone(),
                total_days: *total_days,
            },
        }
    }
}

/// A notification delivery channel. Implementations are synchronous;
/// asynchrony lives in the [`Dispatcher`], not here.
pub trait Mailer: Send + Sync {
    fn deliver(&self, notification: &Notification) -> Result<(), Box<dyn std::error::Error>>;
}

/// Fallback mailer used when no RESEND_API_KEY is configured: logs what
/// would have been sent and succeeds.
#[derive(Debug, Default)]
pub struct SimulatedMailer;

impl Mailer for SimulatedMailer {
    fn deliver(&self, notification: &Notification) -> Result<(), Box<dyn std::error::Error>> {
        match notification {
            Notification::Welcome { to, habit_name, .. } => {
                eprintln!("[email] would send welcome to {to} for habit: {habit_name}");
            }
            Notification::Reminder {
                to, task, streak, ..
            } => {
                eprintln!("[email] would send reminder to {to}: {task} (streak: {streak})");
            }
            Notification::LevelUp { to, new_level, .. } => {
                eprintln!("[email] would send level-up to {to}: Level {new_level}");
            }
            Notification::Graduation { to, habit_name, .. } => {
                eprintln!("[email] would send graduation to {to}: {habit_name} completed!");
            }
        }
        Ok(())
    }
}

/// Queued fire-and-forget delivery.
///
/// `dispatch` hands the notification to a worker thread and returns
/// immediately. Dropping the dispatcher lets the worker drain what is
/// already queued and exit; `flush` does the same but waits, which
/// short-lived processes want before exiting.
pub struct Dispatcher {
    tx: mpsc::Sender<Notification>,
    worker: Option<JoinHandle<()>>,
}

impl Dispatcher {
    pub fn new(mailer: Arc<dyn Mailer>) -> Self {
        let (tx, rx) = mpsc::channel::<Notification>();
        let worker = std::thread::spawn(move || {
            for notification in rx {
                if let Err(e) = mailer.deliver(&notification) {
                    eprintln!(
                        "[notify] {} delivery to {} failed: {e}",
                        notification.kind(),
                        notification.to()
                    );
                }
            }
        });
        Self {
            tx,
            worker: Some(worker),
        }
    }

    /// Queue a notification. Never blocks and never reports failure to
    /// the caller; the transition producing it has already committed.
    pub fn dispatch(&self, notification: Notification) {
        let _ = self.tx.send(notification);
    }

    /// Wait for everything queued so far to be attempted.
    pub fn flush(self) {
        let Self { tx, worker } = self;
        drop(tx);
        if let Some(worker) = worker {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Mutex;

    /// Mailer that records deliveries for assertions.
    #[derive(Default)]
    pub(crate) struct RecordingMailer {
        pub delivered: Mutex<Vec<Notification>>,
    }

    impl Mailer for RecordingMailer {
        fn deliver(&self, notification: &Notification) -> Result<(), Box<dyn std::error::Error>> {
            self.delivered
                .lock()
                .unwrap()
                .push(notification.clone());
            Ok(())
        }
    }

    #[test]
    fn event_maps_to_notification() {
        let event = Event::LevelUp {
            habit_name: "Read".into(),
            new_level: 3,
            new_task: "Read for 10 minutes".into(),
            at: Utc::now(),
        };
        let notification = Notification::for_event("a@b.c", &event);
        assert_eq!(notification.kind(), "level_up");
        assert_eq!(notification.to(), "a@b.c");

        let event = Event::Graduated {
            habit_name: "Read".into(),
            total_days: 35,
            at: Utc::now(),
        };
        let notification = Notification::for_event("a@b.c", &event);
        assert_eq!(notification.kind(), "graduation");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let notification = Notification::Graduation {
            to: "a@b.c".into(),
            habit_name: "Read".into(),
            total_days: 35,
        };
        let json = serde_json::to_value(&notification).unwrap();
        assert_eq!(json["kind"], "graduation");
    }

    #[test]
    fn dispatcher_delivers_in_background_and_flushes() {
        let mailer = Arc::new(RecordingMailer::default());
        let dispatcher = Dispatcher::new(mailer.clone());
        dispatcher.dispatch(Notification::Welcome {
            to: "a@b.c".into(),
            habit_name: "Read".into(),
            first_task: "Read just 1 page of any book".into(),
        });
        dispatcher.dispatch(Notification::Graduation {
            to: "a@b.c".into(),
            habit_name: "Read".into(),
            total_days: 35,
        });
        dispatcher.flush();

        let delivered = mailer.delivered.lock().unwrap();
        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0].kind(), "welcome");
        assert_eq!(delivered[1].kind(), "graduation");
    }

    #[test]
    fn delivery_failure_does_not_reach_the_caller() {
        struct FailingMailer;
        impl Mailer for FailingMailer {
            fn deliver(&self, _: &Notification) -> Result<(), Box<dyn std::error::Error>> {
                Err("smtp on fire".into())
            }
        }

        let dispatcher = Dispatcher::new(Arc::new(FailingMailer));
        dispatcher.dispatch(Notification::Welcome {
            to: "a@b.c".into(),
            habit_name: "Read".into(),
            first_task: "Read just 1 page of any book".into(),
        });
        // Nothing to assert beyond "this returns": the failure stayed
        // inside the worker.
        dispatcher.flush();
    }
}
