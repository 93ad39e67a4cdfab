use clap::Subcommand;
use serde_json::json;
use solo_core::{today_utc, Config, Database, Dispatcher, Notification, ProgressionEngine};

#[derive(Subcommand)]
pub enum CheckinAction {
    /// Record today's check-in
    Record {
        #[arg(long)]
        email: String,
    },
    /// Print whether the user has checked in today, with their streak
    Status {
        #[arg(long)]
        email: String,
    },
}

pub fn run(action: CheckinAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ProgressionEngine::new(Database::open()?);
    let today = today_utc();

    match action {
        CheckinAction::Record { email } => {
            let outcome = match engine.record_checkin(&email, today) {
                Ok(outcome) => outcome,
                Err(e) if e.is_already_checked_in() => {
                    // Idempotency signal, not a failure: report and exit 0.
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({
                            "checked_in": false,
                            "already_checked_in": true,
                            "message": "You already checked in today. See you tomorrow!",
                        }))?
                    );
                    return Ok(());
                }
                Err(e) => return Err(e.into()),
            };

            if let Some(event) = &outcome.event {
                let config = Config::load()?;
                if config.notifications.enabled {
                    let dispatcher = Dispatcher::new(super::mailer(&config));
                    dispatcher.dispatch(Notification::for_event(&outcome.user.email, event));
                    dispatcher.flush();
                }
            }

            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "checked_in": true,
                    "streak": outcome.streak,
                    "event": outcome.event,
                    "user": outcome.user,
                }))?
            );
        }
        CheckinAction::Status { email } => {
            let checked_in = engine.checked_in_on(&email, today)?;
            let streak = engine.streak_for(&email, today)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "date": today.to_string(),
                    "checked_in": checked_in,
                    "streak": streak,
                }))?
            );
        }
    }
    Ok(())
}
