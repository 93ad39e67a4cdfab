use clap::Subcommand;
use serde_json::json;
use solo_core::{today_utc, Config, Database, Dispatcher, Notification, ProgressionEngine};

#[derive(Subcommand)]
pub enum UserAction {
    /// Create a user and start their first habit
    Create {
        /// Email address (identifies the user everywhere)
        #[arg(long)]
        email: String,
        /// Built-in template id (e.g. "read", "meditate")
        #[arg(long)]
        template: Option<String>,
        /// Custom habit name instead of a template
        #[arg(long)]
        custom: Option<String>,
        /// Daily reminder time, HH:MM
        #[arg(long)]
        reminder_time: Option<String>,
    },
    /// Print a user with their current streak as JSON
    Show {
        #[arg(long)]
        email: String,
    },
}

pub fn run(action: UserAction) -> Result<(), Box<dyn std::error::Error>> {
    let engine = ProgressionEngine::new(Database::open()?);
    let today = today_utc();

    match action {
        UserAction::Create {
            email,
            template,
            custom,
            reminder_time,
        } => {
            let config = Config::load()?;
            let definition = super::resolve_definition(template.as_deref(), custom.as_deref())?;
            let reminder_time = reminder_time.unwrap_or_else(|| config.reminders.default_time.clone());
            let user = engine.create_user(&email, &definition, Some(&reminder_time), today)?;

            if config.notifications.enabled {
                let dispatcher = Dispatcher::new(super::mailer(&config));
                dispatcher.dispatch(Notification::Welcome {
                    to: user.email.clone(),
                    habit_name: definition.name.clone(),
                    first_task: definition.levels[0].task.clone(),
                });
                dispatcher.flush();
            }

            println!("{}", serde_json::to_string_pretty(&user)?);
        }
        UserAction::Show { email } => {
            let user = engine.user(&email)?;
            let streak = engine.streak_for(&email, today)?;
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "user": user,
                    "streak": streak,
                }))?
            );
        }
    }
    Ok(())
}
