use clap::Subcommand;
use solo_core::{templates, today_utc, Config, Database, Dispatcher, Notification, ProgressionEngine};

#[derive(Subcommand)]
pub enum HabitAction {
    /// List the built-in habit templates as JSON
    Templates,
    /// Start the next habit (requires an empty habit slot)
    Start {
        #[arg(long)]
        email: String,
        /// Built-in template id (e.g. "read", "meditate")
        #[arg(long)]
        template: Option<String>,
        /// Custom habit name instead of a template
        #[arg(long)]
        custom: Option<String>,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        HabitAction::Templates => {
            println!("{}", serde_json::to_string_pretty(&templates::all())?);
        }
        HabitAction::Start {
            email,
            template,
            custom,
        } => {
            let definition = super::resolve_definition(template.as_deref(), custom.as_deref())?;
            let engine = ProgressionEngine::new(Database::open()?);
            let user = engine.start_habit(&email, &definition, today_utc())?;

            let config = Config::load()?;
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
    }
    Ok(())
}
