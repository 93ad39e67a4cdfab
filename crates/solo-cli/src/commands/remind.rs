use clap::Subcommand;
use solo_core::{reminders, today_utc, Config, Database};

#[derive(Subcommand)]
pub enum RemindAction {
    /// Send due reminders, optionally only for one reminder hour
    Sweep {
        /// Only users whose reminder time falls in this hour (0-23)
        #[arg(long)]
        hour: Option<u32>,
    },
}

pub fn run(action: RemindAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RemindAction::Sweep { hour } => {
            let db = Database::open()?;
            let config = Config::load()?;
            let mailer = super::mailer(&config);
            let report = reminders::sweep(&db, mailer.as_ref(), hour, today_utc())?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }
    Ok(())
}
