use clap::Subcommand;
use solo_core::ideas;
use solo_core::{today_utc, Database};

#[derive(Subcommand)]
pub enum IdeasAction {
    /// List the idea board, most-voted first
    List,
    /// Add a habit idea to the board
    Add {
        /// Idea text (200 characters max)
        #[arg(long)]
        text: String,
    },
    /// Upvote an idea
    Vote {
        #[arg(long)]
        id: String,
    },
}

pub fn run(action: IdeasAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    match action {
        IdeasAction::List => {
            println!("{}", serde_json::to_string_pretty(&ideas::list(&db)?)?);
        }
        IdeasAction::Add { text } => {
            let idea = ideas::add(&db, &text, today_utc())?;
            println!("{}", serde_json::to_string_pretty(&idea)?);
        }
        IdeasAction::Vote { id } => {
            let idea = ideas::vote(&db, &id)?;
            println!("{}", serde_json::to_string_pretty(&idea)?);
        }
    }
    Ok(())
}
