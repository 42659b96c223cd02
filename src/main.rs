mod alarm;
mod cli;
mod config;
mod engine;
mod error;
mod schedule;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::schedule::types::FoodContext;

#[derive(Parser)]
#[command(name = "dosebell", version, about = "Medication reminder alarms")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Watch the schedule and raise alarms when medications are due
    Watch,
    /// List scheduled medications by time
    List,
    /// Schedule a new daily medication
    Add {
        /// Medication name
        #[arg(long)]
        name: String,
        /// Dose, e.g. "2 tablets"
        #[arg(long)]
        dosage: String,
        /// Time of day, HH:mm
        #[arg(long)]
        time: String,
        /// Take before or after food (before, after, any)
        #[arg(long, default_value = "any")]
        food: FoodContext,
        /// Extra reminder text
        #[arg(long)]
        note: Option<String>,
        /// Language of the spoken reminder
        #[arg(long, default_value = "en-US")]
        language: String,
    },
    /// Remove a scheduled medication
    Remove {
        /// Entry id (see `dosebell list`)
        id: String,
    },
    /// Push a medication a few minutes into the future
    Snooze {
        /// Entry id (see `dosebell list`)
        id: String,
        /// Minutes to snooze for (defaults to alarm.snooze_minutes)
        #[arg(long)]
        minutes: Option<u32>,
    },
    /// Check the configuration and schedule for problems
    Doctor,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config (for log level)
    let config = config::DoseBellConfig::load()?;

    // Log to stderr so stdout stays clean for alarm output.
    let filter = EnvFilter::try_new(&config.log.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Watch => cli::watch::watch(&config).await?,
        Command::List => cli::list::list(&config)?,
        Command::Add {
            name,
            dosage,
            time,
            food,
            note,
            language,
        } => cli::add::add(
            &config,
            cli::add::NewEntry {
                name,
                dosage,
                time,
                food,
                note,
                language,
            },
        )?,
        Command::Remove { id } => cli::remove::remove(&config, &id)?,
        Command::Snooze { id, minutes } => cli::snooze::snooze(&config, &id, minutes)?,
        Command::Doctor => cli::doctor::doctor(&config)?,
    }

    Ok(())
}
