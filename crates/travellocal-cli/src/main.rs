//! Travellocal CLI - tour recommendations, reviews and bookings from the terminal

mod auth;
mod cli;
mod commands;
mod error;


use clap::Parser;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands, ProgramCommands, ReviewCommands, ReviewTarget};
use crate::commands::auth_cmd::run_auth;
use crate::commands::completions::run_completions;
use crate::commands::program::{run_program_show, run_program_unlock};
use crate::commands::recommend::{run_recommend, RecommendFilters};
use crate::commands::reserve::run_reserve;
use crate::commands::review::{run_review_add, run_review_delete};
use crate::commands::reviews::{run_place_reviews, run_tour_reviews};
use crate::error::CliError;

const DEFAULT_LOG_DIRECTIVE: &str = "travellocal=info";

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = DEFAULT_LOG_DIRECTIVE.parse::<Directive>() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend {
            hashtags,
            regions,
            sort,
            json,
        } => {
            let filters = RecommendFilters::new(hashtags, regions, sort.map(Into::into));
            run_recommend(filters, json).await?;
        }
        Commands::Reviews { target } => match target {
            ReviewTarget::Tour {
                program_id,
                sort,
                json,
            } => run_tour_reviews(program_id, sort.into(), json).await?,
            ReviewTarget::Place {
                place_id,
                sort,
                json,
            } => run_place_reviews(&place_id, sort.into(), json).await?,
        },
        Commands::Review { command } => match command {
            ReviewCommands::Add { target } => run_review_add(target).await?,
            ReviewCommands::Delete { target } => run_review_delete(target).await?,
        },
        Commands::Program { command } => match command {
            ProgramCommands::Show { program_id, json } => {
                run_program_show(program_id, json).await?;
            }
            ProgramCommands::Unlock { program_id, yes } => {
                run_program_unlock(program_id, yes).await?;
            }
        },
        Commands::Reserve {
            program_id,
            date,
            people,
        } => run_reserve(program_id, date, people).await?,
        Commands::Auth { command } => run_auth(command)?,
        Commands::Completions { shell, output } => {
            run_completions(shell, output.as_deref())?;
        }
    }

    Ok(())
}
