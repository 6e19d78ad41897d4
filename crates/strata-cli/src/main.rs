mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    observability::init_tracing();
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Schema => {
            let builder = commands::make_builder(&cli).await?;
            commands::schema::sdl(&builder).await?;
        }
        Commands::Types => {
            let builder = commands::make_builder(&cli).await?;
            commands::schema::types(&builder, format).await?;
        }
        Commands::Query(args) => {
            let builder = commands::make_builder(&cli).await?;
            commands::query::execute(&builder, args, format).await?;
        }
        Commands::CheckConfig(args) => {
            commands::config::check(&args.file)?;
        }
    }

    Ok(())
}
