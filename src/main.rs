mod api;
mod cli;
mod config;
mod data;
mod models;
mod services;
mod utils;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use config::AppConfig;
use services::MatchFeatures;

#[derive(Parser)]
#[command(name = "cricket-analytics")]
#[command(about = "IPL player, team and venue analytics over historical match data")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Career summary for a player
    Player {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "batsman")]
        role: String,
    },
    /// Runs scored per season
    Seasons {
        #[arg(short, long)]
        name: String,
    },
    /// One batsman against one bowler
    Matchup {
        #[arg(long)]
        batsman: String,
        #[arg(long)]
        bowler: String,
    },
    /// Powerplay, middle and death overs breakdown
    Phases {
        #[arg(short, long)]
        name: String,
        #[arg(short, long, default_value = "batsman")]
        role: String,
    },
    /// Head-to-head record between two teams
    HeadToHead {
        #[arg(long)]
        team1: String,
        #[arg(long)]
        team2: String,
        #[arg(long)]
        season: Option<String>,
        #[arg(long)]
        venue: Option<String>,
    },
    /// A team's strongest venues
    Fortress {
        #[arg(short, long)]
        team: String,
    },
    /// List teams, venues and seasons
    Catalog,
    /// Win probability for a fixture
    Predict {
        #[arg(long)]
        team1: String,
        #[arg(long)]
        team2: String,
        #[arg(long)]
        venue: String,
        #[arg(long)]
        toss_winner: String,
        #[arg(long, default_value = "bat")]
        toss_decision: String,
    },
    /// Write a small sample dataset as CSV
    Seed {
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve { port }) => {
            let port = port.unwrap_or(config.port);
            tracing::info!("Starting cricket analytics API on port {}", port);
            api::serve(config, port).await?;
        }
        Some(Commands::Player { name, role }) => {
            cli::show_player(&config, &name, &role)?;
        }
        Some(Commands::Seasons { name }) => {
            cli::show_seasons(&config, &name)?;
        }
        Some(Commands::Matchup { batsman, bowler }) => {
            cli::show_matchup(&config, &batsman, &bowler)?;
        }
        Some(Commands::Phases { name, role }) => {
            cli::show_phases(&config, &name, &role)?;
        }
        Some(Commands::HeadToHead {
            team1,
            team2,
            season,
            venue,
        }) => {
            cli::show_head_to_head(&config, &team1, &team2, season.as_deref(), venue.as_deref())?;
        }
        Some(Commands::Fortress { team }) => {
            cli::show_fortress(&config, &team)?;
        }
        Some(Commands::Catalog) => {
            cli::show_catalog(&config)?;
        }
        Some(Commands::Predict {
            team1,
            team2,
            venue,
            toss_winner,
            toss_decision,
        }) => {
            let features = MatchFeatures {
                team1,
                team2,
                venue,
                toss_winner,
                toss_decision,
            };
            cli::predict(&config, features)?;
        }
        Some(Commands::Seed { dir }) => {
            let config = match dir {
                Some(dir) => config.with_data_dir(dir),
                None => config,
            };
            cli::seed(&config)?;
        }
        None => {
            // Default to serving
            let port = config.port;
            tracing::info!("Starting cricket analytics API on port {}", port);
            api::serve(config, port).await?;
        }
    }

    Ok(())
}
