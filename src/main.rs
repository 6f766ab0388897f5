mod cli;
mod config;
mod conversation;
mod plan;
mod predictor;
mod render;
mod shell;
mod subscription;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "minebot")]
#[command(about = "Passkey-gated mines predictor bot with seed-derived safe tiles")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive conversation shell
    Shell {
        /// User identifier for this session
        #[arg(long, default_value = "local")]
        user_id: String,
        /// Data directory path
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Show plan, expiry and daily usage for a user
    Status {
        /// User identifier to look up
        #[arg(long, default_value = "local")]
        user_id: String,
        /// Data directory path
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
    /// Derive safe tiles for a seed and render the grid image
    Predict {
        /// Client seed
        seed: String,
        /// Output image path (defaults to <data_dir>/prediction.png)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Data directory path
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Shell { user_id, data_dir } => shell::handle_shell(user_id, data_dir).await,
        Commands::Status { user_id, data_dir } => cli::handle_status(user_id, data_dir).await,
        Commands::Predict {
            seed,
            output,
            data_dir,
        } => cli::handle_predict(seed, output, data_dir).await,
    }
}
