use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;

use crate::config::Config;
use crate::conversation;
use crate::predictor;
use crate::render;
use crate::subscription::{JsonStore, SubscriptionStore};

/// Stateless status query for a user, outside any conversation.
pub async fn handle_status(user_id: String, data_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(data_dir)?;
    let store = JsonStore::new(config.subscriptions_file());
    let records = store.load()?;

    println!("{}", conversation::status_message(&records, &user_id));
    Ok(())
}

/// Derive the safe tiles for a seed and render the grid to a PNG file.
pub async fn handle_predict(
    seed: String,
    output: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> Result<()> {
    let config = Config::new(data_dir)?;

    let tiles = predictor::safe_tiles(seed.trim());
    let image = render::render_grid(&tiles);

    let path = output.unwrap_or_else(|| config.data_dir.join("prediction.png"));
    image
        .save(&path)
        .context("Failed to write prediction image")?;

    let mut sorted = tiles;
    sorted.sort_unstable();

    println!("{} {}", "Seed:".cyan().bold(), seed);
    println!("{} {:?}", "💎 Safe tiles:".green().bold(), sorted);
    println!("🖼️  Image saved to {}", path.display());

    Ok(())
}
