use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::plan::Plan;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub passkey_basic: Option<String>,
    pub passkey_king: Option<String>,
}

impl Config {
    pub fn new(data_dir: Option<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.unwrap_or_else(|| {
            dirs::config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("minebot")
        });

        // Ensure data directory exists
        std::fs::create_dir_all(&data_dir).context("Failed to create data directory")?;

        Ok(Config {
            data_dir,
            passkey_basic: std::env::var("PASSKEY_BASIC").ok(),
            passkey_king: std::env::var("PASSKEY_KING").ok(),
        })
    }

    pub fn subscriptions_file(&self) -> PathBuf {
        self.data_dir.join("subscriptions.json")
    }

    pub fn predictions_dir(&self) -> PathBuf {
        self.data_dir.join("predictions")
    }

    /// Both plan secrets, required before the conversation flow can run.
    pub fn passkeys(&self) -> Result<Passkeys> {
        let basic = self
            .passkey_basic
            .clone()
            .context("PASSKEY_BASIC environment variable is not set")?;
        let king = self
            .passkey_king
            .clone()
            .context("PASSKEY_KING environment variable is not set")?;

        Ok(Passkeys { basic, king })
    }
}

#[derive(Debug, Clone)]
pub struct Passkeys {
    pub basic: String,
    pub king: String,
}

impl Passkeys {
    pub fn expected(&self, plan: Plan) -> &str {
        match plan {
            Plan::Basic => &self.basic,
            Plan::King => &self.king,
        }
    }
}
