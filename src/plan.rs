use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Subscription tier. Stored lowercase in the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Basic,
    King,
}

#[derive(Debug, Clone, Copy)]
pub struct PlanLimits {
    /// Days of access granted on activation
    pub valid_days: i64,
    /// Seed submissions permitted per calendar day
    pub daily_quota: u32,
}

impl Plan {
    pub fn limits(&self) -> PlanLimits {
        match self {
            Plan::Basic => PlanLimits {
                valid_days: 15,
                daily_quota: 20,
            },
            Plan::King => PlanLimits {
                valid_days: 31,
                daily_quota: 45,
            },
        }
    }

    /// Button label shown in the plan menu
    pub fn label(&self) -> &'static str {
        match self {
            Plan::Basic => "Mines Basic",
            Plan::King => "Mines King 👑",
        }
    }

    pub fn all() -> [Plan; 2] {
        [Plan::Basic, Plan::King]
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Plan::Basic => write!(f, "Basic"),
            Plan::King => write!(f, "King"),
        }
    }
}

impl FromStr for Plan {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Plan::Basic),
            "king" => Ok(Plan::King),
            other => Err(anyhow::anyhow!("Unknown plan: {}", other)),
        }
    }
}
