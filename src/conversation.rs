use std::collections::HashMap;

use anyhow::Result;
use chrono::Utc;

use crate::config::Passkeys;
use crate::plan::Plan;
use crate::predictor;
use crate::render;
use crate::subscription::{self, Records, SubscriptionStore, UserRecord};

/// Incoming chat update, as delivered by a transport.
#[derive(Debug, Clone)]
pub enum Event<'a> {
    /// Entry command (/start)
    Start,
    /// Callback-button plan selection
    Plan(Plan),
    /// Plain text reply
    Text(&'a str),
    /// Fallback command (/cancel)
    Cancel,
}

/// Outgoing message for a transport to deliver.
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    PlanMenu {
        text: String,
        options: Vec<(String, Plan)>,
    },
    Photo {
        png: Vec<u8>,
        caption: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum SessionState {
    ChoosePlan,
    EnterPasskey { plan: Plan },
    EnterSeed,
}

/// Per-user conversation flow: choose plan, enter passkey, then submit
/// seeds until the plan expires or the daily quota runs out. Sessions
/// live in memory; subscription records go through the injected store.
pub struct ConversationController<S> {
    passkeys: Passkeys,
    store: S,
    sessions: HashMap<String, SessionState>,
}

impl<S: SubscriptionStore> ConversationController<S> {
    pub fn new(passkeys: Passkeys, store: S) -> Self {
        ConversationController {
            passkeys,
            store,
            sessions: HashMap::new(),
        }
    }

    pub fn handle(&mut self, user_id: &str, event: Event) -> Result<Vec<Reply>> {
        match event {
            Event::Start => Ok(self.start(user_id)),
            Event::Cancel => Ok(self.cancel(user_id)),
            Event::Plan(plan) => Ok(self.choose_plan(user_id, plan)),
            Event::Text(text) => self.text(user_id, text),
        }
    }

    /// Stateless status query, available outside the conversation.
    pub fn status(&self, user_id: &str) -> Result<String> {
        let records = self.store.load()?;
        Ok(status_message(&records, user_id))
    }

    fn start(&mut self, user_id: &str) -> Vec<Reply> {
        self.sessions
            .insert(user_id.to_string(), SessionState::ChoosePlan);

        vec![plan_menu()]
    }

    fn cancel(&mut self, user_id: &str) -> Vec<Reply> {
        self.sessions.remove(user_id);
        vec![Reply::Text("❌ Cancelled.".to_string())]
    }

    fn choose_plan(&mut self, user_id: &str, plan: Plan) -> Vec<Reply> {
        match self.sessions.get(user_id) {
            Some(SessionState::ChoosePlan) => {
                self.sessions
                    .insert(user_id.to_string(), SessionState::EnterPasskey { plan });
                vec![Reply::Text("Please enter your passkey:".to_string())]
            }
            _ => vec![start_hint()],
        }
    }

    fn text(&mut self, user_id: &str, text: &str) -> Result<Vec<Reply>> {
        match self.sessions.get(user_id).cloned() {
            None => Ok(vec![start_hint()]),
            Some(SessionState::ChoosePlan) => match text.parse::<Plan>() {
                Ok(plan) => Ok(self.choose_plan(user_id, plan)),
                Err(_) => Ok(vec![plan_menu()]),
            },
            Some(SessionState::EnterPasskey { plan }) => self.enter_passkey(user_id, plan, text),
            Some(SessionState::EnterSeed) => self.enter_seed(user_id, text),
        }
    }

    fn enter_passkey(&mut self, user_id: &str, plan: Plan, passkey: &str) -> Result<Vec<Reply>> {
        if passkey.trim() != self.passkeys.expected(plan) {
            // No lockout, no attempt limit
            return Ok(vec![Reply::Text(
                "❌ Invalid passkey. Try again.".to_string(),
            )]);
        }

        let now = Utc::now();
        let record = UserRecord::activate(plan, now);
        let expiry_date = record.expiry.date_naive();

        let mut records = self.store.load()?;
        records.insert(user_id.to_string(), record);
        self.store.save(&records)?;

        self.sessions
            .insert(user_id.to_string(), SessionState::EnterSeed);

        Ok(vec![Reply::Text(format!(
            "✅ Access granted for {} plan until {}.\nNow send your client seed:",
            plan, expiry_date
        ))])
    }

    fn enter_seed(&mut self, user_id: &str, seed: &str) -> Result<Vec<Reply>> {
        let now = Utc::now();
        let mut records = self.store.load()?;

        if !subscription::is_active(&mut records, user_id, now) {
            self.sessions.remove(user_id);
            return Ok(vec![Reply::Text(
                "❌ Your plan has expired or is not active. Please restart with /start."
                    .to_string(),
            )]);
        }

        let record = match records.get(user_id) {
            Some(record) => record,
            None => {
                self.sessions.remove(user_id);
                return Ok(vec![start_hint()]);
            }
        };

        if record.daily_used >= record.plan.limits().daily_quota {
            self.sessions.remove(user_id);
            return Ok(vec![Reply::Text(
                "⛔ You've reached your daily limit. Try again tomorrow.".to_string(),
            )]);
        }

        let tiles = predictor::safe_tiles(seed.trim());
        let png = render::encode_png(&render::render_grid(&tiles))?;

        subscription::record_usage(&mut records, user_id, now);
        self.store.save(&records)?;

        let mut sorted = tiles;
        sorted.sort_unstable();

        Ok(vec![
            Reply::Photo {
                png,
                caption: format!(
                    "✅ Safe tiles based on your seed.\n💎 Safe Tiles: {:?}",
                    sorted
                ),
            },
            Reply::Text("🔁 Send another client seed or type /start to restart.".to_string()),
        ])
    }
}

fn plan_menu() -> Reply {
    Reply::PlanMenu {
        text: "Welcome to Stake Mines Predictor Bot!\nChoose your plan:".to_string(),
        options: Plan::all()
            .iter()
            .map(|plan| (plan.label().to_string(), *plan))
            .collect(),
    }
}

fn start_hint() -> Reply {
    Reply::Text("Type /start to begin.".to_string())
}

pub fn status_message(records: &Records, user_id: &str) -> String {
    match records.get(user_id) {
        None => "❌ You don't have an active plan.".to_string(),
        Some(record) => format!(
            "📊 Plan: {}\n📅 Expiry: {}\n🔢 Signals Used Today: {}/{}",
            record.plan,
            record.expiry.date_naive(),
            record.daily_used,
            record.plan.limits().daily_quota
        ),
    }
}
