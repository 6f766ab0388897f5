use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::plan::Plan;

/// One user's subscription, keyed by user id in the data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub plan: Plan,
    pub expiry: DateTime<Utc>,
    pub daily_used: u32,
    pub last_used: DateTime<Utc>,
}

impl UserRecord {
    /// Fresh record created on successful passkey entry.
    pub fn activate(plan: Plan, now: DateTime<Utc>) -> Self {
        UserRecord {
            plan,
            expiry: now + Duration::days(plan.limits().valid_days),
            daily_used: 0,
            last_used: now,
        }
    }
}

pub type Records = HashMap<String, UserRecord>;

/// Durable mapping from user id to subscription record. Implementations
/// load and save the whole document; last writer wins.
pub trait SubscriptionStore {
    fn load(&self) -> Result<Records>;
    fn save(&self, records: &Records) -> Result<()>;
}

/// File-backed store: one pretty-printed JSON document.
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: PathBuf) -> Self {
        JsonStore { path }
    }
}

impl SubscriptionStore for JsonStore {
    fn load(&self) -> Result<Records> {
        // Absent file means no users yet; malformed content is an error.
        if !self.path.exists() {
            return Ok(Records::new());
        }

        let content = std::fs::read_to_string(&self.path)
            .context("Failed to read subscriptions file")?;

        let records: Records = serde_json::from_str(&content)
            .context("Failed to parse subscriptions file")?;

        Ok(records)
    }

    fn save(&self, records: &Records) -> Result<()> {
        let content = serde_json::to_string_pretty(records)
            .context("Failed to serialize subscriptions")?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content).context("Failed to write subscriptions file")?;
        std::fs::rename(&tmp, &self.path)
            .context("Failed to replace subscriptions file")?;

        Ok(())
    }
}

/// In-memory store, shared across clones. Stands in for the file store
/// in tests and keeps the controller oblivious to the backing medium.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<Records>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubscriptionStore for MemoryStore {
    fn load(&self) -> Result<Records> {
        Ok(self.records.lock().unwrap().clone())
    }

    fn save(&self, records: &Records) -> Result<()> {
        *self.records.lock().unwrap() = records.clone();
        Ok(())
    }
}

/// Whether the user's plan is currently active. Resets `daily_used` when
/// the calendar date has advanced past the last usage date; the reset
/// sticks only once the caller persists the records.
pub fn is_active(records: &mut Records, user_id: &str, now: DateTime<Utc>) -> bool {
    let record = match records.get_mut(user_id) {
        Some(record) => record,
        None => return false,
    };

    if now > record.expiry {
        return false;
    }

    if now.date_naive() > record.last_used.date_naive() {
        record.daily_used = 0;
    }

    true
}

/// Count one seed submission. Caller persists afterward.
pub fn record_usage(records: &mut Records, user_id: &str, now: DateTime<Utc>) {
    if let Some(record) = records.get_mut(user_id) {
        record.daily_used += 1;
        record.last_used = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store(name: &str) -> JsonStore {
        let dir = std::env::temp_dir().join(format!(
            "minebot-test-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        JsonStore::new(dir.join("subscriptions.json"))
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = std::env::temp_dir().join(format!("minebot-test-absent-{}", std::process::id()));
        let store = JsonStore::new(dir.join("nope").join("subscriptions.json"));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let store = temp_store("roundtrip");
        let now = Utc::now();

        let mut records = Records::new();
        records.insert("42".to_string(), UserRecord::activate(Plan::King, now));
        store.save(&records).unwrap();

        let loaded = store.load().unwrap();
        let record = loaded.get("42").unwrap();
        assert_eq!(record.plan, Plan::King);
        assert_eq!(record.daily_used, 0);
        assert_eq!(record.expiry, now + Duration::days(31));
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = std::env::temp_dir().join(format!(
            "minebot-test-malformed-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("subscriptions.json");
        std::fs::write(&path, "{not json").unwrap();

        assert!(JsonStore::new(path).load().is_err());
    }

    #[test]
    fn test_absent_user_is_inactive() {
        let mut records = Records::new();
        assert!(!is_active(&mut records, "1", Utc::now()));
    }

    #[test]
    fn test_expired_record_is_inactive_regardless_of_usage() {
        let now = Utc::now();
        let mut record = UserRecord::activate(Plan::Basic, now - Duration::days(16));
        record.daily_used = 0;

        let mut records = Records::new();
        records.insert("1".to_string(), record);

        assert!(!is_active(&mut records, "1", now));
    }

    #[test]
    fn test_activation_window() {
        let now = Utc::now();
        let mut records = Records::new();
        records.insert("1".to_string(), UserRecord::activate(Plan::Basic, now));

        assert!(is_active(&mut records, "1", now + Duration::days(14)));
        assert!(!is_active(&mut records, "1", now + Duration::days(16)));
    }

    #[test]
    fn test_daily_reset_on_date_boundary() {
        let now = Utc::now();
        let mut record = UserRecord::activate(Plan::Basic, now);
        record.daily_used = 7;
        record.last_used = now - Duration::days(1);

        let mut records = Records::new();
        records.insert("1".to_string(), record);

        assert!(is_active(&mut records, "1", now));
        assert_eq!(records.get("1").unwrap().daily_used, 0);

        // Usage today moves last_used forward, so the next check on the
        // same date leaves the counter alone.
        record_usage(&mut records, "1", now);
        assert!(is_active(&mut records, "1", now));
        assert_eq!(records.get("1").unwrap().daily_used, 1);
    }

    #[test]
    fn test_record_usage_updates_counter_and_timestamp() {
        let activated = Utc::now() - Duration::hours(2);
        let now = Utc::now();

        let mut records = Records::new();
        records.insert("1".to_string(), UserRecord::activate(Plan::Basic, activated));

        record_usage(&mut records, "1", now);
        record_usage(&mut records, "1", now);

        let record = records.get("1").unwrap();
        assert_eq!(record.daily_used, 2);
        assert_eq!(record.last_used, now);
    }

    #[test]
    fn test_memory_store_shares_state_across_clones() {
        let store = MemoryStore::new();
        let handle = store.clone();

        let mut records = Records::new();
        records.insert(
            "7".to_string(),
            UserRecord::activate(Plan::Basic, Utc::now()),
        );
        store.save(&records).unwrap();

        assert!(handle.load().unwrap().contains_key("7"));
    }
}
