use super::BillingStore;
use crate::error::BillingResult;
use rusqlite::{params, OptionalExtension};
use serde::{de::DeserializeOwned, Serialize};

pub const SETTING_UNITS: &str = "units";
pub const SETTING_COMMON_EXPENSES: &str = "common_expenses";
pub const SETTING_TARIFF_RATES: &str = "tariff_rates";

impl BillingStore {
    pub fn save_setting<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> BillingResult<()> {
        let json = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO setting (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, json, chrono::Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// The stored value, or None when the key was never saved.
    pub fn load_setting<T: DeserializeOwned>(&self, key: &str) -> BillingResult<Option<T>> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM setting WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        match json {
            Some(j) => Ok(Some(serde_json::from_str(&j)?)),
            None => Ok(None),
        }
    }

    /// The raw stored JSON, for loaders that validate it themselves.
    pub fn load_setting_raw(&self, key: &str) -> BillingResult<Option<String>> {
        let json = self
            .conn
            .query_row(
                "SELECT value FROM setting WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(json)
    }
}
