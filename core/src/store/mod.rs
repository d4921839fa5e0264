//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The history service and the runner call store methods, they never
//! execute SQL directly.

use crate::error::BillingResult;
use rusqlite::Connection;

mod history;
mod settings;

pub use settings::{SETTING_COMMON_EXPENSES, SETTING_TARIFF_RATES, SETTING_UNITS};

pub struct BillingStore {
    conn: Connection,
}

impl BillingStore {
    /// Open (or create) the billing database at `path`.
    pub fn open(path: &str) -> BillingResult<Self> {
        let conn = Connection::open(path)?;
        // WAL mode only applies to real files; in-memory databases ignore it.
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        Ok(Self { conn })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> BillingResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> BillingResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_history.sql"))?;
        Ok(())
    }
}

/// Listing row for the history table, without the full payload.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyRecordRow {
    pub period:            String,
    pub total_reading:     f64,
    pub total_consumption: f64,
    pub total_bill:        f64,
    pub average_bill:      f64,
    pub saved_at:          String,
}
