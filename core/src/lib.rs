//! Condominium water billing.
//!
//! Splits a utility water/sewer invoice and the period's common expenses
//! between a fixed roster of units, from meter readings and a tiered
//! tariff. See `engine` for the calculation pipeline.

pub mod aggregation;
pub mod bill;
pub mod common_expense;
pub mod config;
pub mod consumption;
pub mod engine;
pub mod error;
pub mod expenses;
pub mod history;
pub mod period;
pub mod reconciliation;
pub mod report;
pub mod store;
pub mod tariff;
pub mod tier_allocation;
pub mod types;
pub mod unit;
pub mod validate;
pub mod working;

pub use engine::{calculate_all_units, BillingEngine};
pub use tariff::enrich_tariff_tiers;
