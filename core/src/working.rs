//! Working state: the roster, common expenses and tariff carried from one
//! run to the next.
//!
//! Each part is read back from the settings table when present and falls
//! back to configuration otherwise. A stored part that no longer parses is
//! logged and replaced by its configured value.

use crate::{
    aggregation::MonthlyRecord,
    config::BillingConfig,
    error::BillingResult,
    expenses::CommonExpenses,
    history::units_from_record,
    store::{BillingStore, SETTING_COMMON_EXPENSES, SETTING_TARIFF_RATES, SETTING_UNITS},
    tariff::{enrich_tariff_tiers_or, parse_tariff_rates, TariffRates},
    unit::{align_units, create_initial_units, Unit},
};

/// Which stored parts to ignore in favour of configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResetOptions {
    pub tariffs:  bool,
    pub expenses: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkingState {
    pub units:    Vec<Unit>,
    pub expenses: CommonExpenses,
    pub tariffs:  TariffRates,
}

impl WorkingState {
    pub fn load(
        store: &BillingStore,
        config: &BillingConfig,
        reset: ResetOptions,
    ) -> BillingResult<Self> {
        let roster = &config.roster;
        let units = match store.load_setting_raw(SETTING_UNITS)? {
            Some(json) => match serde_json::from_str::<Vec<Unit>>(&json) {
                Ok(stored) => align_units(&roster.unit_labels, roster.default_area, &stored),
                Err(e) => {
                    log::warn!("working: stored units are invalid ({e}), using a fresh roster");
                    create_initial_units(&roster.unit_labels, roster.default_area)
                }
            },
            None => create_initial_units(&roster.unit_labels, roster.default_area),
        };

        let stored_tariffs = if reset.tariffs {
            None
        } else {
            store.load_setting_raw(SETTING_TARIFF_RATES)?
        };
        let tariffs = parse_tariff_rates(stored_tariffs.as_deref(), &config.tariffs);

        let stored_expenses = if reset.expenses {
            None
        } else {
            store.load_setting_raw(SETTING_COMMON_EXPENSES)?
        };
        let expenses = parse_common_expenses(stored_expenses.as_deref(), &config.expenses);

        Ok(Self { units, expenses, tariffs })
    }

    /// The state a stored period was billed with. Ids and areas come from
    /// `roster` where the label is known.
    pub fn from_record(record: &MonthlyRecord, roster: &[Unit], fallback: &TariffRates) -> Self {
        Self {
            units:    units_from_record(record, roster),
            expenses: record.common_expenses.clone(),
            tariffs:  enrich_tariff_tiers_or(&record.tariff_rates, fallback),
        }
    }

    pub fn save(&self, store: &BillingStore) -> BillingResult<()> {
        store.save_setting(SETTING_UNITS, &self.units)?;
        store.save_setting(SETTING_COMMON_EXPENSES, &self.expenses)?;
        store.save_setting(SETTING_TARIFF_RATES, &self.tariffs)?;
        Ok(())
    }
}

/// Stored common expenses, or `fallback` when absent or unreadable.
pub fn parse_common_expenses(stored: Option<&str>, fallback: &CommonExpenses) -> CommonExpenses {
    match stored.map(serde_json::from_str::<CommonExpenses>) {
        Some(Ok(expenses)) => expenses,
        Some(Err(e)) => {
            log::warn!("working: stored common expenses are invalid ({e}), using configured expenses");
            fallback.clone()
        }
        None => fallback.clone(),
    }
}
