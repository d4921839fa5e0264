//! History: commits calculated periods and carries readings forward.
//!
//! A period is committed only on request. Committing a period that is
//! already in history replaces it; the store serializes writes, so the
//! last commit for a period always wins.

use crate::{
    aggregation::MonthlyRecord,
    bill::CalculatedUnitBill,
    error::{BillingError, BillingResult},
    expenses::CommonExpenses,
    period::PeriodId,
    store::BillingStore,
    tariff::{enrich_tariff_tiers_or, TariffRates},
    unit::Unit,
    working::WorkingState,
};

pub struct BillingHistory<'a> {
    store:            &'a BillingStore,
    /// Used when a tariff to freeze or restore has no tiers. The engine
    /// falls back to the configured tariff, so callers pass the same one.
    fallback_tariffs: TariffRates,
}

impl<'a> BillingHistory<'a> {
    pub fn new(store: &'a BillingStore, fallback_tariffs: TariffRates) -> Self {
        Self { store, fallback_tariffs }
    }

    /// Freeze a calculation into the history record for `period`.
    pub fn commit(
        &self,
        period: PeriodId,
        bills: &[CalculatedUnitBill],
        expenses: &CommonExpenses,
        tariffs: &TariffRates,
    ) -> BillingResult<MonthlyRecord> {
        if bills.is_empty() {
            return Err(BillingError::NothingToSave);
        }

        let record = MonthlyRecord::build(period, bills, expenses, &self.frozen_tariffs(tariffs));
        self.store.upsert_monthly_record(&record)?;

        log::info!(
            "history: saved {period} ({} units, total {:.2})",
            record.units.len(),
            record.totals.total_bill
        );
        Ok(record)
    }

    pub fn load(&self, period: &PeriodId) -> BillingResult<MonthlyRecord> {
        self.store
            .monthly_record(period)?
            .ok_or_else(|| BillingError::RecordNotFound {
                period: period.to_string(),
            })
    }

    /// Reopen a stored period: its units, expenses and tariff become the
    /// working state again. Returns the record alongside the restored state.
    pub fn restore(
        &self,
        period: &PeriodId,
        roster: &[Unit],
    ) -> BillingResult<(MonthlyRecord, WorkingState)> {
        let record = self.load(period)?;
        let state = WorkingState::from_record(&record, roster, &self.fallback_tariffs);
        state.save(self.store)?;

        log::info!("history: restored {period} as the working state");
        Ok((record, state))
    }

    /// Remove a period from history. False when it was not there.
    pub fn delete(&self, period: &PeriodId) -> BillingResult<bool> {
        let deleted = self.store.delete_monthly_record(period)?;
        if deleted {
            log::info!("history: deleted {period}");
        } else {
            log::warn!("history: nothing to delete for {period}");
        }
        Ok(deleted)
    }

    /// All records, newest period first.
    pub fn list(&self) -> BillingResult<Vec<MonthlyRecord>> {
        self.store.monthly_records()
    }

    /// True when the period before `period` has a record with unit data.
    pub fn can_import_previous(&self, period: &PeriodId) -> BillingResult<bool> {
        Ok(self
            .store
            .monthly_record(&period.previous())?
            .is_some_and(|r| !r.units.is_empty()))
    }

    /// Start `period` from the previous period's closing readings: each
    /// unit's previous reading becomes last month's current reading and
    /// its current reading is reset to 0. Units missing from last month's
    /// record are left as they are.
    pub fn import_previous_readings(
        &self,
        period: &PeriodId,
        units: &[Unit],
    ) -> BillingResult<Vec<Unit>> {
        let previous = period.previous();
        let record = match self.store.monthly_record(&previous)? {
            Some(r) if !r.units.is_empty() => r,
            _ => {
                return Err(BillingError::RecordNotFound {
                    period: previous.to_string(),
                })
            }
        };

        let imported = units
            .iter()
            .map(|unit| {
                match record.units.iter().find(|b| b.unit.unit_label == unit.unit_label) {
                    Some(bill) => Unit {
                        previous_reading: bill.unit.current_reading,
                        current_reading: 0.0,
                        ..unit.clone()
                    },
                    None => unit.clone(),
                }
            })
            .collect();

        log::info!("history: imported closing readings of {previous} into {period}");
        Ok(imported)
    }
}

impl BillingHistory<'_> {
    fn frozen_tariffs(&self, tariffs: &TariffRates) -> TariffRates {
        if tariffs.is_enriched() {
            tariffs.clone()
        } else {
            enrich_tariff_tiers_or(tariffs, &self.fallback_tariffs)
        }
    }
}

/// Rebuild the base units of a stored record so the period can be edited
/// and recalculated. Ids and areas come from the current roster where the
/// label is known.
pub fn units_from_record(record: &MonthlyRecord, roster: &[Unit]) -> Vec<Unit> {
    record
        .units
        .iter()
        .map(|bill| {
            let mut unit = bill.unit.clone();
            if let Some(r) = roster.iter().find(|r| r.unit_label == unit.unit_label) {
                unit.id = r.id.clone();
                unit.area = r.area;
            }
            unit
        })
        .collect()
}
