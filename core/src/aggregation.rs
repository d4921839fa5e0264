//! Condo-wide totals and the monthly history record.

use crate::{
    bill::CalculatedUnitBill,
    expenses::CommonExpenses,
    period::PeriodId,
    tariff::TariffRates,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CondoTotals {
    pub total_reading:     f64,
    pub total_consumption: f64,
    pub total_bill:        f64,
    pub average_bill:      f64,
}

pub fn aggregate(bills: &[CalculatedUnitBill]) -> CondoTotals {
    let total_reading: f64 = bills.iter().map(|b| b.unit.current_reading).sum();
    let total_consumption: f64 = bills.iter().map(|b| b.consumption).sum();
    let total_bill: f64 = bills.iter().map(|b| b.total_bill).sum();
    let average_bill = if bills.is_empty() {
        0.0
    } else {
        total_bill / bills.len() as f64
    };

    CondoTotals {
        total_reading,
        total_consumption,
        total_bill,
        average_bill,
    }
}

/// Frozen snapshot of one billing period. Keyed by `period`; saving the
/// same period again replaces the earlier record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    pub period:          PeriodId,
    #[serde(flatten)]
    pub totals:          CondoTotals,
    pub units:           Vec<CalculatedUnitBill>,
    pub common_expenses: CommonExpenses,
    pub tariff_rates:    TariffRates,
}

impl MonthlyRecord {
    pub fn build(
        period: PeriodId,
        bills: &[CalculatedUnitBill],
        expenses: &CommonExpenses,
        tariffs: &TariffRates,
    ) -> Self {
        Self {
            period,
            totals: aggregate(bills),
            units: bills.to_vec(),
            common_expenses: expenses.clone(),
            tariff_rates: tariffs.clone(),
        }
    }
}
