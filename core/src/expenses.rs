//! Per-period charges that are not metered water.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommonExpenses {
    // Split equally between units.
    pub garbage_fee:             f64,
    pub garbage_fee_penalty:     f64,
    pub late_payment_adjustment: f64,
    pub water_penalty:           f64,

    /// Split by floor area.
    pub other_services_fee: f64,

    /// The utility's actual water + sewer invoice for the period.
    /// Reconciliation forces the computed water costs to sum to this.
    pub total_utility_water_sewer_bill: f64,
}

impl CommonExpenses {
    /// The expenses a new installation starts from.
    pub fn standard() -> Self {
        Self {
            total_utility_water_sewer_bill: 404.29,
            ..Self::default()
        }
    }

    /// Sum of the charges that every unit pays an equal share of.
    pub fn equal_share_total(&self) -> f64 {
        self.garbage_fee + self.garbage_fee_penalty + self.late_payment_adjustment + self.water_penalty
    }
}
