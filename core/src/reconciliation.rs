//! Invoice reconciliation. Forces the billed water costs to match the
//! utility's actual invoice.
//!
//! Design:
//!   - difference = invoice total - sum(water_cost)
//!   - |difference| <= tolerance → nothing is adjusted
//!   - Otherwise each unit gets consumption / total_consumption of the
//!     difference, or an equal split when nobody consumed anything
//!   - Only total_bill and the breakdown change; water_cost and
//!     excess_tier_cost stay as the tariff computed them

use crate::{bill::CalculatedUnitBill, types::round_cents};
use serde::{Deserialize, Serialize};

/// Breakdown label for the reconciliation line.
pub const INVOICE_ADJUSTMENT_LABEL: &str = "Invoice adjustment";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationPolicy {
    /// Differences up to this amount are treated as rounding noise.
    pub difference_tolerance: f64,
    /// Smallest per-unit share that earns a breakdown line.
    pub breakdown_min_share: f64,
}

impl Default for ReconciliationPolicy {
    fn default() -> Self {
        Self {
            difference_tolerance: 0.01,
            breakdown_min_share: 0.01,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentBasis {
    /// Difference within tolerance, nothing applied.
    None,
    Consumption,
    EqualSplit,
}

/// What reconciliation found and did for one calculation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InvoiceReconciliation {
    pub computed_water_total: f64,
    pub invoice_total:        f64,
    pub difference:           f64,
    pub basis:                AdjustmentBasis,
}

impl InvoiceReconciliation {
    pub fn applied(&self) -> bool {
        self.basis != AdjustmentBasis::None
    }
}

/// Spread the invoice difference over `bills` in place.
pub fn reconcile(
    bills: &mut [CalculatedUnitBill],
    invoice_total: f64,
    policy: &ReconciliationPolicy,
) -> InvoiceReconciliation {
    let computed_water_total: f64 = bills.iter().map(|b| b.water_cost).sum();
    let difference = invoice_total - computed_water_total;
    let total_consumption: f64 = bills.iter().map(|b| b.consumption).sum();

    let mut result = InvoiceReconciliation {
        computed_water_total,
        invoice_total,
        difference,
        basis: AdjustmentBasis::None,
    };

    if bills.is_empty() || difference.abs() <= policy.difference_tolerance {
        log::debug!(
            "reconciliation: computed {computed_water_total:.2} vs invoice {invoice_total:.2}, no adjustment"
        );
        return result;
    }

    result.basis = if total_consumption > 0.0 {
        AdjustmentBasis::Consumption
    } else {
        AdjustmentBasis::EqualSplit
    };
    let unit_count = bills.len() as f64;

    for bill in bills.iter_mut() {
        let share = match result.basis {
            AdjustmentBasis::Consumption => (bill.consumption / total_consumption) * difference,
            _ => difference / unit_count,
        };

        bill.total_bill = round_cents(bill.total_bill + share);
        if share.abs() >= policy.breakdown_min_share {
            bill.tier_breakdown
                .insert(INVOICE_ADJUSTMENT_LABEL.to_string(), round_cents(share));
        }
    }

    log::info!(
        "reconciliation: computed {computed_water_total:.2} vs invoice {invoice_total:.2}, spread {difference:.2} by {:?}",
        result.basis
    );

    result
}
