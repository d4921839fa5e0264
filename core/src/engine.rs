//! The billing engine. Turns readings, expenses and a tariff into one
//! itemized bill per unit.
//!
//! STAGE ORDER (fixed, never reordered):
//!   1. Tariff enrichment     (BillingEngine::calculate only)
//!   2. Consumption           (per unit, floored at zero)
//!   3. Tier allocation       (fixed share + first excess tier)
//!   4. Common expenses       (equal shares + area-proportional fee)
//!   5. Invoice reconciliation
//!
//! RULES:
//!   - The engine is a pure function of its inputs. Nothing is mutated,
//!     nothing is stored, every call builds fresh bills.
//!   - Configuration problems never fail the calculation. They are logged
//!     and the result degrades to zero-valued bills.
//!   - An empty unit list yields an empty result.

use crate::{
    bill::CalculatedUnitBill,
    common_expense::allocate_common_expenses,
    config::BillingConfig,
    consumption::consumption,
    expenses::CommonExpenses,
    reconciliation::{reconcile, AdjustmentBasis, InvoiceReconciliation, ReconciliationPolicy},
    tariff::{enrich_tariff_tiers_or, TariffRates},
    tier_allocation::allocate_tiers,
    types::round_cents,
    unit::Unit,
};
use serde::{Deserialize, Serialize};

/// Bill every unit with the default reconciliation policy.
/// `tariffs` must already be enriched.
pub fn calculate_all_units(
    units: &[Unit],
    expenses: &CommonExpenses,
    tariffs: &TariffRates,
) -> Vec<CalculatedUnitBill> {
    calculate_all_units_with_policy(units, expenses, tariffs, &ReconciliationPolicy::default()).0
}

/// Bill every unit and report what reconciliation did.
pub fn calculate_all_units_with_policy(
    units: &[Unit],
    expenses: &CommonExpenses,
    tariffs: &TariffRates,
    policy: &ReconciliationPolicy,
) -> (Vec<CalculatedUnitBill>, Option<InvoiceReconciliation>) {
    if units.is_empty() {
        return (Vec::new(), None);
    }

    let allocations = match allocate_tiers(units, tariffs) {
        Some(a) => a,
        None => {
            let zeroed = units
                .iter()
                .map(|u| {
                    CalculatedUnitBill::zeroed(u, consumption(u.current_reading, u.previous_reading))
                })
                .collect();
            return (zeroed, None);
        }
    };
    let shares = allocate_common_expenses(units, expenses);

    let mut bills: Vec<CalculatedUnitBill> = units
        .iter()
        .zip(allocations)
        .zip(shares)
        .map(|((unit, alloc), share)| {
            let preliminary =
                alloc.water_cost + share.equal_share + share.proportional_fee;
            CalculatedUnitBill {
                unit: unit.clone(),
                consumption: alloc.consumption,
                water_cost: alloc.water_cost,
                fixed_share: alloc.fixed_share,
                excess_tier_cost: alloc.excess_tier_cost,
                equal_share: round_cents(share.equal_share),
                proportional_fee: round_cents(share.proportional_fee),
                total_bill: round_cents(preliminary),
                tier_breakdown: alloc.tier_breakdown,
            }
        })
        .collect();

    let outcome = reconcile(&mut bills, expenses.total_utility_water_sewer_bill, policy);
    (bills, Some(outcome))
}

/// One calculation run: the tariff actually applied, the bills, and the
/// reconciliation outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BillingRun {
    pub tariffs:        TariffRates,
    pub bills:          Vec<CalculatedUnitBill>,
    pub reconciliation: Option<InvoiceReconciliation>,
}

impl BillingRun {
    /// True when the tariff could not be applied and every bill is zero.
    pub fn degraded(&self) -> bool {
        !self.bills.is_empty() && self.reconciliation.is_none()
    }

    pub fn adjustment_basis(&self) -> AdjustmentBasis {
        self.reconciliation
            .map(|r| r.basis)
            .unwrap_or(AdjustmentBasis::None)
    }
}

/// Engine wired with configuration: enriches the tariff when needed and
/// applies the configured reconciliation policy.
pub struct BillingEngine {
    config: BillingConfig,
}

impl BillingEngine {
    pub fn new(config: BillingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    pub fn calculate(
        &self,
        units: &[Unit],
        expenses: &CommonExpenses,
        tariffs: &TariffRates,
    ) -> BillingRun {
        let tariffs = if tariffs.is_enriched() {
            tariffs.clone()
        } else {
            enrich_tariff_tiers_or(tariffs, &self.config.tariffs)
        };

        let (bills, reconciliation) =
            calculate_all_units_with_policy(units, expenses, &tariffs, &self.config.policy);

        log::info!(
            "engine: billed {} units, total {:.2}",
            bills.len(),
            bills.iter().map(|b| b.total_bill).sum::<f64>()
        );

        BillingRun { tariffs, bills, reconciliation }
    }
}
