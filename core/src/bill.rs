//! The itemized bill produced for each unit.

use crate::unit::Unit;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Cost contributions by tier name, plus the invoice adjustment line when
/// reconciliation moved this unit's total.
pub type TierBreakdown = BTreeMap<String, f64>;

/// A unit with its computed charges. Built fresh by every calculation.
///
/// `water_cost` and `excess_tier_cost` are the tariff-derived figures and
/// are never touched by invoice reconciliation; only `total_bill` and the
/// breakdown reflect the adjustment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedUnitBill {
    #[serde(flatten)]
    pub unit: Unit,

    pub consumption:      f64,
    /// Fixed share plus excess share, before reconciliation.
    pub water_cost:       f64,
    pub fixed_share:      f64,
    pub excess_tier_cost: f64,
    pub equal_share:      f64,
    pub proportional_fee: f64,
    pub total_bill:       f64,
    pub tier_breakdown:   TierBreakdown,
}

impl CalculatedUnitBill {
    /// A bill with every charge at zero, used when the tariff cannot be applied.
    pub fn zeroed(unit: &Unit, consumption: f64) -> Self {
        Self {
            unit: unit.clone(),
            consumption,
            water_cost: 0.0,
            fixed_share: 0.0,
            excess_tier_cost: 0.0,
            equal_share: 0.0,
            proportional_fee: 0.0,
            total_bill: 0.0,
            tier_breakdown: TierBreakdown::new(),
        }
    }

    pub fn unit_label(&self) -> &str {
        &self.unit.unit_label
    }
}
