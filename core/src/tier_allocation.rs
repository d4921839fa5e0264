//! Tier allocation: splits the tariff's tier costs between units.
//!
//! Design:
//!   - Fixed tier cost is shared equally: total_cost / unit_count
//!   - Each unit's allowance is fixed_volume / unit_count
//!   - Excess volume per unit = max(0, consumption - allowance)
//!   - The first excess tier's whole total cost is split in proportion
//!     to each unit's excess volume (not rate x volume)
//!   - Further excess tiers are accepted in configuration but not charged

use crate::{
    bill::TierBreakdown,
    consumption::consumption,
    tariff::{TariffRates, TariffTier},
    types::round_cents,
    unit::Unit,
};

/// Tariff-derived water cost for one unit. Money fields are in cents
/// precision; `excess_volume` is kept exact.
#[derive(Debug, Clone, PartialEq)]
pub struct TierAllocation {
    pub consumption:      f64,
    pub excess_volume:    f64,
    pub fixed_share:      f64,
    pub excess_tier_cost: f64,
    pub water_cost:       f64,
    pub tier_breakdown:   TierBreakdown,
}

/// Allocate tier costs across `units`, in input order.
///
/// Returns `None` when the tariff has no usable fixed tier (missing,
/// negative volume, or not enriched). This is a configuration error: it
/// is logged here and the caller degrades to zero-valued bills.
pub fn allocate_tiers(units: &[Unit], tariffs: &TariffRates) -> Option<Vec<TierAllocation>> {
    if units.is_empty() {
        return Some(Vec::new());
    }

    let (fixed_tier, fixed_total) = match usable_fixed_tier(tariffs) {
        Some(found) => found,
        None => {
            log::error!(
                "tier allocation: fixed (minimum) tier is missing, invalid or has no total cost"
            );
            return None;
        }
    };

    let unit_count = units.len() as f64;
    let fixed_share = fixed_total / unit_count;
    let allowance_per_unit = fixed_tier.volume / unit_count;

    let consumptions: Vec<f64> = units
        .iter()
        .map(|u| consumption(u.current_reading, u.previous_reading))
        .collect();
    let excess_volumes: Vec<f64> = consumptions
        .iter()
        .map(|c| (c - allowance_per_unit).max(0.0))
        .collect();
    let total_excess_volume: f64 = excess_volumes.iter().sum();

    let excess_tier = tariffs.first_excess_tier();
    let excess_budget = excess_tier.and_then(|t| t.total_cost);

    log::debug!(
        "tier allocation: {} units, fixed share {fixed_share:.4}, allowance {allowance_per_unit:.4} m³, total excess {total_excess_volume:.4} m³",
        units.len()
    );

    let allocations = consumptions
        .iter()
        .zip(&excess_volumes)
        .map(|(&consumption, &excess_volume)| {
            let excess_cost = match excess_budget {
                Some(budget) if total_excess_volume > 0.0 => {
                    (excess_volume / total_excess_volume) * budget
                }
                _ => 0.0,
            };

            let mut tier_breakdown = TierBreakdown::new();
            tier_breakdown.insert(fixed_tier.name.clone(), round_cents(fixed_share));
            if let Some(tier) = excess_tier {
                if excess_cost > 0.0 {
                    tier_breakdown.insert(tier.name.clone(), round_cents(excess_cost));
                }
            }

            TierAllocation {
                consumption,
                excess_volume,
                fixed_share: round_cents(fixed_share),
                excess_tier_cost: round_cents(excess_cost),
                water_cost: round_cents(fixed_share + excess_cost),
                tier_breakdown,
            }
        })
        .collect();

    Some(allocations)
}

fn usable_fixed_tier(tariffs: &TariffRates) -> Option<(&TariffTier, f64)> {
    let tier = tariffs.fixed_tier()?;
    if !tier.volume.is_finite() || tier.volume < 0.0 {
        return None;
    }
    let total = tier.total_cost?;
    Some((tier, total))
}
