//! Common expense allocation: equal shares and the area-proportional fee.

use crate::{expenses::CommonExpenses, unit::Unit};

/// One unit's share of the period's non-water charges, unrounded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommonShare {
    pub equal_share:      f64,
    pub proportional_fee: f64,
}

/// Split the common expenses across `units`, in input order.
///
/// Garbage fee, garbage penalty, late-payment adjustment and water
/// penalty are divided evenly. The other-services fee follows floor area;
/// units without a positive area, or a roster with no area at all, pay
/// none of it.
pub fn allocate_common_expenses(units: &[Unit], expenses: &CommonExpenses) -> Vec<CommonShare> {
    if units.is_empty() {
        return Vec::new();
    }

    let equal_share = expenses.equal_share_total() / units.len() as f64;
    let total_area: f64 = units.iter().map(|u| u.area).sum();

    units
        .iter()
        .map(|unit| {
            let proportional_fee = if total_area > 0.0 && unit.area > 0.0 {
                (unit.area / total_area) * expenses.other_services_fee
            } else {
                0.0
            };
            CommonShare { equal_share, proportional_fee }
        })
        .collect()
}
