//! Input validation run before a calculation.
//!
//! The engine tolerates bad readings by clamping; this is where they are
//! rejected so a calculation with them never runs.

use crate::{
    error::{BillingError, BillingResult},
    unit::Unit,
};

/// Reject an empty roster, non-finite or negative figures, and any unit
/// whose current reading is below its previous one. Reports the first
/// offending unit.
pub fn validate_units(units: &[Unit]) -> BillingResult<()> {
    if units.is_empty() {
        return Err(BillingError::NoUnits);
    }

    for unit in units {
        if !unit.area.is_finite() || unit.area < 0.0 {
            return Err(BillingError::InvalidArea {
                unit_label: unit.unit_label.clone(),
                area:       unit.area,
            });
        }

        let readings_ok = unit.previous_reading.is_finite()
            && unit.current_reading.is_finite()
            && unit.previous_reading >= 0.0
            && unit.current_reading >= unit.previous_reading;
        if !readings_ok {
            return Err(BillingError::InvalidReading {
                unit_label: unit.unit_label.clone(),
                previous:   unit.previous_reading,
                current:    unit.current_reading,
            });
        }
    }

    Ok(())
}
