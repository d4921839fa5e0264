//! The unit roster: residential units and their meter readings.
//!
//! The set of labels is fixed by configuration. Units are never created
//! or removed by the billing pipeline, only their readings change from
//! one period to the next.

use crate::{
    error::{BillingError, BillingResult},
    types::{UnitId, UnitLabel},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id:               UnitId,
    pub unit_label:       UnitLabel,
    pub area:             f64,
    pub previous_reading: f64,
    pub current_reading:  f64,
}

impl Unit {
    pub fn new(unit_label: impl Into<UnitLabel>, area: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            unit_label: unit_label.into(),
            area,
            previous_reading: 0.0,
            current_reading: 0.0,
        }
    }

    pub fn with_readings(mut self, previous: f64, current: f64) -> Self {
        self.previous_reading = previous;
        self.current_reading = current;
        self
    }
}

/// One line of a readings file. `previous_reading` may be omitted when it
/// was already carried over from the prior period.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadingEntry {
    pub unit_label:       UnitLabel,
    #[serde(default)]
    pub previous_reading: Option<f64>,
    pub current_reading:  f64,
}

/// A fresh roster: one unit per label, zero readings.
pub fn create_initial_units(labels: &[UnitLabel], area: f64) -> Vec<Unit> {
    labels.iter().map(|label| Unit::new(label.clone(), area)).collect()
}

/// Restore readings for the fixed roster from a previously stored list.
///
/// Falls back to a fresh roster when the stored list does not cover the
/// roster exactly. Ids and areas always come from the stored list when it
/// is accepted.
pub fn align_units(labels: &[UnitLabel], area: f64, stored: &[Unit]) -> Vec<Unit> {
    let fresh = create_initial_units(labels, area);

    let matches_roster = stored.len() == labels.len()
        && stored.iter().all(|u| labels.contains(&u.unit_label))
        && labels.iter().all(|l| stored.iter().any(|u| &u.unit_label == l));
    if !matches_roster {
        log::warn!(
            "roster: stored unit list ({} units) does not match the configured roster ({} units), using a fresh roster",
            stored.len(),
            labels.len()
        );
        return fresh;
    }

    fresh
        .into_iter()
        .map(|unit| {
            match stored.iter().find(|s| s.unit_label == unit.unit_label) {
                Some(s) => s.clone(),
                None => unit,
            }
        })
        .collect()
}

/// Overlay a set of readings onto the roster.
/// A label that is not on the roster is rejected.
pub fn apply_readings(units: &[Unit], entries: &[ReadingEntry]) -> BillingResult<Vec<Unit>> {
    let mut updated = units.to_vec();

    for entry in entries {
        let unit = updated
            .iter_mut()
            .find(|u| u.unit_label == entry.unit_label)
            .ok_or_else(|| BillingError::UnknownUnit {
                unit_label: entry.unit_label.clone(),
            })?;

        if let Some(previous) = entry.previous_reading {
            unit.previous_reading = previous;
        }
        unit.current_reading = entry.current_reading;
    }

    Ok(updated)
}
