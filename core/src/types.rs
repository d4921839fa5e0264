//! Shared primitive types used across the billing core.

/// A stable, unique identifier for a unit record.
pub type UnitId = String;

/// The label a resident knows their unit by ("11", "42").
/// Unique within the condominium and stable across periods.
pub type UnitLabel = String;

/// Round a monetary amount (or a volume shown next to one) to cents.
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
