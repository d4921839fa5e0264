//! Tariff tiers and tariff enrichment.
//!
//! A tariff is one fixed (minimum) tier plus any number of excess tiers.
//! Enrichment derives the sewer, total and per-m³ figures each tier needs
//! before the allocation engine can use it.

use crate::types::round_cents;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffTier {
    pub id:           String,
    pub name:         String,
    /// Fixed tier: the whole condominium's minimum allowance.
    /// Excess tier: the bracket volume the tier's cost is budgeted for.
    pub volume:       f64,
    pub water_cost:   f64,
    #[serde(default)]
    pub rate_per_m3:  Option<f64>,
    pub is_fixed:     bool,

    // Derived by enrichment.
    #[serde(default)]
    pub sewer_cost:       Option<f64>,
    #[serde(default)]
    pub total_cost:       Option<f64>,
    #[serde(default)]
    pub unit_excess_rate: Option<f64>,
}

impl TariffTier {
    pub fn fixed(id: &str, name: &str, volume: f64, water_cost: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            volume,
            water_cost,
            rate_per_m3: None,
            is_fixed: true,
            sewer_cost: None,
            total_cost: None,
            unit_excess_rate: None,
        }
    }

    pub fn excess(id: &str, name: &str, volume: f64, rate_per_m3: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            volume,
            water_cost: round_cents(volume * rate_per_m3),
            rate_per_m3: Some(rate_per_m3),
            is_fixed: false,
            sewer_cost: None,
            total_cost: None,
            unit_excess_rate: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TariffRates {
    #[serde(default)]
    pub tiers: Vec<TariffTier>,
    /// Sewer charge as a percentage (0-100) of the water cost.
    pub sewer_rate_percentage: f64,
}

impl TariffRates {
    /// The utility's standard structure: a 40 m³ minimum and one excess bracket.
    pub fn standard() -> Self {
        Self {
            tiers: vec![
                TariffTier::fixed("fixed_tier", "Minimum (0-40m³)", 40.0, 403.36),
                TariffTier::excess("excess_tier_1", "Excess tier 1 (above 40m³)", 10.0, 1.56),
            ],
            sewer_rate_percentage: 80.0,
        }
    }

    pub fn fixed_tier(&self) -> Option<&TariffTier> {
        self.tiers.iter().find(|t| t.is_fixed)
    }

    /// The first configured excess tier. It is the only excess tier the
    /// allocation engine charges.
    pub fn first_excess_tier(&self) -> Option<&TariffTier> {
        self.tiers.iter().find(|t| !t.is_fixed)
    }

    /// True once every tier carries its derived total.
    pub fn is_enriched(&self) -> bool {
        !self.tiers.is_empty() && self.tiers.iter().all(|t| t.total_cost.is_some())
    }
}

impl Default for TariffRates {
    fn default() -> Self {
        Self::standard()
    }
}

/// Enrich every tier, falling back to the standard tariff when the
/// configuration has no tiers at all.
pub fn enrich_tariff_tiers(rates: &TariffRates) -> TariffRates {
    enrich_tariff_tiers_or(rates, &TariffRates::standard())
}

/// Enrich every tier, falling back to `fallback` when `rates` has no tiers.
///
/// Enrichment is idempotent: every derived figure is computed from
/// cent-rounded inputs, so enriching an enriched tariff is a no-op.
pub fn enrich_tariff_tiers_or(rates: &TariffRates, fallback: &TariffRates) -> TariffRates {
    let source = if rates.tiers.is_empty() {
        log::error!("tariff: configuration has no tiers, using the default tariff structure");
        fallback
    } else {
        rates
    };

    if !(0.0..=100.0).contains(&source.sewer_rate_percentage) {
        log::warn!(
            "tariff: sewer rate {:.2}% is outside 0-100%",
            source.sewer_rate_percentage
        );
    }

    TariffRates {
        tiers: source
            .tiers
            .iter()
            .map(|tier| enrich_tier(tier, source.sewer_rate_percentage))
            .collect(),
        sewer_rate_percentage: source.sewer_rate_percentage,
    }
}

fn enrich_tier(tier: &TariffTier, sewer_rate_percentage: f64) -> TariffTier {
    let mut water_cost = tier.water_cost;
    if !tier.is_fixed && tier.volume >= 0.0 {
        if let Some(rate) = tier.rate_per_m3 {
            water_cost = tier.volume * rate;
        }
    }

    let water_cost = round_cents(water_cost);
    let sewer_cost = round_cents(water_cost * (sewer_rate_percentage / 100.0));
    let total_cost = round_cents(water_cost + sewer_cost);
    let unit_excess_rate = if !tier.is_fixed && tier.volume > 0.0 {
        round_cents(total_cost / tier.volume)
    } else {
        0.0
    };

    TariffTier {
        water_cost,
        sewer_cost: Some(sewer_cost),
        total_cost: Some(total_cost),
        unit_excess_rate: Some(unit_excess_rate),
        ..tier.clone()
    }
}

/// Parse a stored tariff configuration.
///
/// Anything missing, unparseable or without tiers is replaced by
/// `fallback`. The result is always enriched.
pub fn parse_tariff_rates(stored: Option<&str>, fallback: &TariffRates) -> TariffRates {
    let parsed = match stored {
        None => None,
        Some(json) => match serde_json::from_str::<TariffRates>(json) {
            Ok(rates) if !rates.tiers.is_empty() => Some(rates),
            Ok(_) => {
                log::warn!("tariff: stored configuration has no tiers, resetting to default");
                None
            }
            Err(e) => {
                log::warn!("tariff: stored configuration is invalid ({e}), resetting to default");
                None
            }
        },
    };

    enrich_tariff_tiers_or(parsed.as_ref().unwrap_or(fallback), fallback)
}
