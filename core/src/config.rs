use crate::{
    expenses::CommonExpenses,
    reconciliation::ReconciliationPolicy,
    tariff::TariffRates,
    types::UnitLabel,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::Path;

/// The condominium's roster: which units exist and their default area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    pub unit_labels:  Vec<UnitLabel>,
    #[serde(default = "default_area")]
    pub default_area: f64,
}

fn default_area() -> f64 {
    100.0
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            unit_labels: ["11", "12", "21", "22", "31", "32", "41", "42"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_area: default_area(),
        }
    }
}

/// Everything the billing core needs injected at startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillingConfig {
    pub roster:   RosterConfig,
    pub tariffs:  TariffRates,
    pub expenses: CommonExpenses,
    pub policy:   ReconciliationPolicy,
}

impl BillingConfig {
    /// Load from the data/ directory.
    /// Each file is optional; a missing file keeps the built-in default,
    /// a malformed one is an error.
    /// In tests, use BillingConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let defaults = Self::default_test();
        let dir = Path::new(data_dir);

        let roster = read_optional(&dir.join("units.json"))?.unwrap_or(defaults.roster);
        let tariffs = read_optional(&dir.join("tariffs.json"))?.unwrap_or(defaults.tariffs);
        let expenses = read_optional(&dir.join("expenses.json"))?.unwrap_or(defaults.expenses);
        let policy = read_optional(&dir.join("policy.json"))?.unwrap_or(defaults.policy);

        let config = Self { roster, tariffs, expenses, policy };
        config.check()?;
        Ok(config)
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            roster:   RosterConfig::default(),
            tariffs:  TariffRates::standard(),
            expenses: CommonExpenses::standard(),
            policy:   ReconciliationPolicy::default(),
        }
    }

    fn check(&self) -> anyhow::Result<()> {
        if self.roster.unit_labels.is_empty() {
            anyhow::bail!("units.json: unit_labels must not be empty");
        }
        let mut labels = self.roster.unit_labels.clone();
        labels.sort();
        labels.dedup();
        if labels.len() != self.roster.unit_labels.len() {
            anyhow::bail!("units.json: unit labels must be unique");
        }
        if self.tariffs.tiers.iter().filter(|t| t.is_fixed).count() != 1 {
            log::warn!("tariffs.json: expected exactly one fixed tier");
        }
        if self.policy.difference_tolerance < 0.0 || self.policy.breakdown_min_share < 0.0 {
            anyhow::bail!("policy.json: tolerances must not be negative");
        }
        Ok(())
    }
}

fn read_optional<T: DeserializeOwned>(path: &Path) -> anyhow::Result<Option<T>> {
    if !path.exists() {
        log::info!("config: {} not found, using built-in default", path.display());
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
    let value = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Cannot parse {}: {e}", path.display()))?;
    Ok(Some(value))
}
