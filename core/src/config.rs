//! Tunable coefficients for the monthly step, market, finance and hazards.
//!
//! Loaded from `<data_dir>/pharaoh.json`. Every section and field has a
//! default, so a partial file only overrides what it names.

use crate::types::Tick;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const CONFIG_FILE: &str = "pharaoh.json";

/// Work, crop and herd coefficients. Work figures are man-hours per day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EconomyConfig {
    pub wk_sew_per_acre:     f64,
    pub wk_tend_per_acre:    f64,
    pub wk_harvest_per_acre: f64,
    pub wk_spread_per_ton:   f64,
    pub wk_ox_tend:          f64,
    pub wk_hs_tend:          f64,
    pub wk_per_stone:        f64,
    /// Motivation a slave brings with no supervision at all.
    pub base_motive:         f64,
    /// Bushels of seed per acre sown.
    pub wt_sewn_per_acre:    f64,
    /// Fraction of stored wheat that spoils each month.
    pub wt_rot_rt:           f64,
    /// Fraction of sewn acres that move on to growing each month.
    pub grow_fraction:       f64,
    /// Fraction of growing acres that ripen each month.
    pub ripen_fraction:      f64,
    /// Fraction of unharvested ripe acres lost each month.
    pub ripe_spoil_rt:       f64,
    pub mn_per_slave:        f64,
    pub mn_per_ox:           f64,
    pub mn_per_horse:        f64,
    /// Fraction of the manure heap lost each month.
    pub mn_rot_rt:           f64,
    pub ox_age:              f64,
    pub hs_age:              f64,
    /// Overseer pressure added per unit of unfinished work.
    pub ov_stress_gain:      f64,
    /// Fraction of overseer pressure shed each month.
    pub ov_relax:            f64,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            wk_sew_per_acre:     2.0,
            wk_tend_per_acre:    0.5,
            wk_harvest_per_acre: 3.0,
            wk_spread_per_ton:   1.0,
            wk_ox_tend:          0.2,
            wk_hs_tend:          0.3,
            wk_per_stone:        1.0,
            base_motive:         0.3,
            wt_sewn_per_acre:    20.0,
            wt_rot_rt:           0.05,
            grow_fraction:       1.0,
            ripen_fraction:      1.0,
            ripe_spoil_rt:       0.5,
            mn_per_slave:        0.02,
            mn_per_ox:           0.5,
            mn_per_horse:        0.4,
            mn_rot_rt:           0.02,
            ox_age:              0.01,
            hs_age:              0.01,
            ov_stress_gain:      5.0,
            ov_relax:            0.3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MarketConfig {
    /// Gain of the price response to the supply/demand gap.
    pub price_gain:  f64,
    pub price_floor: f64,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self { price_gain: 0.02, price_floor: 0.01 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FinanceConfig {
    /// Extra monthly interest (percent) charged at a credit rating of 0.
    pub credit_penalty_pct:  f64,
    /// Rating lost in a month the debt/asset ratio is unsupported.
    pub rating_drop:         f64,
    /// Rating regained in a month the debt is supported.
    pub rating_recovery:     f64,
    /// Warn once debt/asset passes this fraction of the supported ratio.
    pub debt_warning_fraction: f64,
}

impl Default for FinanceConfig {
    fn default() -> Self {
        Self {
            credit_penalty_pct:    1.0,
            rating_drop:           0.1,
            rating_recovery:       0.02,
            debt_warning_fraction: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct HazardConfig {
    pub enabled:              bool,
    pub plague_chance:        f64,
    pub plague_mortality_min: f64,
    pub plague_mortality_max: f64,
    pub locust_chance:        f64,
    pub locust_loss_min:      f64,
    pub locust_loss_max:      f64,
}

impl Default for HazardConfig {
    fn default() -> Self {
        Self {
            enabled:              true,
            plague_chance:        0.01,
            plague_mortality_min: 0.05,
            plague_mortality_max: 0.30,
            locust_chance:        0.02,
            locust_loss_min:      0.20,
            locust_loss_max:      0.80,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    pub economy: EconomyConfig,
    pub market:  MarketConfig,
    pub finance: FinanceConfig,
    pub hazards: HazardConfig,
    /// Months between persisted snapshots.
    pub snapshot_interval: Tick,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            economy: EconomyConfig::default(),
            market:  MarketConfig::default(),
            finance: FinanceConfig::default(),
            hazards: HazardConfig::default(),
            snapshot_interval: 12,
        }
    }
}

impl SimConfig {
    /// Load `pharaoh.json` from `data_dir`. A missing file means defaults;
    /// a present but unreadable or malformed file is an error.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = Path::new(data_dir).join(CONFIG_FILE);
        if !path.exists() {
            log::info!("no {} in {data_dir}, using defaults", CONFIG_FILE);
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: SimConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", path.display()))?;
        log::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Deterministic configuration for tests: no random hazards.
    pub fn default_test() -> Self {
        Self {
            hazards: HazardConfig { enabled: false, ..HazardConfig::default() },
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_other_defaults() {
        let cfg: SimConfig =
            serde_json::from_str(r#"{ "market": { "price_gain": 0.1 }, "snapshot_interval": 6 }"#)
                .unwrap();
        assert_eq!(cfg.market.price_gain, 0.1);
        assert_eq!(cfg.market.price_floor, MarketConfig::default().price_floor);
        assert_eq!(cfg.snapshot_interval, 6);
        assert_eq!(cfg.economy, EconomyConfig::default());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let cfg = SimConfig::load("/nonexistent/pharaoh-data").unwrap();
        assert_eq!(cfg, SimConfig::default());
    }

    #[test]
    fn test_config_disables_hazards() {
        assert!(!SimConfig::default_test().hazards.enabled);
    }
}
