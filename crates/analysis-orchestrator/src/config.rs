use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use valuation_models::{DcfParams, ScenarioRates};

/// Model assumptions for one analysis run. Rates are decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    // DCF
    pub dcf_growth_rate: f64,          // 0.10
    pub dcf_terminal_growth: f64,      // 0.03
    pub dcf_wacc: f64,                 // 0.10
    pub dcf_projection_years: u32,     // 5

    // Scenario / sensitivity
    pub scenarios: ScenarioRates,      // 0.15 / 0.10 / 0.05
    pub sensitivity_wacc_range: Vec<f64>,
    pub sensitivity_growth_range: Vec<f64>,

    // Equity models
    pub cost_of_equity: f64,           // 0.10
    pub pbv_terminal_growth: f64,      // 0.05
    pub ddm_growth_rate: f64,          // 0.05

    // Trend projection
    pub projection_metric: String,     // "Total Revenue"
    pub projection_periods: usize,     // 4

    // Anomaly detection
    pub anomaly_z_threshold: f64,      // 2.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dcf_growth_rate: 0.10,
            dcf_terminal_growth: 0.03,
            dcf_wacc: 0.10,
            dcf_projection_years: 5,
            scenarios: ScenarioRates::default(),
            sensitivity_wacc_range: vec![0.08, 0.09, 0.10, 0.11, 0.12],
            sensitivity_growth_range: vec![0.05, 0.08, 0.10, 0.12, 0.15],
            cost_of_equity: 0.10,
            pbv_terminal_growth: 0.05,
            ddm_growth_rate: 0.05,
            projection_metric: "Total Revenue".to_string(),
            projection_periods: 4,
            anomaly_z_threshold: 2.0,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key/value source; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            dcf_growth_rate: parse_rate_or(&lookup, "DCF_GROWTH_RATE", defaults.dcf_growth_rate)?,
            dcf_terminal_growth: parse_rate_or(&lookup, "DCF_TERMINAL_GROWTH", defaults.dcf_terminal_growth)?,
            dcf_wacc: parse_rate_or(&lookup, "DCF_WACC", defaults.dcf_wacc)?,
            dcf_projection_years: parse_or(&lookup, "DCF_PROJECTION_YEARS", defaults.dcf_projection_years)?,
            scenarios: ScenarioRates {
                bull: parse_rate_or(&lookup, "SCENARIO_BULL", defaults.scenarios.bull)?,
                base: parse_rate_or(&lookup, "SCENARIO_BASE", defaults.scenarios.base)?,
                bear: parse_rate_or(&lookup, "SCENARIO_BEAR", defaults.scenarios.bear)?,
            },
            sensitivity_wacc_range: parse_list_or(
                &lookup,
                "SENSITIVITY_WACC_RANGE",
                defaults.sensitivity_wacc_range,
            )?,
            sensitivity_growth_range: parse_list_or(
                &lookup,
                "SENSITIVITY_GROWTH_RANGE",
                defaults.sensitivity_growth_range,
            )?,
            cost_of_equity: parse_rate_or(&lookup, "COST_OF_EQUITY", defaults.cost_of_equity)?,
            pbv_terminal_growth: parse_rate_or(&lookup, "PBV_TERMINAL_GROWTH", defaults.pbv_terminal_growth)?,
            ddm_growth_rate: parse_rate_or(&lookup, "DDM_GROWTH_RATE", defaults.ddm_growth_rate)?,
            projection_metric: lookup("PROJECTION_METRIC").unwrap_or(defaults.projection_metric),
            projection_periods: parse_or(&lookup, "PROJECTION_PERIODS", defaults.projection_periods)?,
            anomaly_z_threshold: parse_rate_or(&lookup, "ANOMALY_Z_THRESHOLD", defaults.anomaly_z_threshold)?,
        };

        anyhow::ensure!(
            config.anomaly_z_threshold > 0.0,
            "ANOMALY_Z_THRESHOLD must be positive, got {}",
            config.anomaly_z_threshold
        );

        Ok(config)
    }

    /// DCF assumptions with the per-ticker share count and net debt filled in.
    pub fn dcf_params(&self, shares_outstanding: Option<f64>, net_debt: f64) -> DcfParams {
        DcfParams {
            growth_rate: self.dcf_growth_rate,
            terminal_growth: self.dcf_terminal_growth,
            wacc: self.dcf_wacc,
            projection_years: self.dcf_projection_years,
            shares_outstanding,
            net_debt,
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a number, got '{}'", key, raw)),
        None => Ok(default),
    }
}

/// Like [`parse_or`], but NaN and infinities are rejected.
fn parse_rate_or<F>(lookup: &F, key: &str, default: f64) -> Result<f64>
where
    F: Fn(&str) -> Option<String>,
{
    let value: f64 = parse_or(lookup, key, default)?;
    anyhow::ensure!(value.is_finite(), "{} must be a finite number, got '{}'", key, value);
    Ok(value)
}

fn parse_list_or<F>(lookup: &F, key: &str, default: Vec<f64>) -> Result<Vec<f64>>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| {
                let rate = s
                    .parse::<f64>()
                    .with_context(|| format!("{} contains an invalid rate '{}'", key, s))?;
                anyhow::ensure!(rate.is_finite(), "{} contains a non-finite rate '{}'", key, s);
                Ok(rate)
            })
            .collect(),
        None => Ok(default),
    }
}
