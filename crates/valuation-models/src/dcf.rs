use analysis_core::numeric::finite;
use analysis_core::ValuationError;
use serde::{Deserialize, Serialize};

/// Assumptions shared by every DCF run. Rates are decimals (0.10 = 10%).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcfParams {
    pub growth_rate: f64,
    pub terminal_growth: f64,
    pub wacc: f64,
    pub projection_years: u32,
    pub shares_outstanding: Option<f64>,
    /// Total debt minus cash, subtracted from enterprise value.
    pub net_debt: f64,
}

impl Default for DcfParams {
    fn default() -> Self {
        Self {
            growth_rate: 0.10,
            terminal_growth: 0.03,
            wacc: 0.10,
            projection_years: 5,
            shares_outstanding: None,
            net_debt: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DcfValuation {
    pub projected_fcf: Vec<f64>,
    pub pv_fcf: Vec<f64>,
    pub sum_pv_fcf: f64,
    pub terminal_value: f64,
    pub pv_terminal: f64,
    pub enterprise_value: f64,
    pub equity_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intrinsic_per_share: Option<f64>,
}

impl DcfValuation {
    /// Per-share value when shares are known, otherwise total equity value.
    pub fn headline_value(&self) -> f64 {
        self.intrinsic_per_share.unwrap_or(self.equity_value)
    }
}

/// Discounted free cash flow with a Gordon-growth terminal value.
///
/// FCF in year t is `base * (1 + g)^t`, discounted at `(1 + wacc)^t`. The
/// terminal value grows the final projected year once more at the terminal
/// rate and is discounted from year N.
pub fn dcf(fcf_base: Option<f64>, params: &DcfParams) -> Result<DcfValuation, ValuationError> {
    let fcf_base = finite(fcf_base).ok_or(ValuationError::MissingInput("free cash flow"))?;
    let DcfParams {
        growth_rate,
        terminal_growth,
        wacc,
        projection_years,
        shares_outstanding,
        net_debt,
    } = *params;

    if wacc <= terminal_growth {
        tracing::debug!("DCF rejected: wacc {} <= terminal growth {}", wacc, terminal_growth);
        return Err(ValuationError::DiscountBelowGrowth {
            discount: wacc,
            growth: terminal_growth,
        });
    }
    let horizon = i32::try_from(projection_years).map_err(|_| ValuationError::InvalidHorizon)?;
    if horizon == 0 {
        return Err(ValuationError::InvalidHorizon);
    }

    let (projected_fcf, pv_fcf): (Vec<f64>, Vec<f64>) = (1..=horizon)
        .map(|year| {
            let fcf = fcf_base * (1.0 + growth_rate).powi(year);
            (fcf, fcf / (1.0 + wacc).powi(year))
        })
        .unzip();

    let last_fcf = projected_fcf.last().copied().ok_or(ValuationError::InvalidHorizon)?;
    let terminal_value = last_fcf * (1.0 + terminal_growth) / (wacc - terminal_growth);
    let pv_terminal = terminal_value / (1.0 + wacc).powi(horizon);
    let sum_pv_fcf: f64 = pv_fcf.iter().sum();
    let enterprise_value = sum_pv_fcf + pv_terminal;
    let equity_value = enterprise_value - net_debt;

    let intrinsic_per_share = finite(shares_outstanding)
        .filter(|shares| *shares > 0.0)
        .map(|shares| equity_value / shares);

    if !equity_value.is_finite() || intrinsic_per_share.is_some_and(|v| !v.is_finite()) {
        return Err(ValuationError::NonFinite);
    }

    Ok(DcfValuation {
        projected_fcf,
        pv_fcf,
        sum_pv_fcf,
        terminal_value,
        pv_terminal,
        enterprise_value,
        equity_value,
        intrinsic_per_share,
    })
}

/// Growth assumptions for the three scenarios.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioRates {
    pub bull: f64,
    pub base: f64,
    pub bear: f64,
}

impl Default for ScenarioRates {
    fn default() -> Self {
        Self {
            bull: 0.15,
            base: 0.10,
            bear: 0.05,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioValuation {
    pub bull: Result<DcfValuation, ValuationError>,
    pub base: Result<DcfValuation, ValuationError>,
    pub bear: Result<DcfValuation, ValuationError>,
}

/// Three DCF runs that differ only in their growth rate.
pub fn scenario(fcf_base: Option<f64>, rates: &ScenarioRates, params: &DcfParams) -> ScenarioValuation {
    let run = |growth_rate| {
        dcf(
            fcf_base,
            &DcfParams {
                growth_rate,
                ..*params
            },
        )
    };
    ScenarioValuation {
        bull: run(rates.bull),
        base: run(rates.base),
        bear: run(rates.bear),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityGrid {
    pub wacc_labels: Vec<String>,
    pub growth_labels: Vec<String>,
    /// Rows follow `wacc_labels`, columns follow `growth_labels`.
    pub matrix: Vec<Vec<Option<f64>>>,
}

fn percent_label(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// WACC x growth grid of independent DCF runs.
///
/// Each cell holds the per-share value (or equity value when shares are
/// unknown). Cells whose run fails are absent.
pub fn sensitivity(
    fcf_base: Option<f64>,
    wacc_range: &[f64],
    growth_range: &[f64],
    params: &DcfParams,
) -> SensitivityGrid {
    let matrix = wacc_range
        .iter()
        .map(|&wacc| {
            growth_range
                .iter()
                .map(|&growth_rate| {
                    dcf(
                        fcf_base,
                        &DcfParams {
                            wacc,
                            growth_rate,
                            ..*params
                        },
                    )
                    .ok()
                    .map(|v| v.headline_value())
                })
                .collect()
        })
        .collect();

    SensitivityGrid {
        wacc_labels: wacc_range.iter().copied().map(percent_label).collect(),
        growth_labels: growth_range.iter().copied().map(percent_label).collect(),
        matrix,
    }
}
