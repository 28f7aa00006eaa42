//! Feeds statement-derived inputs into the valuation model family and
//! collects every outcome, success or precondition failure, into one report.

use analysis_core::numeric::{finite, safe_div};
use analysis_core::{RatioSet, RawFinancials, ValuationError};
use fundamental_analysis::trends::{extract_series, FREE_CASH_FLOW};
use serde::Serialize;
use valuation_models::{
    ddm, dcf, implied_peg, justified_pbv, linear_projection, scenario, sensitivity,
    sustainable_growth, DcfValuation, DividendDiscount, JustifiedPbv, LinearProjection,
    SensitivityGrid, SustainableGrowth,
};

use crate::config::EngineConfig;

/// A model result as it crosses the JSON boundary: the estimate itself, or
/// `{"error": "<reason>"}` when a precondition failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ModelOutcome<T> {
    Estimate(T),
    Failed { error: String },
}

impl<T> ModelOutcome<T> {
    pub fn estimate(&self) -> Option<&T> {
        match self {
            ModelOutcome::Estimate(value) => Some(value),
            ModelOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ModelOutcome::Failed { .. })
    }
}

impl<T> From<Result<T, ValuationError>> for ModelOutcome<T> {
    fn from(result: Result<T, ValuationError>) -> Self {
        match result {
            Ok(value) => ModelOutcome::Estimate(value),
            Err(e) => ModelOutcome::Failed { error: e.to_string() },
        }
    }
}

/// Per-ticker inputs of the valuation models, read from statements with
/// quote-level fallbacks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValuationInputs {
    pub fcf_base: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub net_debt: f64,
    pub current_price: Option<f64>,
    /// Decimal (0.18 = 18%).
    pub roe: Option<f64>,
    pub book_value_per_share: Option<f64>,
    pub last_dividend: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub eps: Option<f64>,
    pub pe: Option<f64>,
}

impl ValuationInputs {
    pub fn from_financials(raw: &RawFinancials, ratios: &RatioSet) -> Self {
        let quote = &raw.quote;
        let balance = raw.balance();
        let shares = finite(quote.shares_outstanding);

        // A zero from the balance sheet is treated as missing, then the quote fills in.
        let balance_value = |label: &str| balance.and_then(|s| s.latest(label)).unwrap_or(0.0);
        let mut total_debt = balance_value("Total Debt");
        if total_debt == 0.0 {
            total_debt = finite(quote.total_debt).unwrap_or(0.0);
        }
        let mut cash = balance_value("Cash And Cash Equivalents");
        if cash == 0.0 {
            cash = finite(quote.total_cash).unwrap_or(0.0);
        }

        let equity = balance.and_then(|s| {
            s.first_value(0, &["Stockholders Equity", "Total Stockholders Equity"])
        });
        let eps = finite(quote.trailing_eps).filter(|v| *v != 0.0).or_else(|| {
            raw.income()
                .and_then(|s| s.first_nonzero(0, &["Basic EPS", "Diluted EPS"]))
        });

        Self {
            fcf_base: raw.cash_flow().and_then(|s| s.latest(FREE_CASH_FLOW)),
            shares_outstanding: shares,
            net_debt: total_debt - cash,
            current_price: quote.price(),
            roe: ratios.roe.map(|r| r / 100.0),
            book_value_per_share: finite(quote.book_value).or_else(|| safe_div(equity, shares)),
            last_dividend: finite(quote.dividend_rate),
            payout_ratio: finite(quote.payout_ratio),
            eps,
            pe: ratios.per,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DcfReport {
    #[serde(flatten)]
    pub valuation: DcfValuation,
    pub fcf_base: f64,
    pub current_price: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub net_debt: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upside_pct: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub fcf_base: f64,
    pub current_price: Option<f64>,
    pub bull: ModelOutcome<DcfValuation>,
    pub base: ModelOutcome<DcfValuation>,
    pub bear: ModelOutcome<DcfValuation>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectionReport {
    pub metric: String,
    pub historical_labels: Vec<String>,
    pub historical_values: Vec<Option<f64>>,
    #[serde(flatten)]
    pub fit: LinearProjection,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationReport {
    pub dcf: ModelOutcome<DcfReport>,
    pub scenario: ModelOutcome<ScenarioReport>,
    pub sensitivity: ModelOutcome<SensitivityGrid>,
    pub justified_pbv: ModelOutcome<JustifiedPbv>,
    pub ddm: ModelOutcome<DividendDiscount>,
    pub sustainable_growth: ModelOutcome<SustainableGrowth>,
    pub projection: ModelOutcome<ProjectionReport>,
    /// P/E over the base DCF growth assumption, on the ratio calculator's PEG scale.
    pub implied_peg: Option<f64>,
}

/// Upside of intrinsic value over price, in percent.
pub fn upside_pct(intrinsic: Option<f64>, price: Option<f64>) -> Option<f64> {
    let price = finite(price).filter(|p| *p != 0.0)?;
    finite(Some((finite(intrinsic)? - price) / price * 100.0))
}

pub fn run_models(raw: &RawFinancials, inputs: &ValuationInputs, config: &EngineConfig) -> ValuationReport {
    let params = config.dcf_params(inputs.shares_outstanding, inputs.net_debt);

    let dcf_outcome = dcf(inputs.fcf_base, &params).and_then(|valuation| {
        let fcf_base = inputs.fcf_base.ok_or(ValuationError::MissingInput("free cash flow"))?;
        Ok(DcfReport {
            upside_pct: upside_pct(valuation.intrinsic_per_share, inputs.current_price),
            valuation,
            fcf_base,
            current_price: inputs.current_price,
            shares_outstanding: inputs.shares_outstanding,
            net_debt: inputs.net_debt,
        })
    });

    let scenario_outcome = inputs
        .fcf_base
        .ok_or(ValuationError::MissingInput("free cash flow"))
        .map(|fcf_base| {
            let runs = scenario(Some(fcf_base), &config.scenarios, &params);
            ScenarioReport {
                fcf_base,
                current_price: inputs.current_price,
                bull: runs.bull.into(),
                base: runs.base.into(),
                bear: runs.bear.into(),
            }
        });

    let sensitivity_outcome = inputs
        .fcf_base
        .ok_or(ValuationError::MissingInput("free cash flow"))
        .map(|fcf_base| {
            sensitivity(
                Some(fcf_base),
                &config.sensitivity_wacc_range,
                &config.sensitivity_growth_range,
                &params,
            )
        });

    ValuationReport {
        dcf: dcf_outcome.into(),
        scenario: scenario_outcome.into(),
        sensitivity: sensitivity_outcome.into(),
        justified_pbv: justified_pbv(
            inputs.roe,
            inputs.book_value_per_share,
            config.cost_of_equity,
            config.pbv_terminal_growth,
        )
        .into(),
        ddm: ddm(inputs.last_dividend, config.ddm_growth_rate, config.cost_of_equity).into(),
        sustainable_growth: sustainable_growth(
            inputs.roe,
            inputs.payout_ratio,
            inputs.eps,
            config.cost_of_equity,
        )
        .into(),
        projection: project_metric(raw, &config.projection_metric, config.projection_periods).into(),
        implied_peg: implied_peg(inputs.pe, Some(config.dcf_growth_rate)),
    }
}

/// Linear projection of `metric`, looked up in the income statement, then
/// the cash-flow statement, then the balance sheet.
pub fn project_metric(
    raw: &RawFinancials,
    metric: &str,
    periods_ahead: usize,
) -> Result<ProjectionReport, ValuationError> {
    let series = [raw.income(), raw.cash_flow(), raw.balance()]
        .into_iter()
        .flatten()
        .find_map(|statement| extract_series(statement, metric))
        .ok_or(ValuationError::MissingInput("projection metric"))?;

    let historical_values: Vec<Option<f64>> = series.iter().map(|(_, v)| *v).collect();
    let fit = linear_projection(&historical_values, periods_ahead)?;

    Ok(ProjectionReport {
        metric: metric.to_string(),
        historical_labels: series.iter().map(|(date, _)| date.to_string()).collect(),
        historical_values,
        fit,
    })
}
