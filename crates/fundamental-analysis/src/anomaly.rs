//! Rule-based and statistical red-flag detection.
//!
//! Every rule is independent and yields at most one anomaly. A rule whose
//! inputs are absent is silently skipped.

use analysis_core::numeric::{finite, round_to, safe_div};
use analysis_core::{Anomaly, AnomalyKind, Direction, Outlier, RatioSet, RawFinancials, Severity};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::growth::growth;
use crate::ratios::net_margin;
use crate::trends::{FREE_CASH_FLOW, NET_INCOME, REVENUE};

pub const DEFAULT_Z_THRESHOLD: f64 = 2.0;
const MIN_Z_SAMPLES: usize = 3;

/// Inputs to the anomaly rules for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnomalySnapshot {
    /// Labelled history screened by the z-score rule.
    pub ratio_history: Vec<(String, Option<f64>)>,
    pub revenue_growth: Option<f64>,
    pub receivables_growth: Option<f64>,
    pub fcf: Option<f64>,
    pub net_income: Option<f64>,
    pub current_npm: Option<f64>,
    pub previous_npm: Option<f64>,
    pub der: Option<f64>,
}

impl AnomalySnapshot {
    /// Derive the rule inputs from raw statements and the computed ratios.
    pub fn from_financials(raw: &RawFinancials, ratios: &RatioSet) -> Self {
        let mut snapshot = Self {
            der: ratios.der,
            ..Default::default()
        };

        if let Some(income) = raw.income() {
            snapshot.revenue_growth = growth(income.value(0, REVENUE), income.value(1, REVENUE));
            snapshot.net_income = income.latest(NET_INCOME);
            snapshot.current_npm = net_margin(income.value(0, NET_INCOME), income.value(0, REVENUE));
            snapshot.previous_npm = net_margin(income.value(1, NET_INCOME), income.value(1, REVENUE));
        }

        if let Some(cash_flow) = raw.cash_flow() {
            snapshot.fcf = cash_flow.latest(FREE_CASH_FLOW);
        }

        if let Some(balance) = raw.balance() {
            snapshot.receivables_growth = growth(
                balance.value(0, "Net Receivables"),
                balance.value(1, "Net Receivables"),
            );
        }

        if let Some(quarterly) = raw.quarterly_income() {
            if let (Some(revenue), Some(net_income)) =
                (quarterly.series(REVENUE), quarterly.series(NET_INCOME))
            {
                snapshot.ratio_history = revenue
                    .iter()
                    .zip(net_income.iter())
                    .map(|((date, rev), (_, ni))| {
                        (format!("Net Margin {}", date), net_margin(*ni, *rev))
                    })
                    .collect();
            }
        }

        snapshot
    }
}

/// Flag values of a labelled series whose population z-score reaches `threshold`.
///
/// Needs at least three finite values and non-zero variance.
pub fn z_score_check(values: &[(String, Option<f64>)], threshold: f64) -> Vec<Anomaly> {
    let clean: Vec<(&str, f64)> = values
        .iter()
        .filter_map(|(label, v)| finite(*v).map(|v| (label.as_str(), v)))
        .collect();
    if clean.len() < MIN_Z_SAMPLES {
        return Vec::new();
    }

    let nums: Vec<f64> = clean.iter().map(|(_, v)| *v).collect();
    let mean = nums.iter().mean();
    let variance = nums.iter().population_variance();
    if !variance.is_finite() || variance == 0.0 {
        return Vec::new();
    }
    let std = variance.sqrt();

    clean
        .into_iter()
        .filter_map(|(label, v)| {
            let z = (v - mean) / std;
            if z.abs() < threshold {
                return None;
            }
            let direction = if z > 0.0 { Direction::High } else { Direction::Low };
            Some(Anomaly {
                outlier: Some(Outlier {
                    label: label.to_string(),
                    value: round_to(v, 2),
                    z_score: round_to(z, 2),
                    direction,
                }),
                ..Anomaly::new(
                    AnomalyKind::ZScore,
                    Severity::Info,
                    format!("{} deviates {:.2} standard deviations from its mean", label, z),
                )
            })
        })
        .collect()
}

/// Receivables outgrowing revenue by more than 15 percentage points.
pub fn check_receivables_vs_revenue(
    revenue_growth: Option<f64>,
    receivables_growth: Option<f64>,
) -> Option<Anomaly> {
    let (revenue, receivables) = (finite(revenue_growth)?, finite(receivables_growth)?);
    (receivables > revenue + 15.0).then(|| {
        Anomaly::new(
            AnomalyKind::ReceivablesGrowth,
            Severity::Warning,
            format!(
                "Receivables growth ({:.1}%) significantly exceeds revenue growth ({:.1}%)",
                receivables, revenue
            ),
        )
    })
}

/// Weak cash conversion, or cash burn masked by an accounting profit.
pub fn check_fcf_vs_net_income(fcf: Option<f64>, net_income: Option<f64>) -> Option<Anomaly> {
    let (fcf_value, ni) = (finite(fcf)?, finite(net_income)?);
    let ratio = safe_div(Some(fcf_value), Some(ni))?;

    if ratio < 0.0 && ni > 0.0 {
        return Some(Anomaly::new(
            AnomalyKind::FcfNegative,
            Severity::Critical,
            format!(
                "Free cash flow is negative ({:.0}) despite positive net income ({:.0})",
                fcf_value, ni
            ),
        ));
    }
    (ratio < 0.5).then(|| {
        Anomaly::new(
            AnomalyKind::FcfDivergence,
            Severity::Warning,
            format!(
                "Free cash flow ({:.0}) is significantly below net income ({:.0}), ratio={:.2}",
                fcf_value, ni, ratio
            ),
        )
    })
}

/// Net margin down more than 5 percentage points year over year.
pub fn check_margin_decline(current_npm: Option<f64>, previous_npm: Option<f64>) -> Option<Anomaly> {
    let (current, previous) = (finite(current_npm)?, finite(previous_npm)?);
    let decline = previous - current;
    (decline > 5.0).then(|| {
        Anomaly::new(
            AnomalyKind::MarginDecline,
            Severity::Warning,
            format!(
                "Net profit margin declined {:.1}pp (from {:.1}% to {:.1}%)",
                decline, previous, current
            ),
        )
    })
}

pub fn check_debt_ratio(der: Option<f64>) -> Option<Anomaly> {
    let der = finite(der)?;
    let severity = if der > 3.0 {
        Severity::Critical
    } else if der > 2.0 {
        Severity::Warning
    } else {
        return None;
    };
    Some(Anomaly::new(
        AnomalyKind::HighLeverage,
        severity,
        format!("High debt-to-equity ratio: {:.2}x (threshold: 2.0x)", der),
    ))
}

pub fn check_revenue_decline(revenue_growth: Option<f64>) -> Option<Anomaly> {
    let g = finite(revenue_growth)?;
    let severity = if g < -20.0 {
        Severity::Critical
    } else if g < -10.0 {
        Severity::Warning
    } else {
        return None;
    };
    Some(Anomaly::new(
        AnomalyKind::RevenueDecline,
        severity,
        format!("Revenue declined {:.1}% year-over-year", g),
    ))
}

/// Run every rule over the snapshot. Order is not significant.
pub fn detect(snapshot: &AnomalySnapshot, z_threshold: f64) -> Vec<Anomaly> {
    let mut anomalies = z_score_check(&snapshot.ratio_history, z_threshold);
    anomalies.extend(
        [
            check_receivables_vs_revenue(snapshot.revenue_growth, snapshot.receivables_growth),
            check_fcf_vs_net_income(snapshot.fcf, snapshot.net_income),
            check_margin_decline(snapshot.current_npm, snapshot.previous_npm),
            check_debt_ratio(snapshot.der),
            check_revenue_decline(snapshot.revenue_growth),
        ]
        .into_iter()
        .flatten(),
    );
    anomalies
}
