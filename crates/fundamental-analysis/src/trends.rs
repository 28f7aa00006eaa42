//! Per-metric YoY/QoQ trend extraction from raw statements.

use std::collections::BTreeMap;

use analysis_core::{FinancialStatement, RawFinancials};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::growth::{growth_series, trend_cagr, GrowthPoint};

pub const REVENUE: &str = "Total Revenue";
pub const NET_INCOME: &str = "Net Income";
pub const FREE_CASH_FLOW: &str = "Free Cash Flow";

const INCOME_METRICS: &[&str] = &[
    REVENUE,
    "Gross Profit",
    "Operating Income",
    NET_INCOME,
    "EBITDA",
    "Basic EPS",
];

const BALANCE_METRICS: &[&str] = &[
    "Total Assets",
    "Total Debt",
    "Stockholders Equity",
    "Cash And Cash Equivalents",
    "Net Receivables",
];

const CASHFLOW_METRICS: &[&str] = &["Operating Cash Flow", FREE_CASH_FLOW, "Capital Expenditure"];

/// Alternative labels some filers (IFRS direct method) use for a canonical metric.
fn aliases(metric: &str) -> &'static [&'static str] {
    match metric {
        "Operating Cash Flow" => &[
            "Cash Flowsfromusedin Operating Activities Direct",
            "Operating Activities",
        ],
        _ => &[],
    }
}

/// Oldest-first series for `metric`, trying the canonical label then its aliases.
pub fn extract_series(
    statement: &FinancialStatement,
    metric: &str,
) -> Option<Vec<(NaiveDate, Option<f64>)>> {
    std::iter::once(metric)
        .chain(aliases(metric).iter().copied())
        .find_map(|label| statement.series(label))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementCategory {
    Income,
    Balance,
    Cashflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricTrend {
    pub category: StatementCategory,
    pub data: Vec<GrowthPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cagr: Option<f64>,
}

/// Growth CAGRs feeding the Quality pillar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendCagrs {
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub free_cash_flow: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub annual: BTreeMap<String, MetricTrend>,
    pub quarterly: BTreeMap<String, MetricTrend>,
}

impl TrendAnalysis {
    pub fn from_financials(raw: &RawFinancials) -> Self {
        let mut trends = Self::default();

        let sources = [
            (StatementCategory::Income, raw.income(), INCOME_METRICS),
            (StatementCategory::Balance, raw.balance(), BALANCE_METRICS),
            (StatementCategory::Cashflow, raw.cash_flow(), CASHFLOW_METRICS),
        ];

        for (category, statement, metrics) in sources {
            let Some(statement) = statement else { continue };
            for metric in metrics {
                if let Some(trend) = metric_trend(statement, metric, category, true) {
                    trends.annual.insert(metric.to_string(), trend);
                }
            }
        }

        if let Some(quarterly) = raw.quarterly_income() {
            for metric in INCOME_METRICS {
                if let Some(trend) = metric_trend(quarterly, metric, StatementCategory::Income, false) {
                    trends.quarterly.insert(metric.to_string(), trend);
                }
            }
        }

        trends
    }

    pub fn annual_cagr(&self, metric: &str) -> Option<f64> {
        self.annual.get(metric).and_then(|t| t.cagr)
    }

    pub fn cagrs(&self) -> TrendCagrs {
        TrendCagrs {
            revenue: self.annual_cagr(REVENUE),
            net_income: self.annual_cagr(NET_INCOME),
            free_cash_flow: self.annual_cagr(FREE_CASH_FLOW),
        }
    }
}

fn metric_trend(
    statement: &FinancialStatement,
    metric: &str,
    category: StatementCategory,
    with_cagr: bool,
) -> Option<MetricTrend> {
    let series = extract_series(statement, metric)?;
    if series.len() < 2 {
        return None;
    }
    let data = growth_series(&series);
    let cagr = if with_cagr {
        let values: Vec<Option<f64>> = data.iter().map(|p| p.value).collect();
        trend_cagr(&values).map(|c| analysis_core::numeric::round_to(c, 2))
    } else {
        None
    };
    Some(MetricTrend { category, data, cagr })
}
