use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::numeric::finite;

/// Line items of one statement period, keyed by the provider's label.
pub type LineItems = BTreeMap<String, Option<f64>>;

/// A tabular financial statement: line items per fiscal period.
///
/// Periods are keyed by their end date, so iteration order is chronological
/// (oldest first) regardless of how the provider ordered its columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FinancialStatement {
    periods: BTreeMap<NaiveDate, LineItems>,
}

impl FinancialStatement {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder used by fixtures and loaders: add one period of line items.
    pub fn with_period<'a>(
        mut self,
        period_end: NaiveDate,
        items: impl IntoIterator<Item = (&'a str, f64)>,
    ) -> Self {
        let entry = self.periods.entry(period_end).or_default();
        for (label, value) in items {
            entry.insert(label.to_string(), Some(value));
        }
        self
    }

    pub fn insert(&mut self, period_end: NaiveDate, label: impl Into<String>, value: Option<f64>) {
        self.periods
            .entry(period_end)
            .or_default()
            .insert(label.into(), value);
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn period_count(&self) -> usize {
        self.periods.len()
    }

    /// The `n`-th most recent period (0 = latest).
    pub fn recent(&self, n: usize) -> Option<(&NaiveDate, &LineItems)> {
        self.periods.iter().rev().nth(n)
    }

    /// Finite value of `label` in the `n`-th most recent period.
    pub fn value(&self, n: usize, label: &str) -> Option<f64> {
        let (_, items) = self.recent(n)?;
        finite(items.get(label).copied().flatten())
    }

    /// First finite value among label aliases in the `n`-th most recent period.
    pub fn first_value(&self, n: usize, labels: &[&str]) -> Option<f64> {
        labels.iter().find_map(|label| self.value(n, label))
    }

    /// Like [`first_value`](Self::first_value), but a zero falls through to the next alias.
    pub fn first_nonzero(&self, n: usize, labels: &[&str]) -> Option<f64> {
        labels
            .iter()
            .find_map(|label| self.value(n, label).filter(|v| *v != 0.0))
    }

    pub fn latest(&self, label: &str) -> Option<f64> {
        self.value(0, label)
    }

    pub fn has_row(&self, label: &str) -> bool {
        self.periods.values().any(|items| items.contains_key(label))
    }

    /// Oldest-first series for one line item, or `None` if no period carries the label.
    ///
    /// Periods that lack the label, or hold a non-finite value, appear as absent.
    pub fn series(&self, label: &str) -> Option<Vec<(NaiveDate, Option<f64>)>> {
        if !self.has_row(label) {
            return None;
        }
        Some(
            self.periods
                .iter()
                .map(|(date, items)| (*date, finite(items.get(label).copied().flatten())))
                .collect(),
        )
    }
}

/// Flat quote-summary fields as delivered by the market-data collaborator.
///
/// Every field may be missing; percentage-like fields (`returnOnEquity`,
/// `profitMargins`, ...) usually arrive as decimal fractions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuoteSummary {
    pub long_name: Option<String>,
    pub short_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub currency: Option<String>,

    pub current_price: Option<f64>,
    pub regular_market_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub shares_outstanding: Option<f64>,
    pub beta: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub dividend_rate: Option<f64>,
    pub payout_ratio: Option<f64>,
    pub trailing_eps: Option<f64>,
    pub book_value: Option<f64>,

    #[serde(rename = "trailingPE")]
    pub trailing_pe: Option<f64>,
    pub price_to_book: Option<f64>,
    pub return_on_equity: Option<f64>,
    pub return_on_assets: Option<f64>,
    pub profit_margins: Option<f64>,
    pub gross_margins: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub current_ratio: Option<f64>,
    pub enterprise_to_ebitda: Option<f64>,
    pub peg_ratio: Option<f64>,
    #[serde(rename = "priceToSalesTrailing12Months")]
    pub price_to_sales: Option<f64>,

    pub total_debt: Option<f64>,
    pub total_cash: Option<f64>,
    pub total_assets: Option<f64>,
    pub net_interest_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
}

impl QuoteSummary {
    /// Current price, falling back to the regular-market price.
    pub fn price(&self) -> Option<f64> {
        finite(self.current_price).or_else(|| finite(self.regular_market_price))
    }

    pub fn display_name(&self) -> Option<&str> {
        self.long_name.as_deref().or(self.short_name.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Everything the data-fetch collaborator hands over for one ticker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawFinancials {
    pub symbol: String,
    pub quote: QuoteSummary,
    pub income_statement: Option<FinancialStatement>,
    pub quarterly_income_statement: Option<FinancialStatement>,
    pub balance_sheet: Option<FinancialStatement>,
    pub cash_flow: Option<FinancialStatement>,
}

impl RawFinancials {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            ..Default::default()
        }
    }

    pub fn income(&self) -> Option<&FinancialStatement> {
        non_empty(&self.income_statement)
    }

    pub fn quarterly_income(&self) -> Option<&FinancialStatement> {
        non_empty(&self.quarterly_income_statement)
    }

    pub fn balance(&self) -> Option<&FinancialStatement> {
        non_empty(&self.balance_sheet)
    }

    pub fn cash_flow(&self) -> Option<&FinancialStatement> {
        non_empty(&self.cash_flow)
    }
}

fn non_empty(statement: &Option<FinancialStatement>) -> Option<&FinancialStatement> {
    statement.as_ref().filter(|s| !s.is_empty())
}

/// Normalised ratio set for one ticker. Every entry is finite or absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RatioSet {
    #[serde(rename = "PER")]
    pub per: Option<f64>,
    #[serde(rename = "PBV")]
    pub pbv: Option<f64>,
    #[serde(rename = "ROE")]
    pub roe: Option<f64>,
    #[serde(rename = "ROA")]
    pub roa: Option<f64>,
    #[serde(rename = "NPM")]
    pub npm: Option<f64>,
    #[serde(rename = "GPM")]
    pub gpm: Option<f64>,
    #[serde(rename = "DER")]
    pub der: Option<f64>,
    #[serde(rename = "Current Ratio")]
    pub current_ratio: Option<f64>,
    #[serde(rename = "EV/EBITDA")]
    pub ev_ebitda: Option<f64>,
    #[serde(rename = "PEG")]
    pub peg: Option<f64>,
    #[serde(rename = "Beta")]
    pub beta: Option<f64>,
    #[serde(rename = "Dividend Yield")]
    pub dividend_yield: Option<f64>,
    #[serde(rename = "P/S")]
    pub price_to_sales: Option<f64>,
}

impl RatioSet {
    /// (display name, value) pairs in a stable order.
    pub fn entries(&self) -> [(&'static str, Option<f64>); 13] {
        [
            ("PER", self.per),
            ("PBV", self.pbv),
            ("ROE", self.roe),
            ("ROA", self.roa),
            ("NPM", self.npm),
            ("GPM", self.gpm),
            ("DER", self.der),
            ("Current Ratio", self.current_ratio),
            ("EV/EBITDA", self.ev_ebitda),
            ("PEG", self.peg),
            ("Beta", self.beta),
            ("Dividend Yield", self.dividend_yield),
            ("P/S", self.price_to_sales),
        ]
    }

    pub fn available(&self) -> usize {
        self.entries().iter().filter(|(_, v)| v.is_some()).count()
    }
}

/// Canonical sector bucket used to select weighting and range tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectorKey {
    Banking,
    Telecom,
    EnergyMining,
    ConsumerGoods,
    Manufacturing,
    PropertyConstruction,
    LogisticsTransport,
    Healthcare,
    Technology,
    Unknown,
}

impl SectorKey {
    pub const ALL: [SectorKey; 10] = [
        SectorKey::Banking,
        SectorKey::Telecom,
        SectorKey::EnergyMining,
        SectorKey::ConsumerGoods,
        SectorKey::Manufacturing,
        SectorKey::PropertyConstruction,
        SectorKey::LogisticsTransport,
        SectorKey::Healthcare,
        SectorKey::Technology,
        SectorKey::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectorKey::Banking => "banking",
            SectorKey::Telecom => "telecom",
            SectorKey::EnergyMining => "energy_mining",
            SectorKey::ConsumerGoods => "consumer_goods",
            SectorKey::Manufacturing => "manufacturing",
            SectorKey::PropertyConstruction => "property_construction",
            SectorKey::LogisticsTransport => "logistics_transport",
            SectorKey::Healthcare => "healthcare",
            SectorKey::Technology => "technology",
            SectorKey::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for SectorKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One pillar's normalised inputs (0-100 or absent) and its weighted score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub score: Option<f64>,
    pub breakdown: BTreeMap<String, Option<f64>>,
}

impl ScoreBreakdown {
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.breakdown.get(name).copied().flatten()
    }
}

/// Four-tier recommendation derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    #[serde(rename = "Strong Buy")]
    StrongBuy,
    #[serde(rename = "Buy")]
    Buy,
    #[serde(rename = "Hold")]
    Hold,
    #[serde(rename = "Avoid")]
    Avoid,
}

impl Recommendation {
    pub fn to_label(&self) -> &'static str {
        match self {
            Recommendation::StrongBuy => "Strong Buy",
            Recommendation::Buy => "Buy",
            Recommendation::Hold => "Hold",
            Recommendation::Avoid => "Avoid",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompositeResult {
    pub quality_score: Option<f64>,
    pub valuation_score: Option<f64>,
    pub risk_score: Option<f64>,
    pub composite_score: Option<f64>,
    pub recommendation: Option<Recommendation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    High,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    ZScore,
    ReceivablesGrowth,
    FcfDivergence,
    FcfNegative,
    MarginDecline,
    HighLeverage,
    RevenueDecline,
}

/// Statistical outlier detail attached to z-score anomalies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outlier {
    pub label: String,
    pub value: f64,
    pub z_score: f64,
    pub direction: Direction,
}

/// A red flag raised by the anomaly detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    pub severity: Severity,
    pub message: String,
    #[serde(flatten, default, skip_serializing_if = "Option::is_none")]
    pub outlier: Option<Outlier>,
}

impl Anomaly {
    pub fn new(kind: AnomalyKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            outlier: None,
        }
    }
}
