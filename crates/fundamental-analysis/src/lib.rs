pub mod anomaly;
pub mod growth;
pub mod ratios;
pub mod trends;

use analysis_core::{AnalysisError, Anomaly, RatioSet, RawFinancials};
use serde::{Deserialize, Serialize};

pub use anomaly::{detect, AnomalySnapshot, DEFAULT_Z_THRESHOLD};
pub use growth::{cagr, growth, growth_series, qoq_growth, trend_cagr, GrowthPoint};
pub use ratios::compute_ratios;
pub use trends::{MetricTrend, StatementCategory, TrendAnalysis, TrendCagrs};

/// Statement-level output for one ticker: ratios, trends and red flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FundamentalAnalysis {
    pub ratios: RatioSet,
    pub trends: TrendAnalysis,
    pub anomalies: Vec<Anomaly>,
}

pub struct FundamentalAnalysisEngine {
    z_threshold: f64,
}

impl FundamentalAnalysisEngine {
    pub fn new() -> Self {
        Self {
            z_threshold: DEFAULT_Z_THRESHOLD,
        }
    }

    pub fn with_z_threshold(mut self, z_threshold: f64) -> Self {
        self.z_threshold = z_threshold;
        self
    }

    /// Derive ratios, trends and anomalies from raw statements.
    ///
    /// Fails only when there is nothing to work with at all: an empty quote
    /// summary and no income statement. Every other gap degrades to absent values.
    pub fn analyze(&self, financials: &RawFinancials) -> Result<FundamentalAnalysis, AnalysisError> {
        if financials.quote.is_empty() && financials.income().is_none() {
            return Err(AnalysisError::NoData(financials.symbol.clone()));
        }

        let ratios = compute_ratios(
            &financials.quote,
            financials.income(),
            financials.balance(),
            financials.cash_flow(),
        );
        let trends = TrendAnalysis::from_financials(financials);
        let snapshot = AnomalySnapshot::from_financials(financials, &ratios);
        let anomalies = detect(&snapshot, self.z_threshold);

        tracing::debug!(
            "{}: {} of 13 ratios available, {} annual trends, {} anomalies",
            financials.symbol,
            ratios.available(),
            trends.annual.len(),
            anomalies.len()
        );

        Ok(FundamentalAnalysis {
            ratios,
            trends,
            anomalies,
        })
    }
}

impl Default for FundamentalAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::QuoteSummary;

    #[test]
    fn test_no_data_is_fatal() {
        let engine = FundamentalAnalysisEngine::new();
        let err = engine.analyze(&RawFinancials::new("NONE")).unwrap_err();
        assert!(matches!(err, AnalysisError::NoData(ref s) if s == "NONE"));
    }

    #[test]
    fn test_quote_only_degrades_gracefully() {
        let raw = RawFinancials {
            quote: QuoteSummary {
                trailing_pe: Some(12.0),
                beta: Some(0.9),
                ..Default::default()
            },
            ..RawFinancials::new("QUOTE")
        };
        let analysis = FundamentalAnalysisEngine::default().analyze(&raw).unwrap();
        assert_eq!(analysis.ratios.per, Some(12.0));
        assert_eq!(analysis.ratios.roe, None);
        assert!(analysis.trends.annual.is_empty());
        assert!(analysis.anomalies.is_empty());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let raw = RawFinancials {
            quote: QuoteSummary {
                current_price: Some(10.0),
                debt_to_equity: Some(2.5),
                ..Default::default()
            },
            ..RawFinancials::new("SAME")
        };
        let engine = FundamentalAnalysisEngine::new().with_z_threshold(1.5);
        assert_eq!(engine.analyze(&raw).unwrap(), engine.analyze(&raw).unwrap());
    }
}
