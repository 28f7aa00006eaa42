use analysis_core::{AnalysisError, Anomaly, RatioSet, RawFinancials, Recommendation, SectorKey};
use fundamental_analysis::{FundamentalAnalysisEngine, TrendAnalysis};
use industry_classifier::{industry_context, IndustryContext};
use scoring_engine::Scorecard;
use serde::Serialize;

pub mod config;
pub mod valuation;

pub use config::EngineConfig;
pub use valuation::{
    DcfReport, ModelOutcome, ProjectionReport, ScenarioReport, ValuationInputs, ValuationReport,
};

/// Full per-ticker result: every engine's output in one serializable record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub name: Option<String>,
    pub currency: Option<String>,
    pub sector_key: SectorKey,
    pub ratios: RatioSet,
    pub trends: TrendAnalysis,
    pub anomalies: Vec<Anomaly>,
    pub industry: IndustryContext,
    pub scores: Scorecard,
    pub valuation: ValuationReport,
}

impl AnalysisReport {
    pub fn recommendation(&self) -> Option<Recommendation> {
        self.scores.composite.recommendation
    }
}

pub struct AnalysisOrchestrator {
    fundamental_analyzer: FundamentalAnalysisEngine,
    config: EngineConfig,
}

impl AnalysisOrchestrator {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            fundamental_analyzer: FundamentalAnalysisEngine::new()
                .with_z_threshold(config.anomaly_z_threshold),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyse one ticker.
    ///
    /// Fails only when the ticker has neither a quote summary nor an income
    /// statement; any other gap yields a partial report with absent values
    /// and model error records.
    pub fn analyze(&self, raw: &RawFinancials) -> Result<AnalysisReport, AnalysisError> {
        tracing::info!("Starting analysis for {}", raw.symbol);

        let fundamentals = self.fundamental_analyzer.analyze(raw)?;
        let industry = industry_context(raw, &fundamentals.ratios);
        let scores = scoring_engine::score(
            &fundamentals.ratios,
            &fundamentals.trends.cagrs(),
            industry.sector_key,
        );

        let inputs = ValuationInputs::from_financials(raw, &fundamentals.ratios);
        let valuation = valuation::run_models(raw, &inputs, &self.config);

        if scores.composite.composite_score.is_none() {
            tracing::warn!("{}: no pillar could be scored, recommendation unavailable", raw.symbol);
        }
        if valuation.dcf.is_failed() {
            tracing::debug!("{}: DCF unavailable", raw.symbol);
        }

        tracing::info!(
            "{} analysed as {} (composite {:?}, {:?}, {} anomalies)",
            raw.symbol,
            industry.sector_key,
            scores.composite.composite_score,
            scores.composite.recommendation,
            fundamentals.anomalies.len()
        );

        Ok(AnalysisReport {
            symbol: raw.symbol.clone(),
            name: raw.quote.display_name().map(str::to_string),
            currency: raw.quote.currency.clone(),
            sector_key: industry.sector_key,
            ratios: fundamentals.ratios,
            trends: fundamentals.trends,
            anomalies: fundamentals.anomalies,
            industry,
            scores,
            valuation,
        })
    }

    /// Analyse independent tickers; one failure never affects the others.
    pub fn analyze_many<'a, I>(&self, batch: I) -> Vec<(String, Result<AnalysisReport, AnalysisError>)>
    where
        I: IntoIterator<Item = &'a RawFinancials>,
    {
        batch
            .into_iter()
            .map(|raw| (raw.symbol.clone(), self.analyze(raw)))
            .collect()
    }
}

impl Default for AnalysisOrchestrator {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests;
