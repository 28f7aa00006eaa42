//! Sector-aware Quality / Valuation / Risk scoring and the composite
//! recommendation built from them.

pub mod composite;
pub mod pillars;

use analysis_core::{CompositeResult, RatioSet, ScoreBreakdown, SectorKey};
use fundamental_analysis::TrendCagrs;
use serde::{Deserialize, Serialize};

pub use composite::{composite, recommend};
pub use pillars::{quality, risk, valuation};

/// All three pillar breakdowns plus the composite for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scorecard {
    pub quality: ScoreBreakdown,
    pub valuation: ScoreBreakdown,
    pub risk: ScoreBreakdown,
    pub composite: CompositeResult,
}

pub fn score(ratios: &RatioSet, cagrs: &TrendCagrs, sector: SectorKey) -> Scorecard {
    let quality = quality(ratios, cagrs, sector);
    let valuation = valuation(ratios, sector);
    let risk = risk(ratios, sector);
    let composite = composite(quality.score, valuation.score, risk.score);

    tracing::debug!(
        "scored {} sector: quality={:?} valuation={:?} risk={:?} composite={:?}",
        sector,
        quality.score,
        valuation.score,
        risk.score,
        composite.composite_score
    );

    Scorecard {
        quality,
        valuation,
        risk,
        composite,
    }
}
