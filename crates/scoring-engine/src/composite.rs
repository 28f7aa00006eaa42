use analysis_core::numeric::weighted_average;
use analysis_core::{CompositeResult, Recommendation};

pub const QUALITY_WEIGHT: f64 = 0.35;
pub const VALUATION_WEIGHT: f64 = 0.35;
pub const RISK_WEIGHT: f64 = 0.30;

/// Blend the three pillar scores and attach a recommendation tier.
pub fn composite(quality: Option<f64>, valuation: Option<f64>, risk: Option<f64>) -> CompositeResult {
    let composite_score = weighted_average(&[
        (quality, QUALITY_WEIGHT),
        (valuation, VALUATION_WEIGHT),
        (risk, RISK_WEIGHT),
    ]);

    CompositeResult {
        quality_score: quality,
        valuation_score: valuation,
        risk_score: risk,
        composite_score,
        recommendation: recommend(composite_score, valuation),
    }
}

/// Four-tier rule on the composite, gated by valuation when it is known.
///
/// Strong Buy needs composite >= 75 and valuation >= 60; Buy needs >= 60 and
/// valuation >= 45. A missing valuation score drops the gate.
pub fn recommend(composite: Option<f64>, valuation: Option<f64>) -> Option<Recommendation> {
    let composite = composite?;
    let passes = |floor: f64| valuation.map_or(true, |v| v >= floor);

    let tier = if composite >= 75.0 && passes(60.0) {
        Recommendation::StrongBuy
    } else if composite >= 60.0 && passes(45.0) {
        Recommendation::Buy
    } else if composite >= 45.0 {
        Recommendation::Hold
    } else {
        Recommendation::Avoid
    };
    Some(tier)
}
