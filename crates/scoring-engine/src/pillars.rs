//! The three pillar scores. Each is a pure function over the ratio set and the
//! sector's configuration record.

use std::collections::BTreeMap;

use analysis_core::numeric::{finite, normalize, normalize_inverse, round_to, weighted_average};
use analysis_core::{RatioSet, ScoreBreakdown, SectorKey};
use fundamental_analysis::TrendCagrs;
use industry_classifier::{config_for, Multiple};

const CAGR_RANGE: (f64, f64) = (-10.0, 30.0);

const RISK_WEIGHT_DER: f64 = 0.40;
const RISK_WEIGHT_BETA: f64 = 0.30;
const RISK_WEIGHT_CURRENT_RATIO: f64 = 0.30;

/// Profitability and growth, 0-100.
///
/// Every input is normalised and reported in the breakdown even when the
/// sector gives it zero weight.
pub fn quality(ratios: &RatioSet, cagrs: &TrendCagrs, sector: SectorKey) -> ScoreBreakdown {
    let w = config_for(sector).quality_weights;
    let (lo, hi) = CAGR_RANGE;

    let inputs = [
        ("ROE", normalize(ratios.roe, 0.0, 30.0), w.roe),
        ("ROA", normalize(ratios.roa, 0.0, 15.0), w.roa),
        ("NPM", normalize(ratios.npm, 0.0, 30.0), w.npm),
        ("GPM", normalize(ratios.gpm, 0.0, 60.0), w.gpm),
        ("Revenue CAGR", normalize(cagrs.revenue, lo, hi), w.revenue_cagr),
        ("NI CAGR", normalize(cagrs.net_income, lo, hi), w.net_income_cagr),
        ("FCF CAGR", normalize(cagrs.free_cash_flow, lo, hi), w.fcf_cagr),
    ];

    let score = weighted_average(&inputs.map(|(_, value, weight)| (value, weight)));
    let breakdown = inputs
        .iter()
        .map(|(name, value, _)| (name.to_string(), *value))
        .collect();

    ScoreBreakdown { score, breakdown }
}

/// Cheapness across the sector's multiples, 0-100 (cheap is high).
///
/// A multiple that is absent or non-positive drops out and its weight is
/// redistributed. The breakdown always lists PER, PBV, EV/EBITDA and PEG;
/// multiples the sector does not score show as absent.
pub fn valuation(ratios: &RatioSet, sector: SectorKey) -> ScoreBreakdown {
    let config = config_for(sector);

    let mut breakdown: BTreeMap<String, Option<f64>> = Multiple::STANDARD
        .iter()
        .map(|m| (m.name().to_string(), None))
        .collect();
    let mut pairs = Vec::with_capacity(config.valuation_multiples.len());

    for band in config.valuation_multiples {
        let raw = finite(band.multiple.value(ratios)).filter(|v| *v > 0.0);
        let normalized = raw.and_then(|v| normalize_inverse(Some(v), band.low, band.high));
        breakdown.insert(band.multiple.name().to_string(), normalized);
        pairs.push((normalized, band.weight));
    }

    ScoreBreakdown {
        score: weighted_average(&pairs),
        breakdown,
    }
}

/// Balance-sheet and market risk, 0-100 (safe is high).
///
/// Sectors without a leverage tolerance (banks) score on beta alone; the
/// DER and current-ratio entries are reported as absent.
pub fn risk(ratios: &RatioSet, sector: SectorKey) -> ScoreBreakdown {
    let beta_score = finite(ratios.beta).map(|b| ((3.0 - b.abs()) / 3.0 * 100.0).clamp(0.0, 100.0));

    let Some(der_limit) = config_for(sector).der_tolerance else {
        return ScoreBreakdown {
            score: weighted_average(&[(beta_score, 1.0)]),
            breakdown: risk_breakdown(None, beta_score, None),
        };
    };

    let der_score = finite(ratios.der)
        .map(|d| ((der_limit - d.abs()) / der_limit * 100.0).clamp(0.0, 100.0));
    let cr_score = finite(ratios.current_ratio).map(|cr| (cr / 3.0 * 100.0).clamp(0.0, 100.0));

    ScoreBreakdown {
        score: weighted_average(&[
            (der_score, RISK_WEIGHT_DER),
            (beta_score, RISK_WEIGHT_BETA),
            (cr_score, RISK_WEIGHT_CURRENT_RATIO),
        ]),
        breakdown: risk_breakdown(der_score, beta_score, cr_score),
    }
}

fn risk_breakdown(
    der: Option<f64>,
    beta: Option<f64>,
    current_ratio: Option<f64>,
) -> BTreeMap<String, Option<f64>> {
    [("DER", der), ("Beta", beta), ("Current Ratio", current_ratio)]
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.map(|v| round_to(v, 1))))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn saturated() -> (RatioSet, TrendCagrs) {
        let ratios = RatioSet {
            roe: Some(30.0),
            roa: Some(15.0),
            npm: Some(30.0),
            gpm: Some(60.0),
            ..Default::default()
        };
        let cagrs = TrendCagrs {
            revenue: Some(30.0),
            net_income: Some(30.0),
            free_cash_flow: Some(30.0),
        };
        (ratios, cagrs)
    }

    #[test]
    fn test_quality_saturates_at_100() {
        let (ratios, cagrs) = saturated();
        for sector in SectorKey::ALL {
            assert_eq!(quality(&ratios, &cagrs, sector).score, Some(100.0), "{sector}");
        }
    }

    #[test]
    fn test_quality_all_absent() {
        let q = quality(&RatioSet::default(), &TrendCagrs::default(), SectorKey::Unknown);
        assert_eq!(q.score, None);
        assert_eq!(q.breakdown.len(), 7);
    }

    #[test]
    fn test_quality_zero_weight_reported_but_excluded() {
        // Banks give GPM zero weight: a terrible gross margin must not move the score.
        let ratios = RatioSet {
            roe: Some(15.0),
            gpm: Some(0.0),
            ..Default::default()
        };
        let q = quality(&ratios, &TrendCagrs::default(), SectorKey::Banking);
        assert_eq!(q.metric("GPM"), Some(0.0));
        assert_eq!(q.score, Some(50.0));
    }

    #[test]
    fn test_quality_sector_weights_differ() {
        let ratios = RatioSet {
            roe: Some(30.0),
            ..Default::default()
        };
        let cagrs = TrendCagrs {
            revenue: Some(-10.0),
            ..Default::default()
        };
        // default: (100*.25 + 0*.10) / .35 = 71.43
        assert_eq!(quality(&ratios, &cagrs, SectorKey::Unknown).score, Some(71.4));
        // technology: (100*.15 + 0*.25) / .40 = 37.5
        assert_eq!(quality(&ratios, &cagrs, SectorKey::Technology).score, Some(37.5));
    }

    #[test]
    fn test_valuation_default_bands() {
        let ratios = RatioSet {
            per: Some(5.0),
            pbv: Some(5.0),
            ..Default::default()
        };
        let v = valuation(&ratios, SectorKey::Unknown);
        assert_eq!(v.metric("PER"), Some(100.0));
        assert_eq!(v.metric("PBV"), Some(0.0));
        // (100*.30 + 0*.25) / .55
        assert_eq!(v.score, Some(54.5));
        assert!(!v.breakdown.contains_key("P/S"));
    }

    #[test]
    fn test_valuation_excludes_non_positive() {
        let ratios = RatioSet {
            per: Some(-8.0),
            pbv: Some(0.5),
            ..Default::default()
        };
        let v = valuation(&ratios, SectorKey::Unknown);
        assert_eq!(v.metric("PER"), None);
        assert_eq!(v.score, Some(100.0));
    }

    #[test]
    fn test_valuation_bank_ignores_ev_and_peg() {
        let ratios = RatioSet {
            per: Some(12.5),
            pbv: Some(3.0),
            ev_ebitda: Some(4.0),
            peg: Some(0.5),
            ..Default::default()
        };
        let v = valuation(&ratios, SectorKey::Banking);
        assert_eq!(v.metric("EV/EBITDA"), None);
        assert_eq!(v.metric("PEG"), None);
        assert_relative_eq!(v.metric("PER").unwrap(), 50.0);
        assert_relative_eq!(v.metric("PBV").unwrap(), 50.0);
        assert_eq!(v.score, Some(50.0));
    }

    #[test]
    fn test_valuation_technology_scores_price_to_sales() {
        let ratios = RatioSet {
            price_to_sales: Some(3.0),
            ev_ebitda: Some(30.0),
            ..Default::default()
        };
        let v = valuation(&ratios, SectorKey::Technology);
        assert_eq!(v.metric("P/S"), Some(100.0));
        assert_eq!(v.metric("EV/EBITDA"), Some(0.0));
        // (100*.30 + 0*.20) / .50
        assert_eq!(v.score, Some(60.0));
        assert_eq!(v.breakdown.len(), 5);
    }

    #[test]
    fn test_risk_bank_uses_beta_only() {
        let ratios = RatioSet {
            der: Some(9.0),
            current_ratio: Some(0.2),
            beta: Some(1.5),
            ..Default::default()
        };
        let r = risk(&ratios, SectorKey::Banking);
        assert_eq!(r.score, Some(50.0));
        assert_eq!(r.metric("DER"), None);
        assert_eq!(r.metric("Current Ratio"), None);
        assert_eq!(r.metric("Beta"), Some(50.0));
    }

    #[test]
    fn test_risk_der_tolerance_by_sector() {
        let ratios = RatioSet {
            der: Some(3.0),
            ..Default::default()
        };
        assert_eq!(risk(&ratios, SectorKey::Manufacturing).score, Some(0.0));
        assert_eq!(risk(&ratios, SectorKey::ConsumerGoods).score, Some(25.0));
        assert_eq!(risk(&ratios, SectorKey::Telecom).score, Some(40.0));
    }

    #[test]
    fn test_risk_weights() {
        let ratios = RatioSet {
            der: Some(0.0),
            beta: Some(3.0),
            current_ratio: Some(4.5),
            ..Default::default()
        };
        let r = risk(&ratios, SectorKey::Unknown);
        // 100*.4 + 0*.3 + 100*.3
        assert_eq!(r.score, Some(70.0));
        assert_eq!(r.metric("Current Ratio"), Some(100.0));
    }

    #[test]
    fn test_risk_breakdown_rounded() {
        let ratios = RatioSet {
            beta: Some(1.0),
            ..Default::default()
        };
        let r = risk(&ratios, SectorKey::Unknown);
        assert_eq!(r.metric("Beta"), Some(66.7));
        assert_eq!(r.score, Some(66.7));
    }
}
