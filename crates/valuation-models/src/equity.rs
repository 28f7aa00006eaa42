//! Single-formula equity models: justified P/B, dividend discount and
//! ROE sustainable growth, plus the implied PEG cross-check.

use analysis_core::numeric::finite;
use analysis_core::ValuationError;
use serde::{Deserialize, Serialize};

/// Percent-scaled fields are reported in percent (18.0 = 18%); inputs are decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JustifiedPbv {
    pub justified_pbv: f64,
    pub intrinsic_per_share: f64,
    pub roe_used: f64,
    pub cost_of_equity: f64,
    pub terminal_growth: f64,
    pub book_value_per_share: f64,
}

/// Justified price-to-book: `(ROE - g) / (COE - g)` times book value per share.
pub fn justified_pbv(
    roe: Option<f64>,
    book_value_per_share: Option<f64>,
    cost_of_equity: f64,
    terminal_growth: f64,
) -> Result<JustifiedPbv, ValuationError> {
    let roe = finite(roe).ok_or(ValuationError::MissingInput("return on equity"))?;
    let bvps = finite(book_value_per_share).ok_or(ValuationError::MissingInput("book value per share"))?;
    if cost_of_equity <= terminal_growth {
        return Err(ValuationError::DiscountBelowGrowth {
            discount: cost_of_equity,
            growth: terminal_growth,
        });
    }
    if bvps <= 0.0 {
        return Err(ValuationError::NonPositiveBookValue);
    }

    let multiple = (roe - terminal_growth) / (cost_of_equity - terminal_growth);
    Ok(JustifiedPbv {
        justified_pbv: multiple,
        intrinsic_per_share: multiple * bvps,
        roe_used: roe * 100.0,
        cost_of_equity: cost_of_equity * 100.0,
        terminal_growth: terminal_growth * 100.0,
        book_value_per_share: bvps,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DividendDiscount {
    pub last_dividend: f64,
    pub d1: f64,
    pub intrinsic_per_share: f64,
    pub growth_rate: f64,
    pub cost_of_equity: f64,
}

/// Gordon growth: `D1 / (COE - g)` with `D1 = D0 * (1 + g)`.
pub fn ddm(
    last_dividend: Option<f64>,
    growth_rate: f64,
    cost_of_equity: f64,
) -> Result<DividendDiscount, ValuationError> {
    let dividend = finite(last_dividend)
        .filter(|d| *d > 0.0)
        .ok_or(ValuationError::NoDividend)?;
    if cost_of_equity <= growth_rate {
        return Err(ValuationError::DiscountBelowGrowth {
            discount: cost_of_equity,
            growth: growth_rate,
        });
    }

    let d1 = dividend * (1.0 + growth_rate);
    Ok(DividendDiscount {
        last_dividend: dividend,
        d1,
        intrinsic_per_share: d1 / (cost_of_equity - growth_rate),
        growth_rate: growth_rate * 100.0,
        cost_of_equity: cost_of_equity * 100.0,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SustainableGrowth {
    pub sustainable_g: f64,
    pub retention_ratio: f64,
    pub payout_ratio: f64,
    pub roe_used: f64,
    pub eps: f64,
    pub intrinsic_per_share: f64,
    pub cost_of_equity: f64,
}

/// ROE sustainable-growth model: `g = ROE * (1 - payout)`, then
/// `EPS * (1 + g) / (COE - g)`.
///
/// A missing payout ratio counts as full retention; out-of-range payouts are
/// clamped to [0, 1].
pub fn sustainable_growth(
    roe: Option<f64>,
    payout_ratio: Option<f64>,
    eps: Option<f64>,
    cost_of_equity: f64,
) -> Result<SustainableGrowth, ValuationError> {
    let roe = finite(roe).ok_or(ValuationError::MissingInput("return on equity"))?;
    let eps = finite(eps).ok_or(ValuationError::MissingInput("earnings per share"))?;
    let payout = finite(payout_ratio).unwrap_or(0.0).clamp(0.0, 1.0);

    let retention = 1.0 - payout;
    let g = roe * retention;
    if cost_of_equity <= g {
        tracing::debug!("sustainable growth {} >= cost of equity {}", g, cost_of_equity);
        return Err(ValuationError::SustainableGrowthTooHigh { growth_pct: g * 100.0 });
    }

    Ok(SustainableGrowth {
        sustainable_g: g * 100.0,
        retention_ratio: retention * 100.0,
        payout_ratio: payout * 100.0,
        roe_used: roe * 100.0,
        eps,
        intrinsic_per_share: eps * (1.0 + g) / (cost_of_equity - g),
        cost_of_equity: cost_of_equity * 100.0,
    })
}

/// PEG implied by a P/E and a decimal growth rate.
///
/// Growth is converted to percent before dividing, the same scale the ratio
/// calculator's PEG uses (P/E 20 at 10% growth is a PEG of 2.0, not 200).
pub fn implied_peg(pe: Option<f64>, growth_rate: Option<f64>) -> Option<f64> {
    let (pe, growth) = (finite(pe)?, finite(growth_rate)?);
    if growth == 0.0 {
        return None;
    }
    finite(Some(pe / (growth * 100.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_justified_pbv() {
        let v = justified_pbv(Some(0.18), Some(2000.0), 0.10, 0.05).unwrap();
        assert_relative_eq!(v.justified_pbv, 2.6, max_relative = 1e-12);
        assert_relative_eq!(v.intrinsic_per_share, 5200.0, max_relative = 1e-12);
        assert_relative_eq!(v.roe_used, 18.0, max_relative = 1e-12);
    }

    #[test]
    fn test_justified_pbv_preconditions() {
        assert_eq!(
            justified_pbv(None, Some(1.0), 0.10, 0.05),
            Err(ValuationError::MissingInput("return on equity"))
        );
        assert_eq!(
            justified_pbv(Some(0.2), Some(-1.0), 0.10, 0.05),
            Err(ValuationError::NonPositiveBookValue)
        );
        assert!(matches!(
            justified_pbv(Some(0.2), Some(1.0), 0.05, 0.05),
            Err(ValuationError::DiscountBelowGrowth { .. })
        ));
    }

    #[test]
    fn test_ddm() {
        let v = ddm(Some(100.0), 0.05, 0.10).unwrap();
        assert_relative_eq!(v.d1, 105.0);
        assert_relative_eq!(v.intrinsic_per_share, 2100.0, max_relative = 1e-12);
        assert_eq!(ddm(Some(0.0), 0.05, 0.10), Err(ValuationError::NoDividend));
        assert_eq!(ddm(None, 0.05, 0.10), Err(ValuationError::NoDividend));
        assert!(ddm(Some(1.0), 0.10, 0.10).is_err());
    }

    #[test]
    fn test_sustainable_growth() {
        // g = 0.15 * 0.4 = 0.06; 500 * 1.06 / 0.04 = 13250
        let v = sustainable_growth(Some(0.15), Some(0.6), Some(500.0), 0.10).unwrap();
        assert_relative_eq!(v.sustainable_g, 6.0, max_relative = 1e-12);
        assert_relative_eq!(v.retention_ratio, 40.0, max_relative = 1e-12);
        assert_relative_eq!(v.intrinsic_per_share, 13250.0, max_relative = 1e-9);
    }

    #[test]
    fn test_sustainable_growth_payout_handling() {
        // No payout: full retention, g = ROE = 0.2 >= COE.
        assert!(matches!(
            sustainable_growth(Some(0.2), None, Some(1.0), 0.10),
            Err(ValuationError::SustainableGrowthTooHigh { .. })
        ));
        // Payout above one clamps to zero growth.
        let v = sustainable_growth(Some(0.2), Some(1.7), Some(10.0), 0.10).unwrap();
        assert_eq!(v.sustainable_g, 0.0);
        assert_eq!(v.payout_ratio, 100.0);
        assert_relative_eq!(v.intrinsic_per_share, 100.0, max_relative = 1e-12);
    }

    #[test]
    fn test_implied_peg_percent_scale() {
        assert_relative_eq!(implied_peg(Some(20.0), Some(0.10)).unwrap(), 2.0, max_relative = 1e-12);
        assert_eq!(implied_peg(Some(20.0), Some(0.0)), None);
        assert_eq!(implied_peg(None, Some(0.1)), None);
    }
}
