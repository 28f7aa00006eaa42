use analysis_core::numeric::{finite, round_to};
use serde::{Deserialize, Serialize};

/// Period-over-period growth in percent: (current - previous) / |previous| * 100.
pub fn growth(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    let (current, previous) = (finite(current)?, finite(previous)?);
    if previous == 0.0 {
        return None;
    }
    finite(Some((current - previous) / previous.abs() * 100.0))
}

/// Quarter-over-quarter growth; same formula as [`growth`].
pub fn qoq_growth(current: Option<f64>, previous: Option<f64>) -> Option<f64> {
    growth(current, previous)
}

/// Compound annual growth rate in percent.
///
/// Both endpoints must be strictly positive and `years` must be positive.
pub fn cagr(start: Option<f64>, end: Option<f64>, years: f64) -> Option<f64> {
    let (start, end) = (finite(start)?, finite(end)?);
    if years.is_nan() || years <= 0.0 || start <= 0.0 || end <= 0.0 {
        return None;
    }
    finite(Some(((end / start).powf(1.0 / years) - 1.0) * 100.0))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthPoint {
    pub period: String,
    pub value: Option<f64>,
    pub growth_pct: Option<f64>,
}

/// Walk an oldest-first series and attach growth versus the previous element.
///
/// The first element never has a growth value. Growth is rounded to two decimals.
pub fn growth_series<P: ToString>(series: &[(P, Option<f64>)]) -> Vec<GrowthPoint> {
    series
        .iter()
        .enumerate()
        .map(|(i, (period, value))| {
            let growth_pct = if i > 0 {
                growth(*value, series[i - 1].1).map(|g| round_to(g, 2))
            } else {
                None
            };
            GrowthPoint {
                period: period.to_string(),
                value: finite(*value),
                growth_pct,
            }
        })
        .collect()
}

/// CAGR from the first and last valid values of a series.
///
/// The compounding exponent is the number of valid values minus one, not the
/// calendar span: a series with a missing interior value compounds over one
/// period fewer than its length suggests.
pub fn trend_cagr(values: &[Option<f64>]) -> Option<f64> {
    let valid: Vec<f64> = values.iter().filter_map(|v| finite(*v)).collect();
    if valid.len() < 2 {
        return None;
    }
    cagr(
        valid.first().copied(),
        valid.last().copied(),
        (valid.len() - 1) as f64,
    )
}
