use analysis_core::numeric::finite;
use analysis_core::ValuationError;
use serde::{Deserialize, Serialize};

/// Multiplier on the residual standard error for the projection band.
pub const CONFIDENCE_Z: f64 = 1.96;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectedPoint {
    pub period_index: usize,
    pub value: f64,
    pub upper: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearProjection {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    /// Fitted value at every historical index, including absent ones.
    pub fitted: Vec<f64>,
    pub projections: Vec<ProjectedPoint>,
}

/// Ordinary least squares over `(index, value)` for the valid entries of an
/// oldest-first series, extended `periods_ahead` steps past the last index.
///
/// Absent or non-finite values are skipped but keep their index, so gaps do
/// not compress the time axis.
pub fn linear_projection(
    values: &[Option<f64>],
    periods_ahead: usize,
) -> Result<LinearProjection, ValuationError> {
    let n = values.len();
    if n < 2 {
        return Err(ValuationError::InsufficientPoints { required: 2, got: n });
    }

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| finite(*v).map(|y| (i as f64, y)))
        .collect();
    if points.len() < 2 {
        return Err(ValuationError::InsufficientPoints {
            required: 2,
            got: points.len(),
        });
    }

    let count = points.len() as f64;
    let sum_x: f64 = points.iter().map(|(x, _)| x).sum();
    let sum_y: f64 = points.iter().map(|(_, y)| y).sum();
    let sum_xy: f64 = points.iter().map(|(x, y)| x * y).sum();
    let sum_x2: f64 = points.iter().map(|(x, _)| x * x).sum();

    let denom = count * sum_x2 - sum_x * sum_x;
    if denom == 0.0 {
        return Err(ValuationError::ZeroVariance);
    }

    let slope = (count * sum_xy - sum_x * sum_y) / denom;
    let intercept = (sum_y - slope * sum_x) / count;
    let line = |x: f64| slope * x + intercept;

    let ssr: f64 = points.iter().map(|(x, y)| (y - line(*x)).powi(2)).sum();
    let mean_y = sum_y / count;
    let sst: f64 = points.iter().map(|(_, y)| (y - mean_y).powi(2)).sum();
    let se = if points.len() > 2 {
        (ssr / (count - 2.0)).sqrt()
    } else {
        0.0
    };

    let fitted: Vec<f64> = (0..n).map(|i| line(i as f64)).collect();
    let projections = (n..n + periods_ahead)
        .map(|i| {
            let value = line(i as f64);
            ProjectedPoint {
                period_index: i,
                value,
                upper: value + CONFIDENCE_Z * se,
                lower: value - CONFIDENCE_Z * se,
            }
        })
        .collect();

    let fit = LinearProjection {
        slope,
        intercept,
        r_squared: 1.0 - ssr / sst.max(1e-10),
        fitted,
        projections,
    };
    if !fit.is_finite() {
        return Err(ValuationError::NonFinite);
    }
    Ok(fit)
}

impl LinearProjection {
    /// True when every coefficient, fitted value and band edge is finite.
    fn is_finite(&self) -> bool {
        [self.slope, self.intercept, self.r_squared]
            .iter()
            .chain(&self.fitted)
            .chain(self.projections.iter().flat_map(|p| [&p.value, &p.upper, &p.lower]))
            .all(|v| v.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_perfect_line() {
        let fit = linear_projection(&[Some(10.0), Some(20.0), Some(30.0)], 2).unwrap();
        assert_relative_eq!(fit.slope, 10.0, max_relative = 1e-12);
        assert_relative_eq!(fit.intercept, 10.0, max_relative = 1e-12);
        assert_relative_eq!(fit.r_squared, 1.0);
        assert_eq!(fit.projections.len(), 2);
        assert_eq!(fit.projections[0].period_index, 3);
        assert_relative_eq!(fit.projections[1].value, 50.0, max_relative = 1e-12);
        // Zero residuals: the band collapses onto the line.
        assert_abs_diff_eq!(fit.projections[1].upper, fit.projections[1].value, epsilon = 1e-9);
    }

    #[test]
    fn test_gap_keeps_index() {
        let fit = linear_projection(&[Some(0.0), None, Some(4.0)], 1).unwrap();
        assert_relative_eq!(fit.slope, 2.0, max_relative = 1e-12);
        assert_eq!(fit.fitted.len(), 3);
        assert_abs_diff_eq!(fit.fitted[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.projections[0].value, 6.0, max_relative = 1e-12);
    }

    #[test]
    fn test_two_points_have_no_band() {
        let fit = linear_projection(&[Some(1.0), Some(3.0)], 1).unwrap();
        assert_eq!(fit.projections[0].upper, fit.projections[0].lower);
    }

    #[test]
    fn test_residual_band() {
        // y = 0, 2, 1, 3: slope 0.8, intercept 0.3, residuals -0.3, 0.9, -0.9, 0.3
        let fit = linear_projection(&[Some(0.0), Some(2.0), Some(1.0), Some(3.0)], 1).unwrap();
        assert_relative_eq!(fit.slope, 0.8, max_relative = 1e-12);
        let se = (1.8_f64 / 2.0).sqrt();
        let p = &fit.projections[0];
        assert_relative_eq!(p.upper - p.value, 1.96 * se, max_relative = 1e-9);
        assert_relative_eq!(fit.r_squared, 1.0 - 1.8 / 5.0, max_relative = 1e-9);
    }

    #[test]
    fn test_overflowing_series_is_rejected() {
        // Squared residuals overflow: R² and the band would be NaN / infinite.
        assert_eq!(
            linear_projection(&[Some(1e200), Some(-1e200), Some(1e200)], 1),
            Err(ValuationError::NonFinite)
        );
        assert_eq!(
            linear_projection(&[Some(f64::MAX), Some(-f64::MAX)], 3),
            Err(ValuationError::NonFinite)
        );
    }

    #[test]
    fn test_insufficient_points() {
        assert_eq!(
            linear_projection(&[Some(1.0)], 4),
            Err(ValuationError::InsufficientPoints { required: 2, got: 1 })
        );
        assert_eq!(
            linear_projection(&[Some(1.0), None, Some(f64::INFINITY)], 4),
            Err(ValuationError::InsufficientPoints { required: 2, got: 1 })
        );
    }
}
