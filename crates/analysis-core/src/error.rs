use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Neither a quote summary nor any statement is available for the ticker.
    #[error("No data available for {0}")]
    NoData(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Precondition failures of the valuation models.
///
/// These are reported back to the caller as structured error records rather
/// than propagated as failures of the whole analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValuationError {
    #[error("Missing input: {0}")]
    MissingInput(&'static str),

    #[error("Discount rate ({discount:.4}) must be greater than growth rate ({growth:.4})")]
    DiscountBelowGrowth { discount: f64, growth: f64 },

    #[error("Book value per share must be positive")]
    NonPositiveBookValue,

    #[error("This stock does not pay dividends, DDM not applicable")]
    NoDividend,

    #[error("Sustainable growth ({growth_pct:.1}%) >= cost of equity, model not valid")]
    SustainableGrowthTooHigh { growth_pct: f64 },

    #[error("Projection horizon must be at least one period")]
    InvalidHorizon,

    #[error("Need at least {required} valid data points, got {got}")]
    InsufficientPoints { required: usize, got: usize },

    #[error("Cannot fit line (zero variance in x)")]
    ZeroVariance,

    #[error("Model produced a non-finite result")]
    NonFinite,
}
