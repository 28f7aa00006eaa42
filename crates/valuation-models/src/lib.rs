//! Intrinsic-value models. Every model returns `Result<_, ValuationError>`;
//! a violated precondition is a value, never a panic.

pub mod dcf;
pub mod equity;
pub mod projection;

pub use dcf::{
    dcf, scenario, sensitivity, DcfParams, DcfValuation, ScenarioRates, ScenarioValuation,
    SensitivityGrid,
};
pub use equity::{
    ddm, implied_peg, justified_pbv, sustainable_growth, DividendDiscount, JustifiedPbv,
    SustainableGrowth,
};
pub use projection::{linear_projection, LinearProjection, ProjectedPoint};
