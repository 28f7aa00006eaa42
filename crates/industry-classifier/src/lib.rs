//! Sector detection, per-sector configuration tables and the industry view
//! built on top of them.

pub mod classifier;
pub mod config;
pub mod context;

pub use classifier::classify;
pub use config::{
    config_for, Band, Multiple, MultipleBand, QualityWeights, SectorConfig, Thesis, ValuationBands,
};
pub use context::{
    industry_context, select_peers, specific_ratios, valuation_zone, ContextInputs,
    IndustryContext, Peers, SpecificRatio, ValuationZone, Zone,
};
