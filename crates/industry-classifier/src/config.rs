//! Static per-sector configuration.
//!
//! Every table here is immutable process-wide data; [`config_for`] is a pure
//! lookup that falls back to [`GENERAL`] for sectors without their own entry.

use analysis_core::{RatioSet, SectorKey};
use serde::Serialize;

/// A price multiple the valuation pillar can score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Multiple {
    #[serde(rename = "PER")]
    Per,
    #[serde(rename = "PBV")]
    Pbv,
    #[serde(rename = "EV/EBITDA")]
    EvEbitda,
    #[serde(rename = "PEG")]
    Peg,
    #[serde(rename = "P/S")]
    PriceToSales,
}

impl Multiple {
    /// The four multiples every valuation breakdown reports, applicable or not.
    pub const STANDARD: [Multiple; 4] = [Multiple::Per, Multiple::Pbv, Multiple::EvEbitda, Multiple::Peg];

    pub fn name(&self) -> &'static str {
        match self {
            Multiple::Per => "PER",
            Multiple::Pbv => "PBV",
            Multiple::EvEbitda => "EV/EBITDA",
            Multiple::Peg => "PEG",
            Multiple::PriceToSales => "P/S",
        }
    }

    pub fn value(&self, ratios: &RatioSet) -> Option<f64> {
        match self {
            Multiple::Per => ratios.per,
            Multiple::Pbv => ratios.pbv,
            Multiple::EvEbitda => ratios.ev_ebitda,
            Multiple::Peg => ratios.peg,
            Multiple::PriceToSales => ratios.price_to_sales,
        }
    }
}

/// Inverse-normalisation range and pillar weight for one multiple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MultipleBand {
    pub multiple: Multiple,
    pub low: f64,
    pub high: f64,
    pub weight: f64,
}

const fn band(multiple: Multiple, low: f64, high: f64, weight: f64) -> MultipleBand {
    MultipleBand {
        multiple,
        low,
        high,
        weight,
    }
}

/// Closed numeric interval.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Band {
    pub low: f64,
    pub high: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValuationBands {
    pub cheap: Band,
    pub fair: Band,
    pub expensive: Band,
}

const fn bands(cheap: (f64, f64), fair: (f64, f64), expensive: (f64, f64)) -> ValuationBands {
    ValuationBands {
        cheap: Band {
            low: cheap.0,
            high: cheap.1,
        },
        fair: Band {
            low: fair.0,
            high: fair.1,
        },
        expensive: Band {
            low: expensive.0,
            high: expensive.1,
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Thesis {
    pub bull: &'static str,
    pub base: &'static str,
    pub bear: &'static str,
}

/// Quality-pillar weights. They sum to 1.0; a zero weight keeps the metric in
/// the breakdown but out of the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QualityWeights {
    pub roe: f64,
    pub roa: f64,
    pub npm: f64,
    pub gpm: f64,
    pub revenue_cagr: f64,
    pub net_income_cagr: f64,
    pub fcf_cagr: f64,
}

impl QualityWeights {
    pub fn total(&self) -> f64 {
        self.roe + self.roa + self.npm + self.gpm + self.revenue_cagr + self.net_income_cagr + self.fcf_cagr
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectorConfig {
    pub key: SectorKey,
    pub label: &'static str,
    /// Indonesian-exchange peers (`.JK` tickers).
    pub peers_idx: &'static [&'static str],
    pub peers_us: &'static [&'static str],
    pub peer_metrics: &'static [&'static str],
    /// Prefix of the sector-specific ratio label the zone check reads.
    pub valuation_metric: &'static str,
    pub valuation_bands: ValuationBands,
    pub thesis: Thesis,
    pub quality_weights: QualityWeights,
    pub valuation_multiples: &'static [MultipleBand],
    /// Debt/equity at which the risk pillar's leverage score reaches zero.
    /// `None` excludes leverage entirely.
    pub der_tolerance: Option<f64>,
}

const DEFAULT_QUALITY: QualityWeights = QualityWeights {
    roe: 0.25,
    roa: 0.15,
    npm: 0.20,
    gpm: 0.10,
    revenue_cagr: 0.10,
    net_income_cagr: 0.10,
    fcf_cagr: 0.10,
};

const DEFAULT_MULTIPLES: &[MultipleBand] = &[
    band(Multiple::Per, 5.0, 40.0, 0.30),
    band(Multiple::Pbv, 0.5, 5.0, 0.25),
    band(Multiple::EvEbitda, 4.0, 20.0, 0.25),
    band(Multiple::Peg, 0.5, 4.0, 0.20),
];

const STANDARD_DER: Option<f64> = Some(3.0);
const MODERATE_DER: Option<f64> = Some(4.0);
const CAPEX_HEAVY_DER: Option<f64> = Some(5.0);

pub static BANKING: SectorConfig = SectorConfig {
    key: SectorKey::Banking,
    label: "Banking",
    peers_idx: &["BBCA.JK", "BBRI.JK", "BMRI.JK"],
    peers_us: &["JPM", "BAC", "WFC"],
    peer_metrics: &["PBV", "ROE", "DER"],
    valuation_metric: "PBV",
    valuation_bands: bands((0.0, 1.5), (1.5, 2.5), (2.5, 5.0)),
    thesis: Thesis {
        bull: "Higher rates widen NIM, consumer and SME lending grows strongly, and digital channels cut cost-to-income while adding fee income.",
        base: "NIM holds in its historical range with credit growth of 8-12% a year; tier-1 banks trade at a fair 1.5-2.5x book.",
        bear: "NPLs rise in a slowdown and eat into provisions; deposit competition lifts funding costs and tighter capital rules cap expansion.",
    },
    quality_weights: QualityWeights {
        roe: 0.35,
        roa: 0.25,
        npm: 0.25,
        gpm: 0.0,
        revenue_cagr: 0.05,
        net_income_cagr: 0.10,
        fcf_cagr: 0.0,
    },
    valuation_multiples: &[
        band(Multiple::Per, 5.0, 20.0, 0.50),
        band(Multiple::Pbv, 0.5, 5.5, 0.50),
    ],
    der_tolerance: None,
};

pub static TELECOM: SectorConfig = SectorConfig {
    key: SectorKey::Telecom,
    label: "Telecommunications",
    peers_idx: &["TLKM.JK", "ISAT.JK", "EXCL.JK"],
    peers_us: &["T", "VZ", "TMUS"],
    peer_metrics: &["EV/EBITDA", "EBITDA Margin", "DER"],
    valuation_metric: "EV/EBITDA",
    valuation_bands: bands((0.0, 5.0), (5.0, 8.0), (8.0, 13.0)),
    thesis: Thesis {
        bull: "5G monetisation lifts ARPU and consolidation ends price wars; data centres and B2B cloud become new growth engines.",
        base: "Data drives 5-8% revenue growth with EBITDA margin steady at 40-50% and an attractive dividend yield.",
        bear: "Heavy 5G capex squeezes free cash flow while OTT services erode voice and SMS revenue.",
    },
    quality_weights: DEFAULT_QUALITY,
    valuation_multiples: &[
        band(Multiple::Per, 5.0, 30.0, 0.20),
        band(Multiple::Pbv, 0.5, 5.0, 0.05),
        band(Multiple::EvEbitda, 4.0, 20.0, 0.60),
        band(Multiple::Peg, 0.5, 4.0, 0.15),
    ],
    der_tolerance: CAPEX_HEAVY_DER,
};

pub static ENERGY_MINING: SectorConfig = SectorConfig {
    key: SectorKey::EnergyMining,
    label: "Energy & Mining",
    peers_idx: &["ADRO.JK", "PTBA.JK", "ITMG.JK"],
    peers_us: &["XOM", "CVX", "COP"],
    peer_metrics: &["EV/EBITDA", "Net Debt/EBITDA", "FCF Yield"],
    valuation_metric: "EV/EBITDA",
    valuation_bands: bands((0.0, 4.0), (4.0, 7.0), (7.0, 12.0)),
    thesis: Thesis {
        bull: "A commodity upcycle lifts revenue and the energy transition creates demand for battery minerals; high dividends draw income investors.",
        base: "Commodity prices sit mid-cycle and capital discipline preserves free cash flow.",
        bear: "A Chinese slowdown weighs on prices while carbon costs and stranded-asset risk hit thermal coal.",
    },
    quality_weights: QualityWeights {
        roe: 0.20,
        roa: 0.15,
        npm: 0.20,
        gpm: 0.10,
        revenue_cagr: 0.05,
        net_income_cagr: 0.10,
        fcf_cagr: 0.20,
    },
    valuation_multiples: &[
        band(Multiple::Per, 5.0, 30.0, 0.25),
        band(Multiple::Pbv, 0.5, 5.0, 0.10),
        band(Multiple::EvEbitda, 4.0, 20.0, 0.65),
    ],
    der_tolerance: STANDARD_DER,
};

pub static CONSUMER_GOODS: SectorConfig = SectorConfig {
    key: SectorKey::ConsumerGoods,
    label: "Consumer Goods / Retail",
    peers_idx: &["UNVR.JK", "ICBP.JK", "MYOR.JK"],
    peers_us: &["PG", "KO", "WMT"],
    peer_metrics: &["PER", "EBITDA Margin", "ROE"],
    valuation_metric: "PER",
    valuation_bands: bands((0.0, 15.0), (15.0, 25.0), (25.0, 40.0)),
    thesis: Thesis {
        bull: "A growing middle class drives premiumisation and e-commerce widens reach; pricing power protects margins through inflation.",
        base: "Volume grows 4-7% on distribution and innovation with stable margins; the brand moat supports a premium multiple.",
        bear: "Commodity and packaging costs squeeze gross margin while private labels take share from weakening consumers.",
    },
    quality_weights: QualityWeights {
        roe: 0.20,
        roa: 0.10,
        npm: 0.15,
        gpm: 0.25,
        revenue_cagr: 0.10,
        net_income_cagr: 0.10,
        fcf_cagr: 0.10,
    },
    valuation_multiples: &[
        band(Multiple::Per, 10.0, 40.0, 0.35),
        band(Multiple::Pbv, 2.0, 20.0, 0.05),
        band(Multiple::EvEbitda, 8.0, 25.0, 0.45),
        band(Multiple::Peg, 0.5, 3.0, 0.15),
    ],
    der_tolerance: MODERATE_DER,
};

pub static MANUFACTURING: SectorConfig = SectorConfig {
    key: SectorKey::Manufacturing,
    label: "Manufacturing",
    peers_idx: &["ASII.JK", "SMGR.JK", "INTP.JK"],
    peers_us: &["CAT", "GE", "MMM"],
    peer_metrics: &["PER", "EV/EBITDA", "Asset Turnover"],
    valuation_metric: "EV/EBITDA",
    valuation_bands: bands((0.0, 6.0), (6.0, 10.0), (10.0, 15.0)),
    thesis: Thesis {
        bull: "Infrastructure spending raises demand for cement and steel; import substitution lifts utilisation and diversification widens margins.",
        base: "Utilisation holds at 70-80% with revenue tracking GDP at 5-7%; maintenance capex keeps plants efficient.",
        bear: "Energy and raw-material inflation compresses gross margin and industry overcapacity triggers price wars.",
    },
    quality_weights: DEFAULT_QUALITY,
    valuation_multiples: DEFAULT_MULTIPLES,
    der_tolerance: STANDARD_DER,
};

pub static PROPERTY_CONSTRUCTION: SectorConfig = SectorConfig {
    key: SectorKey::PropertyConstruction,
    label: "Property & Construction",
    peers_idx: &["BSDE.JK", "SMRA.JK", "PWON.JK"],
    peers_us: &["PLD", "AMT", "SPG"],
    peer_metrics: &["PBV", "PER", "Gross Margin"],
    valuation_metric: "PBV",
    valuation_bands: bands((0.0, 0.5), (0.5, 1.0), (1.0, 2.0)),
    thesis: Thesis {
        bull: "Rate cuts revive mortgage demand and housing subsidies absorb inventory; recurring mall and hotel income grows steadily.",
        base: "Marketing sales grow 5-10% with recurring income as a buffer; most names keep trading at a discount to NAV.",
        bear: "Commercial oversupply pressures prices while high rates burden buyers and land-permit uncertainty stalls projects.",
    },
    quality_weights: DEFAULT_QUALITY,
    valuation_multiples: &[
        band(Multiple::Per, 5.0, 30.0, 0.25),
        band(Multiple::Pbv, 0.3, 2.0, 0.60),
        band(Multiple::EvEbitda, 4.0, 20.0, 0.15),
    ],
    der_tolerance: CAPEX_HEAVY_DER,
};

pub static LOGISTICS_TRANSPORT: SectorConfig = SectorConfig {
    key: SectorKey::LogisticsTransport,
    label: "Logistics & Transportation",
    peers_idx: &["SMDR.JK", "BIRD.JK", "GIAA.JK"],
    peers_us: &["UPS", "FDX", "DAL"],
    peer_metrics: &["EV/EBITDA", "Net Margin", "Asset Turnover"],
    valuation_metric: "EV/EBITDA",
    valuation_bands: bands((0.0, 5.0), (5.0, 9.0), (9.0, 14.0)),
    thesis: Thesis {
        bull: "E-commerce accelerates last-mile delivery and warehouse automation cuts costs; new routes improve asset utilisation.",
        base: "Volume grows with e-commerce penetration and route efficiency keeps margins stable on moderate fleet capex.",
        bear: "Fuel price spikes hit operating costs directly and digital platforms intensify competition for cyclical cargo.",
    },
    quality_weights: DEFAULT_QUALITY,
    valuation_multiples: DEFAULT_MULTIPLES,
    der_tolerance: CAPEX_HEAVY_DER,
};

pub static HEALTHCARE: SectorConfig = SectorConfig {
    key: SectorKey::Healthcare,
    label: "Healthcare & Pharmaceuticals",
    peers_idx: &["KLBF.JK", "SIDO.JK", "MIKA.JK"],
    peers_us: &["JNJ", "PFE", "UNH"],
    peer_metrics: &["PER", "Gross Margin", "ROE"],
    valuation_metric: "PER",
    valuation_bands: bands((0.0, 15.0), (15.0, 25.0), (25.0, 40.0)),
    thesis: Thesis {
        bull: "An ageing population raises demand and national insurance coverage widens the hospital patient base; new drugs drive growth.",
        base: "Revenue grows 8-12% with rising health awareness; branded products keep margins stable.",
        bear: "Regulated insurance tariffs squeeze margins and patent expiries open the door to generics.",
    },
    quality_weights: DEFAULT_QUALITY,
    valuation_multiples: DEFAULT_MULTIPLES,
    der_tolerance: MODERATE_DER,
};

pub static TECHNOLOGY: SectorConfig = SectorConfig {
    key: SectorKey::Technology,
    label: "Technology",
    peers_idx: &["BUKA.JK", "GOTO.JK", "EMTK.JK"],
    peers_us: &["AAPL", "MSFT", "GOOGL"],
    peer_metrics: &["P/S", "Gross Margin", "Revenue Growth"],
    valuation_metric: "PER",
    valuation_bands: bands((0.0, 20.0), (20.0, 40.0), (40.0, 80.0)),
    thesis: Thesis {
        bull: "AI and cloud adoption accelerate growth and gross margin expands with scale; network effects build durable moats.",
        base: "Revenue grows 15-25% on cloud and digital services with gross margin held above 60%.",
        bear: "Regulation raises compliance costs while a macro slowdown cuts enterprise IT budgets and SaaS pricing.",
    },
    quality_weights: QualityWeights {
        roe: 0.15,
        roa: 0.10,
        npm: 0.15,
        gpm: 0.15,
        revenue_cagr: 0.25,
        net_income_cagr: 0.10,
        fcf_cagr: 0.10,
    },
    valuation_multiples: &[
        band(Multiple::Per, 5.0, 40.0, 0.30),
        band(Multiple::Pbv, 0.5, 5.0, 0.10),
        band(Multiple::EvEbitda, 4.0, 30.0, 0.20),
        band(Multiple::Peg, 0.5, 4.0, 0.10),
        band(Multiple::PriceToSales, 3.0, 20.0, 0.30),
    ],
    der_tolerance: STANDARD_DER,
};

pub static GENERAL: SectorConfig = SectorConfig {
    key: SectorKey::Unknown,
    label: "General",
    peers_idx: &[],
    peers_us: &[],
    peer_metrics: &["PER", "PBV", "ROE"],
    valuation_metric: "PER",
    valuation_bands: bands((0.0, 10.0), (10.0, 20.0), (20.0, 35.0)),
    thesis: Thesis {
        bull: "Growth beats expectations and operating efficiency expands margins, prompting a re-rating.",
        base: "Growth tracks the industry with stable margins and a valuation near historical averages.",
        bear: "Competition compresses margins and growth slows below consensus.",
    },
    quality_weights: DEFAULT_QUALITY,
    valuation_multiples: DEFAULT_MULTIPLES,
    der_tolerance: STANDARD_DER,
};

/// Configuration record for a sector key; unknown sectors get [`GENERAL`].
pub fn config_for(key: SectorKey) -> &'static SectorConfig {
    match key {
        SectorKey::Banking => &BANKING,
        SectorKey::Telecom => &TELECOM,
        SectorKey::EnergyMining => &ENERGY_MINING,
        SectorKey::ConsumerGoods => &CONSUMER_GOODS,
        SectorKey::Manufacturing => &MANUFACTURING,
        SectorKey::PropertyConstruction => &PROPERTY_CONSTRUCTION,
        SectorKey::LogisticsTransport => &LOGISTICS_TRANSPORT,
        SectorKey::Healthcare => &HEALTHCARE,
        SectorKey::Technology => &TECHNOLOGY,
        SectorKey::Unknown => &GENERAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_quality_weights_sum_to_one() {
        for key in SectorKey::ALL {
            let weights = config_for(key).quality_weights;
            assert_abs_diff_eq!(weights.total(), 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_valuation_weights_sum_to_one() {
        for key in SectorKey::ALL {
            let total: f64 = config_for(key).valuation_multiples.iter().map(|b| b.weight).sum();
            assert_abs_diff_eq!(total, 1.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_bands_are_contiguous() {
        for key in SectorKey::ALL {
            let b = config_for(key).valuation_bands;
            assert_eq!(b.cheap.high, b.fair.low, "{key}");
            assert_eq!(b.fair.high, b.expensive.low, "{key}");
            assert!(b.cheap.low < b.cheap.high);
        }
    }

    #[test]
    fn test_config_keys_match_lookup() {
        for key in SectorKey::ALL {
            assert_eq!(config_for(key).key, key);
        }
    }

    #[test]
    fn test_bank_has_no_leverage_tolerance() {
        assert_eq!(config_for(SectorKey::Banking).der_tolerance, None);
        assert_eq!(config_for(SectorKey::Telecom).der_tolerance, Some(5.0));
        assert_eq!(config_for(SectorKey::Healthcare).der_tolerance, Some(4.0));
        assert_eq!(config_for(SectorKey::Unknown).der_tolerance, Some(3.0));
    }

    #[test]
    fn test_multiple_reads_ratio() {
        let ratios = RatioSet {
            price_to_sales: Some(4.2),
            ..Default::default()
        };
        assert_eq!(Multiple::PriceToSales.value(&ratios), Some(4.2));
        assert_eq!(Multiple::Per.value(&ratios), None);
        assert_eq!(Multiple::EvEbitda.name(), "EV/EBITDA");
    }
}
