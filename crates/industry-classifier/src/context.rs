use analysis_core::numeric::{finite, round_to, safe_div};
use analysis_core::{RatioSet, RawFinancials, SectorKey};
use serde::{Deserialize, Serialize};

use crate::classifier::classify;
use crate::config::{config_for, SectorConfig, Thesis, ValuationBands};

/// Raw figures the sector-specific ratio panel needs beyond the RatioSet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextInputs {
    pub revenue: Option<f64>,
    pub ebitda: Option<f64>,
    pub free_cash_flow: Option<f64>,
    pub capex: Option<f64>,
    pub market_cap: Option<f64>,
    pub total_debt: Option<f64>,
    pub total_cash: Option<f64>,
    pub total_assets: Option<f64>,
    pub net_interest_margin: Option<f64>,
    pub revenue_growth: Option<f64>,
}

impl ContextInputs {
    /// Latest annual statement values plus the quote-level extras.
    pub fn from_financials(raw: &RawFinancials) -> Self {
        let income = raw.income();
        let cash_flow = raw.cash_flow();
        let quote = &raw.quote;
        Self {
            revenue: income.and_then(|s| s.latest("Total Revenue")),
            ebitda: income.and_then(|s| s.latest("EBITDA")),
            free_cash_flow: cash_flow.and_then(|s| s.latest("Free Cash Flow")),
            capex: cash_flow.and_then(|s| s.latest("Capital Expenditure")),
            market_cap: finite(quote.market_cap),
            total_debt: finite(quote.total_debt),
            total_cash: finite(quote.total_cash),
            total_assets: finite(quote.total_assets),
            net_interest_margin: finite(quote.net_interest_margin),
            revenue_growth: finite(quote.revenue_growth),
        }
    }
}

/// One labelled entry of a sector's ratio panel, e.g. `("NIM (%)", 5.1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpecificRatio {
    pub label: String,
    pub value: Option<f64>,
}

fn nonzero(value: Option<f64>) -> Option<f64> {
    finite(value).filter(|v| *v != 0.0)
}

fn ratio_2dp(numerator: Option<f64>, denominator: Option<f64>, scale: f64) -> Option<f64> {
    safe_div(nonzero(numerator), denominator).map(|v| round_to(v * scale, 2))
}

/// The ordered ratio panel that matters for `key`'s sector.
pub fn specific_ratios(key: SectorKey, ratios: &RatioSet, inputs: &ContextInputs) -> Vec<SpecificRatio> {
    let ebitda_margin = ratio_2dp(inputs.ebitda, inputs.revenue, 100.0);
    let fcf_yield = ratio_2dp(inputs.free_cash_flow, inputs.market_cap, 100.0);
    let capex_revenue = ratio_2dp(inputs.capex.map(f64::abs), inputs.revenue, 100.0);
    let net_debt = inputs.total_debt.unwrap_or(0.0) - inputs.total_cash.unwrap_or(0.0);
    let net_debt_ebitda = safe_div(Some(net_debt), inputs.ebitda).map(|v| round_to(v, 2));
    let asset_turnover = ratio_2dp(inputs.revenue, inputs.total_assets, 1.0);
    let nim = inputs.net_interest_margin.map(|v| round_to(v * 100.0, 2));
    let revenue_growth = inputs.revenue_growth.map(|v| round_to(v * 100.0, 2));

    let per = ("PER (x)", ratios.per);
    let pbv = ("PBV (x)", ratios.pbv);
    let roe = ("ROE (%)", ratios.roe);
    let net_margin = ("Net Margin (%)", ratios.npm);
    let gross_margin = ("Gross Margin (%)", ratios.gpm);
    let ev_ebitda = ("EV/EBITDA (x)", ratios.ev_ebitda);
    let ebitda_margin = ("EBITDA Margin (%)", ebitda_margin);
    let nd_ebitda = ("Net Debt/EBITDA (x)", net_debt_ebitda);
    let capex_rev = ("CapEx/Revenue (%)", capex_revenue);
    let rev_growth = ("Revenue Growth (%)", revenue_growth);
    let fcf_yield = ("FCF Yield (%)", fcf_yield);
    let turnover = ("Asset Turnover (x)", asset_turnover);

    let panel: Vec<(&str, Option<f64>)> = match key {
        SectorKey::Banking => vec![
            ("NIM (%)", nim),
            pbv,
            roe,
            ("ROA (%)", ratios.roa),
            ("DER (x)", ratios.der),
            net_margin,
        ],
        SectorKey::Telecom => vec![ev_ebitda, ebitda_margin, nd_ebitda, capex_rev, rev_growth],
        SectorKey::EnergyMining => vec![ev_ebitda, ebitda_margin, gross_margin, nd_ebitda, fcf_yield, capex_rev],
        SectorKey::ConsumerGoods => vec![per, gross_margin, ebitda_margin, turnover, roe],
        SectorKey::Manufacturing => vec![ev_ebitda, gross_margin, turnover, capex_rev, roe],
        SectorKey::PropertyConstruction => vec![pbv, gross_margin, nd_ebitda, rev_growth, roe],
        SectorKey::LogisticsTransport => vec![ev_ebitda, net_margin, turnover, capex_rev, nd_ebitda],
        SectorKey::Healthcare => vec![per, gross_margin, ebitda_margin, roe, net_margin],
        SectorKey::Technology => vec![per, gross_margin, ebitda_margin, rev_growth, fcf_yield],
        SectorKey::Unknown => vec![per, pbv, roe, net_margin, rev_growth],
    };

    panel
        .into_iter()
        .map(|(label, value)| SpecificRatio {
            label: label.to_string(),
            value: finite(value),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Cheap,
    Fair,
    Expensive,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuationZone {
    pub metric: &'static str,
    pub current: Option<f64>,
    pub bands: ValuationBands,
    pub zone: Zone,
}

/// Place the sector's primary multiple within its cheap/fair/expensive bands.
///
/// The multiple is the first panel entry whose label starts with the
/// configured metric name. Absent or non-positive values give [`Zone::Unknown`].
pub fn valuation_zone(specific: &[SpecificRatio], config: &SectorConfig) -> ValuationZone {
    let current = specific
        .iter()
        .find(|r| r.label.starts_with(config.valuation_metric))
        .and_then(|r| r.value);

    let bands = config.valuation_bands;
    let zone = match current {
        Some(v) if v > 0.0 && v <= bands.cheap.high => Zone::Cheap,
        Some(v) if v > 0.0 && v <= bands.fair.high => Zone::Fair,
        Some(v) if v > 0.0 => Zone::Expensive,
        _ => Zone::Unknown,
    };

    ValuationZone {
        metric: config.valuation_metric,
        current,
        bands,
        zone,
    }
}

/// Comparable tickers: the Indonesian list for `.JK` symbols, the US list
/// otherwise. The symbol itself is excluded and at most two are returned.
pub fn select_peers(symbol: &str, config: &SectorConfig) -> Vec<String> {
    let symbol = symbol.to_uppercase();
    let pool = if symbol.ends_with(".JK") {
        config.peers_idx
    } else {
        config.peers_us
    };
    pool.iter()
        .filter(|peer| peer.to_uppercase() != symbol)
        .take(2)
        .map(|peer| peer.to_string())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Peers {
    pub tickers: Vec<String>,
    pub metrics: &'static [&'static str],
}

/// Everything the industry view reports for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryContext {
    pub sector_key: SectorKey,
    pub label: &'static str,
    pub sector: String,
    pub industry: String,
    pub specific_ratios: Vec<SpecificRatio>,
    pub valuation: ValuationZone,
    pub peers: Peers,
    pub thesis: Thesis,
    pub currency: Option<String>,
}

pub fn industry_context(raw: &RawFinancials, ratios: &RatioSet) -> IndustryContext {
    let sector = raw.quote.sector.clone().unwrap_or_default();
    let industry = raw.quote.industry.clone().unwrap_or_default();
    let sector_key = classify(&sector, &industry);
    let config = config_for(sector_key);

    let specific = specific_ratios(sector_key, ratios, &ContextInputs::from_financials(raw));
    let valuation = valuation_zone(&specific, config);

    IndustryContext {
        sector_key,
        label: config.label,
        sector,
        industry,
        specific_ratios: specific,
        valuation,
        peers: Peers {
            tickers: select_peers(&raw.symbol, config),
            metrics: config.peer_metrics,
        },
        thesis: config.thesis,
        currency: raw.quote.currency.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BANKING, GENERAL, TECHNOLOGY};
    use analysis_core::{FinancialStatement, QuoteSummary};
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn lookup(panel: &[SpecificRatio], label: &str) -> Option<f64> {
        panel.iter().find(|r| r.label == label).and_then(|r| r.value)
    }

    #[test]
    fn test_bank_panel() {
        let ratios = RatioSet {
            pbv: Some(2.1),
            roe: Some(18.0),
            ..Default::default()
        };
        let inputs = ContextInputs {
            net_interest_margin: Some(0.0512),
            ..Default::default()
        };
        let panel = specific_ratios(SectorKey::Banking, &ratios, &inputs);
        let labels: Vec<_> = panel.iter().map(|r| r.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["NIM (%)", "PBV (x)", "ROE (%)", "ROA (%)", "DER (x)", "Net Margin (%)"]
        );
        assert_relative_eq!(lookup(&panel, "NIM (%)").unwrap(), 5.12);
        assert_eq!(lookup(&panel, "ROA (%)"), None);
    }

    #[test]
    fn test_derived_metrics() {
        let inputs = ContextInputs {
            revenue: Some(1000.0),
            ebitda: Some(450.0),
            capex: Some(-180.0),
            total_debt: Some(900.0),
            total_cash: Some(0.0),
            ..Default::default()
        };
        let panel = specific_ratios(SectorKey::Telecom, &RatioSet::default(), &inputs);
        assert_relative_eq!(lookup(&panel, "EBITDA Margin (%)").unwrap(), 45.0);
        assert_relative_eq!(lookup(&panel, "CapEx/Revenue (%)").unwrap(), 18.0);
        assert_relative_eq!(lookup(&panel, "Net Debt/EBITDA (x)").unwrap(), 2.0);
        assert_eq!(lookup(&panel, "Revenue Growth (%)"), None);
    }

    #[test]
    fn test_zero_ebitda_collapses_to_absent() {
        let inputs = ContextInputs {
            revenue: Some(1000.0),
            ebitda: Some(0.0),
            ..Default::default()
        };
        let panel = specific_ratios(SectorKey::EnergyMining, &RatioSet::default(), &inputs);
        assert_eq!(lookup(&panel, "EBITDA Margin (%)"), None);
        assert_eq!(lookup(&panel, "Net Debt/EBITDA (x)"), None);
    }

    #[test]
    fn test_valuation_zone_bands() {
        let panel = |v: f64| {
            vec![SpecificRatio {
                label: "PBV (x)".to_string(),
                value: Some(v),
            }]
        };
        assert_eq!(valuation_zone(&panel(1.5), &BANKING).zone, Zone::Cheap);
        assert_eq!(valuation_zone(&panel(2.0), &BANKING).zone, Zone::Fair);
        assert_eq!(valuation_zone(&panel(6.0), &BANKING).zone, Zone::Expensive);
        assert_eq!(valuation_zone(&panel(-1.0), &BANKING).zone, Zone::Unknown);
        // No PER entry in the panel.
        assert_eq!(valuation_zone(&panel(2.0), &GENERAL).zone, Zone::Unknown);
    }

    #[test]
    fn test_select_peers() {
        assert_eq!(select_peers("bbri.jk", &BANKING), vec!["BBCA.JK", "BMRI.JK"]);
        assert_eq!(select_peers("JPM", &BANKING), vec!["BAC", "WFC"]);
        assert_eq!(select_peers("NVDA", &TECHNOLOGY), vec!["AAPL", "MSFT"]);
        assert!(select_peers("XYZ", &GENERAL).is_empty());
    }

    #[test]
    fn test_industry_context_end_to_end() {
        let income = FinancialStatement::new().with_period(
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
            [("Total Revenue", 500.0), ("EBITDA", 100.0)],
        );
        let raw = RawFinancials {
            quote: QuoteSummary {
                sector: Some("Technology".to_string()),
                industry: Some("Software - Application".to_string()),
                currency: Some("USD".to_string()),
                ..Default::default()
            },
            income_statement: Some(income),
            ..RawFinancials::new("MSFT")
        };
        let ratios = RatioSet {
            per: Some(30.0),
            ..Default::default()
        };
        let ctx = industry_context(&raw, &ratios);
        assert_eq!(ctx.sector_key, SectorKey::Technology);
        assert_eq!(ctx.valuation.zone, Zone::Fair);
        assert_eq!(ctx.peers.tickers, vec!["AAPL", "GOOGL"]);
        assert_relative_eq!(lookup(&ctx.specific_ratios, "EBITDA Margin (%)").unwrap(), 20.0);

        let json = serde_json::to_value(&ctx).unwrap();
        assert_eq!(json["sector_key"], "technology");
        assert_eq!(json["valuation"]["zone"], "fair");
        assert_eq!(json["valuation"]["bands"]["cheap"]["high"], 20.0);
    }
}
