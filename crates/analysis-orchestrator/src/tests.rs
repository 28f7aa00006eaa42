#[cfg(test)]
mod orchestrator_tests {
    use crate::{AnalysisOrchestrator, EngineConfig};
    use analysis_core::{AnalysisError, RawFinancials, SectorKey};
    use approx::assert_relative_eq;
    use serde_json::{json, Value};

    fn bank_fixture() -> RawFinancials {
        serde_json::from_value(json!({
            "symbol": "BBRI.JK",
            "quote": {
                "longName": "Bank Rakyat Indonesia",
                "sector": "Financial Services",
                "industry": "Banks - Regional",
                "currency": "IDR",
                "currentPrice": 50.0,
                "marketCap": 5000.0,
                "sharesOutstanding": 100.0,
                "beta": 0.9,
                "netInterestMargin": 0.055,
                "payoutRatio": 0.6
            },
            "income_statement": {
                "2022-12-31": { "Total Revenue": 800.0, "Net Income": 80.0, "Basic EPS": 1.6 },
                "2023-12-31": { "Total Revenue": 900.0, "Net Income": 100.0, "Basic EPS": 2.0 },
                "2024-12-31": {
                    "Total Revenue": 1000.0,
                    "Net Income": 125.0,
                    "Gross Profit": 600.0,
                    "Basic EPS": 2.5
                }
            },
            "balance_sheet": {
                "2023-12-31": { "Stockholders Equity": 600.0, "Total Assets": 6000.0 },
                "2024-12-31": {
                    "Stockholders Equity": 625.0,
                    "Total Assets": 6250.0,
                    "Total Debt": 300.0,
                    "Cash And Cash Equivalents": 50.0
                }
            },
            "cash_flow": {
                "2022-12-31": { "Free Cash Flow": 90.0 },
                "2023-12-31": { "Free Cash Flow": 100.0 },
                "2024-12-31": { "Free Cash Flow": 120.0 }
            }
        }))
        .unwrap()
    }

    fn report_json(raw: &RawFinancials) -> Value {
        let report = AnalysisOrchestrator::default().analyze(raw).unwrap();
        serde_json::to_value(&report).unwrap()
    }

    #[test]
    fn test_bank_end_to_end() {
        let raw = bank_fixture();
        let report = AnalysisOrchestrator::default().analyze(&raw).unwrap();

        assert_eq!(report.symbol, "BBRI.JK");
        assert_eq!(report.name.as_deref(), Some("Bank Rakyat Indonesia"));
        assert_eq!(report.sector_key, SectorKey::Banking);
        assert_eq!(report.industry.peers.tickers, vec!["BBCA.JK", "BMRI.JK"]);

        // P/E 50 / 2.5 and EPS growth 25%.
        assert_relative_eq!(report.ratios.per.unwrap(), 20.0, max_relative = 1e-12);
        assert_relative_eq!(report.ratios.peg.unwrap(), 0.8, max_relative = 1e-12);
        assert_relative_eq!(report.ratios.roe.unwrap(), 20.0, max_relative = 1e-12);

        // Banks carry no leverage inputs: risk is beta alone, (3 - 0.9) / 3.
        assert_eq!(report.scores.risk.score, Some(70.0));
        assert_eq!(report.scores.risk.metric("DER"), None);
        assert!(report.scores.composite.composite_score.is_some());
        assert!(report.recommendation().is_some());

        let dcf = report.valuation.dcf.estimate().unwrap();
        assert_eq!(dcf.fcf_base, 120.0);
        assert_eq!(dcf.net_debt, 250.0);
        assert!(dcf.valuation.intrinsic_per_share.is_some());
        assert!(dcf.upside_pct.is_some());

        let pbv = report.valuation.justified_pbv.estimate().unwrap();
        assert_relative_eq!(pbv.book_value_per_share, 6.25, max_relative = 1e-12);
        assert!(report.valuation.ddm.is_failed());
    }

    #[test]
    fn test_report_json_shape() {
        let json = report_json(&bank_fixture());

        assert_eq!(json["sector_key"], "banking");
        assert_eq!(json["ratios"]["PER"], 20.0);
        assert_eq!(
            json["valuation"]["ddm"],
            json!({ "error": "This stock does not pay dividends, DDM not applicable" })
        );
        assert_eq!(json["valuation"]["projection"]["metric"], "Total Revenue");
        assert_eq!(
            json["valuation"]["projection"]["historical_labels"],
            json!(["2022-12-31", "2023-12-31", "2024-12-31"])
        );
        assert_eq!(json["valuation"]["sensitivity"]["wacc_labels"][0], "8.0%");
        assert!(json["industry"]["thesis"]["bull"].is_string());
    }

    #[test]
    fn test_peg_scale_matches_implied_peg() {
        // Same growth on both sides: 25% EPS growth vs a 0.25 DCF growth rate.
        let config = EngineConfig {
            dcf_growth_rate: 0.25,
            ..Default::default()
        };
        let report = AnalysisOrchestrator::new(config).analyze(&bank_fixture()).unwrap();
        let ratio_peg = report.ratios.peg.unwrap();
        let implied = report.valuation.implied_peg.unwrap();
        assert_relative_eq!(ratio_peg, implied, max_relative = 1e-12);
        assert!(implied < 10.0);
    }

    #[test]
    fn test_no_data_is_an_error() {
        let err = AnalysisOrchestrator::default()
            .analyze(&RawFinancials::new("EMPTY"))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::NoData(ref s) if s == "EMPTY"));
    }

    #[test]
    fn test_quote_only_yields_partial_report() {
        let raw: RawFinancials = serde_json::from_value(json!({
            "symbol": "MSFT",
            "quote": {
                "sector": "Technology",
                "industry": "Software - Infrastructure",
                "trailingPE": 35.0,
                "beta": 1.2,
                "debtToEquity": 0.4,
                "currentRatio": 1.8
            }
        }))
        .unwrap();
        let report = AnalysisOrchestrator::default().analyze(&raw).unwrap();

        assert_eq!(report.sector_key, SectorKey::Technology);
        assert!(report.trends.annual.is_empty());
        assert!(report.scores.risk.score.is_some());
        assert!(report.valuation.dcf.is_failed());
        assert!(report.valuation.projection.is_failed());
        assert_eq!(report.industry.peers.tickers.len(), 2);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let batch = vec![RawFinancials::new("EMPTY"), bank_fixture()];
        let results = AnalysisOrchestrator::default().analyze_many(&batch);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "EMPTY");
        assert!(results[0].1.is_err());
        assert_eq!(results[1].0, "BBRI.JK");
        assert!(results[1].1.is_ok());
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let raw = bank_fixture();
        assert_eq!(report_json(&raw), report_json(&raw));
    }

    #[test]
    fn test_config_reaches_engines() {
        let config = EngineConfig {
            dcf_wacc: 0.02,
            ..Default::default()
        };
        let orchestrator = AnalysisOrchestrator::new(config);
        assert_eq!(orchestrator.config().dcf_wacc, 0.02);

        // WACC below terminal growth fails the DCF but nothing else.
        let report = orchestrator.analyze(&bank_fixture()).unwrap();
        assert!(report.valuation.dcf.is_failed());
        assert!(report.valuation.justified_pbv.estimate().is_some());
    }
}
