//! analyzer-cli: run the full fundamental analysis over raw-financials JSON files.
//!
//! Each input file holds one ticker's quote summary and statements. Reports are
//! written to stdout as a JSON array in input order; a ticker that cannot be
//! analysed contributes a `{"symbol", "error"}` record instead.
//!
//! Usage:
//!   cargo run -p analyzer-cli -- data/BBCA.JK.json data/AAPL.json
//!   cargo run -p analyzer-cli -- --pretty --concurrency 8 data/*.json

use analysis_core::RawFinancials;
use analysis_orchestrator::{AnalysisOrchestrator, EngineConfig};
use anyhow::Context;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Max tickers analysed in parallel
const DEFAULT_CONCURRENCY: usize = 4;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "analyzer_cli=info,analysis_orchestrator=info".into()),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let pretty = args.iter().any(|a| a == "--pretty");

    let concurrency_idx = args.iter().position(|a| a == "--concurrency");
    let concurrency: usize = concurrency_idx
        .and_then(|i| args.get(i + 1))
        .and_then(|v| v.parse().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_CONCURRENCY);

    let files: Vec<PathBuf> = args
        .iter()
        .enumerate()
        .filter(|(i, a)| !a.starts_with("--") && concurrency_idx.map_or(true, |c| *i != c + 1))
        .map(|(_, a)| PathBuf::from(a))
        .collect();

    if files.is_empty() {
        eprintln!("Usage:");
        eprintln!("  analyzer-cli [OPTIONS] FILE...      Analyse raw-financials JSON files");
        eprintln!();
        eprintln!("Options:");
        eprintln!("  --pretty           Pretty-print the JSON output");
        eprintln!("  --concurrency N    Max parallel tickers (default: {})", DEFAULT_CONCURRENCY);
        eprintln!();
        eprintln!("Model assumptions are read from the environment (DCF_WACC, COST_OF_EQUITY, ...).");
        std::process::exit(1);
    }

    let config = EngineConfig::from_env().context("invalid engine configuration")?;
    tracing::info!(
        "analyzer-cli: {} files, concurrency={}, wacc={}, growth={}",
        files.len(),
        concurrency,
        config.dcf_wacc,
        config.dcf_growth_rate
    );

    let orchestrator = Arc::new(AnalysisOrchestrator::new(config));
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let failed = Arc::new(AtomicU64::new(0));
    let total = files.len();

    let mut handles = Vec::with_capacity(total);
    for path in files {
        let orchestrator = Arc::clone(&orchestrator);
        let semaphore = Arc::clone(&semaphore);
        let failed = Arc::clone(&failed);

        handles.push(tokio::spawn(async move {
            let _permit = semaphore.acquire_owned().await?;
            let label = symbol_hint(&path);
            let record = tokio::task::spawn_blocking(move || analyze_file(&orchestrator, &path)).await?;

            match record {
                Ok(report) => Ok::<Value, anyhow::Error>(report),
                Err(e) => {
                    failed.fetch_add(1, Ordering::Relaxed);
                    tracing::warn!("{} failed: {:#}", label, e);
                    Ok(json!({ "symbol": label, "error": format!("{:#}", e) }))
                }
            }
        }));
    }

    let mut reports = Vec::with_capacity(total);
    for handle in handles {
        reports.push(handle.await??);
    }

    let output = Value::Array(reports);
    let rendered = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", rendered);

    tracing::info!(
        "Done! {} tickers ({} failed)",
        total,
        failed.load(Ordering::Relaxed)
    );
    Ok(())
}

fn analyze_file(orchestrator: &AnalysisOrchestrator, path: &Path) -> anyhow::Result<Value> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let mut raw: RawFinancials = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a raw-financials document", path.display()))?;
    if raw.symbol.is_empty() {
        raw.symbol = symbol_hint(path);
    }

    let report = orchestrator.analyze(&raw)?;
    Ok(serde_json::to_value(&report)?)
}

/// Ticker implied by a file name such as `BBCA.JK.json`.
fn symbol_hint(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symbol_hint_keeps_exchange_suffix() {
        assert_eq!(symbol_hint(Path::new("data/BBCA.JK.json")), "BBCA.JK");
        assert_eq!(symbol_hint(Path::new("AAPL")), "AAPL");
    }

    #[test]
    fn test_unreadable_file_is_an_error() {
        let orchestrator = AnalysisOrchestrator::default();
        let err = analyze_file(&orchestrator, Path::new("/nonexistent/XYZ.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
