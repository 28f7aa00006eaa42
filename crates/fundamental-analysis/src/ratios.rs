//! Ratio derivation from raw statement line items.
//!
//! Each ratio is first computed from the most recent statement period. When
//! that fails (missing line item, zero divisor, non-finite quotient) the
//! equivalent pre-computed quote-summary field is used instead.

use analysis_core::numeric::{decimal_to_percent, finite, safe_div};
use analysis_core::{FinancialStatement, QuoteSummary, RatioSet};

use crate::growth::growth;

const EPS: &[&str] = &["Basic EPS", "Diluted EPS"];
const EQUITY: &[&str] = &["Stockholders Equity", "Total Stockholders Equity"];

/// Latest-period line items the ratios are built from.
#[derive(Debug, Clone, Default)]
struct StatementInputs {
    revenue: Option<f64>,
    net_income: Option<f64>,
    gross_profit: Option<f64>,
    eps: Option<f64>,
    ebitda: Option<f64>,
    eps_growth: Option<f64>,
    equity: Option<f64>,
    total_assets: Option<f64>,
    total_debt: Option<f64>,
    current_assets: Option<f64>,
    current_liabilities: Option<f64>,
    cash: Option<f64>,
}

impl StatementInputs {
    fn extract(income: Option<&FinancialStatement>, balance: Option<&FinancialStatement>) -> Self {
        let mut inputs = Self::default();

        if let Some(income) = income {
            inputs.revenue = income.latest("Total Revenue");
            inputs.net_income = income.latest("Net Income");
            inputs.gross_profit = income.latest("Gross Profit");
            inputs.eps = income.first_nonzero(0, EPS);
            inputs.ebitda = income.latest("EBITDA");

            // EPS growth in percent, from the two most recent annual periods.
            let current = income.value(0, "Basic EPS").filter(|v| *v != 0.0);
            let previous = income.value(1, "Basic EPS");
            inputs.eps_growth = current.and_then(|c| growth(Some(c), previous));
        }

        if let Some(balance) = balance {
            inputs.equity = balance.first_value(0, EQUITY);
            inputs.total_assets = balance.latest("Total Assets");
            inputs.total_debt = balance.latest("Total Debt");
            inputs.current_assets = balance.latest("Current Assets");
            inputs.current_liabilities = balance.latest("Current Liabilities");
            inputs.cash = balance.latest("Cash And Cash Equivalents");
        }

        inputs
    }
}

pub fn price_to_earnings(price: Option<f64>, eps: Option<f64>) -> Option<f64> {
    safe_div(price, eps)
}

pub fn price_to_book(price: Option<f64>, book_value_per_share: Option<f64>) -> Option<f64> {
    safe_div(price, book_value_per_share)
}

/// Return on equity, percent.
pub fn return_on_equity(net_income: Option<f64>, equity: Option<f64>) -> Option<f64> {
    safe_div(net_income, equity).map(|r| r * 100.0)
}

/// Return on assets, percent.
pub fn return_on_assets(net_income: Option<f64>, total_assets: Option<f64>) -> Option<f64> {
    safe_div(net_income, total_assets).map(|r| r * 100.0)
}

/// Net profit margin, percent.
pub fn net_margin(net_income: Option<f64>, revenue: Option<f64>) -> Option<f64> {
    safe_div(net_income, revenue).map(|r| r * 100.0)
}

/// Gross profit margin, percent.
pub fn gross_margin(gross_profit: Option<f64>, revenue: Option<f64>) -> Option<f64> {
    safe_div(gross_profit, revenue).map(|r| r * 100.0)
}

pub fn debt_to_equity(total_debt: Option<f64>, equity: Option<f64>) -> Option<f64> {
    safe_div(total_debt, equity)
}

pub fn current_ratio(current_assets: Option<f64>, current_liabilities: Option<f64>) -> Option<f64> {
    safe_div(current_assets, current_liabilities)
}

/// EV/EBITDA with enterprise value = market cap + total debt - cash.
///
/// Missing debt or cash count as zero; market cap and EBITDA are required.
pub fn ev_to_ebitda(
    market_cap: Option<f64>,
    total_debt: Option<f64>,
    cash: Option<f64>,
    ebitda: Option<f64>,
) -> Option<f64> {
    let market_cap = finite(market_cap)?;
    let enterprise_value = market_cap + finite(total_debt).unwrap_or(0.0) - finite(cash).unwrap_or(0.0);
    safe_div(Some(enterprise_value), ebitda)
}

/// PEG = P/E divided by earnings growth expressed in percent (15.0, not 0.15).
pub fn peg(per: Option<f64>, earnings_growth_pct: Option<f64>) -> Option<f64> {
    let per = finite(per).filter(|p| *p != 0.0)?;
    safe_div(Some(per), earnings_growth_pct)
}

/// Derive the full ratio set for one ticker.
///
/// Takes the whole statement set; none of the thirteen ratios reads the
/// cash-flow statement yet.
pub fn compute_ratios(
    quote: &QuoteSummary,
    income: Option<&FinancialStatement>,
    balance: Option<&FinancialStatement>,
    _cash_flow: Option<&FinancialStatement>,
) -> RatioSet {
    let inputs = StatementInputs::extract(income, balance);

    let price = quote.price();
    let market_cap = finite(quote.market_cap);
    let shares = finite(quote.shares_outstanding).filter(|s| *s != 0.0);
    let book_value_per_share = safe_div(inputs.equity.filter(|e| *e != 0.0), shares);

    let per = price_to_earnings(price, inputs.eps);

    let mut ratios = RatioSet {
        per,
        pbv: price_to_book(price, book_value_per_share),
        roe: return_on_equity(inputs.net_income, inputs.equity),
        roa: return_on_assets(inputs.net_income, inputs.total_assets),
        npm: net_margin(inputs.net_income, inputs.revenue),
        gpm: gross_margin(inputs.gross_profit, inputs.revenue),
        der: debt_to_equity(inputs.total_debt, inputs.equity),
        current_ratio: current_ratio(inputs.current_assets, inputs.current_liabilities),
        ev_ebitda: ev_to_ebitda(market_cap, inputs.total_debt, inputs.cash, inputs.ebitda),
        peg: peg(per, inputs.eps_growth),
        beta: finite(quote.beta),
        dividend_yield: None,
        price_to_sales: safe_div(market_cap, inputs.revenue),
    };

    // Quote-summary fallbacks for anything the statements could not provide.
    ratios.per = ratios.per.or_else(|| finite(quote.trailing_pe));
    ratios.pbv = ratios.pbv.or_else(|| finite(quote.price_to_book));
    ratios.roe = ratios.roe.or_else(|| decimal_to_percent(quote.return_on_equity));
    ratios.roa = ratios.roa.or_else(|| decimal_to_percent(quote.return_on_assets));
    ratios.npm = ratios.npm.or_else(|| decimal_to_percent(quote.profit_margins));
    ratios.gpm = ratios.gpm.or_else(|| decimal_to_percent(quote.gross_margins));
    ratios.der = ratios.der.or_else(|| finite(quote.debt_to_equity));
    ratios.current_ratio = ratios.current_ratio.or_else(|| finite(quote.current_ratio));
    ratios.ev_ebitda = ratios.ev_ebitda.or_else(|| finite(quote.enterprise_to_ebitda));
    ratios.peg = ratios.peg.or_else(|| finite(quote.peg_ratio));
    ratios.price_to_sales = ratios.price_to_sales.or_else(|| finite(quote.price_to_sales));
    ratios.dividend_yield = decimal_to_percent(quote.dividend_yield);

    ratios
}
