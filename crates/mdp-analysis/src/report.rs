//! Per-symbol summary reports
//!
//! Rolls the descriptive statistics up into one serializable report per
//! symbol, plus the composite risk score the downstream pipeline step is
//! triggered with.

use mdp_common::types::DataTable;
use mdp_common::{MdpError, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bars::{parse_bars, symbols, Bar};
use crate::stats;

/// Summary statistics for one symbol's bar series
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolReport {
    pub symbol: String,
    pub bar_count: usize,
    pub first_date: String,
    pub last_date: String,
    pub last_close: f64,
    pub annualized_volatility: Option<f64>,
    pub sharpe_ratio: Option<f64>,
    /// Beta against the designated market symbol's returns, when one is present
    pub beta: Option<f64>,
    pub max_drawdown: Option<f64>,
    pub vwap: Option<f64>,
    pub ma5: Option<f64>,
    pub ma20: Option<f64>,
    /// Composite 0-100 risk score forwarded to the downstream pipeline step
    pub risk_score: f64,
}

/// Build one report over a bar series
///
/// `market_returns`, when given, is the return series beta is measured
/// against. Errors when the series is empty; everything else degrades to
/// None fields.
pub fn build_report(
    symbol: &str,
    bars: &[Bar],
    annual_risk_free: f64,
    market_returns: Option<&[f64]>,
) -> Result<SymbolReport> {
    let (first, last) = match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            return Err(MdpError::InsufficientData(format!(
                "no bars for symbol {}",
                symbol
            )))
        },
    };

    let returns = stats::daily_returns(bars);
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();

    let annualized_volatility = stats::annualized_volatility(&returns);
    let max_drawdown = stats::max_drawdown(bars);

    let report = SymbolReport {
        symbol: symbol.to_string(),
        bar_count: bars.len(),
        first_date: first.date.to_string(),
        last_date: last.date.to_string(),
        last_close: last.close,
        annualized_volatility,
        sharpe_ratio: stats::sharpe_ratio(&returns, annual_risk_free),
        beta: market_returns.and_then(|market| stats::beta(&returns, market)),
        max_drawdown,
        vwap: stats::vwap(bars),
        ma5: stats::rolling_mean(&closes, 5).last().copied().flatten(),
        ma20: stats::rolling_mean(&closes, 20).last().copied().flatten(),
        risk_score: risk_score(annualized_volatility, max_drawdown),
    };

    debug!("Built report for {} over {} bars", symbol, bars.len());
    Ok(report)
}

/// Build reports for every symbol in a normalized table
///
/// Tables without a `symbol` column are treated as a single unnamed series.
/// When `market_symbol` names a symbol present in the table, its return
/// series is the market index every beta is measured against (the market's
/// own beta comes out as 1). Symbols whose bars cannot be extracted are
/// skipped, not fatal.
pub fn build_reports(
    table: &DataTable,
    annual_risk_free: f64,
    market_symbol: Option<&str>,
) -> Result<Vec<SymbolReport>> {
    let names = symbols(table);

    if names.is_empty() {
        let bars = parse_bars(table, None)?;
        return Ok(vec![build_report("*", &bars, annual_risk_free, None)?]);
    }

    let market_returns = match market_symbol {
        Some(market) if names.iter().any(|n| n == market) => {
            let bars = parse_bars(table, Some(market))?;
            Some(stats::daily_returns(&bars))
        },
        _ => None,
    };

    let mut reports = Vec::with_capacity(names.len());
    for name in &names {
        let bars = parse_bars(table, Some(name))?;
        match build_report(name, &bars, annual_risk_free, market_returns.as_deref()) {
            Ok(report) => reports.push(report),
            Err(e) => debug!("Skipping {}: {}", name, e),
        }
    }
    Ok(reports)
}

/// Composite risk score on a 0-100 scale
///
/// Weighted blend of annualized volatility (60%) and maximum drawdown (40%),
/// both expressed as percentages and capped at 100. Missing inputs count as
/// zero risk, matching how the notebooks treated short series.
pub fn risk_score(annualized_volatility: Option<f64>, max_drawdown: Option<f64>) -> f64 {
    let vol = annualized_volatility.unwrap_or(0.0) * 100.0;
    let dd = max_drawdown.unwrap_or(0.0) * 100.0;
    (vol * 0.6 + dd * 0.4).clamp(0.0, 100.0)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn table(csv_rows: &[&[&str]]) -> DataTable {
        let mut table =
            DataTable::with_columns(csv_rows[0].iter().map(|c| c.to_string()).collect());
        for row in &csv_rows[1..] {
            table.push_row(row.iter().map(|v| Some(v.to_string())).collect());
        }
        table
    }

    #[test]
    fn test_build_reports_per_symbol() {
        let table = table(&[
            &["date", "open", "high", "low", "close", "volume", "symbol"],
            &["2026-01-02", "10", "11", "9", "10.0", "1000", "AAPL"],
            &["2026-01-03", "10", "11", "9", "10.5", "1100", "AAPL"],
            &["2026-01-04", "10", "11", "9", "10.2", "1200", "AAPL"],
            &["2026-01-02", "20", "21", "19", "20.0", "500", "MSFT"],
            &["2026-01-03", "20", "21", "19", "19.0", "600", "MSFT"],
        ]);

        let reports = build_reports(&table, stats::DEFAULT_RISK_FREE_RATE, None).unwrap();
        assert_eq!(reports.len(), 2);

        let aapl = &reports[0];
        assert_eq!(aapl.symbol, "AAPL");
        assert_eq!(aapl.bar_count, 3);
        assert_eq!(aapl.first_date, "2026-01-02");
        assert_eq!(aapl.last_date, "2026-01-04");
        assert_eq!(aapl.last_close, 10.2);
        assert!(aapl.annualized_volatility.is_some());
        assert!(aapl.max_drawdown.is_some());

        let msft = &reports[1];
        // One return only: no volatility, risk driven by drawdown alone
        assert!(msft.annualized_volatility.is_none());
        assert!((msft.max_drawdown.unwrap() - 0.05).abs() < 1e-9);
        assert!((msft.risk_score - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_table_without_symbol_column_is_one_series() {
        let table = table(&[
            &["date", "open", "high", "low", "close", "volume"],
            &["2026-01-02", "10", "11", "9", "10.0", "1000"],
            &["2026-01-03", "10", "11", "9", "10.5", "1100"],
        ]);

        let reports = build_reports(&table, 0.02, Some("SPY")).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].symbol, "*");
        assert_eq!(reports[0].bar_count, 2);
        assert_eq!(reports[0].beta, None);
    }

    #[test]
    fn test_beta_against_market_symbol() {
        // SPY returns +10% / -10%; AAPL returns +20% / -20%: beta 2
        let table = table(&[
            &["date", "open", "high", "low", "close", "volume", "symbol"],
            &["2026-01-02", "100", "101", "99", "100.0", "1000", "SPY"],
            &["2026-01-03", "100", "111", "99", "110.0", "1000", "SPY"],
            &["2026-01-04", "100", "111", "98", "99.0", "1000", "SPY"],
            &["2026-01-02", "100", "101", "99", "100.0", "1000", "AAPL"],
            &["2026-01-03", "100", "121", "99", "120.0", "1000", "AAPL"],
            &["2026-01-04", "100", "121", "95", "96.0", "1000", "AAPL"],
        ]);

        let reports = build_reports(&table, 0.02, Some("SPY")).unwrap();
        assert_eq!(reports.len(), 2);

        let aapl = &reports[0];
        assert_eq!(aapl.symbol, "AAPL");
        assert!((aapl.beta.unwrap() - 2.0).abs() < 1e-9);

        let spy = &reports[1];
        assert_eq!(spy.symbol, "SPY");
        assert!((spy.beta.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_absent_market_symbol_leaves_beta_unset() {
        let table = table(&[
            &["date", "open", "high", "low", "close", "volume", "symbol"],
            &["2026-01-02", "10", "11", "9", "10.0", "1000", "AAPL"],
            &["2026-01-03", "10", "11", "9", "10.5", "1100", "AAPL"],
        ]);

        let reports = build_reports(&table, 0.02, Some("SPY")).unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].beta, None);
    }

    #[test]
    fn test_empty_series_is_insufficient_data() {
        let err = build_report("AAPL", &[], 0.02, None).unwrap_err();
        assert!(matches!(err, MdpError::InsufficientData(_)));
    }

    #[test]
    fn test_risk_score_caps_at_100() {
        assert_eq!(risk_score(Some(5.0), Some(1.0)), 100.0);
        assert_eq!(risk_score(None, None), 0.0);
    }
}
