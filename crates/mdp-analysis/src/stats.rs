//! Descriptive statistics over daily bars
//!
//! The usual per-symbol metrics: close-to-close returns, rolling windows,
//! annualized volatility, Sharpe ratio, beta against a market series, maximum
//! drawdown, and VWAP. Conventions follow the upstream analysis notebooks:
//! 252 trading days per year, sample standard deviation, typical price
//! (H+L+C)/3 for VWAP.

use crate::bars::Bar;

/// Trading days per year used for annualization
pub const TRADING_DAYS: f64 = 252.0;

/// Default annual risk-free rate
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;

/// Arithmetic mean; None for an empty slice
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); None for fewer than 2 values
pub fn std_dev(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(var.sqrt())
}

/// Fractional period-over-period change of a series
///
/// Output has one fewer element than the input. Zero previous values yield
/// no entry rather than an infinite return.
pub fn pct_change(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Daily close-to-close fractional returns
pub fn daily_returns(bars: &[Bar]) -> Vec<f64> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    pct_change(&closes)
}

/// Rolling mean; positions before the window fills are None
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| mean(w))
}

/// Rolling sample standard deviation; positions before the window fills are None
pub fn rolling_std(values: &[f64], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, |w| std_dev(w))
}

fn rolling<F>(values: &[f64], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                f(&values[i + 1 - window..=i])
            }
        })
        .collect()
}

/// Annualized volatility: std of daily returns scaled by sqrt(252)
pub fn annualized_volatility(returns: &[f64]) -> Option<f64> {
    Some(std_dev(returns)? * TRADING_DAYS.sqrt())
}

/// Annualized Sharpe ratio over daily returns
///
/// Excess return over the daily risk-free rate, mean over std, scaled by
/// sqrt(252). None when the excess returns have no spread.
pub fn sharpe_ratio(returns: &[f64], annual_risk_free: f64) -> Option<f64> {
    let daily_rf = annual_risk_free / TRADING_DAYS;
    let excess: Vec<f64> = returns.iter().map(|r| r - daily_rf).collect();

    let sd = std_dev(&excess)?;
    if sd == 0.0 {
        return None;
    }
    Some(mean(&excess)? / sd * TRADING_DAYS.sqrt())
}

/// Beta of an asset against a market return series
///
/// Sample covariance over market variance, on the overlapping prefix of the
/// two series. None when the market has no variance.
pub fn beta(asset_returns: &[f64], market_returns: &[f64]) -> Option<f64> {
    let n = asset_returns.len().min(market_returns.len());
    if n < 2 {
        return None;
    }
    let asset = &asset_returns[..n];
    let market = &market_returns[..n];

    let mean_a = mean(asset)?;
    let mean_m = mean(market)?;

    let cov = asset
        .iter()
        .zip(market)
        .map(|(a, m)| (a - mean_a) * (m - mean_m))
        .sum::<f64>()
        / (n - 1) as f64;
    let var_m =
        market.iter().map(|m| (m - mean_m).powi(2)).sum::<f64>() / (n - 1) as f64;

    if var_m == 0.0 {
        return None;
    }
    Some(cov / var_m)
}

/// Maximum drawdown on closes, as a positive fraction of the peak
///
/// 0.25 means a 25% peak-to-trough decline somewhere in the series.
pub fn max_drawdown(bars: &[Bar]) -> Option<f64> {
    let mut peak = f64::MIN;
    let mut worst = 0.0f64;

    if bars.is_empty() {
        return None;
    }

    for bar in bars {
        peak = peak.max(bar.close);
        if peak > 0.0 {
            worst = worst.max((peak - bar.close) / peak);
        }
    }
    Some(worst)
}

/// Volume-weighted average price over the whole series
///
/// Typical price (high + low + close) / 3 weighted by volume. None when
/// total volume is zero.
pub fn vwap(bars: &[Bar]) -> Option<f64> {
    let total_volume: f64 = bars.iter().map(|b| b.volume).sum();
    if total_volume == 0.0 {
        return None;
    }
    let weighted: f64 = bars
        .iter()
        .map(|b| (b.high + b.low + b.close) / 3.0 * b.volume)
        .sum();
    Some(weighted / total_volume)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 100.0,
        }
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_pct_change() {
        let changes = pct_change(&[100.0, 110.0, 99.0]);
        assert_eq!(changes.len(), 2);
        assert!(close(changes[0], 0.10));
        assert!(close(changes[1], -0.10));
    }

    #[test]
    fn test_pct_change_skips_zero_base() {
        let changes = pct_change(&[0.0, 10.0, 20.0]);
        assert_eq!(changes.len(), 1);
        assert!(close(changes[0], 1.0));
    }

    #[test]
    fn test_mean_and_std() {
        assert!(close(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0));
        // Sample std of [2, 4, 4, 4, 5, 5, 7, 9] is ~2.138
        let sd = std_dev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert!(close(sd, (32.0f64 / 7.0).sqrt()));
        assert!(std_dev(&[1.0]).is_none());
        assert!(mean(&[]).is_none());
    }

    #[test]
    fn test_rolling_mean_window_fill() {
        let out = rolling_mean(&[1.0, 2.0, 3.0, 4.0], 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!(close(out[2].unwrap(), 2.0));
        assert!(close(out[3].unwrap(), 3.0));
    }

    #[test]
    fn test_daily_returns_from_bars() {
        let bars = vec![bar(2, 100.0), bar(3, 101.0), bar(4, 99.0)];
        let returns = daily_returns(&bars);
        assert_eq!(returns.len(), 2);
        assert!(close(returns[0], 0.01));
    }

    #[test]
    fn test_sharpe_zero_spread_is_none() {
        assert!(sharpe_ratio(&[0.01, 0.01, 0.01], 0.0).is_none());
    }

    #[test]
    fn test_sharpe_sign_follows_excess_return() {
        let up = sharpe_ratio(&[0.01, 0.02, 0.015, 0.012], 0.02).unwrap();
        assert!(up > 0.0);
        let down = sharpe_ratio(&[-0.01, -0.02, -0.015, -0.012], 0.02).unwrap();
        assert!(down < 0.0);
    }

    #[test]
    fn test_beta_of_market_against_itself_is_one() {
        let market = [0.01, -0.02, 0.005, 0.012, -0.004];
        assert!(close(beta(&market, &market).unwrap(), 1.0));
    }

    #[test]
    fn test_beta_scales_with_leverage() {
        let market = [0.01, -0.02, 0.005, 0.012, -0.004];
        let levered: Vec<f64> = market.iter().map(|r| 2.0 * r).collect();
        assert!(close(beta(&levered, &market).unwrap(), 2.0));
    }

    #[test]
    fn test_max_drawdown() {
        // Peak 120, trough 90: drawdown 25%
        let bars = vec![bar(2, 100.0), bar(3, 120.0), bar(4, 90.0), bar(5, 110.0)];
        assert!(close(max_drawdown(&bars).unwrap(), 0.25));
    }

    #[test]
    fn test_max_drawdown_monotone_series_is_zero() {
        let bars = vec![bar(2, 100.0), bar(3, 110.0), bar(4, 120.0)];
        assert!(close(max_drawdown(&bars).unwrap(), 0.0));
        assert!(max_drawdown(&[]).is_none());
    }

    #[test]
    fn test_vwap_weights_by_volume() {
        let mut heavy = bar(2, 10.0); // typical price 10
        heavy.volume = 300.0;
        let mut light = bar(3, 20.0); // typical price 20
        light.volume = 100.0;

        // (10*300 + 20*100) / 400 = 12.5
        assert!(close(vwap(&[heavy, light]).unwrap(), 12.5));
    }

    #[test]
    fn test_vwap_zero_volume_is_none() {
        let mut b = bar(2, 10.0);
        b.volume = 0.0;
        assert!(vwap(&[b]).is_none());
    }
}
