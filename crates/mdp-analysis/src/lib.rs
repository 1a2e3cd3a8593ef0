//! MDP Analysis Library
//!
//! Descriptive statistics over ingested market data: typed OHLCV bars out of
//! the unified ingestion table, the usual per-symbol metrics (returns,
//! rolling windows, volatility, Sharpe ratio, beta, drawdown, VWAP), and
//! serializable summary reports with the composite risk score downstream
//! steps consume.

pub mod bars;
pub mod report;
pub mod stats;
