//! # Return Statistics
//!
//! $$
//! R_{ann} = (1+\bar r)^{252} - 1, \qquad
//! \sigma_{ann} = \sigma_{daily}\sqrt{252}
//! $$
//!
//! Pure per-series statistics: annualization, cumulative returns, drawdown,
//! empirical VaR/CVaR and rolling volatility. Percent-valued outputs share a
//! 3-decimal display rounding applied at the boundary only; intermediate
//! values stay unrounded so optimizer objectives are not quantized.

use serde::Deserialize;
use serde::Serialize;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::types::ReturnsTable;

/// Trading days per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Annualized volatility below this is treated as degenerate for Sharpe.
pub const MIN_VOLATILITY: f64 = 1e-9;

/// Round to the 3-decimal display contract.
pub fn round3(x: f64) -> f64 {
  (x * 1000.0).round() / 1000.0
}

fn mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

// Annual volatility annualizes the biased daily estimator, matching the
// dashboard this engine backs.
fn population_std(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    return 0.0;
  }
  let m = mean(xs);
  let mut acc = 0.0;
  for &x in xs {
    let d = x - m;
    acc += d * d;
  }
  (acc / xs.len() as f64).sqrt()
}

fn sample_std(xs: &[f64]) -> f64 {
  if xs.len() < 2 {
    return 0.0;
  }
  let m = mean(xs);
  let mut acc = 0.0;
  for &x in xs {
    let d = x - m;
    acc += d * d;
  }
  (acc / (xs.len() - 1) as f64).sqrt()
}

/// Annualized return of a daily simple-return series, percent.
pub fn annualized_return(daily: &[f64]) -> f64 {
  if daily.is_empty() {
    return 0.0;
  }
  ((1.0 + mean(daily)).powf(TRADING_DAYS) - 1.0) * 100.0
}

/// Annualized volatility of a daily simple-return series, percent.
pub fn annualized_volatility(daily: &[f64]) -> f64 {
  population_std(daily) * TRADING_DAYS.sqrt() * 100.0
}

/// Sharpe ratio from a daily series and a percent risk-free rate.
///
/// Fails with [`PortfolioError::DegenerateVolatility`] instead of producing
/// an infinite or NaN ratio when the series has (near) zero volatility.
pub fn sharpe_ratio(daily: &[f64], risk_free: f64) -> Result<f64> {
  let vol = annualized_volatility(daily);
  if vol < MIN_VOLATILITY {
    return Err(PortfolioError::DegenerateVolatility { volatility: vol });
  }
  Ok((annualized_return(daily) - risk_free) / vol)
}

/// Cumulative return series `cumprod(1 + r) - 1`, unrounded.
pub fn cumulative_returns(daily: &[f64]) -> Vec<f64> {
  let mut wealth = 1.0;
  daily
    .iter()
    .map(|r| {
      wealth *= 1.0 + r;
      wealth - 1.0
    })
    .collect()
}

/// Drawdown and running max-drawdown series, as fractions of peak wealth.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawdownSeries {
  /// `wealth / running_max(wealth) - 1` per date; 0 at every new peak.
  pub drawdown: Vec<f64>,
  /// Running minimum of `drawdown`, monotonically non-increasing.
  pub max_drawdown: Vec<f64>,
}

impl DrawdownSeries {
  /// Copy with both series rounded to 3 decimals for display.
  pub fn rounded(&self) -> Self {
    Self {
      drawdown: self.drawdown.iter().map(|x| round3(*x)).collect(),
      max_drawdown: self.max_drawdown.iter().map(|x| round3(*x)).collect(),
    }
  }
}

/// Historical drawdown of a daily return series.
pub fn drawdown(daily: &[f64]) -> DrawdownSeries {
  let mut wealth = 1.0;
  let mut running_max = f64::NEG_INFINITY;
  let mut running_min = f64::INFINITY;
  let mut dd = Vec::with_capacity(daily.len());
  let mut mdd = Vec::with_capacity(daily.len());

  for r in daily {
    wealth *= 1.0 + r;
    running_max = running_max.max(wealth);
    let d = wealth / running_max - 1.0;
    running_min = running_min.min(d);
    dd.push(d);
    mdd.push(running_min);
  }

  DrawdownSeries {
    drawdown: dd,
    max_drawdown: mdd,
  }
}

/// Linear-interpolation percentile of `values` at `p` in `[0, 100]`.
pub fn percentile(values: &[f64], p: f64) -> f64 {
  if values.is_empty() {
    return 0.0;
  }

  let mut sorted = values.to_vec();
  sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

  let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
  let lo = rank.floor() as usize;
  let hi = rank.ceil() as usize;
  if lo == hi {
    sorted[lo]
  } else {
    sorted[lo] + (rank - lo as f64) * (sorted[hi] - sorted[lo])
  }
}

/// Empirical VaR and CVaR of a daily return series at `confidence` percent.
///
/// VaR is the `(100 - confidence)`-th linear-interpolation percentile; CVaR
/// is the mean of all returns at or below it, falling back to VaR itself when
/// the tail is empty.
pub fn var_cvar(daily: &[f64], confidence: f64) -> (f64, f64) {
  let var = percentile(daily, 100.0 - confidence);
  let tail: Vec<f64> = daily.iter().copied().filter(|r| *r <= var).collect();
  let cvar = if tail.is_empty() { var } else { mean(&tail) };
  (var, cvar)
}

/// Annualized rolling volatility over `window` days, percent.
///
/// Uses the sample estimator per window; empty when the series is shorter
/// than the window.
pub fn rolling_volatility(daily: &[f64], window: usize) -> Vec<f64> {
  if window < 2 || daily.len() < window {
    return Vec::new();
  }
  daily
    .windows(window)
    .map(|w| sample_std(w) * TRADING_DAYS.sqrt() * 100.0)
    .collect()
}

/// Annualized risk/return of one asset column, rounded for display.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssetPerformance {
  /// Asset ticker.
  pub ticker: String,
  /// Annualized return, percent.
  pub annual_return: f64,
  /// Annualized volatility, percent.
  pub annual_volatility: f64,
}

/// Per-asset annualized performance for every column of `table`.
pub fn asset_performance(table: &ReturnsTable) -> Vec<AssetPerformance> {
  table
    .iter_columns()
    .map(|(ticker, col)| AssetPerformance {
      ticker: ticker.to_string(),
      annual_return: round3(annualized_return(col)),
      annual_volatility: round3(annualized_volatility(col)),
    })
    .collect()
}
