//! # Correlation & Market Data Helpers
//!
//! $$
//! \rho_{ij} = \frac{\operatorname{cov}(r_i, r_j)}{\sigma_i \sigma_j}
//! $$
//!
//! Pairwise correlation of asset return columns and market-cap weighting
//! from a recent price/volume snapshot.

use serde::Deserialize;
use serde::Serialize;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::stats::round3;
use crate::types::ReturnsTable;
use crate::types::WeightVector;

fn sample_mean(xs: &[f64]) -> f64 {
  if xs.is_empty() {
    0.0
  } else {
    xs.iter().sum::<f64>() / xs.len() as f64
  }
}

fn pearson(x: &[f64], y: &[f64]) -> f64 {
  let n = x.len().min(y.len());
  if n < 2 {
    return 0.0;
  }

  let mx = sample_mean(x);
  let my = sample_mean(y);

  let mut cov = 0.0;
  let mut sx = 0.0;
  let mut sy = 0.0;

  for i in 0..n {
    let dx = x[i] - mx;
    let dy = y[i] - my;
    cov += dx * dy;
    sx += dx * dx;
    sy += dy * dy;
  }

  let denom = (sx * sy).sqrt();
  if denom < 1e-15 {
    0.0
  } else {
    (cov / denom).clamp(-1.0, 1.0)
  }
}

/// Pairwise Pearson correlation of the table's asset columns.
///
/// Symmetric, unit diagonal, indexed in the table's ticker order and rounded
/// to 3 decimals for display.
pub fn correlation_matrix(table: &ReturnsTable) -> Vec<Vec<f64>> {
  let columns: Vec<&[f64]> = table.iter_columns().map(|(_, col)| col).collect();
  let n = columns.len();
  let mut corr = vec![vec![1.0; n]; n];

  for i in 0..n {
    for j in (i + 1)..n {
      let r = round3(pearson(columns[i], columns[j]));
      corr[i][j] = r;
      corr[j][i] = r;
    }
  }

  corr
}

/// Latest price and traded volume for one ticker, used as a market-cap proxy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MarketQuote {
  /// Asset ticker.
  pub ticker: String,
  /// Most recent closing price.
  pub price: f64,
  /// Most recent daily traded volume.
  pub volume: f64,
}

/// Market-cap weights proportional to `price * volume`, normalized to one.
pub fn market_cap_weights(quotes: &[MarketQuote]) -> Result<WeightVector> {
  if quotes.is_empty() {
    return Err(PortfolioError::InvalidWeights {
      reason: "no market quotes for capitalization weighting".to_string(),
    });
  }

  let mut caps = Vec::with_capacity(quotes.len());
  for q in quotes {
    let cap = q.price * q.volume;
    if !cap.is_finite() || cap < 0.0 {
      return Err(PortfolioError::InvalidWeights {
        reason: format!("invalid market cap {cap} for {}", q.ticker),
      });
    }
    caps.push(cap);
  }

  let total: f64 = caps.iter().sum();
  if total <= 0.0 {
    return Err(PortfolioError::InvalidWeights {
      reason: "total market capitalization is zero".to_string(),
    });
  }

  WeightVector::new(
    quotes
      .iter()
      .zip(caps.iter())
      .map(|(q, cap)| (q.ticker.clone(), cap / total))
      .collect(),
  )
}
