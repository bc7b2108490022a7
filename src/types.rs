//! # Core Types
//!
//! $$
//! \mathbf{w} \in \Delta^{n-1} = \\{ w_i \ge 0, \textstyle\sum_i w_i = 1 \\}
//! $$
//!
//! Immutable inputs and result containers shared by every analytics component.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;

use crate::error::PortfolioError;
use crate::error::Result;

/// Tolerance on `sum(weights) - 1` accepted by [`WeightVector`] validation.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Tolerance on individual weight bound violations.
pub const WEIGHT_BOUND_TOLERANCE: f64 = 1e-6;

/// Aligned table of daily simple returns: strictly increasing trading dates
/// crossed with one return column per ticker, no gaps.
///
/// Created once by the data-retrieval collaborator and treated as an
/// immutable snapshot by every core function.
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnsTable {
  dates: Vec<NaiveDate>,
  tickers: Vec<String>,
  columns: Vec<Vec<f64>>,
}

impl ReturnsTable {
  /// Build a validated table from dates and `(ticker, column)` pairs.
  pub fn new(dates: Vec<NaiveDate>, columns: Vec<(String, Vec<f64>)>) -> Result<Self> {
    if dates.is_empty() {
      return Err(PortfolioError::InvalidTable {
        reason: "empty date index".to_string(),
      });
    }
    if columns.is_empty() {
      return Err(PortfolioError::InvalidTable {
        reason: "no asset columns".to_string(),
      });
    }

    for pair in dates.windows(2) {
      if pair[1] <= pair[0] {
        return Err(PortfolioError::InvalidTable {
          reason: format!("dates not strictly increasing at {}", pair[1]),
        });
      }
    }

    let mut tickers = Vec::with_capacity(columns.len());
    let mut cols = Vec::with_capacity(columns.len());

    for (ticker, col) in columns {
      if tickers.contains(&ticker) {
        return Err(PortfolioError::InvalidTable {
          reason: format!("duplicate ticker {ticker}"),
        });
      }
      if col.len() != dates.len() {
        return Err(PortfolioError::InvalidTable {
          reason: format!(
            "column {ticker} has {} rows, expected {}",
            col.len(),
            dates.len()
          ),
        });
      }
      if let Some(bad) = col.iter().find(|r| !r.is_finite()) {
        return Err(PortfolioError::InvalidTable {
          reason: format!("non-finite return {bad} in column {ticker}"),
        });
      }
      tickers.push(ticker);
      cols.push(col);
    }

    Ok(Self {
      dates,
      tickers,
      columns: cols,
    })
  }

  /// Trading dates, ascending.
  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Asset tickers in column order.
  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  /// Number of assets.
  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }

  /// Number of trading days.
  pub fn n_periods(&self) -> usize {
    self.dates.len()
  }

  /// Return column for `ticker`, if present.
  pub fn column(&self, ticker: &str) -> Option<&[f64]> {
    self
      .tickers
      .iter()
      .position(|t| t == ticker)
      .map(|i| self.columns[i].as_slice())
  }

  /// Iterate `(ticker, column)` pairs in column order.
  pub fn iter_columns(&self) -> impl Iterator<Item = (&str, &[f64])> {
    self
      .tickers
      .iter()
      .zip(self.columns.iter())
      .map(|(t, c)| (t.as_str(), c.as_slice()))
  }

  /// Daily portfolio return series for `weights`, resolved by ticker.
  ///
  /// Every table ticker must carry a weight; positional alignment is never
  /// assumed.
  pub fn portfolio_returns(&self, weights: &WeightVector) -> Result<Vec<f64>> {
    if weights.len() != self.tickers.len() {
      return Err(PortfolioError::InvalidWeights {
        reason: format!(
          "{} weights supplied for {} assets",
          weights.len(),
          self.tickers.len()
        ),
      });
    }

    let mut ordered = Vec::with_capacity(self.tickers.len());
    for ticker in &self.tickers {
      match weights.get(ticker) {
        Some(w) => ordered.push(w),
        None => {
          return Err(PortfolioError::InvalidWeights {
            reason: format!("no weight for ticker {ticker}"),
          });
        }
      }
    }

    Ok(
      (0..self.dates.len())
        .map(|t| {
          ordered
            .iter()
            .zip(self.columns.iter())
            .map(|(w, col)| w * col[t])
            .sum()
        })
        .collect(),
    )
  }
}

/// Long-only portfolio weights as an ordered `(ticker, weight)` association.
///
/// Weights are kept in `[0, 1]` and sum to one within
/// [`WEIGHT_SUM_TOLERANCE`]; the pairing with tickers makes column alignment
/// explicit instead of positional.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightVector {
  entries: Vec<(String, f64)>,
}

impl WeightVector {
  /// Build a validated weight vector from `(ticker, weight)` pairs.
  pub fn new(entries: Vec<(String, f64)>) -> Result<Self> {
    if entries.is_empty() {
      return Err(PortfolioError::InvalidWeights {
        reason: "empty weight vector".to_string(),
      });
    }

    let mut sum = 0.0;
    for (ticker, w) in &entries {
      if !w.is_finite() {
        return Err(PortfolioError::InvalidWeights {
          reason: format!("non-finite weight for {ticker}"),
        });
      }
      if *w < -WEIGHT_BOUND_TOLERANCE || *w > 1.0 + WEIGHT_BOUND_TOLERANCE {
        return Err(PortfolioError::InvalidWeights {
          reason: format!("weight {w} for {ticker} outside [0, 1]"),
        });
      }
      sum += w;
    }

    if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
      return Err(PortfolioError::InvalidWeights {
        reason: format!("weights sum to {sum}, expected 1"),
      });
    }

    Ok(Self { entries })
  }

  /// Exact `1/N` weighting over `tickers`.
  pub fn equal(tickers: &[String]) -> Result<Self> {
    if tickers.is_empty() {
      return Err(PortfolioError::InvalidWeights {
        reason: "no tickers for equal weighting".to_string(),
      });
    }
    let w = 1.0 / tickers.len() as f64;
    Self::new(tickers.iter().map(|t| (t.clone(), w)).collect())
  }

  /// Build from user-entered percentages, validated to sum to 100 and then
  /// normalized to `[0, 1]`.
  pub fn from_percentages(entries: &[(String, f64)]) -> Result<Self> {
    if entries.is_empty() {
      return Err(PortfolioError::InvalidWeights {
        reason: "empty percentage input".to_string(),
      });
    }

    let mut total = 0.0;
    for (ticker, pct) in entries {
      if !pct.is_finite() || *pct < 0.0 || *pct > 100.0 {
        return Err(PortfolioError::InvalidWeights {
          reason: format!("percentage {pct} for {ticker} outside [0, 100]"),
        });
      }
      total += pct;
    }
    if (total - 100.0).abs() > 100.0 * WEIGHT_SUM_TOLERANCE {
      return Err(PortfolioError::InvalidWeights {
        reason: format!("percentages sum to {total}, expected 100"),
      });
    }

    Self::new(
      entries
        .iter()
        .map(|(t, pct)| (t.clone(), pct / total))
        .collect(),
    )
  }

  /// Number of assets.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  /// True when the vector holds no entries (never after validation).
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  /// Weight for `ticker`, if present.
  pub fn get(&self, ticker: &str) -> Option<f64> {
    self
      .entries
      .iter()
      .find(|(t, _)| t == ticker)
      .map(|(_, w)| *w)
  }

  /// Iterate `(ticker, weight)` pairs in order.
  pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
    self.entries.iter().map(|(t, w)| (t.as_str(), *w))
  }

  /// Weight values in entry order.
  pub fn values(&self) -> Vec<f64> {
    self.entries.iter().map(|(_, w)| *w).collect()
  }
}

/// Annualized risk/return summary for one portfolio or asset, in percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
  /// Annualized return, percent.
  pub annual_return: f64,
  /// Annualized volatility, percent.
  pub annual_volatility: f64,
  /// Sharpe ratio `(annual_return - risk_free) / annual_volatility`.
  pub sharpe_ratio: f64,
}

impl PerformanceSummary {
  /// Copy with every field rounded to the 3-decimal display contract.
  pub fn rounded(&self) -> Self {
    Self {
      annual_return: crate::stats::round3(self.annual_return),
      annual_volatility: crate::stats::round3(self.annual_volatility),
      sharpe_ratio: crate::stats::round3(self.sharpe_ratio),
    }
  }
}

/// Tail-risk summary for one portfolio, in percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
  /// Value-at-Risk at the requested confidence level, percent of daily return.
  pub var: f64,
  /// Conditional VaR (mean return at or below VaR), percent.
  pub cvar: f64,
  /// Most negative drawdown over the full history, percent.
  pub max_drawdown: f64,
}

/// Outcome of a single constrained optimization run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OptimizationResult {
  /// Final weights, clamped to bounds and renormalized to sum to one.
  pub weights: WeightVector,
  /// Objective value at the final weights (un-penalized).
  pub objective_value: f64,
  /// True when the solver met its tolerance within the iteration budget.
  pub converged: bool,
}

/// One efficient-frontier solve, retained even when it fails.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FrontierPoint {
  /// Target annual return for this solve, percent.
  pub target_return: f64,
  /// The solve outcome; failures are flagged here rather than dropped.
  pub result: Result<OptimizationResult>,
}

impl FrontierPoint {
  /// True when the solve produced a converged, feasible portfolio.
  pub fn is_valid(&self) -> bool {
    matches!(&self.result, Ok(r) if r.converged)
  }
}
