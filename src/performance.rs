//! # Portfolio Performance Evaluator
//!
//! $$
//! r_{p,t} = \sum_i w_i r_{i,t}, \qquad
//! S = \frac{R_{ann} - r_f}{\sigma_{ann}}
//! $$
//!
//! Maps a weight vector to annualized performance and exposes the two
//! scalarized objective modes consumed by the constrained optimizer.

use crate::error::Result;
use crate::stats;
use crate::types::PerformanceSummary;
use crate::types::ReturnsTable;
use crate::types::RiskSummary;
use crate::types::WeightVector;

/// Cost returned by objective modes where the true value is undefined,
/// steering the minimizer away instead of emitting NaN.
pub const DEGENERATE_COST: f64 = 1e10;

/// Daily portfolio series from positional weights in table column order.
///
/// The optimizer works on raw simplex points, so this variant skips ticker
/// resolution; [`ReturnsTable::portfolio_returns`] is the checked entry point
/// for caller-supplied weights.
pub fn weighted_series(table: &ReturnsTable, weights: &[f64]) -> Vec<f64> {
  let columns: Vec<&[f64]> = table.iter_columns().map(|(_, col)| col).collect();
  (0..table.n_periods())
    .map(|t| {
      weights
        .iter()
        .zip(columns.iter())
        .map(|(w, col)| w * col[t])
        .sum()
    })
    .collect()
}

/// Annualized performance of `weights` over `table`, unrounded.
///
/// Call [`PerformanceSummary::rounded`] at the display boundary.
pub fn evaluate(
  weights: &WeightVector,
  table: &ReturnsTable,
  risk_free: f64,
) -> Result<PerformanceSummary> {
  let series = table.portfolio_returns(weights)?;
  Ok(PerformanceSummary {
    annual_return: stats::annualized_return(&series),
    annual_volatility: stats::annualized_volatility(&series),
    sharpe_ratio: stats::sharpe_ratio(&series, risk_free)?,
  })
}

/// Performance plus tail-risk summary at `confidence` percent.
pub fn evaluate_with_risk(
  weights: &WeightVector,
  table: &ReturnsTable,
  risk_free: f64,
  confidence: f64,
) -> Result<(PerformanceSummary, RiskSummary)> {
  let summary = evaluate(weights, table, risk_free)?;
  let series = table.portfolio_returns(weights)?;
  let (var, cvar) = stats::var_cvar(&series, confidence);
  let dd = stats::drawdown(&series);
  let max_drawdown = dd.max_drawdown.last().copied().unwrap_or(0.0);

  Ok((
    summary,
    RiskSummary {
      var: stats::round3(var * 100.0),
      cvar: stats::round3(cvar * 100.0),
      max_drawdown: stats::round3(max_drawdown * 100.0),
    },
  ))
}

/// Negated Sharpe ratio objective for the Max-Sharpe formulation.
///
/// Pure in `weights` with the table and rate closed over by the caller;
/// degenerate volatility maps to [`DEGENERATE_COST`] so the minimizer backs
/// away from zero-variance corners.
pub fn objective_max_sharpe(weights: &[f64], table: &ReturnsTable, risk_free: f64) -> f64 {
  let series = weighted_series(table, weights);
  match stats::sharpe_ratio(&series, risk_free) {
    Ok(sharpe) => -sharpe,
    Err(_) => DEGENERATE_COST,
  }
}

/// Annualized-volatility objective for the Min-Volatility formulation.
pub fn objective_min_vol(weights: &[f64], table: &ReturnsTable) -> f64 {
  stats::annualized_volatility(&weighted_series(table, weights))
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn table() -> ReturnsTable {
    let dates: Vec<NaiveDate> = (0..60)
      .map(|i| NaiveDate::from_num_days_from_ce_opt(737425 + i).unwrap())
      .collect();
    let a: Vec<f64> = (0..60).map(|t| 0.001 + 0.01 * (t as f64 * 0.7).sin()).collect();
    let b: Vec<f64> = (0..60).map(|t| 0.0005 + 0.006 * (t as f64 * 0.3).cos()).collect();
    ReturnsTable::new(dates, vec![("AAA".to_string(), a), ("BBB".to_string(), b)]).unwrap()
  }

  #[test]
  fn sharpe_is_consistent_with_components() {
    let table = table();
    let weights =
      WeightVector::new(vec![("AAA".to_string(), 0.4), ("BBB".to_string(), 0.6)]).unwrap();
    let risk_free = 2.0;

    let summary = evaluate(&weights, &table, risk_free).unwrap();
    let series = table.portfolio_returns(&weights).unwrap();
    let expected =
      (stats::annualized_return(&series) - risk_free) / stats::annualized_volatility(&series);

    assert!((summary.sharpe_ratio - expected).abs() < 1e-12);
  }

  #[test]
  fn objectives_agree_with_evaluate() {
    let table = table();
    let weights =
      WeightVector::new(vec![("AAA".to_string(), 0.5), ("BBB".to_string(), 0.5)]).unwrap();
    let summary = evaluate(&weights, &table, 0.0).unwrap();

    let raw = [0.5, 0.5];
    assert!((objective_max_sharpe(&raw, &table, 0.0) + summary.sharpe_ratio).abs() < 1e-12);
    assert!((objective_min_vol(&raw, &table) - summary.annual_volatility).abs() < 1e-12);
  }

  #[test]
  fn degenerate_portfolio_maps_to_guard_cost() {
    let dates: Vec<NaiveDate> = (0..10)
      .map(|i| NaiveDate::from_num_days_from_ce_opt(737425 + i).unwrap())
      .collect();
    let table = ReturnsTable::new(
      dates,
      vec![
        ("AAA".to_string(), vec![0.001; 10]),
        ("BBB".to_string(), vec![0.001; 10]),
      ],
    )
    .unwrap();

    assert_eq!(objective_max_sharpe(&[0.5, 0.5], &table, 0.0), DEGENERATE_COST);
  }

  #[test]
  fn risk_summary_is_rounded_percent() {
    let table = table();
    let weights =
      WeightVector::new(vec![("AAA".to_string(), 0.5), ("BBB".to_string(), 0.5)]).unwrap();
    let (_, risk) = evaluate_with_risk(&weights, &table, 0.0, 95.0).unwrap();

    assert!(risk.var <= 0.0 || risk.var.abs() < 5.0);
    assert!(risk.cvar <= risk.var + 1e-9);
    assert!(risk.max_drawdown <= 0.0);
    assert_eq!(risk.var, stats::round3(risk.var));
  }
}
