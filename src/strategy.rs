//! # Strategy Comparator
//!
//! $$
//! \text{EW}, \ \text{MCap}, \ \text{MSR}, \ \text{GMV}, \ \text{Custom}
//! $$
//!
//! Assembles the canonical weighting strategies into one comparable table
//! with aligned cumulative-return series for overlay plots.

use serde::Deserialize;
use serde::Serialize;

use crate::data::market_cap_weights;
use crate::data::MarketQuote;
use crate::error::Result;
use crate::optimizer;
use crate::performance::evaluate;
use crate::stats::cumulative_returns;
use crate::stats::round3;
use crate::types::PerformanceSummary;
use crate::types::ReturnsTable;
use crate::types::WeightVector;

/// Canonical portfolio weighting strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
  /// `1/N` across all assets.
  EqualWeight,
  /// Proportional to latest `price * volume`.
  MarketCap,
  /// Maximum Sharpe ratio solve.
  MaxSharpeRatio,
  /// Global minimum volatility solve.
  GlobalMinVolatility,
  /// User-supplied weighting.
  Custom,
}

impl Strategy {
  /// Display label.
  pub fn label(&self) -> &'static str {
    match self {
      Self::EqualWeight => "Equal Weight",
      Self::MarketCap => "Market Cap",
      Self::MaxSharpeRatio => "Max Sharpe Ratio",
      Self::GlobalMinVolatility => "Global Min Volatility",
      Self::Custom => "Custom",
    }
  }
}

/// One strategy's weights, summary and cumulative series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StrategyRow {
  /// Strategy identity.
  pub strategy: Strategy,
  /// Weights backing this row.
  pub weights: WeightVector,
  /// Annualized performance, rounded for display.
  pub summary: PerformanceSummary,
  /// Cumulative return per table date, rounded for display.
  pub cumulative: Vec<f64>,
}

/// Comparable table of strategy rows, aligned on the table's date index.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StrategyTable {
  /// Rows in fixed strategy order; `Custom` last when present.
  pub rows: Vec<StrategyRow>,
}

impl StrategyTable {
  /// Row for `strategy`, if present.
  pub fn get(&self, strategy: Strategy) -> Option<&StrategyRow> {
    self.rows.iter().find(|r| r.strategy == strategy)
  }
}

fn build_row(
  strategy: Strategy,
  weights: WeightVector,
  table: &ReturnsTable,
  risk_free: f64,
) -> Result<StrategyRow> {
  let summary = evaluate(&weights, table, risk_free)?.rounded();
  let series = table.portfolio_returns(&weights)?;
  let cumulative = cumulative_returns(&series)
    .iter()
    .map(|x| round3(*x))
    .collect();

  Ok(StrategyRow {
    strategy,
    weights,
    summary,
    cumulative,
  })
}

/// Build the full strategy comparison for `table`.
///
/// Market-cap weighting consumes the recent `quotes` snapshot rather than
/// the backtest history; `custom` is an optional already-validated user
/// weighting.
pub fn compare_strategies(
  table: &ReturnsTable,
  quotes: &[MarketQuote],
  risk_free: f64,
  custom: Option<&WeightVector>,
) -> Result<StrategyTable> {
  let mut rows = Vec::with_capacity(5);

  let ew = WeightVector::equal(table.tickers())?;
  rows.push(build_row(Strategy::EqualWeight, ew, table, risk_free)?);

  let mcap = market_cap_weights(quotes)?;
  rows.push(build_row(Strategy::MarketCap, mcap, table, risk_free)?);

  let msr = optimizer::max_sharpe(table, risk_free)?;
  rows.push(build_row(
    Strategy::MaxSharpeRatio,
    msr.weights,
    table,
    risk_free,
  )?);

  let gmv = optimizer::min_volatility(table)?;
  rows.push(build_row(
    Strategy::GlobalMinVolatility,
    gmv.weights,
    table,
    risk_free,
  )?);

  if let Some(weights) = custom {
    rows.push(build_row(Strategy::Custom, weights.clone(), table, risk_free)?);
  }

  Ok(StrategyTable { rows })
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn sample_table() -> ReturnsTable {
    let n = 120;
    let dates: Vec<NaiveDate> = (0..n)
      .map(|i| NaiveDate::from_num_days_from_ce_opt(737425 + i).unwrap())
      .collect();
    let a: Vec<f64> = (0..n).map(|t| 0.002 + 0.010 * (t as f64 * 0.7).sin()).collect();
    let b: Vec<f64> = (0..n).map(|t| 0.0004 + 0.006 * (t as f64 * 0.3).cos()).collect();
    ReturnsTable::new(dates, vec![("AAA".to_string(), a), ("BBB".to_string(), b)]).unwrap()
  }

  fn quotes() -> Vec<MarketQuote> {
    vec![
      MarketQuote {
        ticker: "AAA".to_string(),
        price: 120.0,
        volume: 3_000_000.0,
      },
      MarketQuote {
        ticker: "BBB".to_string(),
        price: 80.0,
        volume: 1_500_000.0,
      },
    ]
  }

  #[test]
  fn table_holds_all_strategies_with_aligned_series() {
    let table = sample_table();
    let custom =
      WeightVector::new(vec![("AAA".to_string(), 0.7), ("BBB".to_string(), 0.3)]).unwrap();
    let result = compare_strategies(&table, &quotes(), 0.0, Some(&custom)).unwrap();

    assert_eq!(result.rows.len(), 5);
    for row in &result.rows {
      assert_eq!(row.cumulative.len(), table.n_periods());
    }
    assert!(result.get(Strategy::Custom).is_some());
  }

  #[test]
  fn equal_weight_row_is_exact() {
    let table = sample_table();
    let result = compare_strategies(&table, &quotes(), 0.0, None).unwrap();
    let ew = result.get(Strategy::EqualWeight).unwrap();
    for (_, w) in ew.weights.iter() {
      assert_eq!(w, 0.5);
    }
  }

  #[test]
  fn gmv_row_has_lowest_volatility() {
    let table = sample_table();
    let result = compare_strategies(&table, &quotes(), 0.0, None).unwrap();
    let gmv = result.get(Strategy::GlobalMinVolatility).unwrap();

    for row in &result.rows {
      assert!(gmv.summary.annual_volatility <= row.summary.annual_volatility + 0.1);
    }
  }

  #[test]
  fn summaries_are_display_rounded() {
    let table = sample_table();
    let result = compare_strategies(&table, &quotes(), 0.0, None).unwrap();
    for row in &result.rows {
      assert_eq!(row.summary.annual_return, round3(row.summary.annual_return));
      assert_eq!(
        row.summary.annual_volatility,
        round3(row.summary.annual_volatility)
      );
    }
  }
}
