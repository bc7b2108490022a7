//! # Analytics Engine
//!
//! $$
//! \text{Report} = \operatorname{Analyze}(R, \mathbf{w}, \theta)
//! $$
//!
//! High-level orchestration: one call recomputes every analytics surface
//! from an immutable returns snapshot. All computation is a pure function of
//! the inputs; nothing is retained between requests.

use chrono::NaiveDate;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::data::correlation_matrix;
use crate::data::MarketQuote;
use crate::error::Result;
use crate::frontier::efficient_frontier;
use crate::performance::evaluate_with_risk;
use crate::stats;
use crate::stats::AssetPerformance;
use crate::stats::DrawdownSeries;
use crate::strategy::compare_strategies;
use crate::strategy::StrategyTable;
use crate::types::FrontierPoint;
use crate::types::PerformanceSummary;
use crate::types::ReturnsTable;
use crate::types::RiskSummary;
use crate::types::WeightVector;

/// Caller-supplied request parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsConfig {
  /// Risk-free rate, percent per year.
  pub risk_free: f64,
  /// VaR/CVaR confidence level, percent.
  pub confidence: f64,
  /// Expected annual return bracketing the frontier sweep, percent.
  pub expected_return: f64,
  /// Rolling volatility window, trading days.
  pub rolling_window: usize,
}

impl Default for AnalyticsConfig {
  fn default() -> Self {
    Self {
      risk_free: 0.0,
      confidence: 95.0,
      expected_return: 10.0,
      rolling_window: 20,
    }
  }
}

/// Full analytics output for one request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsReport {
  /// Trading dates the series below align to.
  pub dates: Vec<NaiveDate>,
  /// Current portfolio performance, rounded.
  pub summary: PerformanceSummary,
  /// Current portfolio tail risk, percent.
  pub risk: RiskSummary,
  /// Latest cumulative return of the current portfolio, percent.
  pub current_return: f64,
  /// Per-asset annualized performance.
  pub asset_performance: Vec<AssetPerformance>,
  /// Pairwise asset correlation, ticker order of `tickers`.
  pub correlation: Vec<Vec<f64>>,
  /// Ticker order of the correlation matrix and cumulative columns.
  pub tickers: Vec<String>,
  /// Cumulative return series of the current portfolio, rounded.
  pub cumulative: Vec<f64>,
  /// Cumulative return series per asset, rounded.
  pub asset_cumulative: Vec<(String, Vec<f64>)>,
  /// Drawdown and running max drawdown, rounded fractions.
  pub drawdown: DrawdownSeries,
  /// Rolling annualized volatility, percent.
  pub rolling_volatility: Vec<f64>,
  /// Strategy comparison table, `Custom` = the current weights.
  pub strategies: StrategyTable,
  /// Efficient frontier sweep, failed points flagged in place.
  pub frontier: Vec<FrontierPoint>,
}

/// Single entry point running the full analytics request.
#[derive(Clone, Debug, Default)]
pub struct AnalyticsEngine {
  config: AnalyticsConfig,
}

impl AnalyticsEngine {
  /// Construct an engine with explicit configuration.
  pub fn new(config: AnalyticsConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &AnalyticsConfig {
    &self.config
  }

  /// Recompute every analytics surface for the snapshot.
  ///
  /// `weights` is the caller's current portfolio; it doubles as the
  /// `Custom` strategy row. `quotes` feeds market-cap weighting only.
  pub fn analyze(
    &self,
    table: &ReturnsTable,
    quotes: &[MarketQuote],
    weights: &WeightVector,
  ) -> Result<AnalyticsReport> {
    debug!(
      assets = table.n_assets(),
      periods = table.n_periods(),
      "running analytics request"
    );

    let (summary, risk) =
      evaluate_with_risk(weights, table, self.config.risk_free, self.config.confidence)?;
    let series = table.portfolio_returns(weights)?;

    let cumulative_raw = stats::cumulative_returns(&series);
    let current_return = stats::round3(cumulative_raw.last().copied().unwrap_or(0.0) * 100.0);
    let cumulative: Vec<f64> = cumulative_raw.iter().map(|x| stats::round3(*x)).collect();

    let asset_cumulative = table
      .iter_columns()
      .map(|(ticker, col)| {
        (
          ticker.to_string(),
          stats::cumulative_returns(col)
            .iter()
            .map(|x| stats::round3(*x))
            .collect(),
        )
      })
      .collect();

    let strategies = compare_strategies(table, quotes, self.config.risk_free, Some(weights))?;
    let frontier = efficient_frontier(table, self.config.expected_return, self.config.risk_free)?;

    Ok(AnalyticsReport {
      dates: table.dates().to_vec(),
      summary: summary.rounded(),
      risk,
      current_return,
      asset_performance: stats::asset_performance(table),
      correlation: correlation_matrix(table),
      tickers: table.tickers().to_vec(),
      cumulative,
      asset_cumulative,
      drawdown: stats::drawdown(&series).rounded(),
      rolling_volatility: stats::rolling_volatility(&series, self.config.rolling_window),
      strategies,
      frontier,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::strategy::Strategy;

  fn sample_table() -> ReturnsTable {
    let n = 252;
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
  fn analyze_produces_consistent_report() {
    let table = sample_table();
    let weights =
      WeightVector::new(vec![("AAA".to_string(), 0.6), ("BBB".to_string(), 0.4)]).unwrap();
    let engine = AnalyticsEngine::new(AnalyticsConfig {
      expected_return: 40.0,
      ..AnalyticsConfig::default()
    });

    let report = engine.analyze(&table, &quotes(), &weights).unwrap();

    assert_eq!(report.dates.len(), table.n_periods());
    assert_eq!(report.cumulative.len(), table.n_periods());
    assert_eq!(report.asset_cumulative.len(), 2);
    assert_eq!(report.correlation.len(), 2);
    assert_eq!(report.frontier.len(), crate::frontier::FRONTIER_POINTS);
    assert_eq!(report.strategies.rows.len(), 5);
    assert_eq!(
      report.rolling_volatility.len(),
      table.n_periods() - engine.config().rolling_window + 1
    );

    let custom = report.strategies.get(Strategy::Custom).unwrap();
    assert_eq!(custom.weights, weights);
  }

  #[test]
  fn analyze_is_deterministic() {
    let table = sample_table();
    let weights =
      WeightVector::new(vec![("AAA".to_string(), 0.5), ("BBB".to_string(), 0.5)]).unwrap();
    let engine = AnalyticsEngine::default();

    let a = engine.analyze(&table, &quotes(), &weights).unwrap();
    let b = engine.analyze(&table, &quotes(), &weights).unwrap();
    assert_eq!(a.summary, b.summary);
    assert_eq!(a.risk, b.risk);
    assert_eq!(a.cumulative, b.cumulative);
  }
}
