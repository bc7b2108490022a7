//! # frontier-rs
//!
//! $$
//! \min_{\mathbf{w} \in \Delta^{n-1}} \sigma_p(\mathbf{w})
//! \quad \text{s.t.} \quad \mu_p(\mathbf{w}) = r^\*
//! $$
//!
//! Portfolio analytics and mean-variance optimization for small equity
//! baskets: annualized risk/return statistics, correlation structure,
//! drawdown, empirical VaR/CVaR, the Markowitz efficient frontier and the
//! canonical weighting strategies. Every computation is a pure function of
//! an immutable returns snapshot; data retrieval and rendering live outside
//! this crate.

pub mod cache;
pub mod data;
pub mod engine;
pub mod error;
pub mod frontier;
pub mod optimizer;
pub mod performance;
pub mod stats;
pub mod strategy;
pub mod types;

pub use cache::ReportCache;
pub use data::correlation_matrix;
pub use data::market_cap_weights;
pub use data::MarketQuote;
pub use engine::AnalyticsConfig;
pub use engine::AnalyticsEngine;
pub use engine::AnalyticsReport;
pub use error::PortfolioError;
pub use error::Result;
pub use frontier::efficient_frontier;
pub use frontier::valid_points;
pub use frontier::FRONTIER_POINTS;
pub use optimizer::efficient_return;
pub use optimizer::max_sharpe;
pub use optimizer::min_volatility;
pub use performance::evaluate;
pub use performance::evaluate_with_risk;
pub use performance::objective_max_sharpe;
pub use performance::objective_min_vol;
pub use stats::annualized_return;
pub use stats::annualized_volatility;
pub use stats::asset_performance;
pub use stats::cumulative_returns;
pub use stats::drawdown;
pub use stats::rolling_volatility;
pub use stats::sharpe_ratio;
pub use stats::var_cvar;
pub use stats::AssetPerformance;
pub use stats::DrawdownSeries;
pub use strategy::compare_strategies;
pub use strategy::Strategy;
pub use strategy::StrategyRow;
pub use strategy::StrategyTable;
pub use types::FrontierPoint;
pub use types::OptimizationResult;
pub use types::PerformanceSummary;
pub use types::ReturnsTable;
pub use types::RiskSummary;
pub use types::WeightVector;
