//! # Errors
//!
//! $$
//! \sigma_p \to 0 \implies \text{Sharpe ratio undefined}
//! $$
//!
//! Recoverable error taxonomy for table validation, evaluation and optimization.

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the analytics engine.
///
/// Every variant is recoverable from the engine's perspective; the caller
/// decides whether to surface, retry with relaxed parameters, or omit the
/// affected result.
#[derive(Error, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum PortfolioError {
  /// Returns table violates a shape or ordering invariant.
  #[error("invalid returns table: {reason}")]
  InvalidTable { reason: String },

  /// Weight vector fails bounds or sum-to-one validation.
  #[error("invalid weights: {reason}")]
  InvalidWeights { reason: String },

  /// Annualized volatility is zero or near-zero, the Sharpe ratio is undefined.
  #[error("degenerate annualized volatility {volatility}, Sharpe ratio undefined")]
  DegenerateVolatility { volatility: f64 },

  /// The constrained minimizer failed to reach a feasible optimum.
  #[error("optimizer failed to converge: {reason}")]
  NonConvergence { reason: String },

  /// A requested target annual return lies outside the achievable range.
  #[error("target return {target}% infeasible, best achieved {achieved}%")]
  InfeasibleTarget { target: f64, achieved: f64 },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, PortfolioError>;
