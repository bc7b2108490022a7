//! # Constrained Optimizer
//!
//! $$
//! \min_{\mathbf{w} \in \Delta^{n-1}} f(\mathbf{w})
//! \quad \text{s.t.} \quad \mu_p(\mathbf{w}) = r^\*
//! $$
//!
//! Long-only mean-variance solves on the probability simplex. Bounds and the
//! sum-to-one equality hold by construction through a softmax
//! reparameterization of the search space; the return-target equality is
//! enforced by a quadratic penalty and checked post-solve. A single
//! equal-weight start is used, and non-convergence is surfaced, never
//! silently replaced.

use argmin::core::CostFunction;
use argmin::core::Executor;
use argmin::core::TerminationReason;
use argmin::core::TerminationStatus;
use argmin::solver::neldermead::NelderMead;
use tracing::debug;
use tracing::warn;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::performance::objective_max_sharpe;
use crate::performance::objective_min_vol;
use crate::performance::weighted_series;
use crate::stats::annualized_return;
use crate::types::OptimizationResult;
use crate::types::ReturnsTable;
use crate::types::WeightVector;

/// Iteration budget for every solve.
pub const MAX_ITERS: u64 = 5000;

/// Nelder-Mead standard-deviation tolerance.
pub const SD_TOLERANCE: f64 = 1e-8;

/// Quadratic penalty coefficient on the target-return equality, in the
/// percent units of the annualized return.
pub const RETURN_PENALTY: f64 = 100.0;

/// Accepted residual between achieved and target annual return, percent.
pub const TARGET_TOLERANCE: f64 = 0.5;

fn softmax(x: &[f64]) -> Vec<f64> {
  if x.is_empty() {
    return Vec::new();
  }

  let max_x = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
  let exps: Vec<f64> = x.iter().map(|&v| (v - max_x).exp()).collect();
  let sum: f64 = exps.iter().sum();

  if sum < 1e-15 {
    vec![1.0 / x.len() as f64; x.len()]
  } else {
    exps.iter().map(|&e| e / sum).collect()
  }
}

struct SimplexCost<F> {
  f: F,
}

impl<F> CostFunction for SimplexCost<F>
where
  F: Fn(&[f64]) -> f64,
{
  type Param = Vec<f64>;
  type Output = f64;

  fn cost(&self, x: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
    Ok((self.f)(&softmax(x)))
  }
}

struct Solved {
  weights: Vec<f64>,
  converged: bool,
  iters: u64,
}

/// Run Nelder-Mead over the softmax-reparameterized simplex.
///
/// `x0 = 0` maps to the equal-weight initial guess.
fn minimize_on_simplex<F>(n: usize, objective: F, label: &str) -> Result<Solved>
where
  F: Fn(&[f64]) -> f64,
{
  let x0 = vec![0.0; n];
  let mut simplex = Vec::with_capacity(n + 1);
  simplex.push(x0.clone());
  for i in 0..n {
    let mut point = x0.clone();
    point[i] = 1.0;
    simplex.push(point);
  }

  let solver =
    NelderMead::new(simplex)
      .with_sd_tolerance(SD_TOLERANCE)
      .map_err(|e| PortfolioError::NonConvergence {
        reason: format!("{label}: {e}"),
      })?;

  let res = Executor::new(SimplexCost { f: objective }, solver)
    .configure(|state| state.max_iters(MAX_ITERS))
    .run()
    .map_err(|e| PortfolioError::NonConvergence {
      reason: format!("{label}: {e}"),
    })?;

  let converged = matches!(
    res.state.termination_status,
    TerminationStatus::Terminated(TerminationReason::SolverConverged)
  );
  let iters = res.state.iter;

  let best = res
    .state
    .best_param
    .ok_or_else(|| PortfolioError::NonConvergence {
      reason: format!("{label}: solver returned no parameter"),
    })?;

  if !converged {
    warn!(label, iters, "optimizer hit iteration budget before tolerance");
  } else {
    debug!(label, iters, "optimizer converged");
  }

  Ok(Solved {
    weights: softmax(&best),
    converged,
    iters,
  })
}

/// Clamp to `[0, 1]`, renormalize to sum one and pair with tickers.
fn finalize_weights(table: &ReturnsTable, raw: &[f64]) -> Result<WeightVector> {
  let clamped: Vec<f64> = raw.iter().map(|w| w.clamp(0.0, 1.0)).collect();
  let total: f64 = clamped.iter().sum();
  if total <= 0.0 {
    return Err(PortfolioError::NonConvergence {
      reason: "all weights collapsed to zero".to_string(),
    });
  }

  WeightVector::new(
    table
      .tickers()
      .iter()
      .zip(clamped.iter())
      .map(|(t, w)| (t.clone(), w / total))
      .collect(),
  )
}

/// Maximum Sharpe ratio portfolio.
///
/// Minimizes the negated Sharpe ratio; `objective_value` is `-sharpe` at the
/// final weights.
pub fn max_sharpe(table: &ReturnsTable, risk_free: f64) -> Result<OptimizationResult> {
  let solved = minimize_on_simplex(
    table.n_assets(),
    |w| objective_max_sharpe(w, table, risk_free),
    "max_sharpe",
  )?;
  let weights = finalize_weights(table, &solved.weights)?;
  let objective_value = objective_max_sharpe(&weights.values(), table, risk_free);

  Ok(OptimizationResult {
    weights,
    objective_value,
    converged: solved.converged,
  })
}

/// Global minimum volatility portfolio.
pub fn min_volatility(table: &ReturnsTable) -> Result<OptimizationResult> {
  let solved = minimize_on_simplex(
    table.n_assets(),
    |w| objective_min_vol(w, table),
    "min_volatility",
  )?;
  let weights = finalize_weights(table, &solved.weights)?;
  let objective_value = objective_min_vol(&weights.values(), table);

  Ok(OptimizationResult {
    weights,
    objective_value,
    converged: solved.converged,
  })
}

/// Minimum volatility portfolio subject to `annual_return = target_return`.
///
/// The residual between achieved and target return is checked against
/// [`TARGET_TOLERANCE`]; a violation is reported as
/// [`PortfolioError::InfeasibleTarget`] so frontier consumers can
/// distinguish unreachable targets from ordinary non-convergence.
pub fn efficient_return(table: &ReturnsTable, target_return: f64) -> Result<OptimizationResult> {
  let solved = minimize_on_simplex(
    table.n_assets(),
    |w| {
      let vol = objective_min_vol(w, table);
      let ret = annualized_return(&weighted_series(table, w));
      vol + RETURN_PENALTY * (ret - target_return).powi(2)
    },
    "efficient_return",
  )?;

  let weights = finalize_weights(table, &solved.weights)?;
  let achieved = annualized_return(&table.portfolio_returns(&weights)?);
  if (achieved - target_return).abs() > TARGET_TOLERANCE {
    warn!(
      target_return,
      achieved,
      iters = solved.iters,
      "target return out of reach"
    );
    return Err(PortfolioError::InfeasibleTarget {
      target: target_return,
      achieved,
    });
  }

  let objective_value = objective_min_vol(&weights.values(), table);
  Ok(OptimizationResult {
    weights,
    objective_value,
    converged: solved.converged,
  })
}
