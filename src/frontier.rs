//! # Efficient Frontier Sweep
//!
//! $$
//! \sigma^\*(r) = \min_{\mathbf{w} \in \Delta^{n-1}}
//! \\{ \sigma_p(\mathbf{w}) : \mu_p(\mathbf{w}) = r \\}
//! $$
//!
//! Drives the return-targeted optimizer across 50 evenly spaced target
//! returns between the global-minimum-volatility return and the caller's
//! expected return plus a fixed margin. The solves are independent and run
//! in parallel; output order follows ascending target generation order.

use rayon::prelude::*;
use tracing::debug;

use crate::error::Result;
use crate::optimizer;
use crate::performance::evaluate;
use crate::types::FrontierPoint;
use crate::types::ReturnsTable;

/// Number of frontier solves per sweep.
pub const FRONTIER_POINTS: usize = 50;

/// Margin added above the caller's expected return, percentage points.
pub const RETURN_MARGIN: f64 = 5.0;

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
  match n {
    0 => Vec::new(),
    1 => vec![start],
    _ => {
      let step = (end - start) / (n - 1) as f64;
      (0..n).map(|i| start + step * i as f64).collect()
    }
  }
}

/// Sweep the efficient frontier for `table`.
///
/// The target bracket runs from the achieved return of the global minimum
/// volatility portfolio to `expected_return + RETURN_MARGIN`, both ends
/// inclusive. Every point is retained; failed solves stay flagged in their
/// [`FrontierPoint`] so downstream consumers can choose to omit them.
pub fn efficient_frontier(
  table: &ReturnsTable,
  expected_return: f64,
  risk_free: f64,
) -> Result<Vec<FrontierPoint>> {
  let gmv = optimizer::min_volatility(table)?;
  let min_exp = evaluate(&gmv.weights, table, risk_free)?.annual_return;
  let max_exp = expected_return + RETURN_MARGIN;

  let targets = linspace(min_exp, max_exp, FRONTIER_POINTS);
  let points: Vec<FrontierPoint> = targets
    .par_iter()
    .map(|&target_return| FrontierPoint {
      target_return,
      result: optimizer::efficient_return(table, target_return),
    })
    .collect();

  debug!(
    valid = points.iter().filter(|p| p.is_valid()).count(),
    total = points.len(),
    "frontier sweep finished"
  );

  Ok(points)
}

/// The converged, feasible subset of a sweep, in sweep order.
pub fn valid_points(points: &[FrontierPoint]) -> Vec<&FrontierPoint> {
  points.iter().filter(|p| p.is_valid()).collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::NaiveDate;

  fn sample_table() -> ReturnsTable {
    let n = 252;
    let dates: Vec<NaiveDate> = (0..n)
      .map(|i| NaiveDate::from_num_days_from_ce_opt(737425 + i).unwrap())
      .collect();
    let a: Vec<f64> = (0..n).map(|t| 0.002 + 0.010 * (t as f64 * 0.7).sin()).collect();
    let b: Vec<f64> = (0..n).map(|t| 0.0004 + 0.006 * (t as f64 * 0.3).cos()).collect();
    let c: Vec<f64> = (0..n)
      .map(|t| 0.001 + 0.012 * (t as f64 * 1.3 + 0.5).sin())
      .collect();
    ReturnsTable::new(
      dates,
      vec![
        ("AAA".to_string(), a),
        ("BBB".to_string(), b),
        ("CCC".to_string(), c),
      ],
    )
    .unwrap()
  }

  #[test]
  fn linspace_is_inclusive() {
    let xs = linspace(1.0, 2.0, 5);
    assert_eq!(xs.len(), 5);
    assert!((xs[0] - 1.0).abs() < 1e-12);
    assert!((xs[4] - 2.0).abs() < 1e-12);
  }

  #[test]
  fn sweep_produces_ordered_points() {
    let table = sample_table();
    let points = efficient_frontier(&table, 40.0, 0.0).unwrap();

    assert_eq!(points.len(), FRONTIER_POINTS);
    for pair in points.windows(2) {
      assert!(pair[1].target_return >= pair[0].target_return);
    }

    // The bracket starts at the GMV return, so the sweep must contain a
    // usable frontier, not just failures.
    assert!(valid_points(&points).len() > FRONTIER_POINTS / 2);
  }

  #[test]
  fn frontier_volatility_is_monotone_in_target() {
    let table = sample_table();
    let points = efficient_frontier(&table, 40.0, 0.0).unwrap();
    let valid = valid_points(&points);

    for pair in valid.windows(2) {
      let (a, b) = (pair[0], pair[1]);
      let vol_a = a.result.as_ref().unwrap().objective_value;
      let vol_b = b.result.as_ref().unwrap().objective_value;
      assert!(vol_b >= vol_a - 0.6);
    }
  }

  #[test]
  fn infeasible_points_are_flagged_not_dropped() {
    let table = sample_table();
    // Bracket far beyond the achievable range: upper targets must fail but
    // still appear in the output.
    let points = efficient_frontier(&table, 400.0, 0.0).unwrap();
    assert_eq!(points.len(), FRONTIER_POINTS);
    assert!(points.iter().any(|p| p.result.is_err()));
  }
}
