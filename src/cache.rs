//! # Report Cache
//!
//! $$
//! h = H(R, \mathbf{w}, \theta)
//! $$
//!
//! Optional memoization at the engine boundary. The core stays pure and
//! cache-oblivious; this layer keys complete reports by a content hash of
//! the immutable inputs and evicts least-recently-used entries when full.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::collections::VecDeque;
use std::hash::Hash;
use std::hash::Hasher;

use tracing::debug;

use crate::data::MarketQuote;
use crate::engine::AnalyticsEngine;
use crate::engine::AnalyticsReport;
use crate::error::Result;
use crate::types::ReturnsTable;
use crate::types::WeightVector;

/// Bounded LRU memo of analytics reports.
#[derive(Debug)]
pub struct ReportCache {
  capacity: usize,
  map: HashMap<u64, AnalyticsReport>,
  order: VecDeque<u64>,
}

impl ReportCache {
  /// Create a cache holding at most `capacity` reports.
  pub fn new(capacity: usize) -> Self {
    Self {
      capacity: capacity.max(1),
      map: HashMap::new(),
      order: VecDeque::new(),
    }
  }

  /// Number of cached reports.
  pub fn len(&self) -> usize {
    self.map.len()
  }

  /// True when nothing is cached.
  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }

  /// Run `engine.analyze`, reusing the memoized report on identical inputs.
  pub fn analyze(
    &mut self,
    engine: &AnalyticsEngine,
    table: &ReturnsTable,
    quotes: &[MarketQuote],
    weights: &WeightVector,
  ) -> Result<AnalyticsReport> {
    let key = content_hash(engine, table, quotes, weights);

    if let Some(report) = self.map.get(&key) {
      debug!(key, "analytics cache hit");
      let report = report.clone();
      self.touch(key);
      return Ok(report);
    }

    let report = engine.analyze(table, quotes, weights)?;
    if self.map.len() >= self.capacity {
      if let Some(evicted) = self.order.pop_front() {
        self.map.remove(&evicted);
      }
    }
    self.map.insert(key, report.clone());
    self.order.push_back(key);
    Ok(report)
  }

  fn touch(&mut self, key: u64) {
    self.order.retain(|k| *k != key);
    self.order.push_back(key);
  }
}

fn hash_f64<H: Hasher>(state: &mut H, x: f64) {
  state.write_u64(x.to_bits());
}

fn content_hash(
  engine: &AnalyticsEngine,
  table: &ReturnsTable,
  quotes: &[MarketQuote],
  weights: &WeightVector,
) -> u64 {
  let mut hasher = DefaultHasher::new();

  let config = engine.config();
  hash_f64(&mut hasher, config.risk_free);
  hash_f64(&mut hasher, config.confidence);
  hash_f64(&mut hasher, config.expected_return);
  hasher.write_usize(config.rolling_window);

  for date in table.dates() {
    date.hash(&mut hasher);
  }
  for (ticker, column) in table.iter_columns() {
    ticker.hash(&mut hasher);
    for r in column {
      hash_f64(&mut hasher, *r);
    }
  }

  for q in quotes {
    q.ticker.hash(&mut hasher);
    hash_f64(&mut hasher, q.price);
    hash_f64(&mut hasher, q.volume);
  }

  for (ticker, w) in weights.iter() {
    ticker.hash(&mut hasher);
    hash_f64(&mut hasher, w);
  }

  hasher.finish()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::engine::AnalyticsConfig;
  use chrono::NaiveDate;

  fn sample_table(shift: f64) -> ReturnsTable {
    let n = 80;
    let dates: Vec<NaiveDate> = (0..n)
      .map(|i| NaiveDate::from_num_days_from_ce_opt(737425 + i).unwrap())
      .collect();
    let a: Vec<f64> = (0..n)
      .map(|t| shift + 0.002 + 0.010 * (t as f64 * 0.7).sin())
      .collect();
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

  fn weights() -> WeightVector {
    WeightVector::new(vec![("AAA".to_string(), 0.5), ("BBB".to_string(), 0.5)]).unwrap()
  }

  #[test]
  fn identical_inputs_reuse_the_report() {
    let engine = AnalyticsEngine::new(AnalyticsConfig {
      expected_return: 30.0,
      ..AnalyticsConfig::default()
    });
    let table = sample_table(0.0);
    let mut cache = ReportCache::new(4);

    let first = cache.analyze(&engine, &table, &quotes(), &weights()).unwrap();
    assert_eq!(cache.len(), 1);

    let second = cache.analyze(&engine, &table, &quotes(), &weights()).unwrap();
    assert_eq!(cache.len(), 1);
    assert_eq!(first, second);
  }

  #[test]
  fn capacity_bound_evicts_oldest() {
    let engine = AnalyticsEngine::new(AnalyticsConfig {
      expected_return: 30.0,
      ..AnalyticsConfig::default()
    });
    let mut cache = ReportCache::new(2);

    cache
      .analyze(&engine, &sample_table(0.0), &quotes(), &weights())
      .unwrap();
    cache
      .analyze(&engine, &sample_table(0.0001), &quotes(), &weights())
      .unwrap();
    cache
      .analyze(&engine, &sample_table(0.0002), &quotes(), &weights())
      .unwrap();

    assert_eq!(cache.len(), 2);
  }
}
