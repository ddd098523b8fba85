//! Scoring statistics for a run of the predictor

use crate::types::prediction::RiskLevel;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for scored records
pub struct ScoringMetrics {
    /// Records scored successfully
    pub records_scored: AtomicU64,
    /// Records rejected by validation
    pub validation_failures: AtomicU64,
    /// Records that failed during inference
    pub inference_failures: AtomicU64,
    /// Predictions by risk level
    by_level: RwLock<HashMap<RiskLevel, u64>>,
    /// Scoring times (in microseconds)
    scoring_times: RwLock<Vec<u64>>,
    /// Probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    start_time: Instant,
}

impl ScoringMetrics {
    pub fn new() -> Self {
        Self {
            records_scored: AtomicU64::new(0),
            validation_failures: AtomicU64::new(0),
            inference_failures: AtomicU64::new(0),
            by_level: RwLock::new(HashMap::new()),
            scoring_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a scored record
    pub fn record_prediction(&self, scoring_time: Duration, probability: f64, level: RiskLevel) {
        self.records_scored.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut times) = self.scoring_times.write() {
            times.push(scoring_time.as_micros() as u64);
            // Keep only last 10000
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (probability * 10.0).clamp(0.0, 9.0) as usize;
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut by_level) = self.by_level.write() {
            *by_level.entry(level).or_insert(0) += 1;
        }
    }

    pub fn record_validation_failure(&self) {
        self.validation_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_inference_failure(&self) {
        self.inference_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Scoring time statistics
    pub fn get_scoring_stats(&self) -> ScoringStats {
        let times = match self.scoring_times.read() {
            Ok(times) => times,
            Err(_) => return ScoringStats::default(),
        };
        if times.is_empty() {
            return ScoringStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ScoringStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[((count as f64 * 0.95) as usize).min(count - 1)],
            p99_us: sorted[((count as f64 * 0.99) as usize).min(count - 1)],
            max_us: sorted[count - 1],
        }
    }

    /// Records per second since start
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.records_scored.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn get_probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|b| *b)
            .unwrap_or_default()
    }

    pub fn get_count_by_level(&self, level: RiskLevel) -> u64 {
        self.by_level
            .read()
            .ok()
            .and_then(|m| m.get(&level).copied())
            .unwrap_or(0)
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let scored = self.records_scored.load(Ordering::Relaxed);
        let invalid = self.validation_failures.load(Ordering::Relaxed);
        let failed = self.inference_failures.load(Ordering::Relaxed);
        let stats = self.get_scoring_stats();

        info!(
            scored,
            invalid,
            failed,
            throughput = format!("{:.1} rec/s", self.get_throughput()),
            mean_us = stats.mean_us,
            p50_us = stats.p50_us,
            p95_us = stats.p95_us,
            p99_us = stats.p99_us,
            max_us = stats.max_us,
            "Scoring summary"
        );

        for level in [RiskLevel::Low, RiskLevel::Medium, RiskLevel::High] {
            let count = self.get_count_by_level(level);
            let pct = if scored > 0 {
                (count as f64 / scored as f64) * 100.0
            } else {
                0.0
            };
            info!(level = %level, count, pct = format!("{:.1}%", pct), "Risk level share");
        }

        let distribution = self.get_probability_distribution();
        for (i, &count) in distribution.iter().enumerate().filter(|(_, &c)| c > 0) {
            info!(
                bucket = format!("{:.1}-{:.1}", i as f64 / 10.0, (i + 1) as f64 / 10.0),
                count,
                "Probability distribution"
            );
        }
    }
}

impl Default for ScoringMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoring time statistics
#[derive(Debug, Default)]
pub struct ScoringStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}
