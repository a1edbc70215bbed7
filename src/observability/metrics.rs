//! Request metrics backing the `/stats` endpoint

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Point-in-time metrics snapshot
#[derive(Debug, Clone, Serialize)]
pub struct SystemMetrics {
    /// Total chat turns processed
    pub total_requests: u64,

    /// Total failed turns
    pub total_errors: u64,

    /// Average turn latency (ms)
    pub avg_response_time_ms: f64,

    /// Reply cache hit rate
    pub cache_hit_rate: f64,

    /// Uptime in seconds
    pub uptime_secs: u64,
}

/// Metrics collector
pub struct MetricsCollector {
    start_time: Instant,
    total_requests: AtomicU64,
    total_errors: AtomicU64,
    total_response_time_ms: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            total_requests: AtomicU64::new(0),
            total_errors: AtomicU64::new(0),
            total_response_time_ms: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
        }
    }

    /// Record a completed turn
    pub fn record_request(&self, response_time: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_ms
            .fetch_add(response_time.as_millis() as u64, Ordering::Relaxed);
    }

    /// Record a failed turn
    pub fn record_error(&self) {
        self.total_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reply cache hit
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a reply cache miss
    pub fn record_cache_miss(&self) {
        self.cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics
    pub fn get_metrics(&self) -> SystemMetrics {
        let total_requests = self.total_requests.load(Ordering::Relaxed);
        let total_errors = self.total_errors.load(Ordering::Relaxed);
        let total_response_time = self.total_response_time_ms.load(Ordering::Relaxed);
        let cache_hits = self.cache_hits.load(Ordering::Relaxed);
        let cache_misses = self.cache_misses.load(Ordering::Relaxed);

        let avg_response_time_ms = if total_requests > 0 {
            total_response_time as f64 / total_requests as f64
        } else {
            0.0
        };

        let cache_total = cache_hits + cache_misses;
        let cache_hit_rate = if cache_total > 0 {
            cache_hits as f64 / cache_total as f64
        } else {
            0.0
        };

        SystemMetrics {
            total_requests,
            total_errors,
            avg_response_time_ms,
            cache_hit_rate,
            uptime_secs: self.start_time.elapsed().as_secs(),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collector() {
        let collector = MetricsCollector::new();

        collector.record_request(Duration::from_millis(100));
        collector.record_request(Duration::from_millis(200));
        collector.record_error();
        collector.record_cache_hit();
        collector.record_cache_miss();

        let metrics = collector.get_metrics();

        assert_eq!(metrics.total_requests, 2);
        assert_eq!(metrics.total_errors, 1);
        assert_eq!(metrics.avg_response_time_ms, 150.0);
        assert_eq!(metrics.cache_hit_rate, 0.5);
    }

    #[test]
    fn test_empty_metrics() {
        let metrics = MetricsCollector::new().get_metrics();
        assert_eq!(metrics.avg_response_time_ms, 0.0);
        assert_eq!(metrics.cache_hit_rate, 0.0);
    }
}
