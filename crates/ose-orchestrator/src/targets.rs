//! Performance targets derived from constraints

use ose_core::{PerformanceTargets, ServiceConstraints};

/// Error-rate ceiling applied to every blueprint
pub const MAX_ERROR_RATE: f64 = 0.01;

/// p95 = 0.8 x p99 and p50 = 0.5 x p99, truncated to whole milliseconds
pub fn performance_targets(constraints: &ServiceConstraints) -> PerformanceTargets {
    let p99 = constraints.latency_p99_ms;

    PerformanceTargets {
        target_tps: constraints.throughput_tps,
        target_p99_ms: p99,
        target_p95_ms: p99.saturating_mul(4) / 5,
        target_p50_ms: p99 / 2,
        max_error_rate: MAX_ERROR_RATE,
    }
}
