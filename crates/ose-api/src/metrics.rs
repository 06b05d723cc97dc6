//! Prometheus metrics for the RPC surface
use prometheus::{
    Encoder, Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder,
};

pub struct AdvisoryMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    quality_score: Histogram,
}

impl AdvisoryMetrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new("ose_rpc_requests_total", "RPC requests by method and status"),
            &["method", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration_seconds = HistogramVec::new(
            HistogramOpts::new("ose_rpc_duration_seconds", "RPC latency in seconds").buckets(vec![
                0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
            ]),
            &["method"],
        )?;
        registry.register(Box::new(request_duration_seconds.clone()))?;

        let quality_score = Histogram::with_opts(
            HistogramOpts::new("ose_quality_score", "Overall quality score of registered services")
                .buckets(vec![0.1, 0.2, 0.35, 0.5, 0.65, 0.75, 0.85, 0.95, 1.0]),
        )?;
        registry.register(Box::new(quality_score.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration_seconds,
            quality_score,
        })
    }

    pub fn observe_request(&self, method: &str, status: u16, seconds: f64) {
        self.requests_total
            .with_label_values(&[method, &status.to_string()])
            .inc();
        self.request_duration_seconds
            .with_label_values(&[method])
            .observe(seconds);
    }

    pub fn observe_quality(&self, xi: f64) {
        self.quality_score.observe(xi);
    }

    /// Text exposition of every registered metric
    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}
