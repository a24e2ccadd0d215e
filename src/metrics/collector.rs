// src/metrics/collector.rs
use crate::health::HealthStatus;
use crate::poller::PollOutcome;
use anyhow::Result;
use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub struct MetricsRegistry {
    registry: Registry,
    collector: Arc<MetricsCollector>,
}

impl MetricsRegistry {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let collector = Arc::new(MetricsCollector::new(&registry)?);

        Ok(Self {
            registry,
            collector,
        })
    }

    pub fn collector(&self) -> Arc<MetricsCollector> {
        self.collector.clone()
    }

    pub fn gather(&self) -> Result<Vec<u8>> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(buffer)
    }
}

pub struct MetricsCollector {
    pub polls_total: IntCounterVec,
    pub poll_duration_seconds: Histogram,
    pub polls_in_flight: IntGauge,
    pub health_status: IntGauge,
}

impl MetricsCollector {
    pub fn new(registry: &Registry) -> Result<Self> {
        let polls_total = IntCounterVec::new(
            Opts::new("status_poller_polls_total", "Completed polls by outcome"),
            &["outcome"],
        )?;
        registry.register(Box::new(polls_total.clone()))?;

        let poll_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "status_poller_poll_duration_seconds",
            "Time from request start to display update",
        ))?;
        registry.register(Box::new(poll_duration_seconds.clone()))?;

        let polls_in_flight = IntGauge::new(
            "status_poller_polls_in_flight",
            "Polls started but not yet completed",
        )?;
        registry.register(Box::new(polls_in_flight.clone()))?;

        let health_status = IntGauge::new(
            "status_poller_health_status",
            "Last reported health (1=active, 0=inactive, -1=unknown)",
        )?;
        health_status.set(-1);
        registry.register(Box::new(health_status.clone()))?;

        Ok(Self {
            polls_total,
            poll_duration_seconds,
            polls_in_flight,
            health_status,
        })
    }

    pub fn poll_started(&self) {
        self.polls_in_flight.inc();
    }

    pub fn record_poll(&self, outcome: PollOutcome, duration: Duration) {
        self.polls_in_flight.dec();
        self.polls_total
            .with_label_values(&[outcome.label()])
            .inc();
        self.poll_duration_seconds.observe(duration.as_secs_f64());

        if let Some(status) = outcome.health_status() {
            self.health_status.set(match status {
                HealthStatus::Active => 1,
                HealthStatus::Inactive => 0,
            });
        }
    }
}

// Helper for timing operations
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
