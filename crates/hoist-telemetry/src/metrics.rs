//! Publish and transfer counters backed by a private Prometheus registry.

use std::sync::Arc;

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

/// Cloneable handle to the publish counters; clones share one registry.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    publish_total: IntCounterVec,
    transfers_total: IntCounterVec,
    bytes_transferred_total: IntCounter,
    lock_failures_total: IntCounter,
}

/// Snapshot of selected counters for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Bytes copied or uploaded by any transport.
    pub bytes_transferred_total: u64,
    /// Lock marker writes that failed.
    pub lock_failures_total: u64,
}

impl Metrics {
    /// Fresh registry with every hoist collector registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let publish_total = IntCounterVec::new(
            Opts::new(
                "hoist_publish_total",
                "Publish calls by asset kind and outcome",
            ),
            &["kind", "outcome"],
        )
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "hoist_publish_total",
            source,
        })?;
        let transfers_total = IntCounterVec::new(
            Opts::new(
                "hoist_transfers_total",
                "Single-file transfers by transport and status",
            ),
            &["transport", "status"],
        )
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "hoist_transfers_total",
            source,
        })?;
        let bytes_transferred_total = IntCounter::with_opts(Opts::new(
            "hoist_bytes_transferred_total",
            "Bytes copied or uploaded to the destination",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "hoist_bytes_transferred_total",
            source,
        })?;
        let lock_failures_total = IntCounter::with_opts(Opts::new(
            "hoist_lock_failures_total",
            "Lock marker writes that failed and were ignored",
        ))
        .map_err(|source| TelemetryError::MetricsCollector {
            name: "hoist_lock_failures_total",
            source,
        })?;

        register(&registry, "hoist_publish_total", publish_total.clone())?;
        register(&registry, "hoist_transfers_total", transfers_total.clone())?;
        register(
            &registry,
            "hoist_bytes_transferred_total",
            bytes_transferred_total.clone(),
        )?;
        register(
            &registry,
            "hoist_lock_failures_total",
            lock_failures_total.clone(),
        )?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                publish_total,
                transfers_total,
                bytes_transferred_total,
                lock_failures_total,
            }),
        })
    }

    /// Increment the publish counter for an asset kind (`file`/`directory`) and outcome.
    pub fn inc_publish(&self, kind: &str, outcome: &str) {
        self.inner
            .publish_total
            .with_label_values(&[kind, outcome])
            .inc();
    }

    /// Increment the transfer counter for a transport and status (`ok`/`failed`).
    pub fn inc_transfer(&self, transport: &str, status: &str) {
        self.inner
            .transfers_total
            .with_label_values(&[transport, status])
            .inc();
    }

    /// Add to the transferred byte counter.
    pub fn add_bytes_transferred(&self, bytes: u64) {
        self.inner.bytes_transferred_total.inc_by(bytes);
    }

    /// Increment the ignored lock failure counter.
    pub fn inc_lock_failure(&self) {
        self.inner.lock_failures_total.inc();
    }

    /// Prometheus text exposition of every registered counter.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|source| TelemetryError::MetricsEncode { source })?;
        String::from_utf8(buffer).map_err(|source| TelemetryError::MetricsUtf8 { source })
    }

    /// Take a point-in-time snapshot of the scalar counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            bytes_transferred_total: self.inner.bytes_transferred_total.get(),
            lock_failures_total: self.inner.lock_failures_total.get(),
        }
    }
}

fn register<C>(registry: &Registry, name: &'static str, collector: C) -> Result<()>
where
    C: prometheus::core::Collector + 'static,
{
    registry
        .register(Box::new(collector))
        .map_err(|source| TelemetryError::MetricsRegister { name, source })
}
