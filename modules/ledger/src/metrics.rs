use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounterVec, Opts, Registry, TextEncoder};
use std::time::Instant;

use crate::error::LedgerError;

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,

    // Counters
    pub ledger_writes_total: IntCounterVec,

    // Histograms
    pub ledger_write_duration_seconds: HistogramVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let ledger_writes_total = IntCounterVec::new(
            Opts::new("ledger_writes_total", "Ledger module write operations"),
            &["op", "result"], // result: ok or an error kind
        )?;

        let ledger_write_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "ledger_write_duration_seconds",
                "Ledger module write duration seconds",
            ),
            &["op"],
        )?;

        registry.register(Box::new(ledger_writes_total.clone()))?;
        registry.register(Box::new(ledger_write_duration_seconds.clone()))?;

        Ok(Self {
            registry,
            ledger_writes_total,
            ledger_write_duration_seconds,
        })
    }

    /// Record the outcome and duration of one write started at `started`
    pub fn observe_write<T>(&self, op: &str, started: Instant, outcome: &Result<T, LedgerError>) {
        let result = match outcome {
            Ok(_) => "ok",
            Err(e) => e.kind(),
        };
        self.ledger_writes_total.with_label_values(&[op, result]).inc();
        self.ledger_write_duration_seconds
            .with_label_values(&[op])
            .observe(started.elapsed().as_secs_f64());
    }

    pub fn render(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let mf = self.registry.gather();
        let mut buf = Vec::new();
        encoder.encode(&mf, &mut buf).map_err(|e| e.to_string())?;
        String::from_utf8(buf).map_err(|e| e.to_string())
    }

    pub fn timer() -> Instant {
        Instant::now()
    }
}
