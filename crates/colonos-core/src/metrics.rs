//! Global atomic counters for batch generation.
//!
//! Counters are incremented silently at the call site. Call
//! [`Metrics::flush`] to emit current values as a single
//! `tracing::info!` event (e.g. at the end of a CLI invocation).

use std::sync::atomic::{AtomicU64, Ordering};

/// Global metrics singleton.
pub static METRICS: Metrics = Metrics::new();

/// Lightweight atomic counters.
pub struct Metrics {
    codes_derived: AtomicU64,
    fixed_encodes: AtomicU64,
    auto_fallbacks: AtomicU64,
    encode_failures: AtomicU64,
    archives_assembled: AtomicU64,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub const fn new() -> Self {
        Self {
            codes_derived: AtomicU64::new(0),
            fixed_encodes: AtomicU64::new(0),
            auto_fallbacks: AtomicU64::new(0),
            encode_failures: AtomicU64::new(0),
            archives_assembled: AtomicU64::new(0),
        }
    }

    pub fn inc_codes_derived(&self) {
        self.codes_derived.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "codes_derived", "counter incremented");
    }

    pub fn inc_fixed_encodes(&self) {
        self.fixed_encodes.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "fixed_encodes", "counter incremented");
    }

    pub fn inc_auto_fallbacks(&self) {
        self.auto_fallbacks.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "auto_fallbacks", "counter incremented");
    }

    pub fn inc_encode_failures(&self) {
        self.encode_failures.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "encode_failures", "counter incremented");
    }

    pub fn inc_archives(&self) {
        self.archives_assembled.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(metric = "archives_assembled", "counter incremented");
    }

    /// Emit all current counter values as a single `info!` event.
    pub fn flush(&self) {
        tracing::info!(
            metric = "flush",
            codes_derived = self.codes_derived(),
            fixed_encodes = self.fixed_encodes(),
            auto_fallbacks = self.auto_fallbacks(),
            encode_failures = self.encode_failures(),
            archives_assembled = self.archives_assembled(),
        );
    }

    pub fn codes_derived(&self) -> u64 {
        self.codes_derived.load(Ordering::Relaxed)
    }

    pub fn fixed_encodes(&self) -> u64 {
        self.fixed_encodes.load(Ordering::Relaxed)
    }

    pub fn auto_fallbacks(&self) -> u64 {
        self.auto_fallbacks.load(Ordering::Relaxed)
    }

    pub fn encode_failures(&self) -> u64 {
        self.encode_failures.load(Ordering::Relaxed)
    }

    pub fn archives_assembled(&self) -> u64 {
        self.archives_assembled.load(Ordering::Relaxed)
    }
}
