//! Structured observability hooks for the batch lifecycle.
//!
//! - `BatchSpan` RAII guard that tags every event of one generation
//! - `emit_*` functions for start, per-resident outcome, finish and archive
//!
//! Filter with `RUST_LOG`; pass `--json` to the CLI for JSON lines.

use tracing::{info, warn};
use uuid::Uuid;

use crate::digest::Digest;
use crate::encoder::EncoderPath;

/// RAII guard that enters a batch-scoped span for the duration of a batch.
pub struct BatchSpan {
    _span: tracing::span::EnteredSpan,
}

impl BatchSpan {
    pub fn enter(batch_id: &Uuid, address: &str) -> Self {
        let span = tracing::info_span!("colonos.batch", batch_id = %batch_id, address = %address);
        Self {
            _span: span.entered(),
        }
    }
}

pub fn emit_batch_started(residents: usize, prefix: &str, include_lot_number: bool) {
    info!(
        event = "batch.started",
        residents = residents,
        prefix = %prefix,
        include_lot_number = include_lot_number,
    );
}

pub fn emit_artifact_generated(ordinal: u32, code: &str, path: EncoderPath, side_px: u32) {
    info!(
        event = "artifact.generated",
        ordinal = ordinal,
        code = %code,
        encoder_path = ?path,
        side_px = side_px,
    );
}

/// Emit event: one resident could not be rendered (warning level).
pub fn emit_resident_failed(ordinal: u32, code: &str, reason: &dyn std::fmt::Display) {
    warn!(event = "artifact.failed", ordinal = ordinal, code = %code, reason = %reason);
}

/// Emit event: batch refused before any resident was attempted (warning level).
pub fn emit_batch_rejected(address: &str, residents: usize, reason: &dyn std::fmt::Display) {
    warn!(
        event = "batch.rejected",
        address = %address,
        residents = residents,
        reason = %reason,
    );
}

pub fn emit_batch_finished(artifacts: usize, failures: usize, duration_ms: u64) {
    info!(
        event = "batch.finished",
        artifacts = artifacts,
        failures = failures,
        duration_ms = duration_ms,
        success = artifacts > 0,
    );
}

pub fn emit_archive_assembled(file_name: &str, entries: usize, bytes: usize, digest: &Digest) {
    info!(
        event = "archive.assembled",
        file_name = %file_name,
        entries = entries,
        bytes = bytes,
        sha256 = %digest,
    );
}


#[cfg(test)]
mod tests {
    use super::capture::record;
    use super::*;
    use tracing::Level;

    #[test]
    fn events_inside_batch_span_are_tagged() {
        let ((), events) = record(|| {
            let _span = BatchSpan::enter(&Uuid::new_v4(), "Calle 10");
            emit_batch_started(2, "girasol", true);
        });
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event.as_deref(), Some("batch.started"));
        assert_eq!(events[0].span, Some("colonos.batch"));
    }

    #[test]
    fn rejected_batch_is_a_warning() {
        let ((), events) = record(|| emit_batch_rejected("", 0, &"address must not be empty"));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::WARN);
        assert_eq!(events[0].event.as_deref(), Some("batch.rejected"));
        assert_eq!(events[0].span, None);
    }
}
