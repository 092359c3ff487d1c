//! Stage → progress mapping.
//!
//! [`to_progress`] is pure. [`ProgressEmitter`] adds the per-run
//! high-water mark that keeps emitted percentages non-decreasing when a
//! chunk attempt restarts from zero.

use std::sync::atomic::{AtomicU8, Ordering};

use assetmint_protocol::types::{Stage, UploadProgress};

use crate::types::ProgressCallback;

/// Overall percent range `[start, end]` of each stage.
pub const STAGE_RANGES: [(Stage, u8, u8); 7] = [
    (Stage::Validating, 0, 5),
    (Stage::Preparing, 5, 12),
    (Stage::Processing, 12, 18),
    (Stage::Uploading, 18, 75),
    (Stage::Finalizing, 75, 85),
    (Stage::RequestingMint, 85, 99),
    (Stage::Done, 100, 100),
];

/// Returns the percent range of `stage`.
pub fn stage_range(stage: Stage) -> (u8, u8) {
    STAGE_RANGES
        .iter()
        .find(|(s, _, _)| *s == stage)
        .map(|&(_, start, end)| (start, end))
        .unwrap_or((0, 0))
}

/// Chunk counters of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Counters {
    pub uploaded_chunks: u32,
    pub total_chunks: u32,
    /// 1-based chunk in flight; 0 before chunking.
    pub current_chunk: u32,
    /// Fraction of the in-flight chunk already sent, 0.0-1.0.
    pub chunk_fraction: f64,
}

/// Overall percent after `uploaded` of `total` chunks, with the next chunk
/// `fraction` complete.
pub fn uploading_percent(uploaded: u32, total: u32, fraction: f64) -> u8 {
    let (start, end) = stage_range(Stage::Uploading);
    if total == 0 {
        return end;
    }
    let span = f64::from(end - start);
    let per_chunk = span / f64::from(total);
    let raw = f64::from(start)
        + f64::from(uploaded) * per_chunk
        + fraction.clamp(0.0, 1.0) * per_chunk;
    raw.round().clamp(f64::from(start), f64::from(end)) as u8
}

fn status_for(stage: Stage, counters: &Counters) -> String {
    match stage {
        Stage::Validating => "Validating file...".into(),
        Stage::Preparing => "Preparing upload...".into(),
        Stage::Processing => "Processing file...".into(),
        Stage::Uploading => format!(
            "Uploading chunk {} of {}...",
            counters.current_chunk, counters.total_chunks
        ),
        Stage::Finalizing => "Finalizing upload...".into(),
        Stage::RequestingMint => "Requesting mint...".into(),
        Stage::Done => "Upload complete!".into(),
    }
}

/// Builds the progress snapshot for `stage` with `counters`.
pub fn to_progress(stage: Stage, counters: &Counters) -> UploadProgress {
    let (percent, chunk_progress) = match stage {
        Stage::Uploading => {
            // The current chunk is in flight until the uploaded count
            // catches up with it.
            let in_flight = counters.current_chunk > counters.uploaded_chunks;
            let fraction = if in_flight {
                counters.chunk_fraction.clamp(0.0, 1.0)
            } else {
                0.0
            };
            let chunk_progress = match (counters.current_chunk, in_flight) {
                (0, _) => None,
                (_, true) => Some((fraction * 100.0).round() as u8),
                (_, false) => Some(100),
            };
            (
                uploading_percent(counters.uploaded_chunks, counters.total_chunks, fraction),
                chunk_progress,
            )
        }
        other => (stage_range(other).0, None),
    };

    UploadProgress {
        stage,
        percent,
        uploaded_chunks: counters.uploaded_chunks,
        total_chunks: counters.total_chunks,
        current_chunk: counters.current_chunk,
        status: status_for(stage, counters),
        chunk_progress,
    }
}

/// Forwards snapshots to the caller's callback, never letting the
/// percentage go backwards.
pub(crate) struct ProgressEmitter {
    callback: Option<ProgressCallback>,
    high_water: AtomicU8,
}

impl ProgressEmitter {
    pub(crate) fn new(callback: Option<ProgressCallback>) -> Self {
        Self {
            callback,
            high_water: AtomicU8::new(0),
        }
    }

    pub(crate) fn emit(&self, mut progress: UploadProgress) {
        let previous = self.high_water.fetch_max(progress.percent, Ordering::SeqCst);
        progress.percent = progress.percent.max(previous);
        if let Some(cb) = &self.callback {
            cb(progress);
        }
    }
}
