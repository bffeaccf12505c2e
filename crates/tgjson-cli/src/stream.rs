//! JSON Lines event stream ingestion.
//!
//! Each non-blank line is one `TestOutcome`. Lines that do not parse are
//! logged and skipped.

use std::io::BufRead;

use anyhow::{Context, Result};
use tgjson_core::{Ingest, ReportAggregator, TestOutcome};
use tracing::warn;

/// Counters for one ingested stream.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub recorded: usize,
    pub ignored: usize,
    pub malformed: usize,
}

impl StreamStats {
    pub fn merge(&mut self, other: StreamStats) {
        self.recorded += other.recorded;
        self.ignored += other.ignored;
        self.malformed += other.malformed;
    }
}

/// Feed every event in `reader` to `aggregator`, in order.
pub fn ingest_stream<R: BufRead>(
    aggregator: &mut ReportAggregator,
    reader: R,
    source: &str,
) -> Result<StreamStats> {
    let mut stats = StreamStats::default();

    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read {}:{}", source, idx + 1))?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let outcome: TestOutcome = match serde_json::from_str(trimmed) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(source = %source, line = idx + 1, error = %e, "skipping malformed event");
                stats.malformed += 1;
                continue;
            }
        };

        match aggregator.on_test_report(&outcome) {
            Ingest::Recorded => stats.recorded += 1,
            Ingest::IgnoredPhase | Ingest::Duplicate => stats.ignored += 1,
        }
    }

    Ok(stats)
}
