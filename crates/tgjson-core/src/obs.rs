//! Structured observability hooks for the report session lifecycle.
//!
//! Lifecycle events are emitted at `info!`, per-outcome events at `debug!`
//! (filter with `RUST_LOG`). Use [`SessionSpan`] to tag everything logged
//! during a session with the project name.

use std::path::Path;

use tracing::{debug, info, warn};

/// RAII guard that enters a session-scoped tracing span.
///
/// ```ignore
/// let _span = SessionSpan::enter("firmware-tests");
/// // tracing calls below carry project = "firmware-tests"
/// ```
pub struct SessionSpan {
    _span: tracing::span::EnteredSpan,
}

impl SessionSpan {
    pub fn enter(project: &str) -> Self {
        let span = tracing::info_span!("tgjson.session", project = %project);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: session started.
pub fn emit_session_started(project: &str, output: &Path) {
    info!(event = "session.started", project = %project, output = %output.display());
}

/// Emit event: test root scanned.
pub fn emit_structure_scanned(root: &Path, files: usize) {
    info!(event = "structure.scanned", root = %root.display(), files = files);
}

/// Emit event: one call-phase outcome folded into the tree.
pub fn emit_outcome_ingested(node_id: &str, verdict: &str, folder: Option<&str>) {
    debug!(
        event = "outcome.ingested",
        node_id = %node_id,
        verdict = %verdict,
        folder = folder.unwrap_or("."),
    );
}

/// Emit event: outcome skipped (non-call phase or duplicate).
pub fn emit_outcome_ignored(node_id: &str, reason: &str) {
    debug!(event = "outcome.ignored", node_id = %node_id, reason = %reason);
}

/// Emit event: constants could not be loaded, falling back to an empty list.
pub fn emit_constants_fallback(error: &dyn std::fmt::Display) {
    warn!(event = "constants.fallback", error = %error);
}

/// Emit event: report document written.
pub fn emit_report_written(path: &Path, testcases: usize, folders: usize) {
    info!(
        event = "report.written",
        path = %path.display(),
        testcases = testcases,
        folders = folders,
    );
}
