//! Session-scoped report aggregation.
//!
//! A [`ReportAggregator`] is created when the session starts, receives one
//! [`TestOutcome`] per finished test phase, and is consumed by
//! [`ReportAggregator::on_session_finish`], which writes the report.
//!
//! Each runner process owns its own aggregator. Nothing here is shared
//! between threads or processes.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::classify::classify;
use crate::config::ReportConfig;
use crate::constants::ConstantsBlock;
use crate::discovery::scan_test_structure;
use crate::error::Result;
use crate::obs;
use crate::outcome::TestOutcome;
use crate::record::TestRecord;
use crate::report::{write_report, ReportDocument};
use crate::tree::{FolderTree, Insertion};

/// What happened to one outcome handed to [`ReportAggregator::on_test_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    Recorded,
    /// Setup, teardown or unknown phase.
    IgnoredPhase,
    /// Top-level test already recorded under the same name.
    Duplicate,
}

pub struct ReportAggregator {
    config: ReportConfig,
    test_root: String,
    timestamp: i64,
    constants: Arc<ConstantsBlock>,
    tree: FolderTree,
    session_started_at: Option<DateTime<Utc>>,
    test_structure: BTreeSet<String>,
}

impl ReportAggregator {
    /// Create an aggregator stamped with the current time.
    pub fn new(config: ReportConfig) -> Self {
        Self::with_timestamp(config, Utc::now().timestamp_millis())
    }

    /// Create an aggregator with a fixed run timestamp (ms since epoch).
    pub fn with_timestamp(config: ReportConfig, timestamp: i64) -> Self {
        let constants = Arc::new(config.constants());
        let test_root = config.test_root_str();
        Self {
            config,
            test_root,
            timestamp,
            constants,
            tree: FolderTree::new(),
            session_started_at: None,
            test_structure: BTreeSet::new(),
        }
    }

    /// Record the session start time and scan the test root.
    pub fn on_session_start(&mut self) {
        self.session_started_at = Some(Utc::now());
        obs::emit_session_started(&self.config.project_name, &self.config.output_path);

        self.test_structure = scan_test_structure(&self.config.test_root, &self.config.naming);
        obs::emit_structure_scanned(&self.config.test_root, self.test_structure.len());
    }

    /// Fold one outcome into the tree. Only call-phase outcomes are recorded.
    pub fn on_test_report(&mut self, outcome: &TestOutcome) -> Ingest {
        if !outcome.is_call() {
            obs::emit_outcome_ignored(&outcome.node_id, "not a call phase");
            return Ingest::IgnoredPhase;
        }

        let classified = classify(&outcome.node_id, &self.test_root);
        let record = TestRecord::from_outcome(
            outcome,
            classified.name,
            self.timestamp,
            Arc::clone(&self.constants),
        );
        let verdict = record.verdict;

        let folder_key = classified.placement.folder_key();
        match self.tree.insert(folder_key, record) {
            Insertion::Inserted => {
                obs::emit_outcome_ingested(&outcome.node_id, verdict.as_str(), folder_key);
                Ingest::Recorded
            }
            Insertion::Duplicate => {
                obs::emit_outcome_ignored(&outcome.node_id, "duplicate top-level test");
                Ingest::Duplicate
            }
        }
    }

    /// Flatten the tree and clean every name. Consumes the aggregator.
    pub fn into_document(self) -> ReportDocument {
        let mut testcases = self.tree.into_nodes();
        self.config.naming.clean_nodes(&mut testcases);

        ReportDocument {
            name: self.config.project_name,
            timestamp: self.timestamp,
            testcases,
        }
    }

    /// Build the document and write it to the configured path.
    pub fn on_session_finish(self) -> Result<WrittenReport> {
        let path = self.config.output_path.clone();
        let document = self.into_document();
        write_report(&path, &document)?;

        let (testcases, folders) = document.counts();
        obs::emit_report_written(&path, testcases, folders);

        Ok(WrittenReport {
            path,
            testcases,
            folders,
        })
    }

    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn session_started_at(&self) -> Option<DateTime<Utc>> {
        self.session_started_at
    }

    pub fn output_path(&self) -> &Path {
        &self.config.output_path
    }

    pub fn constants(&self) -> &ConstantsBlock {
        &self.constants
    }

    /// Test files found by [`ReportAggregator::on_session_start`].
    pub fn test_structure(&self) -> &BTreeSet<String> {
        &self.test_structure
    }

    /// Number of recorded testcases so far.
    pub fn recorded(&self) -> usize {
        self.tree.len()
    }
}

/// Result of a successful finalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenReport {
    pub path: PathBuf,
    pub testcases: usize,
    pub folders: usize,
}

impl WrittenReport {
    /// One-line confirmation for the terminal.
    pub fn terminal_summary(&self) -> String {
        format!(
            "{:-^80}",
            format!(" Generated JSON report: {} ", self.path.display())
        )
    }
}
