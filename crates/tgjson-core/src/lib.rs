//! tgjson core library
//!
//! Folds per-test outcome events from a test runner into a nested folder
//! tree and writes a single JSON report at the end of the session.
//!
//! ```no_run
//! use tgjson_core::{ReportAggregator, ReportConfig, TestOutcome};
//!
//! let config = ReportConfig::new("~/reports/run.json", "firmware-tests")
//!     .with_ecu(Some("BCM".into()), Some("2.5.1".into()));
//! let mut aggregator = ReportAggregator::new(config);
//! aggregator.on_session_start();
//! aggregator.on_test_report(&TestOutcome::passed("tests/hw/test_sensor.py::test_read"));
//! let written = aggregator.on_session_finish()?;
//! println!("{}", written.terminal_summary());
//! # Ok::<(), tgjson_core::ReportError>(())
//! ```

pub mod aggregator;
pub mod classify;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod names;
pub mod obs;
pub mod outcome;
pub mod record;
pub mod report;
pub mod telemetry;
pub mod tree;

pub use aggregator::{Ingest, ReportAggregator, WrittenReport};
pub use classify::{classify, ClassifiedTest, Placement};
pub use config::{detect_project_name, expand_path, ReportConfig};
pub use constants::{Constant, ConstantsBlock};
pub use discovery::scan_test_structure;
pub use error::{ReportError, Result};
pub use names::NamingRules;
pub use outcome::{MetadataEntry, Phase, TestOutcome, Verdict};
pub use record::{Attribute, FolderNode, ReportNode, TestRecord};
pub use report::{write_report, ReportDocument};
pub use telemetry::init_tracing;
pub use tree::{FolderTree, Insertion};
