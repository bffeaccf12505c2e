//! tgjson - hierarchical JSON test reports
//!
//! Reads test outcome events as JSON Lines (one event per finished test
//! phase) from files or stdin, folds them into a folder tree, and writes a
//! single JSON report.
//!
//! Every option can also come from a `TGJSON_*` environment variable. When
//! no report path is configured, reporting is disabled and nothing is
//! written.

mod stream;

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tgjson_core::obs::SessionSpan;
use tgjson_core::{detect_project_name, NamingRules, ReportAggregator, ReportConfig};
use tracing::{info, Level};

use crate::stream::{ingest_stream, StreamStats};

#[derive(Parser, Debug)]
#[command(name = "tgjson")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Build a hierarchical JSON test report from runner events", long_about = None)]
struct Cli {
    /// Where to store the JSON report (supports ~ and $VARS)
    #[arg(long = "json", env = "TGJSON_REPORT")]
    json_path: Option<String>,

    /// Project name written into the report (default: detected from the project root)
    #[arg(long, env = "TGJSON_PROJECT_NAME")]
    project_name: Option<String>,

    /// ECU / component name
    #[arg(long, env = "TGJSON_ECU_NAME")]
    ecu_name: Option<String>,

    /// ECU / component version, e.g. 2.5.1
    #[arg(long, env = "TGJSON_ECU_VERSION")]
    ecu_version: Option<String>,

    /// Firmware metadata.json to read ECU constants from (overrides --ecu-*)
    #[arg(long, env = "TGJSON_METADATA")]
    metadata: Option<PathBuf>,

    /// Test root that report folders are relative to
    #[arg(long, env = "TGJSON_TEST_ROOT", default_value = tgjson_core::config::DEFAULT_TEST_ROOT)]
    test_root: PathBuf,

    /// Prefix of test files and functions, stripped from report names
    #[arg(long, default_value = "test_")]
    test_prefix: String,

    /// Suffix of test files, stripped from report names
    #[arg(long, default_value = ".py")]
    file_suffix: String,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long)]
    log_json: bool,

    /// Event files (JSON Lines). Reads stdin when none are given.
    events: Vec<PathBuf>,
}

impl Cli {
    fn report_config(&self, json_path: &str) -> Result<ReportConfig> {
        let project_name = match &self.project_name {
            Some(name) => name.clone(),
            None => {
                let cwd = std::env::current_dir().context("Failed to get current directory")?;
                detect_project_name(&cwd)
            }
        };

        let mut config = ReportConfig::new(json_path, project_name)
            .with_ecu(self.ecu_name.clone(), self.ecu_version.clone())
            .with_test_root(&self.test_root)
            .with_naming(NamingRules {
                test_prefix: self.test_prefix.clone(),
                file_suffix: self.file_suffix.clone(),
            });
        if let Some(metadata) = &self.metadata {
            config = config.with_metadata_path(metadata);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tgjson_core::init_tracing(cli.log_json, level);

    let Some(json_path) = cli.json_path.as_deref() else {
        info!("No report path configured (--json / TGJSON_REPORT); JSON reporting disabled");
        return Ok(());
    };

    let config = cli.report_config(json_path)?;
    let _span = SessionSpan::enter(&config.project_name);

    let mut aggregator = ReportAggregator::new(config);
    aggregator.on_session_start();

    let stats = ingest_sources(&mut aggregator, &cli.events)?;
    info!(
        recorded = stats.recorded,
        ignored = stats.ignored,
        malformed = stats.malformed,
        "Event ingestion finished"
    );

    let written = aggregator
        .on_session_finish()
        .context("Failed to write JSON report")?;
    println!("{}", written.terminal_summary());

    Ok(())
}

fn ingest_sources(aggregator: &mut ReportAggregator, sources: &[PathBuf]) -> Result<StreamStats> {
    let mut total = StreamStats::default();

    if sources.is_empty() {
        let stdin = std::io::stdin();
        total.merge(ingest_stream(aggregator, stdin.lock(), "<stdin>")?);
        return Ok(total);
    }

    for path in sources {
        let file = File::open(path).with_context(|| format!("Failed to open events file {:?}", path))?;
        let source = path.display().to_string();
        total.merge(ingest_stream(aggregator, BufReader::new(file), &source)?);
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_report_options() {
        let cli = Cli::try_parse_from([
            "tgjson",
            "--json",
            "/tmp/out/report.json",
            "--project-name",
            "brakes",
            "--ecu-name",
            "BCM",
            "--ecu-version",
            "2.5",
            "--test-root",
            "it",
            "events-1.jsonl",
            "events-2.jsonl",
        ])
        .expect("parse");

        assert_eq!(cli.json_path.as_deref(), Some("/tmp/out/report.json"));
        assert_eq!(cli.events.len(), 2);

        let config = cli.report_config("/tmp/out/report.json").expect("config");
        assert_eq!(config.project_name, "brakes");
        assert_eq!(config.test_root, PathBuf::from("it"));
        assert_eq!(config.constants().get("Release_Version_Minor"), Some("5"));
    }

    #[test]
    fn test_ingest_sources_reads_files_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let first = dir.path().join("w1.jsonl");
        let second = dir.path().join("w2.jsonl");
        std::fs::write(
            &first,
            "{\"nodeId\": \"tests/hw/test_a.py::test_x\", \"phase\": \"call\", \"passed\": true}\n",
        )
        .expect("write");
        std::fs::write(
            &second,
            "{\"nodeId\": \"tests/hw/test_a.py::test_y\", \"phase\": \"call\", \"skipped\": true}\n",
        )
        .expect("write");

        let config = ReportConfig::new(&dir.path().join("r.json").to_string_lossy(), "p");
        let mut agg = ReportAggregator::with_timestamp(config, 0);
        let stats = ingest_sources(&mut agg, &[first, second]).expect("ingest");
        assert_eq!(stats.recorded, 2);

        let doc = agg.into_document();
        let hw = doc.testcases[0].as_folder().expect("hw");
        let names: Vec<&str> = hw.testcases.iter().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a-x", "a-y"]);
    }

    #[test]
    fn test_missing_events_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = ReportConfig::new(&dir.path().join("r.json").to_string_lossy(), "p");
        let mut agg = ReportAggregator::with_timestamp(config, 0);
        let err = ingest_sources(&mut agg, &[dir.path().join("absent.jsonl")]).unwrap_err();
        assert!(err.to_string().contains("Failed to open events file"));
    }
}
