//! Test outcome events handed over by the runner, and verdict mapping.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Lifecycle phase of a test report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Setup,
    Call,
    Teardown,
    /// Anything the runner sends that is not one of the known phases.
    #[serde(other)]
    Unknown,
}

/// One free-form key/value pair attached to a test by the runner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetadataEntry {
    #[serde(default)]
    pub key: String,
    #[serde(default = "empty_value")]
    pub value: Value,
}

fn empty_value() -> Value {
    Value::String(String::new())
}

/// A finished test phase as reported by the external runner.
///
/// Optional fields are resolved here, at the deserialization boundary:
/// a missing duration reads as `None` (treated as 0.0), missing artifacts
/// and metadata as empty lists.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestOutcome {
    /// `<file path>::<test function>`.
    pub node_id: String,

    #[serde(alias = "when")]
    pub phase: Phase,

    #[serde(default)]
    pub passed: bool,

    #[serde(default)]
    pub failed: bool,

    #[serde(default)]
    pub skipped: bool,

    /// Duration in seconds.
    #[serde(default)]
    pub duration: Option<f64>,

    #[serde(default)]
    pub artifacts: Vec<Value>,

    #[serde(default)]
    pub test_metadata: Vec<MetadataEntry>,
}

impl TestOutcome {
    /// Outcome for `node_id` in `phase` with every flag cleared.
    pub fn new(node_id: impl Into<String>, phase: Phase) -> Self {
        Self {
            node_id: node_id.into(),
            phase,
            passed: false,
            failed: false,
            skipped: false,
            duration: None,
            artifacts: Vec::new(),
            test_metadata: Vec::new(),
        }
    }

    /// Call-phase outcome that passed.
    pub fn passed(node_id: impl Into<String>) -> Self {
        Self {
            passed: true,
            ..Self::new(node_id, Phase::Call)
        }
    }

    /// Call-phase outcome that failed.
    pub fn failed(node_id: impl Into<String>) -> Self {
        Self {
            failed: true,
            ..Self::new(node_id, Phase::Call)
        }
    }

    /// Call-phase outcome that was skipped.
    pub fn skipped(node_id: impl Into<String>) -> Self {
        Self {
            skipped: true,
            ..Self::new(node_id, Phase::Call)
        }
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn with_artifact(mut self, artifact: Value) -> Self {
        self.artifacts.push(artifact);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.test_metadata.push(MetadataEntry {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    pub fn is_call(&self) -> bool {
        self.phase == Phase::Call
    }

    pub fn verdict(&self) -> Verdict {
        Verdict::from_flags(self.passed, self.failed, self.skipped)
    }
}

/// Verdict assigned to a single test execution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Passed,
    Failed,
    /// The test was skipped.
    Inconclusive,
    /// None of the runner's flags were set (collection errors and the like).
    Error,
}

impl Verdict {
    /// Map runner flags to a verdict with precedence
    /// FAILED > INCONCLUSIVE > PASSED > ERROR.
    pub fn from_flags(passed: bool, failed: bool, skipped: bool) -> Self {
        if failed {
            Verdict::Failed
        } else if skipped {
            Verdict::Inconclusive
        } else if passed {
            Verdict::Passed
        } else {
            Verdict::Error
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Passed => "PASSED",
            Verdict::Failed => "FAILED",
            Verdict::Inconclusive => "INCONCLUSIVE",
            Verdict::Error => "ERROR",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
