//! Report node types: testcases and folders, as they appear in the output.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::ConstantsBlock;
use crate::outcome::{TestOutcome, Verdict};

/// Runner metadata attached to a testcase as `{key, value}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attribute {
    pub key: String,
    pub value: Value,
}

/// One test execution in the report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TestRecord {
    pub name: String,
    pub verdict: Verdict,
    /// Run timestamp (ms since epoch), shared by every record in a run.
    pub timestamp: i64,
    /// Execution time in whole milliseconds.
    pub execution_time: u64,
    pub artifacts: Vec<Value>,
    pub constants: Arc<ConstantsBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Vec<Attribute>>,
}

impl TestRecord {
    /// Build a record from a runner outcome.
    ///
    /// `name` is the classified (not yet cleaned) display name.
    pub fn from_outcome(
        outcome: &TestOutcome,
        name: String,
        timestamp: i64,
        constants: Arc<ConstantsBlock>,
    ) -> Self {
        let attributes = if outcome.test_metadata.is_empty() {
            None
        } else {
            Some(
                outcome
                    .test_metadata
                    .iter()
                    .map(|m| Attribute {
                        key: m.key.clone(),
                        value: m.value.clone(),
                    })
                    .collect(),
            )
        };

        Self {
            name,
            verdict: outcome.verdict(),
            timestamp,
            execution_time: duration_to_millis(outcome.duration.unwrap_or(0.0)),
            artifacts: outcome.artifacts.clone(),
            constants,
            attributes,
        }
    }

    /// Append one attribute after construction.
    pub fn push_attribute(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attributes.get_or_insert_with(Vec::new).push(Attribute {
            key: key.into(),
            value: value.into(),
        });
    }
}

/// Seconds to whole milliseconds, truncating. Negative and non-finite
/// durations read as zero.
pub fn duration_to_millis(seconds: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 {
        return 0;
    }
    (seconds * 1000.0) as u64
}

/// A folder of testcases and nested folders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FolderNode {
    pub name: String,
    pub testcases: Vec<ReportNode>,
}

/// Entry of a `testcases` array, tagged by `@type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "@type")]
pub enum ReportNode {
    #[serde(rename = "testcase")]
    Testcase(TestRecord),
    #[serde(rename = "testcasefolder")]
    Folder(FolderNode),
}

impl ReportNode {
    pub fn name(&self) -> &str {
        match self {
            ReportNode::Testcase(record) => &record.name,
            ReportNode::Folder(folder) => &folder.name,
        }
    }

    pub fn as_testcase(&self) -> Option<&TestRecord> {
        match self {
            ReportNode::Testcase(record) => Some(record),
            ReportNode::Folder(_) => None,
        }
    }

    pub fn as_folder(&self) -> Option<&FolderNode> {
        match self {
            ReportNode::Folder(folder) => Some(folder),
            ReportNode::Testcase(_) => None,
        }
    }
}

/// Count testcases and folders in a node list, recursively.
pub fn count_nodes(nodes: &[ReportNode]) -> (usize, usize) {
    nodes.iter().fold((0, 0), |(tc, fo), node| match node {
        ReportNode::Testcase(_) => (tc + 1, fo),
        ReportNode::Folder(folder) => {
            let (sub_tc, sub_fo) = count_nodes(&folder.testcases);
            (tc + sub_tc, fo + 1 + sub_fo)
        }
    })
}
