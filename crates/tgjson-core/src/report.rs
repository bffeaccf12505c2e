//! Report document and its JSON serialization.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::record::{count_nodes, ReportNode};

/// The whole report written at the end of a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportDocument {
    pub name: String,
    /// Run start, milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub testcases: Vec<ReportNode>,
}

impl ReportDocument {
    /// `(testcases, folders)` across the whole tree.
    pub fn counts(&self) -> (usize, usize) {
        count_nodes(&self.testcases)
    }

    /// Render as JSON with a 4-space indent.
    pub fn to_json_pretty(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        // serde_json only ever emits valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}

/// Write `document` to `path`, creating missing parent directories and
/// replacing any existing file.
pub fn write_report(path: &Path, document: &ReportDocument) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ReportError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let content = document.to_json_pretty()?;
    std::fs::write(path, content).map_err(|source| ReportError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
