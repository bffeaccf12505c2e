//! Display-name cleaning for testcases and folders.

use serde::{Deserialize, Serialize};

use crate::classify::NODE_SEPARATOR;
use crate::record::ReportNode;

/// Naming conventions of the test runner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NamingRules {
    /// Prefix marking test files and test functions.
    pub test_prefix: String,
    /// Suffix of test source files.
    pub file_suffix: String,
}

impl Default for NamingRules {
    fn default() -> Self {
        Self {
            test_prefix: "test_".to_string(),
            file_suffix: ".py".to_string(),
        }
    }
}

impl NamingRules {
    /// Whether `file_name` looks like a test source file.
    pub fn is_test_file(&self, file_name: &str) -> bool {
        file_name.starts_with(&self.test_prefix) && file_name.ends_with(&self.file_suffix)
    }

    /// Clean a testcase name.
    ///
    /// For `<file>::<func>` the file part loses its extension and the test
    /// prefix, the function part loses the test prefix and then a leading
    /// `<file>_` that repeats the file part, so
    /// `test_chicken.py::test_chicken_talks` becomes `chicken-talks`.
    /// A name without `::` only loses its leading prefix.
    pub fn clean_testcase_name(&self, name: &str) -> String {
        match name.split_once(NODE_SEPARATOR) {
            Some((file_part, func_part)) => {
                let file_part = self.strip_prefix(strip_extension(basename(file_part)));
                let func_part = self.strip_prefix(func_part);
                let func_part = strip_file_echo(func_part, file_part);
                format!("{file_part}-{func_part}")
            }
            None => self.strip_prefix(name).to_string(),
        }
    }

    /// Clean a folder name by removing every occurrence of the test prefix
    /// and of the file suffix, wherever they appear.
    pub fn clean_folder_name(&self, name: &str) -> String {
        let mut cleaned = name.to_string();
        if !self.test_prefix.is_empty() {
            cleaned = cleaned.replace(&self.test_prefix, "");
        }
        if !self.file_suffix.is_empty() {
            cleaned = cleaned.replace(&self.file_suffix, "");
        }
        cleaned
    }

    /// Clean every name in `nodes`, recursing into folders.
    pub fn clean_nodes(&self, nodes: &mut [ReportNode]) {
        for node in nodes {
            match node {
                ReportNode::Testcase(record) => {
                    record.name = self.clean_testcase_name(&record.name);
                }
                ReportNode::Folder(folder) => {
                    folder.name = self.clean_folder_name(&folder.name);
                    self.clean_nodes(&mut folder.testcases);
                }
            }
        }
    }

    fn strip_prefix<'a>(&self, s: &'a str) -> &'a str {
        s.strip_prefix(self.test_prefix.as_str()).unwrap_or(s)
    }
}

fn basename(path: &str) -> &str {
    path.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(path)
}

/// `chicken_talks` under file `chicken` reads as `talks`. Never empties the
/// function part.
///
/// This also folds `test_egg.py::test_egg_hatch` to `egg-hatch`, where a
/// plain prefix strip would give `egg-egg_hatch`. Reports compared against
/// the older naming differ for such tests.
fn strip_file_echo<'a>(func: &'a str, file: &str) -> &'a str {
    if file.is_empty() {
        return func;
    }
    match func.strip_prefix(file).and_then(|rest| rest.strip_prefix('_')) {
        Some(rest) if !rest.is_empty() => rest,
        _ => func,
    }
}

/// Drop the last extension; leading dots do not start an extension.
fn strip_extension(file: &str) -> &str {
    match file.rfind('.') {
        Some(idx) if file[..idx].chars().any(|c| c != '.') => &file[..idx],
        _ => file,
    }
}
