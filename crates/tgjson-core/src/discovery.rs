//! Test structure discovery.
//!
//! Scans the test root once at session start. The result is informative
//! only: aggregation never depends on it.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::names::NamingRules;

/// Relative, `/`-separated paths of every test file under `root`.
///
/// A missing root yields an empty set. Unreadable directories are skipped
/// and symlinked directories are not descended into.
pub fn scan_test_structure(root: &Path, rules: &NamingRules) -> BTreeSet<String> {
    let mut found = BTreeSet::new();
    scan_recursive(root, root, rules, &mut found);
    found
}

fn scan_recursive(root: &Path, dir: &Path, rules: &NamingRules, found: &mut BTreeSet<String>) {
    if !dir.is_dir() {
        return;
    }

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            scan_recursive(root, &path, rules, found);
            continue;
        }
        if file_type.is_symlink() && path.is_dir() {
            continue;
        }

        let name = entry.file_name();
        if !rules.is_test_file(&name.to_string_lossy()) {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(&path);
        found.insert(relative.to_string_lossy().replace('\\', "/"));
    }
}
