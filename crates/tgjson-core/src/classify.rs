//! Path classification: top-level vs. foldered tests.
//!
//! Paths are compared lexically and never resolved against the filesystem.
//! When only one side is absolute, the other is anchored at the working
//! directory first.

use std::path::Path;

/// Separator between the file path and the test function in a node id.
pub const NODE_SEPARATOR: &str = "::";

/// Where a test lands in the report tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    /// The test file sits directly under the test root.
    TopLevel,
    /// Folder key relative to the test root, `/`-separated.
    Folder(String),
}

impl Placement {
    pub fn folder_key(&self) -> Option<&str> {
        match self {
            Placement::TopLevel => None,
            Placement::Folder(key) => Some(key),
        }
    }
}

/// Result of classifying one node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedTest {
    pub placement: Placement,
    /// Raw display name, `<file basename>::<test function>`.
    pub name: String,
}

/// Classify `node_id` against `test_root`.
///
/// The node id is split on its first `::`; backslashes in the file path are
/// read as `/`. A file without a directory component, or whose directory is
/// the test root itself, is top-level.
pub fn classify(node_id: &str, test_root: &str) -> ClassifiedTest {
    let (file_path, test_func) = match node_id.split_once(NODE_SEPARATOR) {
        Some((file, func)) => (file, func),
        None => (node_id, ""),
    };
    let file_path = file_path.replace('\\', "/");

    let (dir, basename) = match file_path.rsplit_once('/') {
        Some((dir, base)) => (dir, base),
        None => ("", file_path.as_str()),
    };
    let name = format!("{basename}{NODE_SEPARATOR}{test_func}");

    if dir.is_empty() {
        return ClassifiedTest {
            placement: Placement::TopLevel,
            name,
        };
    }

    let rel = relative_path(dir, &test_root.replace('\\', "/"));
    let placement = if rel == "." {
        Placement::TopLevel
    } else {
        Placement::Folder(rel)
    };

    ClassifiedTest { placement, name }
}

/// `path` relative to `base`, joined with `/`. Returns `"."` when the two
/// are the same directory.
///
/// If exactly one of the two is absolute, the relative one is taken as
/// relative to the current working directory.
pub fn relative_path(path: &str, base: &str) -> String {
    if is_absolute(path) == is_absolute(base) {
        return lexical_relative(path, base);
    }
    match std::env::current_dir() {
        Ok(cwd) => {
            let cwd = cwd.to_string_lossy().replace('\\', "/");
            relative_path_in(path, base, &cwd)
        }
        Err(_) => lexical_relative(path, base),
    }
}

fn relative_path_in(path: &str, base: &str, cwd: &str) -> String {
    let anchor = |p: &str| {
        if is_absolute(p) {
            p.to_string()
        } else {
            format!("{cwd}/{p}")
        }
    };
    lexical_relative(&anchor(path), &anchor(base))
}

fn is_absolute(path: &str) -> bool {
    path.starts_with('/') || Path::new(path).is_absolute()
}

fn lexical_relative(path: &str, base: &str) -> String {
    let target = normalize(path);
    let base = normalize(base);

    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = std::iter::repeat("..").take(base.len() - common).collect();
    parts.extend(target[common..].iter().copied());

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

fn normalize(path: &str) -> Vec<&str> {
    let mut out: Vec<&str> = Vec::new();
    for part in path.split('/') {
        match part {
            "" | "." => {}
            ".." => match out.last() {
                Some(last) if *last != ".." => {
                    out.pop();
                }
                _ => out.push(".."),
            },
            other => out.push(other),
        }
    }
    out
}
