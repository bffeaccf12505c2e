//! Report configuration, resolved by the caller into plain values.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::constants::ConstantsBlock;
use crate::names::NamingRules;

pub const DEFAULT_TEST_ROOT: &str = "tests";
pub const DEFAULT_PROJECT_NAME: &str = "Test-Suite";

/// Files whose presence marks a project root.
pub const PROJECT_MARKERS: &[&str] = &["Cargo.toml", "pyproject.toml", "setup.py", ".git"];

/// Everything the aggregator needs to know about a run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportConfig {
    /// Absolute destination of the JSON report.
    pub output_path: PathBuf,

    /// Display name written as the document's `name`.
    pub project_name: String,

    pub ecu_name: Option<String>,

    /// Dot-separated ECU version (`major.minor.subminor`).
    pub ecu_version: Option<String>,

    /// Firmware `metadata.json`; when set it replaces `ecu_name`/`ecu_version`.
    pub metadata_path: Option<PathBuf>,

    /// Directory that folder keys are computed against.
    pub test_root: PathBuf,

    pub naming: NamingRules,
}

impl ReportConfig {
    /// Configuration writing to `output` (expanded with [`expand_path`]).
    pub fn new(output: &str, project_name: impl Into<String>) -> Self {
        Self {
            output_path: expand_path(output),
            project_name: project_name.into(),
            ecu_name: None,
            ecu_version: None,
            metadata_path: None,
            test_root: PathBuf::from(DEFAULT_TEST_ROOT),
            naming: NamingRules::default(),
        }
    }

    pub fn with_ecu(mut self, name: Option<String>, version: Option<String>) -> Self {
        self.ecu_name = name;
        self.ecu_version = version;
        self
    }

    pub fn with_metadata_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.metadata_path = Some(path.into());
        self
    }

    pub fn with_test_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.test_root = root.into();
        self
    }

    pub fn with_naming(mut self, naming: NamingRules) -> Self {
        self.naming = naming;
        self
    }

    /// Load the run's constants block.
    pub fn constants(&self) -> ConstantsBlock {
        match &self.metadata_path {
            Some(path) => ConstantsBlock::load_metadata(path),
            None => ConstantsBlock::from_component(
                self.ecu_name.as_deref(),
                self.ecu_version.as_deref(),
            ),
        }
    }

    /// Test root as a `/`-separated string for classification.
    pub fn test_root_str(&self) -> String {
        self.test_root.to_string_lossy().replace('\\', "/")
    }
}

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$(?:\{([^}]*)\}|([A-Za-z0-9_]+))").expect("env var pattern is valid")
    })
}

/// Replace `$NAME` and `${NAME}` with environment values. Unset variables
/// are left untouched.
pub fn expand_env_vars(raw: &str) -> Cow<'_, str> {
    env_var_pattern().replace_all(raw, |caps: &Captures<'_>| {
        let name = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or_default();
        std::env::var(name).unwrap_or_else(|_| caps[0].to_string())
    })
}

/// Expand a leading `~` (alone or followed by a separator) to the home
/// directory.
pub fn expand_home(raw: &str) -> PathBuf {
    let rest = match raw.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\') => rest,
        _ => return PathBuf::from(raw),
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest.trim_start_matches(|c: char| c == '/' || c == '\\')),
        None => PathBuf::from(raw),
    }
}

/// Expand environment variables, then `~`, then make the path absolute
/// against the working directory and normalize it lexically.
pub fn expand_path(raw: &str) -> PathBuf {
    let expanded = expand_home(&expand_env_vars(raw));
    let absolute = if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(&expanded))
            .unwrap_or(expanded)
    };
    normalize_lexically(&absolute)
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Name of the nearest ancestor of `start` (inclusive) containing a
/// project marker, else `start`'s own name, else [`DEFAULT_PROJECT_NAME`].
pub fn detect_project_name(start: &Path) -> String {
    let dir_name = |dir: &Path| {
        dir.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .filter(|n| !n.is_empty())
    };

    start
        .ancestors()
        .find(|dir| PROJECT_MARKERS.iter().any(|m| dir.join(m).exists()))
        .and_then(dir_name)
        .or_else(|| dir_name(start))
        .unwrap_or_else(|| DEFAULT_PROJECT_NAME.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{ECU_KEY, VERSION_MAJOR_KEY};

    #[test]
    fn test_expand_env_vars_braced_and_bare() {
        std::env::set_var("TGJSON_TEST_OUT_DIR", "/var/reports");
        assert_eq!(
            expand_env_vars("$TGJSON_TEST_OUT_DIR/run.json"),
            "/var/reports/run.json"
        );
        assert_eq!(
            expand_env_vars("${TGJSON_TEST_OUT_DIR}/run.json"),
            "/var/reports/run.json"
        );
    }

    #[test]
    fn test_expand_env_vars_unset_left_alone() {
        assert_eq!(
            expand_env_vars("$TGJSON_TEST_DEFINITELY_UNSET/x.json"),
            "$TGJSON_TEST_DEFINITELY_UNSET/x.json"
        );
    }

    #[test]
    fn test_expand_home() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/reports/r.json"), home.join("reports/r.json"));
            assert_eq!(expand_home("~"), home);
        }
        assert_eq!(expand_home("~other/r.json"), PathBuf::from("~other/r.json"));
        assert_eq!(expand_home("/abs/r.json"), PathBuf::from("/abs/r.json"));
    }

    #[test]
    fn test_expand_path_is_absolute_and_normalized() {
        let path = expand_path("out/../reports/./report.json");
        assert!(path.is_absolute());
        let cwd = std::env::current_dir().expect("cwd");
        assert_eq!(path, cwd.join("reports").join("report.json"));
    }

    #[test]
    fn test_config_constants_prefer_metadata_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let meta = dir.path().join("metadata.json");
        std::fs::write(&meta, r#"{"ECUModel": {"ComponentId": "GW"}, "Version": "3.0.1"}"#)
            .expect("write");

        let config = ReportConfig::new("/tmp/r.json", "p")
            .with_ecu(Some("BCM".into()), Some("1.0".into()))
            .with_metadata_path(&meta);
        let constants = config.constants();
        assert_eq!(constants.get(ECU_KEY), Some("GW"));
        assert_eq!(constants.get(VERSION_MAJOR_KEY), Some("3"));
    }

    #[test]
    fn test_config_defaults() {
        let config = ReportConfig::new("/tmp/r.json", "p");
        assert_eq!(config.output_path, PathBuf::from("/tmp/r.json"));
        assert_eq!(config.test_root_str(), "tests");
        assert_eq!(config.constants(), ConstantsBlock::unknown());
    }

    #[test]
    fn test_detect_project_name_from_marker() {
        let dir = tempfile::tempdir().expect("tempdir");
        let project = dir.path().join("brake-controller");
        let nested = project.join("tests/hw");
        std::fs::create_dir_all(&nested).expect("mkdir");
        std::fs::write(project.join("pyproject.toml"), "").expect("write");

        assert_eq!(detect_project_name(&nested), "brake-controller");
    }

    #[test]
    fn test_detect_project_name_without_marker_uses_start() {
        let dir = tempfile::tempdir().expect("tempdir");
        let start = dir.path().join("lonely");
        std::fs::create_dir_all(&start).expect("mkdir");
        let name = detect_project_name(&start);
        // an ancestor of the temp dir may carry a marker; either way we get a name
        assert!(!name.is_empty());
    }
}
