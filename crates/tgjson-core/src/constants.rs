//! Static identification constants stamped onto every testcase.
//!
//! The block is computed once per run and shared by `Arc` into each record.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::obs;

pub const ECU_KEY: &str = "ECU";
pub const VERSION_MAJOR_KEY: &str = "Release_Version_Major";
pub const VERSION_MINOR_KEY: &str = "Release_Version_Minor";
pub const VERSION_SUBMINOR_KEY: &str = "Release_Version_Subminor";

/// Placeholder used when component identification is unavailable.
pub const UNKNOWN: &str = "Unknown";

/// One `{key, value}` constant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Constant {
    pub key: String,
    pub value: String,
}

impl Constant {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered list of constants, serialized as a plain JSON array.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ConstantsBlock(Vec<Constant>);

/// Shape of the firmware `metadata.json` file.
#[derive(Debug, Default, Deserialize)]
struct FirmwareMetadata {
    #[serde(rename = "ECUModel", default)]
    ecu_model: EcuModel,
    #[serde(rename = "Version", default)]
    version: String,
}

#[derive(Debug, Default, Deserialize)]
struct EcuModel {
    #[serde(rename = "ComponentId", default)]
    component_id: String,
}

impl ConstantsBlock {
    /// Build the block from an ECU name and a dot-separated version.
    ///
    /// Without a version every constant is `"Unknown"`. With a version, the
    /// first three segments fill major/minor/subminor and missing segments
    /// are empty strings; a missing ECU name reads as `"Unknown"`.
    pub fn from_component(ecu_name: Option<&str>, ecu_version: Option<&str>) -> Self {
        match ecu_version.filter(|v| !v.is_empty()) {
            Some(version) => {
                let name = ecu_name.filter(|n| !n.is_empty()).unwrap_or(UNKNOWN);
                Self::from_parts(name, version)
            }
            None => Self::unknown(),
        }
    }

    /// Every constant set to `"Unknown"`.
    pub fn unknown() -> Self {
        Self(vec![
            Constant::new(ECU_KEY, UNKNOWN),
            Constant::new(VERSION_MAJOR_KEY, UNKNOWN),
            Constant::new(VERSION_MINOR_KEY, UNKNOWN),
            Constant::new(VERSION_SUBMINOR_KEY, UNKNOWN),
        ])
    }

    /// Empty block, used when the metadata file cannot be loaded.
    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// Read constants from a firmware `metadata.json`.
    pub fn read_metadata(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ReportError::MetadataRead {
            path: path.to_path_buf(),
            source,
        })?;
        let meta: FirmwareMetadata =
            serde_json::from_str(&raw).map_err(|source| ReportError::MetadataParse {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self::from_parts(&meta.ecu_model.component_id, &meta.version))
    }

    /// Like [`ConstantsBlock::read_metadata`], but any failure is logged as a
    /// warning and yields an empty block.
    pub fn load_metadata(path: &Path) -> Self {
        match Self::read_metadata(path) {
            Ok(block) => block,
            Err(e) => {
                obs::emit_constants_fallback(&e);
                Self::empty()
            }
        }
    }

    fn from_parts(ecu: &str, version: &str) -> Self {
        let mut parts = version.split('.');
        let mut next = || parts.next().unwrap_or_default().to_string();
        let major = next();
        let minor = next();
        let subminor = next();

        Self(vec![
            Constant::new(ECU_KEY, ecu),
            Constant::new(VERSION_MAJOR_KEY, major),
            Constant::new(VERSION_MINOR_KEY, minor),
            Constant::new(VERSION_SUBMINOR_KEY, subminor),
        ])
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.value.as_str())
    }

    pub fn entries(&self) -> &[Constant] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_two_part_version_leaves_subminor_empty() {
        let block = ConstantsBlock::from_component(Some("BCM"), Some("2.5"));
        assert_eq!(block.get(ECU_KEY), Some("BCM"));
        assert_eq!(block.get(VERSION_MAJOR_KEY), Some("2"));
        assert_eq!(block.get(VERSION_MINOR_KEY), Some("5"));
        assert_eq!(block.get(VERSION_SUBMINOR_KEY), Some(""));
    }

    #[test]
    fn test_absent_version_is_all_unknown() {
        for block in [
            ConstantsBlock::from_component(Some("BCM"), None),
            ConstantsBlock::from_component(None, None),
            ConstantsBlock::from_component(Some("BCM"), Some("")),
        ] {
            assert_eq!(block.entries().len(), 4);
            assert!(block.entries().iter().all(|c| c.value == UNKNOWN));
        }
    }

    #[test]
    fn test_extra_version_segments_ignored() {
        let block = ConstantsBlock::from_component(Some("GW"), Some("1.2.3.4"));
        assert_eq!(block.get(VERSION_SUBMINOR_KEY), Some("3"));
    }

    #[test]
    fn test_missing_ecu_name_with_version() {
        let block = ConstantsBlock::from_component(None, Some("7"));
        assert_eq!(block.get(ECU_KEY), Some(UNKNOWN));
        assert_eq!(block.get(VERSION_MAJOR_KEY), Some("7"));
        assert_eq!(block.get(VERSION_MINOR_KEY), Some(""));
    }

    #[test]
    fn test_serializes_as_key_value_array() {
        let block = ConstantsBlock::from_component(Some("BCM"), Some("1.0.2"));
        assert_eq!(
            serde_json::to_value(&block).expect("serialize"),
            json!([
                {"key": "ECU", "value": "BCM"},
                {"key": "Release_Version_Major", "value": "1"},
                {"key": "Release_Version_Minor", "value": "0"},
                {"key": "Release_Version_Subminor", "value": "2"},
            ])
        );
    }

    #[test]
    fn test_load_metadata_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("metadata.json");
        std::fs::write(
            &path,
            r#"{"ECUModel": {"ComponentId": "ZCU-Left"}, "Version": "4.1.0"}"#,
        )
        .expect("write metadata");

        let block = ConstantsBlock::load_metadata(&path);
        assert_eq!(block.get(ECU_KEY), Some("ZCU-Left"));
        assert_eq!(block.get(VERSION_MAJOR_KEY), Some("4"));
        assert_eq!(block.get(VERSION_SUBMINOR_KEY), Some("0"));
    }

    #[test]
    fn test_load_metadata_missing_or_malformed_falls_back_to_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("nope.json");
        assert!(ConstantsBlock::load_metadata(&missing).is_empty());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{not json").expect("write");
        assert!(matches!(
            ConstantsBlock::read_metadata(&bad),
            Err(ReportError::MetadataParse { .. })
        ));
        assert!(ConstantsBlock::load_metadata(&bad).is_empty());
    }
}
