//! Configuration types for lciafmt

use crate::cache::FileCache;
use crate::collapse::DuplicatePolicy;
use crate::mapping::{MapOptions, MappingResolver};
use crate::{LciaError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LciaConfig {
    /// JSON schema reference for editor support
    #[serde(rename = "$schema", skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub mapping: Option<MappingConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapse: Option<CollapseConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportConfiguration>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheConfiguration>,
}

/// Flow mapping settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MappingConfiguration {
    #[schemars(description = "Keep rows without a mapping entry instead of dropping them")]
    pub preserve_unmapped: Option<bool>,

    #[schemars(description = "Match flow names and contexts case-insensitively")]
    pub case_insensitive: Option<bool>,

    /// Checked for `<system>.csv` before the bundled tables
    #[schemars(description = "Directory with mapping files named <system>.csv")]
    pub directory: Option<PathBuf>,
}

/// Indicator collapsing settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollapseConfiguration {
    #[schemars(
        description = "Treatment of conflicting factors: keep-all, keep-first, sum or average"
    )]
    pub duplicate_policy: Option<DuplicatePolicy>,
}

/// JSON-LD export settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ExportConfiguration {
    #[schemars(description = "Write flows and flow categories into the package")]
    pub write_flows: Option<bool>,
}

/// Cache locations
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CacheConfiguration {
    #[schemars(description = "Folder for downloaded source files (default: <tmp>/lciafmt)")]
    pub directory: Option<PathBuf>,

    #[schemars(description = "Folder for mapped method tables (default: <cache>/methods)")]
    pub store_directory: Option<PathBuf>,
}

impl LciaConfig {
    /// Load configuration from a `.json`, `.toml`, `.yaml` or `.yml` file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| LciaError::io_error(path, e))?;
        let ext = path.extension().and_then(|e| e.to_str());

        let parsed = match ext {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
            Some("json") => serde_json::from_str(&content).map_err(|e| e.to_string()),
            Some("toml") => toml::from_str(&content).map_err(|e| e.to_string()),
            _ => Err("Unsupported file extension (expected .json, .toml, .yaml or .yml)".to_string()),
        };
        parsed.map_err(LciaError::config_error)
    }

    /// Serialize in the format implied by the extension of `path`
    pub fn to_string_for(&self, path: &Path) -> Result<String> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("yaml") | Some("yml") => {
                serde_yaml::to_string(self).map_err(|e| LciaError::config_error(e.to_string()))
            }
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| LciaError::config_error(e.to_string()))
            }
            _ => Ok(serde_json::to_string_pretty(self)?),
        }
    }

    /// Check values that deserialization alone cannot
    pub fn validate(&self) -> Result<()> {
        if let Some(dir) = self.mapping.as_ref().and_then(|m| m.directory.as_ref())
            && !dir.is_dir()
        {
            return Err(LciaError::config_error(format!(
                "mapping.directory '{}' is not a directory",
                dir.display()
            )));
        }
        Ok(())
    }

    /// Configuration written by `config init`
    pub fn example() -> Self {
        Self {
            schema: None,
            mapping: Some(MappingConfiguration {
                preserve_unmapped: Some(false),
                case_insensitive: Some(false),
                directory: None,
            }),
            collapse: Some(CollapseConfiguration {
                duplicate_policy: Some(DuplicatePolicy::KeepAll),
            }),
            export: Some(ExportConfiguration {
                write_flows: Some(true),
            }),
            cache: None,
        }
    }

    pub fn map_options(&self) -> MapOptions {
        let mapping = self.mapping.clone().unwrap_or_default();
        MapOptions {
            preserve_unmapped: mapping.preserve_unmapped.unwrap_or(false),
            case_insensitive: mapping.case_insensitive.unwrap_or(false),
        }
    }

    pub fn mapping_resolver(&self) -> MappingResolver {
        MappingResolver::new(self.mapping.as_ref().and_then(|m| m.directory.clone()))
    }

    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        self.collapse
            .as_ref()
            .and_then(|c| c.duplicate_policy)
            .unwrap_or_default()
    }

    pub fn write_flows(&self) -> bool {
        self.export
            .as_ref()
            .and_then(|e| e.write_flows)
            .unwrap_or(true)
    }

    pub fn file_cache(&self) -> FileCache {
        self.cache
            .as_ref()
            .and_then(|c| c.directory.clone())
            .map(FileCache::new)
            .unwrap_or_default()
    }

    pub fn store_directory(&self) -> PathBuf {
        self.cache
            .as_ref()
            .and_then(|c| c.store_directory.clone())
            .unwrap_or_else(|| self.file_cache().folder().join("methods"))
    }
}

/// JSON schema of the configuration file
pub fn config_schema() -> Result<String> {
    let schema = schemars::schema_for!(LciaConfig);
    Ok(serde_json::to_string_pretty(&schema)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = LciaConfig::default();
        assert_eq!(config.map_options(), MapOptions::default());
        assert_eq!(config.duplicate_policy(), DuplicatePolicy::KeepAll);
        assert!(config.write_flows());
        assert!(config.store_directory().ends_with("lciafmt/methods"));
    }

    #[test]
    fn test_load_yaml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lciafmt.yaml");
        fs::write(
            &path,
            "mapping:\n  preserveUnmapped: true\ncollapse:\n  duplicatePolicy: sum\n",
        )
        .unwrap();

        let config = LciaConfig::load(&path).unwrap();
        assert!(config.map_options().preserve_unmapped);
        assert_eq!(config.duplicate_policy(), DuplicatePolicy::Sum);
    }

    #[test]
    fn test_load_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".lciafmtrc.toml");
        fs::write(&path, "[export]\nwriteFlows = false\n\n[cache]\ndirectory = \"/tmp/x\"\n")
            .unwrap();

        let config = LciaConfig::load(&path).unwrap();
        assert!(!config.write_flows());
        assert_eq!(config.file_cache().folder(), Path::new("/tmp/x"));
        assert_eq!(config.store_directory(), Path::new("/tmp/x/methods"));
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lciafmt.json");
        fs::write(&path, r#"{"collapse": {"duplicatePolicy": "median"}}"#).unwrap();
        assert!(LciaConfig::load(&path).is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("lciafmt.ini");
        fs::write(&path, "").unwrap();
        assert!(matches!(
            LciaConfig::load(&path),
            Err(LciaError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_validate_mapping_directory() {
        let dir = TempDir::new().unwrap();
        let mut config = LciaConfig::example();
        assert!(config.validate().is_ok());

        config.mapping.as_mut().unwrap().directory = Some(dir.path().join("missing"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_example_serializes_in_all_formats() {
        let config = LciaConfig::example();
        for name in ["a.json", "a.yaml", "a.toml"] {
            let text = config.to_string_for(Path::new(name)).unwrap();
            assert!(text.contains("duplicatePolicy"), "{name}: {text}");
        }
    }

    #[test]
    fn test_schema_lists_sections() {
        let schema = config_schema().unwrap();
        assert!(schema.contains("duplicatePolicy"));
        assert!(schema.contains("storeDirectory"));
    }
}
