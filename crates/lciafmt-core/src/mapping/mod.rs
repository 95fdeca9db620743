//! Flow mapping onto a target flow list
//!
//! A [`MappingTable`] relates source flows (name + context) to target flows
//! of a canonical flow list. Tables are either bundled under a system name
//! (see [`supported_mapping_systems`]) or supplied by the caller. The
//! [`FlowMapper`] applies a table to a characterization table.

mod mapper;
mod systems;

use crate::{LciaError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

pub use mapper::{FlowMapper, MapOptions, MappingOutcome, MappingReport, MappingSpec};
pub use systems::{MappingResolver, bundled_mapping, supported_mapping_systems};

/// Columns a mapping table must provide
pub const REQUIRED_MAPPING_COLUMNS: &[&str] = &[
    "SourceFlowName",
    "SourceFlowContext",
    "TargetFlowUUID",
    "TargetFlowName",
    "TargetUnit",
    "ConversionFactor",
];

/// One source-to-target relation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappingEntry {
    #[serde(rename = "SourceListName", default)]
    pub source_list: Option<String>,

    #[serde(rename = "SourceFlowName")]
    pub source_name: String,

    #[serde(rename = "SourceFlowContext")]
    pub source_context: String,

    #[serde(rename = "SourceUnit", default)]
    pub source_unit: Option<String>,

    #[serde(rename = "TargetListName", default)]
    pub target_list: Option<String>,

    #[serde(rename = "TargetFlowUUID")]
    pub target_uuid: String,

    #[serde(rename = "TargetFlowName")]
    pub target_name: String,

    /// Replaces the row context when present
    #[serde(rename = "TargetFlowContext", default)]
    pub target_context: Option<String>,

    #[serde(rename = "TargetUnit")]
    pub target_unit: String,

    /// Blank means 1.0
    #[serde(rename = "ConversionFactor", default)]
    pub conversion_factor: Option<f64>,
}

impl MappingEntry {
    pub fn new(
        source_name: impl Into<String>,
        source_context: impl Into<String>,
        target_uuid: impl Into<String>,
        target_name: impl Into<String>,
        target_unit: impl Into<String>,
        conversion_factor: f64,
    ) -> Self {
        Self {
            source_list: None,
            source_name: source_name.into(),
            source_context: source_context.into(),
            source_unit: None,
            target_list: None,
            target_uuid: target_uuid.into(),
            target_name: target_name.into(),
            target_context: None,
            target_unit: target_unit.into(),
            conversion_factor: Some(conversion_factor),
        }
    }

    pub fn with_target_context(mut self, context: impl Into<String>) -> Self {
        self.target_context = Some(context.into());
        self
    }

    pub fn factor(&self) -> f64 {
        self.conversion_factor.unwrap_or(1.0)
    }
}

/// A table of mapping entries
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingTable {
    entries: Vec<MappingEntry>,
}

impl MappingTable {
    pub fn new(entries: Vec<MappingEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Read a mapping table in the flow-list mapping CSV format
    pub fn read_csv<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = rdr
            .headers()
            .map_err(|e| LciaError::invalid_mapping(e.to_string()))?
            .clone();
        let missing: Vec<&str> = REQUIRED_MAPPING_COLUMNS
            .iter()
            .copied()
            .filter(|c| !headers.iter().any(|h| h == *c))
            .collect();
        if !missing.is_empty() {
            return Err(LciaError::invalid_mapping(format!(
                "missing columns: {}",
                missing.join(", ")
            )));
        }

        let mut entries = Vec::new();
        for (idx, record) in rdr.deserialize::<MappingEntry>().enumerate() {
            let entry =
                record.map_err(|e| LciaError::invalid_mapping(format!("row {}: {}", idx + 1, e)))?;
            if entry.target_uuid.trim().is_empty() {
                return Err(LciaError::invalid_mapping(format!(
                    "row {}: blank TargetFlowUUID for '{}'",
                    idx + 1,
                    entry.source_name
                )));
            }
            entries.push(entry);
        }
        let table = Self { entries };
        table.validate()?;
        Ok(table)
    }

    /// Reject entries that map one source flow onto the same target with a
    /// different unit or conversion factor
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashMap<(&str, &str, &str), &MappingEntry> = HashMap::new();
        for entry in &self.entries {
            let key = (
                entry.source_name.as_str(),
                entry.source_context.as_str(),
                entry.target_uuid.as_str(),
            );
            let first = *seen.entry(key).or_insert(entry);
            if first.target_unit != entry.target_unit
                || first.factor().to_bits() != entry.factor().to_bits()
            {
                return Err(LciaError::invalid_mapping(format!(
                    "conflicting entries for '{}' ({}) -> {}: {} x{} and {} x{}",
                    entry.source_name,
                    entry.source_context,
                    entry.target_uuid,
                    first.target_unit,
                    first.factor(),
                    entry.target_unit,
                    entry.factor()
                )));
            }
        }
        Ok(())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| LciaError::io_error(path, e))?;
        Self::read_csv(file)
    }

    /// Build the lookup index used by the mapper
    pub(crate) fn index(&self, case_insensitive: bool) -> MappingIndex<'_> {
        let mut targets: HashMap<(String, String), Vec<&MappingEntry>> = HashMap::new();
        let mut target_ids = HashSet::new();

        for entry in &self.entries {
            let key = fold_key(&entry.source_name, &entry.source_context, case_insensitive);
            let list = targets.entry(key).or_default();
            if !list.iter().any(|e| *e == entry) {
                list.push(entry);
            }
            target_ids.insert(entry.target_uuid.as_str());
        }

        MappingIndex {
            targets,
            target_ids,
            case_insensitive,
        }
    }
}

impl FromIterator<MappingEntry> for MappingTable {
    fn from_iter<T: IntoIterator<Item = MappingEntry>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

fn fold_key(name: &str, context: &str, case_insensitive: bool) -> (String, String) {
    if case_insensitive {
        (name.to_lowercase(), context.to_lowercase())
    } else {
        (name.to_string(), context.to_string())
    }
}

/// Source key lookup over a borrowed mapping table
pub(crate) struct MappingIndex<'a> {
    targets: HashMap<(String, String), Vec<&'a MappingEntry>>,
    target_ids: HashSet<&'a str>,
    case_insensitive: bool,
}

impl<'a> MappingIndex<'a> {
    pub(crate) fn lookup(&self, name: &str, context: &str) -> Option<&[&'a MappingEntry]> {
        self.targets
            .get(&fold_key(name, context, self.case_insensitive))
            .map(Vec::as_slice)
    }

    pub(crate) fn is_target(&self, uuid: &str) -> bool {
        self.target_ids.contains(uuid)
    }
}
