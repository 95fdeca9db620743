//! Named mapping systems
//!
//! Abridged flow-list mappings ship with the crate; a configured mapping
//! directory (`<dir>/<system>.csv`) takes precedence over them so complete
//! mapping files can be dropped in without rebuilding.

use super::MappingTable;
use crate::{LciaError, Result};
use std::path::PathBuf;
use tracing::debug;

const BUNDLED: &[(&str, &str)] = &[
    ("TRACI2.1", include_str!("../../data/mappings/TRACI2.1.csv")),
    (
        "ReCiPe2016",
        include_str!("../../data/mappings/ReCiPe2016.csv"),
    ),
    (
        "ImpactWorld+",
        include_str!("../../data/mappings/ImpactWorld+.csv"),
    ),
];

/// Names of the bundled mapping systems
pub fn supported_mapping_systems() -> Vec<&'static str> {
    BUNDLED.iter().map(|(name, _)| *name).collect()
}

/// Parse the bundled table of a system, if there is one
pub fn bundled_mapping(system: &str) -> Option<Result<MappingTable>> {
    BUNDLED
        .iter()
        .find(|(name, _)| *name == system)
        .map(|(_, content)| MappingTable::read_csv(content.as_bytes()))
}

/// Resolves mapping system names to tables
#[derive(Debug, Clone, Default)]
pub struct MappingResolver {
    directory: Option<PathBuf>,
}

impl MappingResolver {
    pub fn new(directory: Option<PathBuf>) -> Self {
        Self { directory }
    }

    /// Look up a system in the mapping directory, then among bundled tables
    pub fn resolve(&self, system: &str) -> Result<MappingTable> {
        if let Some(dir) = &self.directory {
            let path = dir.join(format!("{system}.csv"));
            if path.is_file() {
                debug!("Using mapping file {}", path.display());
                return MappingTable::from_path(&path);
            }
        }

        match bundled_mapping(system) {
            Some(table) => {
                debug!("Using bundled mapping for {}", system);
                table
            }
            None => Err(LciaError::UnsupportedMappingSystem {
                system: system.to_string(),
            }),
        }
    }
}
