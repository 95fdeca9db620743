//! Zip package writer for the exchange format

use super::graph::{ExchangeGraph, GraphStats};
use super::schema::EntityType;
use crate::anomaly::Anomaly;
use crate::table::CharacterizationTable;
use crate::{LciaError, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::mem;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonLdOptions {
    /// Also write flows and their categories
    pub write_flows: bool,
}

impl Default for JsonLdOptions {
    fn default() -> Self {
        Self { write_flows: true }
    }
}

/// Summary of a finished package
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReport {
    pub path: PathBuf,
    pub methods: usize,
    pub indicators: usize,
    pub factors: usize,
    /// Flows written to the package (0 unless flows are written)
    pub flows: usize,
    pub categories: usize,
    pub anomalies: Vec<Anomaly>,
}

enum PackageState {
    Open(ZipWriter<BufWriter<File>>),
    Closed,
}

/// Writes characterization tables into a JSON-LD zip package
///
/// Entities are collected across all [`write`](Self::write) calls and
/// written on [`finish`](Self::finish). An unfinished writer is finalized
/// when dropped.
pub struct JsonLdWriter {
    path: PathBuf,
    options: JsonLdOptions,
    graph: ExchangeGraph,
    state: PackageState,
}

impl JsonLdWriter {
    /// Create the package file, replacing an existing one
    pub fn create(path: impl AsRef<Path>, options: JsonLdOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| LciaError::io_error(parent, e))?;
        }
        let file = File::create(&path).map_err(|e| LciaError::io_error(&path, e))?;
        debug!("Opened package {}", path.display());

        Ok(Self {
            path,
            options,
            graph: ExchangeGraph::new(),
            state: PackageState::Open(ZipWriter::new(BufWriter::new(file))),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, PackageState::Open(_))
    }

    pub fn graph(&self) -> &ExchangeGraph {
        &self.graph
    }

    /// Add all rows of `table` to the package
    pub fn write(&mut self, table: &CharacterizationTable) -> Result<()> {
        if !self.is_open() {
            return Err(LciaError::WriterClosed);
        }
        self.graph.add_table(table);
        Ok(())
    }

    /// Write all collected entities and close the package
    pub fn finish(&mut self) -> Result<WriteReport> {
        let mut zip = match mem::replace(&mut self.state, PackageState::Closed) {
            PackageState::Open(zip) => zip,
            PackageState::Closed => return Err(LciaError::WriterClosed),
        };

        let options = SimpleFileOptions::default();
        let mut written = 0usize;

        for indicator in self.graph.indicators() {
            write_entity(&mut zip, options, EntityType::ImpactCategory, &indicator.id, indicator)?;
            written += 1;
        }
        for method in self.graph.methods() {
            write_entity(&mut zip, options, EntityType::ImpactMethod, &method.id, method)?;
            written += 1;
        }

        let GraphStats {
            methods,
            indicators,
            factors,
            flows,
            categories,
        } = self.graph.stats();

        let (flows, categories) = if self.options.write_flows {
            for category in self.graph.categories() {
                write_entity(&mut zip, options, EntityType::Category, &category.id, category)?;
                written += 1;
            }
            for flow in self.graph.flows() {
                write_entity(&mut zip, options, EntityType::Flow, &flow.id, flow)?;
                written += 1;
            }
            (flows, categories)
        } else {
            (0, 0)
        };

        let mut inner = zip.finish()?;
        inner
            .flush()
            .map_err(|e| LciaError::io_error(&self.path, e))?;

        info!(
            "Wrote {} documents to {}",
            written,
            self.path.display()
        );

        Ok(WriteReport {
            path: self.path.clone(),
            methods,
            indicators,
            factors,
            flows,
            categories,
            anomalies: self.graph.anomalies().to_vec(),
        })
    }
}

impl Drop for JsonLdWriter {
    fn drop(&mut self) {
        if self.is_open()
            && let Err(e) = self.finish()
        {
            error!("Failed to finalize package {}: {}", self.path.display(), e);
        }
    }
}

fn write_entity<W, T>(
    zip: &mut ZipWriter<W>,
    options: SimpleFileOptions,
    entity_type: EntityType,
    id: &str,
    entity: &T,
) -> Result<()>
where
    W: Write + std::io::Seek,
    T: Serialize,
{
    let folder = entity_type.folder().unwrap_or("other");
    zip.start_file(format!("{folder}/{id}.json"), options)?;
    serde_json::to_writer_pretty(&mut *zip, entity)?;
    Ok(())
}

/// Write `table` into a new package at `path`
pub fn to_jsonld(
    table: &CharacterizationTable,
    path: impl AsRef<Path>,
    write_flows: bool,
) -> Result<WriteReport> {
    let mut writer = JsonLdWriter::create(path, JsonLdOptions { write_flows })?;
    writer.write(table)?;
    writer.finish()
}
