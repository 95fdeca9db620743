//! Pipeline entry points
//!
//! Ties the stages together: a [`MethodSource`] produces a raw method table,
//! which is mapped onto the target flow list, collapsed and kept in a
//! [`MethodStore`] for later calls.

use crate::cache::MethodStore;
use crate::collapse::{DuplicatePolicy, collapse_indicators};
use crate::mapping::{FlowMapper, MapOptions, MappingOutcome, MappingResolver, MappingSpec};
use crate::methods::Method;
use crate::table::{self, CharacterizationTable};
use crate::{LciaError, Result};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Produces the raw characterization table of a method
pub trait MethodSource {
    fn get_method(&self, method: Method) -> Result<CharacterizationTable>;
}

/// Reads raw method tables from disk
///
/// A file path is read as is. A directory is searched for
/// `<Method::filename()>.csv`, then `.json`.
#[derive(Debug, Clone)]
pub struct TableFileSource {
    path: PathBuf,
}

impl TableFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn locate(&self, method: Method) -> Result<PathBuf> {
        if !self.path.is_dir() {
            return Ok(self.path.clone());
        }
        ["csv", "json"]
            .iter()
            .map(|ext| self.path.join(format!("{}.{ext}", method.filename())))
            .find(|p| p.is_file())
            .ok_or_else(|| {
                LciaError::io_error(
                    &self.path,
                    std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("no table for {method}"),
                    ),
                )
            })
    }
}

impl MethodSource for TableFileSource {
    fn get_method(&self, method: Method) -> Result<CharacterizationTable> {
        let path = self.locate(method)?;
        info!("reading {} from {}", method, path.display());
        table::read_path(&path)
    }
}

/// Options of [`get_mapped_method`]
#[derive(Debug, Clone, Default)]
pub struct MappedMethodRequest {
    /// Keep only these indicators
    pub indicators: Option<Vec<String>>,
    /// Keep only these (sub-)methods
    pub methods: Option<Vec<String>>,
    pub resolver: MappingResolver,
    pub duplicate_policy: DuplicatePolicy,
}

impl MappedMethodRequest {
    pub fn with_indicators<I, S>(mut self, indicators: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.indicators = Some(indicators.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = Some(methods.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_resolver(mut self, resolver: MappingResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

/// Map `table` onto a named system or a supplied mapping table
///
/// System names resolve against the bundled tables only; use
/// [`map_flows_with`] to consult a mapping directory as well.
pub fn map_flows(
    table: &CharacterizationTable,
    spec: MappingSpec,
    options: MapOptions,
) -> Result<MappingOutcome> {
    map_flows_with(table, spec, options, &MappingResolver::default())
}

pub fn map_flows_with(
    table: &CharacterizationTable,
    spec: MappingSpec,
    options: MapOptions,
    resolver: &MappingResolver,
) -> Result<MappingOutcome> {
    let mapper = FlowMapper::from_spec(spec, options, resolver)?;
    Ok(mapper.run(table))
}

/// Mapped table of `method`, generated and stored on first use
pub fn get_mapped_method(
    method: Method,
    source: &dyn MethodSource,
    store: &dyn MethodStore,
    request: &MappedMethodRequest,
) -> Result<CharacterizationTable> {
    let stored = match store.read_method(method) {
        Ok(stored) => stored,
        Err(e) => {
            warn!("stored table of {} unreadable, regenerating: {}", method, e);
            None
        }
    };

    let mut mapped = match stored {
        Some(table) => table,
        None => {
            info!("generating {}", method);
            let raw = source.get_method(method)?;
            let meta = method.metadata();
            match &meta.mapping {
                Some(system) => {
                    let table = prepare_for_mapping(raw, meta.case_insensitive);
                    let options = MapOptions {
                        preserve_unmapped: false,
                        case_insensitive: meta.case_insensitive,
                    };
                    let outcome = map_flows_with(
                        &table,
                        MappingSpec::System(system.clone()),
                        options,
                        &request.resolver,
                    )?;
                    let collapsed =
                        collapse_indicators(&outcome.table, request.duplicate_policy).table;
                    store.store_method(&collapsed, method)?;
                    collapsed
                }
                None => raw,
            }
        }
    };

    if let Some(indicators) = &request.indicators {
        mapped = mapped.filter_indicators(indicators.as_slice());
        if mapped.is_empty() {
            error!("indicator not found: {}", indicators.join(", "));
        }
    }
    if let Some(methods) = &request.methods {
        mapped = mapped.filter_methods(methods.as_slice());
        if mapped.is_empty() {
            error!("specified method not found: {}", methods.join(", "));
        }
    }
    Ok(mapped)
}

fn prepare_for_mapping(table: CharacterizationTable, case_insensitive: bool) -> CharacterizationTable {
    if !case_insensitive {
        return table;
    }
    table
        .into_iter()
        .map(|mut row| {
            row.flowable = row.flowable.to_lowercase();
            row
        })
        .collect()
}

/// Indicators of the stored table of `method`, `None` when nothing is stored
pub fn supported_indicators(method: Method, store: &dyn MethodStore) -> Result<Option<Vec<String>>> {
    Ok(store.read_method(method)?.map(|t| t.indicators()))
}

/// Read a table, map it and write the result; used by the command line
pub fn map_file(
    input: &Path,
    output: &Path,
    spec: MappingSpec,
    options: MapOptions,
    resolver: &MappingResolver,
) -> Result<MappingOutcome> {
    let table = table::read_path(input)?;
    let outcome = map_flows_with(&table, spec, options, resolver)?;
    table::write_path(&outcome.table, output)?;
    Ok(outcome)
}
