//! Command implementations

pub mod config;

use anyhow::{Context, bail};
use lciafmt_core::table::{self, CharacterizationTable};
use lciafmt_core::{
    ConfigLoader, DuplicatePolicy, LciaConfig, LocalMethodStore, MapOptions, MappedMethodRequest,
    MappingSpec, MappingTable, Method, TableFileSource, collapse_indicators, get_mapped_method,
    map_file, supported_indicators, supported_mapping_systems, supported_methods, to_jsonld,
};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::output;

fn load_config(config_path: Option<&Path>) -> anyhow::Result<LciaConfig> {
    let config = ConfigLoader::load(config_path, None)?;
    debug!("Effective configuration: {:?}", config);
    Ok(config)
}

fn resolve_method(name: &str) -> anyhow::Result<Method> {
    Method::from_alias(name).ok_or_else(|| {
        lciafmt_core::LciaError::UnknownMethod {
            name: name.to_string(),
        }
        .into()
    })
}

fn read_table(path: &Path) -> anyhow::Result<CharacterizationTable> {
    table::read_path(path).with_context(|| format!("Failed to read table '{}'", path.display()))
}

fn write_table(table: &CharacterizationTable, path: &Path) -> anyhow::Result<()> {
    table::write_path(table, path)
        .with_context(|| format!("Failed to write table '{}'", path.display()))
}

pub fn methods_command(json: bool) -> anyhow::Result<()> {
    let methods = supported_methods();
    if json {
        println!("{}", serde_json::to_string_pretty(&methods)?);
    } else {
        output::print_methods(&methods);
    }
    Ok(())
}

pub fn systems_command() -> anyhow::Result<()> {
    for system in supported_mapping_systems() {
        println!("{system}");
    }
    Ok(())
}

pub fn map_command(
    input: &Path,
    output_path: &Path,
    system: Option<String>,
    mapping: Option<PathBuf>,
    preserve_unmapped: Option<bool>,
    case_insensitive: Option<bool>,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let defaults = config.map_options();
    let options = MapOptions {
        preserve_unmapped: preserve_unmapped.unwrap_or(defaults.preserve_unmapped),
        case_insensitive: case_insensitive.unwrap_or(defaults.case_insensitive),
    };

    let spec = match (system, mapping) {
        (_, Some(path)) => MappingSpec::Table(
            MappingTable::from_path(&path)
                .with_context(|| format!("Failed to read mapping '{}'", path.display()))?,
        ),
        (Some(system), None) => MappingSpec::System(system),
        (None, None) => bail!("Either --system or --mapping is required"),
    };

    info!("Mapping {} -> {}", input.display(), output_path.display());
    let outcome = map_file(input, output_path, spec, options, &config.mapping_resolver())?;
    output::print_mapping_report(&outcome.report, output_path);
    Ok(())
}

pub fn collapse_command(
    input: &Path,
    output_path: &Path,
    policy: Option<DuplicatePolicy>,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let policy = policy.unwrap_or_else(|| config.duplicate_policy());

    let table = read_table(input)?;
    let outcome = collapse_indicators(&table, policy);
    write_table(&outcome.table, output_path)?;
    output::print_collapse_report(&outcome.report, outcome.table.len(), policy, output_path);
    Ok(())
}

pub fn jsonld_command(
    input: &Path,
    output_path: &Path,
    no_flows: bool,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let write_flows = !no_flows && config.write_flows();

    let table = read_table(input)?;
    info!("write JSON-LD package to {}", output_path.display());
    let report = to_jsonld(&table, output_path, write_flows)
        .with_context(|| format!("Failed to write package '{}'", output_path.display()))?;
    output::print_write_report(&report);
    Ok(())
}

pub fn mapped_command(
    method: &str,
    source: &Path,
    output_path: Option<&Path>,
    indicators: Vec<String>,
    methods: Vec<String>,
    config_path: Option<&Path>,
) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let method = resolve_method(method)?;

    let mut request = MappedMethodRequest::default()
        .with_resolver(config.mapping_resolver())
        .with_duplicate_policy(config.duplicate_policy());
    if !indicators.is_empty() {
        request = request.with_indicators(indicators);
    }
    if !methods.is_empty() {
        request = request.with_methods(methods);
    }

    let store = LocalMethodStore::new(config.store_directory());
    let table = get_mapped_method(method, &TableFileSource::new(source), &store, &request)?;

    match output_path {
        Some(path) => {
            write_table(&table, path)?;
            output::print_table_written(&table, path);
        }
        None => output::print_table_summary(method, &table),
    }
    Ok(())
}

pub fn indicators_command(method: &str, config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let method = resolve_method(method)?;
    let store = LocalMethodStore::new(config.store_directory());

    match supported_indicators(method, &store)? {
        Some(indicators) => {
            for indicator in indicators {
                println!("{indicator}");
            }
            Ok(())
        }
        None => bail!(
            "No mapped table stored for {method}; run 'lciafmt mapped {}' first",
            method.id()
        ),
    }
}

pub fn cache_clear_command(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    let cache = config.file_cache();
    cache.clear()?;

    let store = config.store_directory();
    if store.is_dir() {
        std::fs::remove_dir_all(&store)
            .with_context(|| format!("Failed to remove '{}'", store.display()))?;
    }
    output::print_success(&format!("Cleared cache {}", cache.folder().display()));
    Ok(())
}

pub fn cache_path_command(config_path: Option<&Path>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;
    println!("{}", config.file_cache().folder().display());
    Ok(())
}
