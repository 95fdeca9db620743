//! LCIA Formatter Core
//!
//! Harmonizes life cycle impact assessment (LCIA) method data: characterization
//! tables are mapped onto a canonical elementary flow list, duplicate factors
//! are collapsed and the result is exported as a JSON-LD zip package.
//!
//! ```no_run
//! use lciafmt_core::{MapOptions, MappingSpec, collapse_indicators, map_flows, table, to_jsonld};
//! use std::path::Path;
//!
//! let raw = table::read_path(Path::new("traci.csv"))?;
//! let mapped = map_flows(&raw, MappingSpec::System("TRACI2.1".into()), MapOptions::default())?;
//! let collapsed = collapse_indicators(&mapped.table, Default::default());
//! to_jsonld(&collapsed.table, "traci.zip", true)?;
//! # Ok::<(), lciafmt_core::LciaError>(())
//! ```

pub mod anomaly;
pub mod api;
pub mod cache;
pub mod collapse;
pub mod config;
pub mod error;
pub mod identity;
pub mod jsonld;
pub mod mapping;
pub mod methods;
pub mod result;
pub mod table;

// Re-export commonly used types
pub use anomaly::Anomaly;
pub use api::{
    MappedMethodRequest, MethodSource, TableFileSource, get_mapped_method, map_file, map_flows,
    map_flows_with, supported_indicators,
};
pub use cache::{FileCache, LocalMethodStore, MethodStore};
pub use collapse::{CollapseOutcome, CollapseReport, DuplicatePolicy, collapse_indicators};
pub use config::{ConfigLoader, LciaConfig};
pub use error::{ErrorKind, LciaError};
pub use identity::make_uuid;
pub use jsonld::{ExchangeGraph, JsonLdOptions, JsonLdWriter, WriteReport, to_jsonld};
pub use mapping::{
    FlowMapper, MapOptions, MappingEntry, MappingOutcome, MappingReport, MappingResolver,
    MappingSpec, MappingTable, supported_mapping_systems,
};
pub use methods::{Method, MethodMetadata, generate_method_description, supported_methods};
pub use result::Result;
pub use table::{CharacterizationRow, CharacterizationTable, MappingStatus};

/// Initialize the tracing subscriber for logging
///
/// `RUST_LOG` takes precedence over `default_directive`. Output goes to
/// stderr so tables written to stdout stay clean.
pub fn init_tracing(default_directive: &str) {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_thread_ids(false),
        )
        .init();
}

/// Default log filter
pub const DEFAULT_LOG_FILTER: &str = "lciafmt=info";

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
