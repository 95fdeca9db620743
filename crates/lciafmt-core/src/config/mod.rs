//! Configuration system for lciafmt
//!
//! Settings are read from a config file found by explicit path or by
//! traversing up from the working directory (see [`CONFIG_FILE_NAMES`]).
//! Every field is optional; command line flags override file values.
//!
//! ## Example Configuration (lciafmt.yaml)
//!
//! ```yaml
//! mapping:
//!   preserveUnmapped: false
//!   caseInsensitive: false
//!   directory: ./mappings
//!
//! collapse:
//!   duplicatePolicy: keep-all
//!
//! export:
//!   writeFlows: true
//!
//! cache:
//!   directory: /var/cache/lciafmt
//! ```

mod lcia_config;
mod loader;

pub use lcia_config::{
    CacheConfiguration, CollapseConfiguration, ExportConfiguration, LciaConfig,
    MappingConfiguration, config_schema,
};
pub use loader::{CONFIG_FILE_NAMES, ConfigLoader};
