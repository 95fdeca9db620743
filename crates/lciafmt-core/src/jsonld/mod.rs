//! JSON-LD exchange package export
//!
//! Characterization tables are turned into an object graph of LCIA methods,
//! impact categories, flows and flow categories ([`ExchangeGraph`]), which
//! the [`JsonLdWriter`] serializes into a zip package with one document per
//! entity:
//!
//! ```text
//! lcia_methods/<id>.json
//! lcia_categories/<id>.json
//! categories/<id>.json
//! flows/<id>.json
//! ```

mod graph;
pub mod schema;
pub mod units;
mod writer;

pub use graph::{ExchangeGraph, GraphStats};
pub use writer::{JsonLdOptions, JsonLdWriter, WriteReport, to_jsonld};
