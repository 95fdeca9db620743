//! Supported LCIA methods and their metadata
//!
//! Metadata is embedded from `data/methods.json` and parsed once into an
//! immutable registry. Lookups by id, display name, mapping system or
//! sub-method name go through an alias index built at load time.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

const METHODS_JSON: &str = include_str!("../data/methods.json");
const DESCRIPTION_YAML: &str = include_str!("../data/description.yaml");

/// A supported LCIA method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Method {
    #[serde(rename = "TRACI")]
    Traci,
    #[serde(rename = "RECIPE_2016")]
    Recipe2016,
    #[serde(rename = "FEDEFL_INV")]
    FedeflInventory,
    #[serde(rename = "ImpactWorld")]
    ImpactWorld,
}

impl Method {
    pub const ALL: [Method; 4] = [
        Method::Traci,
        Method::Recipe2016,
        Method::FedeflInventory,
        Method::ImpactWorld,
    ];

    /// Metadata record of this method
    pub fn metadata(&self) -> &'static MethodMetadata {
        &REGISTRY.records[self]
    }

    /// Registry id (`TRACI`, `RECIPE_2016`, ...)
    pub fn id(&self) -> &'static str {
        &self.metadata().id_str
    }

    /// Display name with spaces replaced by underscores
    pub fn filename(&self) -> String {
        self.metadata().name.replace(' ', "_")
    }

    /// Resolve a method by id, display name, mapping system or sub-method name
    pub fn from_alias(name: &str) -> Option<Method> {
        REGISTRY.aliases.get(name.trim()).copied()
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.metadata().name)
    }
}

/// Metadata of a supported method
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MethodMetadata {
    pub id: Method,

    #[serde(skip)]
    id_str: String,

    /// Display name, also the `Method` column value of produced tables
    pub name: String,

    /// Storage path of the source files
    pub path: String,

    /// Mapping system used to harmonize flows, if any
    #[serde(default)]
    pub mapping: Option<String>,

    /// Fold flowable names to lower case before mapping
    #[serde(default)]
    pub case_insensitive: bool,

    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub citation: Option<String>,

    /// Names of sub-methods contained in the source
    #[serde(default)]
    pub methods: Vec<String>,
}

struct MethodRegistry {
    records: HashMap<Method, MethodMetadata>,
    ordered: Vec<Method>,
    aliases: HashMap<String, Method>,
}

static REGISTRY: LazyLock<MethodRegistry> = LazyLock::new(|| {
    let records: Vec<MethodMetadata> =
        serde_json::from_str(METHODS_JSON).expect("embedded methods.json is valid");
    MethodRegistry::build(records)
});

impl MethodRegistry {
    fn build(records: Vec<MethodMetadata>) -> Self {
        let mut by_method = HashMap::new();
        let mut ordered = Vec::new();
        let mut aliases = HashMap::new();

        for mut record in records {
            let method = record.id;
            record.id_str = serde_json::to_value(method)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_default();

            aliases.insert(record.id_str.clone(), method);
            aliases.insert(record.name.clone(), method);
            if let Some(mapping) = &record.mapping {
                aliases.insert(mapping.clone(), method);
            }
            for sub in &record.methods {
                aliases.insert(sub.clone(), method);
            }

            ordered.push(method);
            by_method.insert(method, record);
        }

        for method in Method::ALL {
            assert!(
                by_method.contains_key(&method),
                "embedded methods.json lacks a record for {method:?}"
            );
        }

        Self {
            records: by_method,
            ordered,
            aliases,
        }
    }
}

/// Metadata of all supported methods, in registry order
pub fn supported_methods() -> Vec<&'static MethodMetadata> {
    REGISTRY
        .ordered
        .iter()
        .map(|m| &REGISTRY.records[m])
        .collect()
}

#[derive(Debug, Deserialize)]
struct DescriptionTemplate {
    description: String,
    detail: String,
    unknown: String,
}

static DESCRIPTION: LazyLock<DescriptionTemplate> = LazyLock::new(|| {
    serde_yaml::from_str(DESCRIPTION_YAML).expect("embedded description.yaml is valid")
});

/// Build the description written into exported method documents
pub fn generate_method_description(name: &str) -> String {
    let mut description = DESCRIPTION
        .description
        .replace("[Method]", name)
        .replace("[version]", crate::VERSION);

    description.push_str("\n\n");
    match Method::from_alias(name) {
        Some(method) => {
            let meta = method.metadata();
            description.push_str(
                &DESCRIPTION
                    .detail
                    .replace("[citation]", meta.citation.as_deref().unwrap_or("n/a"))
                    .replace("[url]", meta.url.as_deref().unwrap_or("n/a")),
            );
        }
        None => description.push_str(&DESCRIPTION.unknown),
    }
    description
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_variant_has_metadata() {
        for method in Method::ALL {
            assert_eq!(method.metadata().id, method);
        }
        assert_eq!(supported_methods().len(), Method::ALL.len());
    }

    #[test]
    fn test_alias_lookup() {
        assert_eq!(Method::from_alias("TRACI"), Some(Method::Traci));
        assert_eq!(Method::from_alias("TRACI 2.1"), Some(Method::Traci));
        assert_eq!(Method::from_alias("TRACI2.1"), Some(Method::Traci));
        assert_eq!(
            Method::from_alias("ReCiPe 2016 - Midpoint/H"),
            Some(Method::Recipe2016)
        );
        assert_eq!(Method::from_alias("ImpactWorld+"), Some(Method::ImpactWorld));
        assert_eq!(Method::from_alias("nonexistent"), None);
    }

    #[test]
    fn test_metadata_fields() {
        let recipe = Method::Recipe2016.metadata();
        assert!(recipe.case_insensitive);
        assert_eq!(recipe.mapping.as_deref(), Some("ReCiPe2016"));
        assert_eq!(Method::FedeflInventory.metadata().mapping, None);
        assert_eq!(Method::Traci.id(), "TRACI");
        assert_eq!(Method::Recipe2016.filename(), "ReCiPe_2016");
    }

    #[test]
    fn test_description_for_known_and_unknown_method() {
        let known = generate_method_description("TRACI 2.1");
        assert!(known.starts_with("TRACI 2.1 as prepared by lciafmt version"));
        assert!(known.contains(crate::VERSION));
        assert!(known.contains("Bare, J."));

        let unknown = generate_method_description("Custom method");
        assert!(unknown.contains("not found among the supported methods"));
    }
}
