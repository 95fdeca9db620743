//! JSON-LD entity types of the exchange format
//!
//! Field names follow the openLCA schema: every document carries `@type` and
//! `@id`, and relations are reference objects with `@type`, `@id` and an
//! optional `name`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    ImpactMethod,
    ImpactCategory,
    ImpactFactor,
    Flow,
    FlowProperty,
    FlowPropertyFactor,
    Unit,
    Category,
}

impl EntityType {
    /// Package folder of root entities
    pub fn folder(&self) -> Option<&'static str> {
        match self {
            EntityType::ImpactMethod => Some("lcia_methods"),
            EntityType::ImpactCategory => Some("lcia_categories"),
            EntityType::Flow => Some("flows"),
            EntityType::FlowProperty => Some("flow_properties"),
            EntityType::Category => Some("categories"),
            EntityType::ImpactFactor | EntityType::FlowPropertyFactor | EntityType::Unit => None,
        }
    }
}

/// Reference to another entity by identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ref {
    #[serde(rename = "@type")]
    pub entity_type: EntityType,

    #[serde(rename = "@id")]
    pub id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Only set on impact category references
    #[serde(rename = "refUnit", skip_serializing_if = "Option::is_none")]
    pub ref_unit: Option<String>,
}

impl Ref {
    pub fn new(entity_type: EntityType, id: impl Into<String>) -> Self {
        Self {
            entity_type,
            id: id.into(),
            name: None,
            ref_unit: None,
        }
    }

    pub fn named(entity_type: EntityType, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(entity_type, id)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowType {
    ElementaryFlow,
    ProductFlow,
    WasteFlow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModelType {
    Flow,
    ImpactMethod,
    ImpactCategory,
}

/// Top-level LCIA method
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactMethod {
    #[serde(rename = "@type")]
    pub entity_type: EntityType,

    #[serde(rename = "@id")]
    pub id: String,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub impact_categories: Vec<Ref>,
}

/// Impact indicator with its characterization factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactCategory {
    #[serde(rename = "@type")]
    pub entity_type: EntityType,

    #[serde(rename = "@id")]
    pub id: String,

    pub name: String,

    pub reference_unit_name: String,

    #[serde(default)]
    pub impact_factors: Vec<ImpactFactor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactFactor {
    #[serde(rename = "@type")]
    pub entity_type: EntityType,

    pub flow: Ref,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow_property: Option<Ref>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<Ref>,

    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flow {
    #[serde(rename = "@type")]
    pub entity_type: EntityType,

    #[serde(rename = "@id")]
    pub id: String,

    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cas: Option<String>,

    pub flow_type: FlowType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Ref>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flow_properties: Vec<FlowPropertyFactor>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowPropertyFactor {
    #[serde(rename = "@type")]
    pub entity_type: EntityType,

    pub conversion_factor: f64,

    pub reference_flow_property: bool,

    pub flow_property: Ref,
}

/// Classification node; `category` points at the parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    #[serde(rename = "@type")]
    pub entity_type: EntityType,

    #[serde(rename = "@id")]
    pub id: String,

    pub name: String,

    pub model_type: ModelType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Ref>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ref_serialization() {
        let r = Ref::named(EntityType::Flow, "F1", "Carbon dioxide");
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"@type": "Flow", "@id": "F1", "name": "Carbon dioxide"})
        );
    }

    #[test]
    fn test_category_serialization() {
        let c = Category {
            entity_type: EntityType::Category,
            id: "C2".into(),
            name: "urban".into(),
            model_type: ModelType::Flow,
            category: Some(Ref::new(EntityType::Category, "C1")),
        };
        assert_eq!(
            serde_json::to_value(&c).unwrap(),
            json!({
                "@type": "Category",
                "@id": "C2",
                "name": "urban",
                "modelType": "FLOW",
                "category": {"@type": "Category", "@id": "C1"}
            })
        );
    }

    #[test]
    fn test_flow_omits_empty_properties() {
        let f = Flow {
            entity_type: EntityType::Flow,
            id: "F1".into(),
            name: "Carbon dioxide".into(),
            cas: None,
            flow_type: FlowType::ElementaryFlow,
            category: None,
            flow_properties: vec![],
        };
        let value = serde_json::to_value(&f).unwrap();
        assert_eq!(value["flowType"], "ELEMENTARY_FLOW");
        assert!(value.get("flowProperties").is_none());
        assert!(value.get("category").is_none());
    }
}
