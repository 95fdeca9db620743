//! Exchange graph builder
//!
//! Turns characterization rows into the method → indicator → factor → flow →
//! category object graph. Each entity is created the first time its
//! identifier is seen and looked up by identifier afterwards, so a graph
//! built from N rows over K distinct flows holds exactly K flows.

use super::schema::{
    Category, EntityType, Flow, FlowPropertyFactor, FlowType, ImpactCategory, ImpactFactor,
    ImpactMethod, ModelType, Ref,
};
use super::units;
use crate::anomaly::Anomaly;
use crate::identity::make_uuid;
use crate::methods::generate_method_description;
use crate::table::{CharacterizationRow, CharacterizationTable};
use indexmap::IndexMap;
use std::collections::HashSet;
use tracing::{debug, info};

fn category_id(path: &str) -> String {
    make_uuid([format!("category/flow/{path}")])
}

/// Entity counts of a graph
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub methods: usize,
    pub indicators: usize,
    pub factors: usize,
    pub flows: usize,
    pub categories: usize,
}

/// Owns all entities of one export operation, keyed by identifier
#[derive(Debug, Default)]
pub struct ExchangeGraph {
    methods: IndexMap<String, ImpactMethod>,
    indicators: IndexMap<String, ImpactCategory>,
    flows: IndexMap<String, Flow>,
    /// Keyed by derived id, so paths differing only in case share a node
    categories: IndexMap<String, Category>,
    failed_units: HashSet<String>,
    anomalies: Vec<Anomaly>,
}

impl ExchangeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_table(&mut self, table: &CharacterizationTable) {
        for row in table {
            self.add_row(row);
        }
        let stats = self.stats();
        debug!(
            "Graph holds {} methods, {} indicators, {} flows, {} categories",
            stats.methods, stats.indicators, stats.flows, stats.categories
        );
    }

    /// Resolve the row's flow and indicator and append its factor
    pub fn add_row(&mut self, row: &CharacterizationRow) {
        let flow = self.flow(row);
        let factor = ImpactFactor {
            entity_type: EntityType::ImpactFactor,
            flow,
            flow_property: units::property_ref(&row.unit),
            unit: units::unit_ref(&row.unit),
            value: row.value,
        };
        let indicator_id = self.indicator(row);
        if let Some(indicator) = self.indicators.get_mut(&indicator_id) {
            indicator.impact_factors.push(factor);
        }
    }

    /// Create the category chain of `path` and return a reference to its leaf
    fn category(&mut self, path: &str) -> Option<Ref> {
        let path = path.trim();
        if path.is_empty() {
            return None;
        }
        if let Some(c) = self.categories.get(&category_id(path)) {
            return Some(Ref::named(EntityType::Category, &c.id, &c.name));
        }

        let parts: Vec<&str> = path.split('/').collect();
        let mut parent: Option<Ref> = None;
        for i in 0..parts.len() {
            let prefix = parts[..=i].join("/");
            let id = category_id(&prefix);
            if let Some(existing) = self.categories.get(&id) {
                parent = Some(Ref::named(EntityType::Category, &existing.id, &existing.name));
                continue;
            }
            debug!("init category {}", prefix);
            let category = Category {
                entity_type: EntityType::Category,
                id: id.clone(),
                name: parts[i].to_string(),
                model_type: ModelType::Flow,
                category: parent.take(),
            };
            parent = Some(Ref::named(EntityType::Category, &category.id, &category.name));
            self.categories.insert(id, category);
        }
        parent
    }

    fn flow(&mut self, row: &CharacterizationRow) -> Ref {
        let id = row.effective_flow_uuid();
        if let Some(flow) = self.flows.get(&id) {
            return Ref::named(EntityType::Flow, &flow.id, &flow.name);
        }

        let mut flow_properties = Vec::new();
        match units::property_ref(&row.unit) {
            Some(property) => flow_properties.push(FlowPropertyFactor {
                entity_type: EntityType::FlowPropertyFactor,
                conversion_factor: 1.0,
                reference_flow_property: true,
                flow_property: property,
            }),
            None => self.unit_failure(&row.unit),
        }

        let flow = Flow {
            entity_type: EntityType::Flow,
            id: id.clone(),
            name: row.flowable.clone(),
            cas: row.cas_no.clone(),
            flow_type: FlowType::ElementaryFlow,
            category: self.category(&row.context),
            flow_properties,
        };
        let reference = Ref::named(EntityType::Flow, &flow.id, &flow.name);
        self.flows.insert(id, flow);
        reference
    }

    fn unit_failure(&mut self, unit: &str) {
        if self.failed_units.insert(unit.to_string()) {
            let anomaly = Anomaly::FlowPropertyInferenceFailure {
                unit: unit.to_string(),
            };
            anomaly.log();
            self.anomalies.push(anomaly);
        }
    }

    /// Return the indicator id, creating the indicator on first use
    fn indicator(&mut self, row: &CharacterizationRow) -> String {
        let id = row.effective_indicator_uuid();
        if self.indicators.contains_key(&id) {
            return id;
        }

        info!("writing {} indicator ...", row.indicator);
        let indicator = ImpactCategory {
            entity_type: EntityType::ImpactCategory,
            id: id.clone(),
            name: row.indicator.clone(),
            reference_unit_name: row.indicator_unit.clone(),
            impact_factors: Vec::new(),
        };
        let summary = Ref {
            ref_unit: Some(indicator.reference_unit_name.clone()),
            ..Ref::named(EntityType::ImpactCategory, &id, &indicator.name)
        };
        self.indicators.insert(id.clone(), indicator);
        self.method(row).impact_categories.push(summary);
        id
    }

    fn method(&mut self, row: &CharacterizationRow) -> &mut ImpactMethod {
        let id = row.effective_method_uuid();
        self.methods.entry(id).or_insert_with_key(|id| {
            info!("writing {} method ...", row.method);
            ImpactMethod {
                entity_type: EntityType::ImpactMethod,
                id: id.clone(),
                name: row.method.clone(),
                description: Some(generate_method_description(&row.method)),
                version: Some(crate::VERSION.to_string()),
                impact_categories: Vec::new(),
            }
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &ImpactMethod> {
        self.methods.values()
    }

    pub fn indicators(&self) -> impl Iterator<Item = &ImpactCategory> {
        self.indicators.values()
    }

    pub fn flows(&self) -> impl Iterator<Item = &Flow> {
        self.flows.values()
    }

    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.values()
    }

    pub fn method_by_id(&self, id: &str) -> Option<&ImpactMethod> {
        self.methods.get(id)
    }

    pub fn indicator_by_id(&self, id: &str) -> Option<&ImpactCategory> {
        self.indicators.get(id)
    }

    pub fn flow_by_id(&self, id: &str) -> Option<&Flow> {
        self.flows.get(id)
    }

    pub fn category_by_path(&self, path: &str) -> Option<&Category> {
        self.categories.get(&category_id(path.trim()))
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn stats(&self) -> GraphStats {
        GraphStats {
            methods: self.methods.len(),
            indicators: self.indicators.len(),
            factors: self
                .indicators
                .values()
                .map(|i| i.impact_factors.len())
                .sum(),
            flows: self.flows.len(),
            categories: self.categories.len(),
        }
    }
}
