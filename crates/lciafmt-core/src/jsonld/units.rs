//! Unit to flow property inference
//!
//! Reference flow properties and reference units carry the identifiers of the
//! openLCA reference data. Other units get identifiers derived from their
//! property and name.

use super::schema::{EntityType, Ref};
use crate::identity::make_uuid;
use std::collections::HashMap;
use std::sync::LazyLock;

struct PropertyDef {
    name: &'static str,
    id: Option<&'static str>,
    /// (unit name, known unit id)
    units: &'static [(&'static str, Option<&'static str>)],
}

const PROPERTIES: &[PropertyDef] = &[
    PropertyDef {
        name: "Mass",
        id: Some("93a60a56-a3c8-11da-a746-0800200b9a66"),
        units: &[
            ("kg", Some("20aadc24-a391-41cf-b340-3e4529f44bde")),
            ("g", None),
            ("mg", None),
            ("t", None),
            ("lb", None),
        ],
    },
    PropertyDef {
        name: "Energy",
        id: Some("f6811440-ee37-11de-8a39-0800200c9a66"),
        units: &[
            ("MJ", Some("52765a6c-3896-43c2-b2f4-c679acf13efe")),
            ("kJ", None),
            ("J", None),
            ("GJ", None),
            ("kWh", None),
        ],
    },
    PropertyDef {
        name: "Volume",
        id: Some("93a60a56-a3c8-22da-a746-0800200c9a66"),
        units: &[
            ("m3", Some("1c3a9695-398d-4b1f-b07e-a8715b610f70")),
            ("l", None),
            ("dm3", None),
            ("cm3", None),
        ],
    },
    PropertyDef {
        name: "Area",
        id: Some("93a60a56-a3c8-19da-a746-0800200c9a66"),
        units: &[
            ("m2", Some("3ce61faa-5716-41c1-aef6-b5920054acc9")),
            ("ha", None),
            ("km2", None),
        ],
    },
    PropertyDef {
        name: "Area*time",
        id: None,
        units: &[("m2*a", None), ("ha*a", None)],
    },
    PropertyDef {
        name: "Volume*time",
        id: None,
        units: &[("m3*a", None)],
    },
    PropertyDef {
        name: "Number of items",
        id: Some("01846770-4cfe-4a25-8ad9-919d8d378345"),
        units: &[
            ("Item(s)", Some("5beb6eed-33a9-47b8-9ede-1dfe8f679159")),
            ("p", None),
        ],
    },
    PropertyDef {
        name: "Radioactivity",
        id: None,
        units: &[("kBq", None), ("Bq", None)],
    },
];

#[derive(Debug, Clone)]
struct UnitEntry {
    property: Ref,
    unit: Ref,
}

/// Unit names are case-sensitive: `Mg` is not `mg`
static UNITS: LazyLock<HashMap<&'static str, UnitEntry>> = LazyLock::new(|| {
    let mut units = HashMap::new();
    for prop in PROPERTIES {
        let prop_id = prop
            .id
            .map(str::to_string)
            .unwrap_or_else(|| make_uuid(["flow_property", prop.name]));
        let property = Ref::named(EntityType::FlowProperty, prop_id, prop.name);

        for (name, id) in prop.units {
            let unit_id = id
                .map(str::to_string)
                .unwrap_or_else(|| make_uuid(["unit", prop.name, *name]));
            let entry = UnitEntry {
                property: property.clone(),
                unit: Ref::named(EntityType::Unit, unit_id, *name),
            };
            units.insert(*name, entry);
        }
    }
    units
});

fn lookup(unit: &str) -> Option<&'static UnitEntry> {
    UNITS.get(unit.trim())
}

/// Flow property of a unit, if the unit is known
pub fn property_ref(unit: &str) -> Option<Ref> {
    lookup(unit).map(|e| e.property.clone())
}

/// Reference of a unit, if the unit is known
pub fn unit_ref(unit: &str) -> Option<Ref> {
    lookup(unit).map(|e| e.unit.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_units_use_reference_ids() {
        let mass = property_ref("kg").unwrap();
        assert_eq!(mass.id, "93a60a56-a3c8-11da-a746-0800200b9a66");
        assert_eq!(mass.name.as_deref(), Some("Mass"));
        assert_eq!(
            unit_ref("kg").unwrap().id,
            "20aadc24-a391-41cf-b340-3e4529f44bde"
        );
    }

    #[test]
    fn test_alternate_units_share_property() {
        assert_eq!(property_ref("g"), property_ref("kg"));
        assert_ne!(unit_ref("g"), unit_ref("kg"));
        assert_eq!(property_ref("kWh").unwrap().name.as_deref(), Some("Energy"));
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        assert_eq!(unit_ref(" m2*a "), unit_ref("m2*a"));
        assert!(unit_ref("mg").is_some());
        assert!(unit_ref("Mg").is_none());
        assert!(property_ref("KG").is_none());
    }

    #[test]
    fn test_unknown_unit() {
        assert!(property_ref("CTUh").is_none());
        assert!(unit_ref("").is_none());
    }
}
