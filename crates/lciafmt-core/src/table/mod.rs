//! Characterization tables
//!
//! The common intermediate format every method source produces and every
//! pipeline stage consumes: one row per characterization factor, with the
//! method, indicator and flow descriptors it belongs to.
//!
//! Column names follow the established LCIA formatting convention
//! (`Method`, `Indicator`, `Flowable`, `Flow UUID`, `Context`, ...). Input is
//! validated against [`REQUIRED_COLUMNS`] before any row is decoded.

mod io;

use crate::identity::id_or_derived;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

pub use io::{read_csv, read_json, read_path, write_csv, write_json, write_path};

/// Column header of the factor value
pub const VALUE_COLUMN: &str = "Characterization Factor";

/// Accepted alternative header of the factor value
pub const VALUE_COLUMN_ALIAS: &str = "Factor value";

/// Column header of the mapping status written by the flow mapper
pub const STATUS_COLUMN: &str = "Mapping status";

/// Required column set; each entry lists the accepted header names
pub const REQUIRED_COLUMNS: &[&[&str]] = &[
    &["Method"],
    &["Indicator"],
    &["Indicator unit"],
    &["Flowable"],
    &["Flow UUID"],
    &["Context"],
    &["Unit"],
    &[VALUE_COLUMN, VALUE_COLUMN_ALIAS],
];

/// Full column order used when writing tables
pub const COLUMNS: &[&str] = &[
    "Method",
    "Method UUID",
    "Indicator",
    "Indicator UUID",
    "Indicator unit",
    "Flowable",
    "Flow UUID",
    "Context",
    "Unit",
    "CAS No",
    "Location",
    "Location UUID",
    VALUE_COLUMN,
];

/// Check a header against the required column schema.
///
/// Returns the canonical names of all missing columns.
pub fn missing_columns<S: AsRef<str>>(header: &[S]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|accepted| !header.iter().any(|h| accepted.contains(&h.as_ref().trim())))
        .map(|accepted| accepted[0].to_string())
        .collect()
}

/// Mapping state of a row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingStatus {
    /// Not passed through a flow mapper
    #[default]
    Unprocessed,
    /// Flow reference replaced by a target flow
    Mapped,
    /// No mapping entry matched; retained unmodified
    Unmapped,
}

impl MappingStatus {
    pub fn is_unprocessed(&self) -> bool {
        matches!(self, MappingStatus::Unprocessed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MappingStatus::Unprocessed => "Unprocessed",
            MappingStatus::Mapped => "Mapped",
            MappingStatus::Unmapped => "Unmapped",
        }
    }
}

/// A single characterization factor with its descriptors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterizationRow {
    #[serde(rename = "Method")]
    pub method: String,

    #[serde(rename = "Method UUID", default)]
    pub method_uuid: Option<String>,

    #[serde(rename = "Indicator")]
    pub indicator: String,

    #[serde(rename = "Indicator UUID", default)]
    pub indicator_uuid: Option<String>,

    #[serde(rename = "Indicator unit")]
    pub indicator_unit: String,

    #[serde(rename = "Flowable")]
    pub flowable: String,

    /// Target flow identifier; populated by mapping or supplied by the source
    #[serde(rename = "Flow UUID", default)]
    pub flow_uuid: Option<String>,

    /// Compartment path, slash-delimited (`air/urban`)
    #[serde(rename = "Context")]
    pub context: String,

    #[serde(rename = "Unit")]
    pub unit: String,

    /// Source flow identifier (chemical registry number)
    #[serde(rename = "CAS No", default)]
    pub cas_no: Option<String>,

    #[serde(rename = "Location", default)]
    pub location: Option<String>,

    #[serde(rename = "Location UUID", default)]
    pub location_uuid: Option<String>,

    #[serde(rename = "Characterization Factor", alias = "Factor value")]
    pub value: f64,

    #[serde(
        rename = "Mapping status",
        default,
        skip_serializing_if = "MappingStatus::is_unprocessed"
    )]
    pub status: MappingStatus,
}

impl CharacterizationRow {
    /// Create a row from the required descriptors
    pub fn new(
        method: impl Into<String>,
        indicator: impl Into<String>,
        indicator_unit: impl Into<String>,
        flowable: impl Into<String>,
        context: impl Into<String>,
        unit: impl Into<String>,
        value: f64,
    ) -> Self {
        Self {
            method: method.into(),
            method_uuid: None,
            indicator: indicator.into(),
            indicator_uuid: None,
            indicator_unit: indicator_unit.into(),
            flowable: flowable.into(),
            flow_uuid: None,
            context: context.into(),
            unit: unit.into(),
            cas_no: None,
            location: None,
            location_uuid: None,
            value,
            status: MappingStatus::Unprocessed,
        }
    }

    pub fn with_flow_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.flow_uuid = Some(uuid.into());
        self
    }

    pub fn with_cas_no(mut self, cas: impl Into<String>) -> Self {
        self.cas_no = Some(cas.into());
        self
    }

    pub fn with_indicator_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.indicator_uuid = Some(uuid.into());
        self
    }

    pub fn with_method_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.method_uuid = Some(uuid.into());
        self
    }

    /// Supplied flow identifier, or one derived from flowable, context and unit
    pub fn effective_flow_uuid(&self) -> String {
        id_or_derived(
            self.flow_uuid.as_deref(),
            [&self.flowable, &self.context, &self.unit],
        )
    }

    pub fn effective_indicator_uuid(&self) -> String {
        id_or_derived(
            self.indicator_uuid.as_deref(),
            [&self.method, &self.indicator],
        )
    }

    pub fn effective_method_uuid(&self) -> String {
        id_or_derived(self.method_uuid.as_deref(), [&self.method])
    }

    /// Treat blank optional cells as absent
    pub(crate) fn normalize(&mut self) {
        for field in [
            &mut self.method_uuid,
            &mut self.indicator_uuid,
            &mut self.flow_uuid,
            &mut self.cas_no,
            &mut self.location,
            &mut self.location_uuid,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
    }

    /// Cell values in [`COLUMNS`] order
    pub(crate) fn cells(&self) -> Vec<String> {
        let opt = |v: &Option<String>| v.clone().unwrap_or_default();
        vec![
            self.method.clone(),
            opt(&self.method_uuid),
            self.indicator.clone(),
            opt(&self.indicator_uuid),
            self.indicator_unit.clone(),
            self.flowable.clone(),
            opt(&self.flow_uuid),
            self.context.clone(),
            self.unit.clone(),
            opt(&self.cas_no),
            opt(&self.location),
            opt(&self.location_uuid),
            self.value.to_string(),
        ]
    }
}

/// An ordered table of characterization rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterizationTable {
    rows: Vec<CharacterizationRow>,
}

impl CharacterizationTable {
    pub fn new(rows: Vec<CharacterizationRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[CharacterizationRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<CharacterizationRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CharacterizationRow> {
        self.rows.iter()
    }

    pub fn push(&mut self, row: CharacterizationRow) {
        self.rows.push(row);
    }

    /// Distinct indicator names in first-seen order
    pub fn indicators(&self) -> Vec<String> {
        let set: IndexSet<&str> = self.rows.iter().map(|r| r.indicator.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Distinct method names in first-seen order
    pub fn methods(&self) -> Vec<String> {
        let set: IndexSet<&str> = self.rows.iter().map(|r| r.method.as_str()).collect();
        set.into_iter().map(str::to_string).collect()
    }

    /// Keep only rows whose indicator is in `indicators`
    pub fn filter_indicators<S: AsRef<str>>(&self, indicators: &[S]) -> Self {
        self.filter(|r| indicators.iter().any(|i| i.as_ref() == r.indicator))
    }

    /// Keep only rows whose method is in `methods`
    pub fn filter_methods<S: AsRef<str>>(&self, methods: &[S]) -> Self {
        self.filter(|r| methods.iter().any(|m| m.as_ref() == r.method))
    }

    fn filter(&self, keep: impl Fn(&CharacterizationRow) -> bool) -> Self {
        self.rows.iter().filter(|r| keep(r)).cloned().collect()
    }

    /// True when any row carries a mapping status
    pub(crate) fn has_status(&self) -> bool {
        self.rows.iter().any(|r| !r.status.is_unprocessed())
    }
}

impl FromIterator<CharacterizationRow> for CharacterizationTable {
    fn from_iter<T: IntoIterator<Item = CharacterizationRow>>(iter: T) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for CharacterizationTable {
    type Item = CharacterizationRow;
    type IntoIter = std::vec::IntoIter<CharacterizationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a CharacterizationTable {
    type Item = &'a CharacterizationRow;
    type IntoIter = std::slice::Iter<'a, CharacterizationRow>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
