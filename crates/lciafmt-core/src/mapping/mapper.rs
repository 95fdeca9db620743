//! Applies a mapping table to a characterization table

use super::{MappingResolver, MappingTable};
use crate::anomaly::Anomaly;
use crate::table::{CharacterizationRow, CharacterizationTable, MappingStatus};
use crate::Result;
use indexmap::IndexSet;
use tracing::{debug, info};

/// Where the mapping table comes from
#[derive(Debug, Clone)]
pub enum MappingSpec {
    /// A named system, resolved to a configured or bundled table
    System(String),
    /// A table supplied by the caller
    Table(MappingTable),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MapOptions {
    /// Keep rows without a mapping entry instead of dropping them
    pub preserve_unmapped: bool,
    /// Compare flow names and contexts case-insensitively
    pub case_insensitive: bool,
}

/// Counts collected during one mapping run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingReport {
    pub input_rows: usize,
    /// Output rows produced from mapping hits, fan-out included
    pub mapped_rows: usize,
    /// Output rows beyond the first for fanned-out source rows
    pub fan_out_rows: usize,
    /// Rows that already referenced a target flow
    pub already_mapped: usize,
    pub preserved_unmapped: usize,
    pub dropped: usize,
    /// Distinct (flowable, context) pairs without a mapping entry
    pub unmapped_flows: IndexSet<(String, String)>,
}

impl MappingReport {
    pub fn anomalies(&self) -> Vec<Anomaly> {
        self.unmapped_flows
            .iter()
            .map(|(flowable, context)| Anomaly::UnmappedFlow {
                flowable: flowable.clone(),
                context: context.clone(),
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct MappingOutcome {
    pub table: CharacterizationTable,
    pub report: MappingReport,
}

/// Maps source flows onto a target flow list
pub struct FlowMapper {
    mapping: MappingTable,
    options: MapOptions,
}

impl FlowMapper {
    pub fn new(mapping: MappingTable, options: MapOptions) -> Self {
        Self { mapping, options }
    }

    /// Create a mapper from a mapping spec, resolving system names
    pub fn from_spec(
        spec: MappingSpec,
        options: MapOptions,
        resolver: &MappingResolver,
    ) -> Result<Self> {
        let mapping = match spec {
            MappingSpec::System(system) => resolver.resolve(&system)?,
            MappingSpec::Table(table) => {
                table.validate()?;
                table
            }
        };
        Ok(Self::new(mapping, options))
    }

    pub fn mapping(&self) -> &MappingTable {
        &self.mapping
    }

    /// Map every row of `table`; the input is left untouched
    pub fn run(&self, table: &CharacterizationTable) -> MappingOutcome {
        info!(
            "Applying {} mapping entries to {} rows",
            self.mapping.len(),
            table.len()
        );
        let index = self.mapping.index(self.options.case_insensitive);
        let mut report = MappingReport {
            input_rows: table.len(),
            ..Default::default()
        };
        let mut rows = Vec::with_capacity(table.len());

        for row in table {
            if row.flow_uuid.as_deref().is_some_and(|id| index.is_target(id)) {
                report.already_mapped += 1;
                rows.push(row.clone());
                continue;
            }

            match index.lookup(&row.flowable, &row.context) {
                Some(targets) => {
                    if targets.len() > 1 {
                        debug!(
                            "Flow '{}' ({}) maps to {} target flows",
                            row.flowable,
                            row.context,
                            targets.len()
                        );
                        report.fan_out_rows += targets.len() - 1;
                    }
                    for entry in targets {
                        let mut mapped = row.clone();
                        mapped.flowable = entry.target_name.clone();
                        mapped.flow_uuid = Some(entry.target_uuid.clone());
                        if let Some(context) = &entry.target_context {
                            mapped.context = context.clone();
                        }
                        mapped.unit = entry.target_unit.clone();
                        mapped.value = row.value * entry.factor();
                        mapped.status = MappingStatus::Mapped;
                        rows.push(mapped);
                        report.mapped_rows += 1;
                    }
                }
                None => {
                    report
                        .unmapped_flows
                        .insert((row.flowable.clone(), row.context.clone()));
                    if self.options.preserve_unmapped {
                        rows.push(CharacterizationRow {
                            status: MappingStatus::Unmapped,
                            ..row.clone()
                        });
                        report.preserved_unmapped += 1;
                    } else {
                        report.dropped += 1;
                    }
                }
            }
        }

        for anomaly in report.anomalies() {
            anomaly.log();
        }
        info!(
            "Mapped {} rows ({} already mapped, {} unmapped kept, {} dropped)",
            report.mapped_rows, report.already_mapped, report.preserved_unmapped, report.dropped
        );

        MappingOutcome {
            table: CharacterizationTable::new(rows),
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::MappingEntry;

    fn co2_row() -> CharacterizationRow {
        CharacterizationRow::new("X", "GWP", "kg CO2 eq", "Carbon dioxide", "air", "kg", 1.0)
    }

    fn mapper(entries: Vec<MappingEntry>, options: MapOptions) -> FlowMapper {
        FlowMapper::new(entries.into_iter().collect(), options)
    }

    #[test]
    fn test_single_target_hit() {
        let table: CharacterizationTable = vec![co2_row()].into_iter().collect();
        let m = mapper(
            vec![MappingEntry::new("Carbon dioxide", "air", "F1", "Carbon dioxide", "kg", 1.0)],
            MapOptions::default(),
        );

        let outcome = m.run(&table);
        assert_eq!(outcome.table.len(), 1);
        let row = &outcome.table.rows()[0];
        assert_eq!(row.flow_uuid.as_deref(), Some("F1"));
        assert_eq!(row.unit, "kg");
        assert_eq!(row.value, 1.0);
        assert_eq!(row.status, MappingStatus::Mapped);
        assert_eq!(outcome.report.mapped_rows, 1);
    }

    #[test]
    fn test_conversion_factor_scales_value() {
        let mut row = co2_row();
        row.value = 2.5;
        let table: CharacterizationTable = vec![row].into_iter().collect();
        let m = mapper(
            vec![
                MappingEntry::new("Carbon dioxide", "air", "F1", "Carbon dioxide", "g", 1000.0)
                    .with_target_context("emission/air"),
            ],
            MapOptions::default(),
        );

        let out = m.run(&table).table;
        assert_eq!(out.rows()[0].value, 2500.0);
        assert_eq!(out.rows()[0].unit, "g");
        assert_eq!(out.rows()[0].context, "emission/air");
    }

    #[test]
    fn test_fan_out_scales_each_target() {
        let mut row = co2_row();
        row.flowable = "Xylene".into();
        row.value = 2.0;
        let table: CharacterizationTable = vec![row].into_iter().collect();
        let m = mapper(
            vec![
                MappingEntry::new("Xylene", "air", "X1", "m-Xylene", "kg", 1.0),
                MappingEntry::new("Xylene", "air", "X2", "o-Xylene", "kg", 0.5),
            ],
            MapOptions::default(),
        );

        let outcome = m.run(&table);
        let values: Vec<f64> = outcome.table.iter().map(|r| r.value).collect();
        assert_eq!(values, vec![2.0, 1.0]);
        assert_eq!(outcome.report.fan_out_rows, 1);
        assert_eq!(outcome.report.mapped_rows, 2);
    }

    #[test]
    fn test_unmapped_dropped_by_default() {
        let table: CharacterizationTable = vec![co2_row()].into_iter().collect();
        let m = mapper(vec![], MapOptions::default());

        let outcome = m.run(&table);
        assert!(outcome.table.is_empty());
        assert_eq!(outcome.report.dropped, 1);
        assert_eq!(outcome.report.anomalies().len(), 1);
    }

    #[test]
    fn test_unmapped_preserved_unchanged() {
        let input = co2_row().with_cas_no("000124-38-9");
        let table: CharacterizationTable = vec![input.clone()].into_iter().collect();
        let m = mapper(
            vec![],
            MapOptions {
                preserve_unmapped: true,
                ..Default::default()
            },
        );

        let out = m.run(&table).table;
        let row = &out.rows()[0];
        assert_eq!(row.status, MappingStatus::Unmapped);
        assert_eq!(row.flowable, input.flowable);
        assert_eq!(row.flow_uuid, input.flow_uuid);
        assert_eq!(row.context, input.context);
        assert_eq!(row.unit, input.unit);
        assert_eq!(row.value, input.value);
    }

    #[test]
    fn test_case_insensitive_lookup() {
        let mut row = co2_row();
        row.flowable = "CARBON DIOXIDE".into();
        let table: CharacterizationTable = vec![row].into_iter().collect();
        let entries =
            vec![MappingEntry::new("carbon dioxide", "Air", "F1", "Carbon dioxide", "kg", 1.0)];

        assert!(mapper(entries.clone(), MapOptions::default()).run(&table).table.is_empty());

        let out = mapper(
            entries,
            MapOptions {
                case_insensitive: true,
                ..Default::default()
            },
        )
        .run(&table)
        .table;
        assert_eq!(out.rows()[0].flow_uuid.as_deref(), Some("F1"));
    }

    #[test]
    fn test_input_not_mutated() {
        let table: CharacterizationTable = vec![co2_row()].into_iter().collect();
        let before = table.clone();
        mapper(
            vec![MappingEntry::new("Carbon dioxide", "air", "F1", "CO2", "kg", 3.0)],
            MapOptions::default(),
        )
        .run(&table);
        assert_eq!(table, before);
    }

    #[test]
    fn test_conflicting_mapping_spec_rejected() {
        let mapping: MappingTable = vec![
            MappingEntry::new("Xylene", "air", "X1", "Xylene", "kg", 1.0),
            MappingEntry::new("Xylene", "air", "X1", "Xylene", "g", 1000.0),
        ]
        .into_iter()
        .collect();

        let result = FlowMapper::from_spec(
            MappingSpec::Table(mapping),
            MapOptions::default(),
            &MappingResolver::default(),
        );
        assert!(matches!(
            result,
            Err(crate::LciaError::InvalidMappingTable { .. })
        ));
    }
}
