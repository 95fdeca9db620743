//! Indicator collapsing after flow mapping
//!
//! Mapping can make several source rows point at the same target flow of the
//! same indicator. Collapsing aligns indicator and method identifiers within
//! each group, removes duplicates and reports conflicting factors. What
//! happens to a conflict is decided by [`DuplicatePolicy`].

use crate::anomaly::Anomaly;
use crate::table::{CharacterizationRow, CharacterizationTable, MappingStatus};
use indexmap::IndexMap;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;
use tracing::info;

/// Treatment of rows sharing (method, indicator, flow) with different values
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Keep one row per distinct value and flag the conflict
    #[default]
    KeepAll,
    /// Keep the first-seen row
    KeepFirst,
    /// Merge into the first-seen row with the summed value
    Sum,
    /// Merge into the first-seen row with the mean value
    Average,
}

impl DuplicatePolicy {
    pub const ALL: [DuplicatePolicy; 4] = [
        DuplicatePolicy::KeepAll,
        DuplicatePolicy::KeepFirst,
        DuplicatePolicy::Sum,
        DuplicatePolicy::Average,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DuplicatePolicy::KeepAll => "keep-all",
            DuplicatePolicy::KeepFirst => "keep-first",
            DuplicatePolicy::Sum => "sum",
            DuplicatePolicy::Average => "average",
        }
    }
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DuplicatePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                format!("Invalid duplicate policy '{s}'. Expected keep-all, keep-first, sum or average")
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollapseReport {
    pub input_rows: usize,
    /// Rows identical to an earlier row in every column
    pub identical_removed: usize,
    /// Rows sharing key and value with an earlier row
    pub redundant_removed: usize,
    /// Rows folded away by the duplicate policy
    pub merged_removed: usize,
    pub conflicts: Vec<Anomaly>,
}

#[derive(Debug, Clone)]
pub struct CollapseOutcome {
    pub table: CharacterizationTable,
    pub report: CollapseReport,
}

type GroupKey = (String, String, String);

fn fingerprint(row: &CharacterizationRow) -> (Vec<String>, u64, MappingStatus) {
    (row.cells(), row.value.to_bits(), row.status)
}

/// Collapse duplicate indicator factors
pub fn collapse_indicators(
    table: &CharacterizationTable,
    policy: DuplicatePolicy,
) -> CollapseOutcome {
    let mut report = CollapseReport {
        input_rows: table.len(),
        ..Default::default()
    };

    // first-seen identifiers per indicator and per method
    let mut indicator_ids: HashMap<(&str, &str), &str> = HashMap::new();
    let mut method_ids: HashMap<&str, &str> = HashMap::new();
    for row in table {
        if let Some(id) = row.indicator_uuid.as_deref() {
            indicator_ids
                .entry((row.method.as_str(), row.indicator.as_str()))
                .or_insert(id);
        }
        if let Some(id) = row.method_uuid.as_deref() {
            method_ids.entry(row.method.as_str()).or_insert(id);
        }
    }

    let mut seen = HashSet::new();
    let mut rows: Vec<CharacterizationRow> = Vec::with_capacity(table.len());
    for source in table {
        let mut row = source.clone();
        if let Some(id) = indicator_ids.get(&(source.method.as_str(), source.indicator.as_str())) {
            row.indicator_uuid = Some((*id).to_string());
        }
        if let Some(id) = method_ids.get(source.method.as_str()) {
            row.method_uuid = Some((*id).to_string());
        }
        if seen.insert(fingerprint(&row)) {
            rows.push(row);
        } else {
            report.identical_removed += 1;
        }
    }

    let mut groups: IndexMap<GroupKey, Vec<usize>> = IndexMap::new();
    for (idx, row) in rows.iter().enumerate() {
        let key = (
            row.method.clone(),
            row.indicator.clone(),
            row.effective_flow_uuid(),
        );
        groups.entry(key).or_default().push(idx);
    }

    let mut keep = vec![false; rows.len()];
    let mut merged_values: HashMap<usize, f64> = HashMap::new();

    for ((method, indicator, flow_uuid), members) in &groups {
        let first = members[0];
        let mut distinct: Vec<usize> = Vec::new();
        for &idx in members {
            if !distinct
                .iter()
                .any(|&d| rows[d].value.to_bits() == rows[idx].value.to_bits())
            {
                distinct.push(idx);
            }
        }

        if distinct.len() == 1 {
            keep[first] = true;
            report.redundant_removed += members.len() - 1;
            continue;
        }

        let conflict = Anomaly::DuplicateFactorConflict {
            method: method.clone(),
            indicator: indicator.clone(),
            flow_uuid: flow_uuid.clone(),
            values: members.iter().map(|&i| rows[i].value).collect(),
        };
        conflict.log();
        report.conflicts.push(conflict);

        match policy {
            DuplicatePolicy::KeepAll => {
                for &idx in &distinct {
                    keep[idx] = true;
                }
                report.redundant_removed += members.len() - distinct.len();
            }
            DuplicatePolicy::KeepFirst | DuplicatePolicy::Sum | DuplicatePolicy::Average => {
                keep[first] = true;
                report.merged_removed += members.len() - 1;
                let sum: f64 = members.iter().map(|&i| rows[i].value).sum();
                match policy {
                    DuplicatePolicy::Sum => {
                        merged_values.insert(first, sum);
                    }
                    DuplicatePolicy::Average => {
                        merged_values.insert(first, sum / members.len() as f64);
                    }
                    _ => {}
                }
            }
        }
    }

    let collapsed: CharacterizationTable = rows
        .into_iter()
        .enumerate()
        .filter(|(idx, _)| keep[*idx])
        .map(|(idx, mut row)| {
            if let Some(value) = merged_values.get(&idx) {
                row.value = *value;
            }
            row
        })
        .collect();

    info!(
        "Collapsed {} rows to {} ({} conflicts, policy {})",
        report.input_rows,
        collapsed.len(),
        report.conflicts.len(),
        policy
    );

    CollapseOutcome {
        table: collapsed,
        report,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(flow: &str, value: f64) -> CharacterizationRow {
        CharacterizationRow::new("TRACI 2.1", "Global warming", "kg CO2 eq", "src", "air", "kg", value)
            .with_flow_uuid(flow)
    }

    fn table(rows: Vec<CharacterizationRow>) -> CharacterizationTable {
        rows.into_iter().collect()
    }

    #[test]
    fn test_identical_rows_removed() {
        let out = collapse_indicators(
            &table(vec![row("F1", 1.0), row("F1", 1.0), row("F2", 3.0)]),
            DuplicatePolicy::default(),
        );
        assert_eq!(out.table.len(), 2);
        assert_eq!(out.report.identical_removed, 1);
        assert!(out.report.conflicts.is_empty());
    }

    #[test]
    fn test_same_key_same_value_kept_once() {
        let mut other_source = row("F1", 1.0);
        other_source.flowable = "Carbon dioxide, fossil".into();
        let out = collapse_indicators(
            &table(vec![row("F1", 1.0), other_source]),
            DuplicatePolicy::KeepAll,
        );
        assert_eq!(out.table.len(), 1);
        assert_eq!(out.table.rows()[0].flowable, "src");
        assert_eq!(out.report.redundant_removed, 1);
    }

    #[test]
    fn test_conflict_flagged_and_retained_by_default() {
        let out = collapse_indicators(
            &table(vec![row("F1", 1.0), row("F1", 2.0)]),
            DuplicatePolicy::KeepAll,
        );
        assert_eq!(out.table.len(), 2);
        assert_eq!(out.report.conflicts.len(), 1);
        match &out.report.conflicts[0] {
            Anomaly::DuplicateFactorConflict {
                flow_uuid, values, ..
            } => {
                assert_eq!(flow_uuid, "F1");
                assert_eq!(values, &vec![1.0, 2.0]);
            }
            other => panic!("unexpected anomaly: {other}"),
        }
    }

    #[test]
    fn test_policies_resolve_conflicts() {
        let input = table(vec![row("F1", 1.0), row("F2", 5.0), row("F1", 3.0)]);

        let first = collapse_indicators(&input, DuplicatePolicy::KeepFirst);
        assert_eq!(first.table.len(), 2);
        assert_eq!(first.table.rows()[0].value, 1.0);
        assert_eq!(first.report.merged_removed, 1);

        let sum = collapse_indicators(&input, DuplicatePolicy::Sum);
        assert_eq!(sum.table.rows()[0].value, 4.0);
        assert_eq!(sum.table.rows()[1].value, 5.0);

        let avg = collapse_indicators(&input, DuplicatePolicy::Average);
        assert_eq!(avg.table.rows()[0].value, 2.0);
    }

    #[test]
    fn test_first_seen_indicator_uuid_applied_to_group() {
        let a = row("F1", 1.0).with_indicator_uuid("IND-A");
        let b = row("F2", 2.0).with_indicator_uuid("IND-B");
        let c = row("F3", 3.0);
        let out = collapse_indicators(&table(vec![c, a, b]), DuplicatePolicy::default());
        assert!(
            out.table
                .iter()
                .all(|r| r.indicator_uuid.as_deref() == Some("IND-A"))
        );
    }

    #[test]
    fn test_unmapped_rows_grouped_by_derived_flow_id() {
        let mut a = row("", 1.0);
        a.flow_uuid = None;
        let mut b = a.clone();
        b.value = 2.0;
        let out = collapse_indicators(&table(vec![a, b]), DuplicatePolicy::KeepFirst);
        assert_eq!(out.table.len(), 1);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!("sum".parse::<DuplicatePolicy>(), Ok(DuplicatePolicy::Sum));
        assert_eq!(DuplicatePolicy::KeepFirst.to_string(), "keep-first");
        assert!("median".parse::<DuplicatePolicy>().is_err());
    }
}
