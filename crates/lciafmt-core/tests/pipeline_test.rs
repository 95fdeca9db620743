//! End-to-end tests of mapping, collapsing and package export

use lciafmt_core::table::{self, CharacterizationRow, CharacterizationTable};
use lciafmt_core::{
    DuplicatePolicy, JsonLdOptions, JsonLdWriter, LciaError, MapOptions, MappingEntry,
    MappingSpec, MappingStatus, MappingTable, collapse_indicators, make_uuid, map_flows, to_jsonld,
};
use serde_json::Value;
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tempfile::TempDir;
use zip::ZipArchive;

const RAW_CSV: &str = "\
Method,Indicator,Indicator unit,Flowable,Flow UUID,Context,Unit,Characterization Factor
TRACI 2.1,Global warming,kg CO2 eq,Carbon dioxide,,air,kg,1
TRACI 2.1,Global warming,kg CO2 eq,Methane,,air,kg,28
TRACI 2.1,Global warming,kg CO2 eq,Unobtainium,,air,kg,5
TRACI 2.1,Smog formation,kg O3 eq,Xylene,,air,kg,2
";

fn row(flowable: &str, context: &str, value: f64) -> CharacterizationRow {
    CharacterizationRow::new("X", "GWP", "kg CO2 eq", flowable, context, "kg", value)
}

fn table(rows: Vec<CharacterizationRow>) -> CharacterizationTable {
    rows.into_iter().collect()
}

/// Parsed documents of a package, keyed by folder
fn read_package(path: &Path) -> HashMap<String, Vec<Value>> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut docs: HashMap<String, Vec<Value>> = HashMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).unwrap();
        let folder = file.name().split('/').next().unwrap().to_string();
        let mut text = String::new();
        file.read_to_string(&mut text).unwrap();
        docs.entry(folder)
            .or_default()
            .push(serde_json::from_str(&text).unwrap());
    }
    docs
}

#[test]
fn test_example_scenario() {
    let input = table(vec![row("Carbon dioxide", "air", 1.0)]);
    let mapping: MappingTable =
        vec![MappingEntry::new("Carbon dioxide", "air", "F1", "Carbon dioxide", "kg", 1.0)]
            .into_iter()
            .collect();

    let outcome = map_flows(&input, MappingSpec::Table(mapping), MapOptions::default()).unwrap();
    let out = &outcome.table.rows()[0];
    assert_eq!(out.flow_uuid.as_deref(), Some("F1"));
    assert_eq!(out.unit, "kg");
    assert_eq!(out.value, 1.0);
}

#[test]
fn test_bundled_system_mapping() {
    let raw = table::read_csv(RAW_CSV.as_bytes()).unwrap();
    let outcome = map_flows(
        &raw,
        MappingSpec::System("TRACI2.1".into()),
        MapOptions::default(),
    )
    .unwrap();

    // Unobtainium dropped, Xylene fanned out to three isomers
    assert_eq!(outcome.report.dropped, 1);
    assert_eq!(outcome.report.fan_out_rows, 2);
    assert_eq!(outcome.table.len(), 5);
    assert!(
        outcome
            .table
            .iter()
            .all(|r| r.status == MappingStatus::Mapped && r.context == "emission/air")
    );
}

#[test]
fn test_conversion_factor_applied() {
    let mut input = row("Crude oil", "resource", 2.0);
    input.method = "ReCiPe 2016".into();
    let outcome = map_flows(
        &table(vec![input]),
        MappingSpec::System("ReCiPe2016".into()),
        MapOptions::default(),
    )
    .unwrap();
    let out = &outcome.table.rows()[0];
    assert_eq!(out.unit, "MJ");
    assert!((out.value - 2.0 * 0.0238).abs() < 1e-12);
}

#[test]
fn test_preserved_row_passes_through() {
    let input = table(vec![row("Unobtainium", "air", 5.0).with_cas_no("000000-00-0")]);
    let options = MapOptions {
        preserve_unmapped: true,
        ..Default::default()
    };
    let outcome = map_flows(&input, MappingSpec::System("TRACI2.1".into()), options).unwrap();

    let out = &outcome.table.rows()[0];
    let original = &input.rows()[0];
    assert_eq!(out.flowable, original.flowable);
    assert_eq!(out.flow_uuid, original.flow_uuid);
    assert_eq!(out.context, original.context);
    assert_eq!(out.unit, original.unit);
    assert_eq!(out.value, original.value);
    assert_eq!(out.cas_no, original.cas_no);
}

#[test]
fn test_remapping_is_idempotent() {
    let raw = table::read_csv(RAW_CSV.as_bytes()).unwrap();
    let options = MapOptions {
        preserve_unmapped: true,
        ..Default::default()
    };
    let spec = || MappingSpec::System("TRACI2.1".into());

    let first = map_flows(&raw, spec(), options).unwrap();
    let second = map_flows(&first.table, spec(), options).unwrap();

    assert_eq!(first.table, second.table);
    assert_eq!(second.report.dropped, 0);
    assert_eq!(second.report.mapped_rows, 0);
}

#[test]
fn test_unsupported_system() {
    let err = map_flows(
        &table(vec![row("Carbon dioxide", "air", 1.0)]),
        MappingSpec::System("NoSuchSystem".into()),
        MapOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, LciaError::UnsupportedMappingSystem { .. }));
}

#[test]
fn test_missing_columns_rejected_at_ingestion() {
    let csv = "Method,Indicator,Flowable,Context\nX,GWP,Carbon dioxide,air\n";
    match table::read_csv(csv.as_bytes()) {
        Err(LciaError::MissingIdentifierColumns { columns }) => {
            assert!(columns.contains(&"Unit".to_string()));
            assert!(columns.contains(&"Flow UUID".to_string()));
        }
        other => panic!("expected missing columns, got {other:?}"),
    }
}

#[test]
fn test_post_collapse_uniqueness() {
    // two source names mapped to the same target flow
    let input = table(vec![
        row("Carbon dioxide", "air", 1.0),
        row("CO2", "air", 1.0),
        row("Methane", "air", 28.0),
        row("CH4", "air", 25.0),
    ]);
    let mapping: MappingTable = vec![
        MappingEntry::new("Carbon dioxide", "air", "F1", "Carbon dioxide", "kg", 1.0),
        MappingEntry::new("CO2", "air", "F1", "Carbon dioxide", "kg", 1.0),
        MappingEntry::new("Methane", "air", "F2", "Methane", "kg", 1.0),
        MappingEntry::new("CH4", "air", "F2", "Methane", "kg", 1.0),
    ]
    .into_iter()
    .collect();
    let mapped = map_flows(&input, MappingSpec::Table(mapping), MapOptions::default()).unwrap();

    let collapsed = collapse_indicators(&mapped.table, DuplicatePolicy::KeepAll);
    let f1 = collapsed
        .table
        .iter()
        .filter(|r| r.flow_uuid.as_deref() == Some("F1"))
        .count();
    let f2 = collapsed
        .table
        .iter()
        .filter(|r| r.flow_uuid.as_deref() == Some("F2"))
        .count();
    assert_eq!(f1, 1);
    assert_eq!(f2, 2);
    assert_eq!(collapsed.report.conflicts.len(), 1);

    let first = collapse_indicators(&mapped.table, DuplicatePolicy::KeepFirst);
    assert_eq!(first.table.len(), 2);
}

#[test]
fn test_package_has_one_flow_per_distinct_flow() {
    let rows: Vec<_> = (0..30)
        .map(|i| {
            let name = ["Carbon dioxide", "Methane", "Ammonia"][i % 3];
            row(name, "emission/air", i as f64)
        })
        .collect();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("x.zip");

    let report = to_jsonld(&table(rows), &path, true).unwrap();
    assert_eq!(report.flows, 3);
    assert_eq!(report.factors, 30);

    let docs = read_package(&path);
    assert_eq!(docs["flows"].len(), 3);
    assert_eq!(docs["categories"].len(), 2);
    assert_eq!(docs["lcia_categories"][0]["impactFactors"].as_array().unwrap().len(), 30);
}

#[test]
fn test_package_category_chain() {
    let rows: Vec<_> = (0..10).map(|_| row("Carbon dioxide", "A/B/C", 1.0)).collect();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("x.zip");
    to_jsonld(&table(rows), &path, true).unwrap();

    let docs = read_package(&path);
    let categories = &docs["categories"];
    assert_eq!(categories.len(), 3);

    let by_name: HashMap<&str, &Value> = categories
        .iter()
        .map(|c| (c["name"].as_str().unwrap(), c))
        .collect();
    assert!(by_name["A"].get("category").is_none());
    assert_eq!(by_name["B"]["category"]["@id"], by_name["A"]["@id"]);
    assert_eq!(by_name["C"]["category"]["@id"], by_name["B"]["@id"]);
    assert_eq!(by_name["A"]["@id"], make_uuid(["category/flow/A"]).as_str());
    assert_eq!(by_name["C"]["modelType"], "FLOW");

    let flow = &docs["flows"][0];
    assert_eq!(flow["category"]["@id"], by_name["C"]["@id"]);
    assert_eq!(flow["flowType"], "ELEMENTARY_FLOW");
    assert_eq!(flow["flowProperties"][0]["referenceFlowProperty"], true);
}

#[test]
fn test_method_document_lists_indicators() {
    let mut acid = row("Ammonia", "air", 1.0);
    acid.indicator = "Acidification".into();
    acid.indicator_unit = "kg SO2 eq".into();
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("x.zip");
    to_jsonld(
        &table(vec![row("Carbon dioxide", "air", 1.0), acid]),
        &path,
        false,
    )
    .unwrap();

    let docs = read_package(&path);
    assert!(!docs.contains_key("flows"));
    let method = &docs["lcia_methods"][0];
    assert_eq!(method["@type"], "ImpactMethod");
    assert_eq!(method["name"], "X");
    assert_eq!(method["impactCategories"].as_array().unwrap().len(), 2);
    assert_eq!(method["impactCategories"][1]["refUnit"], "kg SO2 eq");
    assert_eq!(method["@id"], make_uuid(["X"]).as_str());
}

#[test]
fn test_closed_writer_guard() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("x.zip");
    let input = table(vec![row("Carbon dioxide", "air", 1.0)]);

    let mut writer = JsonLdWriter::create(&path, JsonLdOptions::default()).unwrap();
    writer.write(&input).unwrap();
    writer.finish().unwrap();

    let err = writer.write(&input).unwrap_err();
    assert!(matches!(err, LciaError::WriterClosed));
    drop(writer);

    // the finished package is left intact
    assert_eq!(read_package(&path)["flows"].len(), 1);
}

#[test]
fn test_full_pipeline_from_files() {
    let dir = TempDir::new().unwrap();
    let raw_path = dir.path().join("raw.csv");
    std::fs::write(&raw_path, RAW_CSV).unwrap();

    let raw = table::read_path(&raw_path).unwrap();
    let mapped = map_flows(
        &raw,
        MappingSpec::System("TRACI2.1".into()),
        MapOptions::default(),
    )
    .unwrap();
    let collapsed = collapse_indicators(&mapped.table, DuplicatePolicy::default());

    let mapped_path = dir.path().join("out/mapped.json");
    table::write_path(&collapsed.table, &mapped_path).unwrap();
    assert_eq!(table::read_path(&mapped_path).unwrap(), collapsed.table);

    let report = to_jsonld(&collapsed.table, dir.path().join("out/traci.zip"), true).unwrap();
    assert_eq!(report.indicators, 2);
    assert_eq!(report.flows, 5);
    assert!(report.anomalies.is_empty());
}
