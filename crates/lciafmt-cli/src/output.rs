//! Human-readable summaries of pipeline runs

use colored::*;
use lciafmt_core::{
    Anomaly, CharacterizationTable, CollapseReport, DuplicatePolicy, MappingReport, Method,
    MethodMetadata, WriteReport,
};
use std::path::Path;

pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn print_methods(methods: &[&MethodMetadata]) {
    println!("{}", "Supported methods:".bold());
    for meta in methods {
        let mapping = meta.mapping.as_deref().unwrap_or("-");
        println!(
            "  {:<12} {:<20} mapping: {}",
            meta.id.id().cyan(),
            meta.name,
            mapping
        );
    }
}

fn print_anomalies(anomalies: &[Anomaly]) {
    if anomalies.is_empty() {
        return;
    }
    println!("  {}", "Anomalies:".yellow());
    for anomaly in anomalies {
        println!("    - {anomaly}");
    }
}

pub fn print_mapping_report(report: &MappingReport, output: &Path) {
    print_success(&format!("Mapped table written to {}", output.display()));
    println!("\n{}", "Summary:".bold());
    println!("  Input rows: {}", report.input_rows);
    println!("  Mapped rows: {}", report.mapped_rows.to_string().green());
    if report.fan_out_rows > 0 {
        println!("  Fan-out rows: {}", report.fan_out_rows);
    }
    if report.already_mapped > 0 {
        println!("  Already mapped: {}", report.already_mapped);
    }
    if report.preserved_unmapped > 0 {
        println!(
            "  Unmapped (kept): {}",
            report.preserved_unmapped.to_string().yellow()
        );
    }
    if report.dropped > 0 {
        println!("  Unmapped (dropped): {}", report.dropped.to_string().red());
    }
    print_anomalies(&report.anomalies());
}

pub fn print_collapse_report(
    report: &CollapseReport,
    output_rows: usize,
    policy: DuplicatePolicy,
    output: &Path,
) {
    print_success(&format!("Collapsed table written to {}", output.display()));
    println!("\n{}", "Summary:".bold());
    println!("  Input rows: {}", report.input_rows);
    println!("  Output rows: {}", output_rows.to_string().green());
    println!("  Policy: {}", policy);
    println!("  Identical rows removed: {}", report.identical_removed);
    println!("  Redundant rows removed: {}", report.redundant_removed);
    if report.merged_removed > 0 {
        println!("  Rows merged: {}", report.merged_removed);
    }
    if !report.conflicts.is_empty() {
        println!(
            "  Conflicts: {}",
            report.conflicts.len().to_string().yellow()
        );
    }
    print_anomalies(&report.conflicts);
}

pub fn print_write_report(report: &WriteReport) {
    print_success(&format!("Package written to {}", report.path.display()));
    println!("\n{}", "Summary:".bold());
    println!("  Methods: {}", report.methods);
    println!("  Indicators: {}", report.indicators);
    println!("  Factors: {}", report.factors);
    println!("  Flows: {}", report.flows);
    println!("  Categories: {}", report.categories);
    print_anomalies(&report.anomalies);
}

pub fn print_table_written(table: &CharacterizationTable, output: &Path) {
    print_success(&format!(
        "{} rows written to {}",
        table.len(),
        output.display()
    ));
}

pub fn print_table_summary(method: Method, table: &CharacterizationTable) {
    println!("{} {}", method.to_string().bold(), format!("({} rows)", table.len()).dimmed());
    for indicator in table.indicators() {
        let count = table.iter().filter(|r| r.indicator == indicator).count();
        println!("  {:<40} {}", indicator, count);
    }
}
