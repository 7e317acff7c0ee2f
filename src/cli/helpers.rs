//! Shared helper functions for CLI commands

use console::style;
use miette::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tabled::{builder::Builder, settings::Style};

use crate::catalog;
use crate::core::store::{DefectBreakdown, EquipmentHealth, HighRiskLot, ShiftPerformance};
use crate::core::{Config, LoadSummary, ProductionStore, ReferenceCounts, StoreError};

/// Open the configured database, reporting each failed attempt
pub fn connect(config: &Config, quiet: bool) -> Result<ProductionStore> {
    let store = ProductionStore::connect_with_retry(
        &config.database,
        &config.encoding,
        config.connect_attempts,
        config.connect_backoff(),
        |attempt, max, err| {
            tracing::warn!(attempt, max, error = %err, "waiting for database");
            if !quiet {
                println!(
                    "{} Waiting for database... ({}/{})",
                    style("→").yellow(),
                    attempt,
                    max
                );
            }
        },
    )?;
    Ok(store)
}

/// Create the schema, reference rows and feature metadata in one
/// transaction, dropping existing tables first when `reset` is set.
/// Returns the reference rows and features inserted.
pub fn seed_metadata(
    store: &ProductionStore,
    reset: bool,
) -> Result<(ReferenceCounts, usize), StoreError> {
    store.begin()?;
    let seeded = write_metadata(store, reset);

    match seeded {
        Ok(counts) => {
            store.commit()?;
            tracing::info!(features = counts.1, "feature metadata created");
            Ok(counts)
        }
        Err(e) => {
            store.rollback()?;
            Err(e)
        }
    }
}

fn write_metadata(store: &ProductionStore, reset: bool) -> Result<(ReferenceCounts, usize), StoreError> {
    if reset {
        store.reset()?;
    }
    store.init_schema()?;
    let refs = store.seed_reference_data()?;
    let features = store.insert_feature_definitions(&catalog::definitions())?;
    Ok((refs, features))
}

/// Random source for a run: seeded when a seed is configured
pub fn rng_for(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

/// Format an optional average for display
pub fn format_risk(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.4}", v),
        None => "-".to_string(),
    }
}

/// Render the verification counts as a table
pub fn summary_table(summary: &LoadSummary) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Metric", "Value"]);
    builder.push_record(["Features", &summary.feature_count.to_string()]);
    builder.push_record(["Critical features", &summary.critical_features.to_string()]);
    builder.push_record(["Feature categories", &summary.feature_categories.to_string()]);
    builder.push_record(["Lots", &summary.lot_count.to_string()]);
    builder.push_record(["Measurements", &summary.measurement_count.to_string()]);
    builder.push_record(["Out of spec", &summary.out_of_spec_count.to_string()]);
    builder.push_record(["Quality results", &summary.quality_count.to_string()]);
    builder.push_record(["Pass", &summary.pass_count.to_string()]);
    builder.push_record(["Fail", &summary.fail_count.to_string()]);
    builder.push_record(["Fail rate", &format!("{:.2}%", summary.fail_rate())]);
    builder.push_record(["Avg risk (fail)", &format_risk(summary.avg_risk_fail)]);
    builder.push_record(["Avg risk (pass)", &format_risk(summary.avg_risk_pass)]);
    builder.build().with(Style::rounded()).to_string()
}

fn format_score(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "-".to_string(),
    }
}

/// Render lot outcomes per shift
pub fn shift_table(rows: &[ShiftPerformance]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Shift", "Name", "Lots", "Pass", "Fail", "Fail rate", "Avg quality", "Operators", "Equipment"]);
    for row in rows {
        builder.push_record([
            row.shift_code.clone(),
            row.shift_name.clone(),
            row.total_lots.to_string(),
            row.pass_count.to_string(),
            row.fail_count.to_string(),
            format!("{:.2}%", row.fail_rate()),
            format_score(row.avg_quality_score),
            row.operator_count.to_string(),
            row.equipment_used.to_string(),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Render throughput and failures per piece of equipment
pub fn equipment_table(rows: &[EquipmentHealth]) -> String {
    let mut builder = Builder::default();
    builder.push_record([
        "Code", "Name", "Type", "Status", "Lots", "Failed", "Fail rate", "Avg quality", "Days", "Lots/failure", "Health",
    ]);
    for row in rows {
        builder.push_record([
            row.equipment_code.clone(),
            row.equipment_name.clone(),
            row.equipment_type.clone(),
            row.status.clone(),
            row.total_lots.to_string(),
            row.failed_lots.to_string(),
            format!("{:.2}%", row.fail_rate()),
            format_score(row.avg_quality_score),
            row.days_operated.to_string(),
            format_score(row.lots_between_failures()),
            format_score(row.health_score()),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Render failed lots per defect type
pub fn defect_table(rows: &[DefectBreakdown]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Defect type", "Count", "% of failures", "Avg quality", "Product families", "Equipment types"]);
    for row in rows {
        builder.push_record([
            row.defect_type.clone(),
            row.occurrences.to_string(),
            format!("{:.2}%", row.pct_of_failures()),
            format_score(row.avg_quality_score),
            row.product_families.join(", "),
            row.equipment_types.join(", "),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}

/// Render lots at or above the risk threshold
pub fn high_risk_table(rows: &[HighRiskLot]) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Lot", "Product", "Equipment", "Predicted risk", "Risk score", "Tested", "Result"]);
    for row in rows {
        builder.push_record([
            row.lot_number.clone(),
            row.product_name.clone(),
            row.equipment_code.clone(),
            format_risk(Some(row.predicted_risk)),
            format_score(row.risk_score),
            row.test_datetime.clone().unwrap_or_else(|| "-".to_string()),
            row.classification.to_string(),
        ]);
    }
    builder.build().with(Style::rounded()).to_string()
}
