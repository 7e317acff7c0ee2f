//! Feature catalog - deterministic metadata for the 590 SECOM features
//!
//! The SECOM dataset ships anonymous sensor columns. The catalog gives every
//! column a category, process stage, measurement type, unit and normal range
//! as a pure function of its zero-based index, so the same metadata is
//! produced on every run.

mod sql;

pub use sql::{render_sql, sql_script};

use crate::entities::{FeatureCategory, FeatureDefinition, MeasurementKind};

/// Number of feature columns in a SECOM measurement line
pub const FEATURE_COUNT: u32 = 590;

const fn kind(
    measurement_type: &'static str,
    unit: &'static str,
    range_min: f64,
    range_max: f64,
) -> MeasurementKind {
    MeasurementKind {
        measurement_type,
        unit,
        range_min,
        range_max,
    }
}

/// A contiguous block of feature indexes sharing one category
#[derive(Debug, Clone, Copy)]
pub struct CategoryBlock {
    pub category: FeatureCategory,
    /// First index (inclusive)
    pub start: u32,
    /// Last index (inclusive)
    pub end: u32,
    /// Measurement kinds, cycled by `index % 4`
    pub kinds: [MeasurementKind; 4],
}

impl CategoryBlock {
    pub fn contains(&self, fid: u32) -> bool {
        (self.start..=self.end).contains(&fid)
    }

    pub fn len(&self) -> u32 {
        self.end - self.start + 1
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// Category blocks in index order; together they cover 0..=589
pub const CATEGORY_BLOCKS: [CategoryBlock; 6] = [
    CategoryBlock {
        category: FeatureCategory::CvdProcess,
        start: 0,
        end: 99,
        kinds: [
            kind("temperature", "°C", 200.0, 800.0),
            kind("chamber_pressure", "mTorr", 0.1, 100.0),
            kind("gas_flow_rate", "sccm", 0.0, 500.0),
            kind("RF_power", "W", 0.0, 3000.0),
        ],
    },
    CategoryBlock {
        category: FeatureCategory::EtchProcess,
        start: 100,
        end: 199,
        kinds: [
            kind("chamber_pressure", "mTorr", 1.0, 200.0),
            kind("RF_power", "W", 100.0, 2000.0),
            kind("etch_time", "seconds", 10.0, 300.0),
            kind("gas_ratio", "ratio", 0.1, 10.0),
        ],
    },
    CategoryBlock {
        category: FeatureCategory::PhotoProcess,
        start: 200,
        end: 299,
        kinds: [
            kind("exposure_dose", "mJ/cm²", 10.0, 100.0),
            kind("focus_offset", "nm", -100.0, 100.0),
            kind("overlay_error", "nm", 0.0, 50.0),
            kind("resist_thickness", "Å", 1000.0, 10000.0),
        ],
    },
    CategoryBlock {
        category: FeatureCategory::TestElectrical,
        start: 300,
        end: 399,
        kinds: [
            kind("voltage", "V", 0.0, 5.0),
            kind("current", "mA", 0.0, 1000.0),
            kind("resistance", "Ω", 0.0, 1000000.0),
            kind("capacitance", "pF", 0.0, 100.0),
        ],
    },
    CategoryBlock {
        category: FeatureCategory::TestPhysical,
        start: 400,
        end: 489,
        kinds: [
            kind("film_thickness", "nm", 0.0, 1000.0),
            kind("critical_dimension", "nm", 0.0, 500.0),
            kind("surface_roughness", "Å", 0.0, 100.0),
            kind("uniformity", "%", 0.0, 100.0),
        ],
    },
    CategoryBlock {
        category: FeatureCategory::Environmental,
        start: 490,
        end: 589,
        kinds: [
            kind("humidity", "%RH", 0.0, 100.0),
            kind("ambient_temperature", "°C", 18.0, 25.0),
            kind("particle_count", "counts/m³", 0.0, 1000.0),
            kind("vibration", "Hz", 0.0, 100.0),
        ],
    },
];

/// Category block owning a feature index
pub fn block_for(fid: u32) -> Option<&'static CategoryBlock> {
    CATEGORY_BLOCKS.iter().find(|b| b.contains(fid))
}

pub fn category_for(fid: u32) -> Option<FeatureCategory> {
    block_for(fid).map(|b| b.category)
}

/// Sensor location label used in descriptions
pub fn zone_label(fid: u32) -> String {
    match fid {
        0..=9 => "Zone_A".to_string(),
        10..=19 => "Zone_B".to_string(),
        _ => format!("Sensor_{}", fid % 10),
    }
}

/// Every 20th feature is critical
pub fn is_critical(fid: u32) -> bool {
    fid % 20 == 0
}

/// Describe a single feature; `None` when the index is outside 0..590
pub fn definition(fid: u32) -> Option<FeatureDefinition> {
    let block = block_for(fid)?;
    let cycle = (fid % block.kinds.len() as u32) as usize;
    let kind = block.kinds[cycle];
    let category = block.category;
    let stage = category.stage();

    Some(FeatureDefinition {
        feature_id: fid + 1,
        code: format!("F{}", fid),
        name: format!("{}_{}_{}", category, kind.measurement_type, cycle + 1),
        category,
        stage: stage.to_string(),
        measurement_type: kind.measurement_type.to_string(),
        unit: kind.unit.to_string(),
        range_min: kind.range_min,
        range_max: kind.range_max,
        description: format!(
            "{} {} measurement from {}",
            stage,
            kind.measurement_type,
            zone_label(fid)
        ),
        is_critical: is_critical(fid),
    })
}

/// All 590 feature definitions in id order
pub fn definitions() -> Vec<FeatureDefinition> {
    CATEGORY_BLOCKS
        .iter()
        .flat_map(|b| b.start..=b.end)
        .filter_map(definition)
        .collect()
}
