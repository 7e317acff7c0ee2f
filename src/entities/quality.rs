//! Quality results - pass/fail verdict, risk scoring and defect disposition

use std::collections::BTreeMap;

use chrono::NaiveDateTime;

/// Version tag recorded with every synthesized risk prediction
pub const MODEL_VERSION: &str = "v1.0.0";

/// SECOM label classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    Pass,
    Fail,
}

impl Classification {
    /// Raw label value (-1 pass, 1 fail)
    pub fn code(&self) -> i32 {
        match self {
            Classification::Pass => -1,
            Classification::Fail => 1,
        }
    }
}

impl TryFrom<i64> for Classification {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Classification::Pass),
            1 => Ok(Classification::Fail),
            other => Err(format!(
                "Invalid classification: {}. Expected -1 (pass) or 1 (fail)",
                other
            )),
        }
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Classification::Pass => write!(f, "pass"),
            Classification::Fail => write!(f, "fail"),
        }
    }
}

/// Defect family assigned to failed lots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefectType {
    ElectricalFail,
    DimensionalOor,
    SurfaceDefect,
    Contamination,
}

impl DefectType {
    /// Sampling order with cumulative weights summing to 1.0
    pub const WEIGHTED: [(DefectType, f64); 4] = [
        (DefectType::ElectricalFail, 0.40),
        (DefectType::DimensionalOor, 0.30),
        (DefectType::SurfaceDefect, 0.20),
        (DefectType::Contamination, 0.10),
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DefectType::ElectricalFail => "electrical_fail",
            DefectType::DimensionalOor => "dimensional_oor",
            DefectType::SurfaceDefect => "surface_defect",
            DefectType::Contamination => "contamination",
        }
    }

    /// Representative inspector notes for this defect family
    pub fn notes(&self) -> &'static [&'static str] {
        match self {
            DefectType::ElectricalFail => {
                &["Open circuit", "Short circuit", "Leakage current high"]
            }
            DefectType::DimensionalOor => {
                &["CD out of spec", "Thickness variation", "Overlay error"]
            }
            DefectType::SurfaceDefect => {
                &["Scratch detected", "Particle contamination", "Film defect"]
            }
            DefectType::Contamination => {
                &["Chemical residue", "Particle count high", "Foreign material"]
            }
        }
    }

    /// Defect code, e.g. `ELECTRICAL_FAIL-007` for the 7th failed lot
    pub fn code(&self, fail_sequence: usize) -> String {
        format!("{}-{:03}", self.as_str().to_uppercase(), fail_sequence)
    }
}

/// Post-inspection handling decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    Released,
    Rework,
    Scrap,
    Pending,
}

impl Disposition {
    /// Draw pool for failed lots (scrap and rework twice as likely as pending)
    pub const FAIL_POOL: [Disposition; 5] = [
        Disposition::Scrap,
        Disposition::Rework,
        Disposition::Scrap,
        Disposition::Rework,
        Disposition::Pending,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Released => "released",
            Disposition::Rework => "rework",
            Disposition::Scrap => "scrap",
            Disposition::Pending => "pending",
        }
    }
}

/// Defect details recorded for a failed lot
#[derive(Debug, Clone, PartialEq)]
pub struct DefectDetails {
    pub defect_type: DefectType,
    pub defect_code: String,
    pub note: &'static str,
}

/// Risk factor contributions keyed `F{index}_{high|low}`
pub type RiskFactors = BTreeMap<String, f64>;

/// A quality result ready to be inserted for a lot
#[derive(Debug, Clone, PartialEq)]
pub struct NewQualityResult {
    pub classification: Classification,
    /// Timestamp exactly as it appeared in the label file
    pub raw_timestamp: Option<String>,
    /// Effective (shifted or synthetic) test datetime
    pub test_datetime: NaiveDateTime,
    pub predicted_risk: f64,
    pub risk_score: f64,
    pub risk_factors: Option<RiskFactors>,
    pub model_version: &'static str,
    pub quality_score: f64,
    pub defect: Option<DefectDetails>,
    pub inspector_id: u32,
    pub disposition: Disposition,
}

impl NewQualityResult {
    /// Risk factors serialized for the JSON column
    pub fn risk_factors_json(&self) -> Option<String> {
        self.risk_factors
            .as_ref()
            .and_then(|f| serde_json::to_string(f).ok())
    }
}
