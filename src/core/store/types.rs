//! Store query result types

use crate::entities::Classification;

/// Row counts and averages used to verify a completed load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadSummary {
    pub feature_count: usize,
    pub critical_features: usize,
    pub feature_categories: usize,
    pub lot_count: usize,
    pub measurement_count: usize,
    pub quality_count: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub out_of_spec_count: usize,
    pub avg_risk_fail: Option<f64>,
    pub avg_risk_pass: Option<f64>,
}

impl LoadSummary {
    /// Percentage of lots classified as failed
    pub fn fail_rate(&self) -> f64 {
        percent(self.fail_count, self.lot_count)
    }
}

/// Reference rows seeded by `seed_reference_data`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReferenceCounts {
    pub shifts: usize,
    pub operators: usize,
    pub equipment: usize,
    pub product_types: usize,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Lot outcomes grouped by shift
#[derive(Debug, Clone, PartialEq)]
pub struct ShiftPerformance {
    pub shift_code: String,
    pub shift_name: String,
    pub total_lots: usize,
    pub pass_count: usize,
    pub fail_count: usize,
    pub avg_quality_score: Option<f64>,
    pub operator_count: usize,
    pub equipment_used: usize,
}

impl ShiftPerformance {
    pub fn fail_rate(&self) -> f64 {
        percent(self.fail_count, self.total_lots)
    }
}

/// Lot outcomes grouped by equipment
#[derive(Debug, Clone, PartialEq)]
pub struct EquipmentHealth {
    pub equipment_code: String,
    pub equipment_name: String,
    pub equipment_type: String,
    pub status: String,
    pub total_lots: usize,
    pub failed_lots: usize,
    pub avg_quality_score: Option<f64>,
    /// Distinct production days with at least one lot
    pub days_operated: usize,
}

impl EquipmentHealth {
    pub fn fail_rate(&self) -> f64 {
        percent(self.failed_lots, self.total_lots)
    }

    /// Average lots processed per failed lot; `None` before the first failure
    pub fn lots_between_failures(&self) -> Option<f64> {
        if self.failed_lots == 0 {
            None
        } else {
            Some(self.total_lots as f64 / self.failed_lots as f64)
        }
    }

    /// 100 minus the fail rate; `None` for idle equipment
    pub fn health_score(&self) -> Option<f64> {
        if self.total_lots == 0 {
            None
        } else {
            Some(100.0 - self.fail_rate())
        }
    }
}

/// Failed lots of one defect type
#[derive(Debug, Clone, PartialEq)]
pub struct DefectBreakdown {
    pub defect_type: String,
    pub occurrences: usize,
    /// Failed lots across every defect type
    pub total_failures: usize,
    pub avg_quality_score: Option<f64>,
    /// Sorted, distinct product families of the affected lots
    pub product_families: Vec<String>,
    /// Sorted, distinct equipment types of the affected lots
    pub equipment_types: Vec<String>,
}

impl DefectBreakdown {
    pub fn pct_of_failures(&self) -> f64 {
        percent(self.occurrences, self.total_failures)
    }
}

/// A lot whose predicted risk reached the report threshold
#[derive(Debug, Clone, PartialEq)]
pub struct HighRiskLot {
    pub lot_number: String,
    pub product_name: String,
    pub equipment_code: String,
    pub predicted_risk: f64,
    pub risk_score: Option<f64>,
    pub test_datetime: Option<String>,
    pub classification: Classification,
}
