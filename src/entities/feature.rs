//! Feature definitions - descriptive metadata for the 590 SECOM sensor columns

/// Feature category (one contiguous block of feature indexes each)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureCategory {
    CvdProcess,
    EtchProcess,
    PhotoProcess,
    TestElectrical,
    TestPhysical,
    Environmental,
}

impl FeatureCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureCategory::CvdProcess => "CVD_Process",
            FeatureCategory::EtchProcess => "Etch_Process",
            FeatureCategory::PhotoProcess => "Photo_Process",
            FeatureCategory::TestElectrical => "Test_Electrical",
            FeatureCategory::TestPhysical => "Test_Physical",
            FeatureCategory::Environmental => "Environmental",
        }
    }

    /// Process stage the category's sensors belong to
    pub fn stage(&self) -> &'static str {
        match self {
            FeatureCategory::CvdProcess => "Deposition",
            FeatureCategory::EtchProcess => "Etching",
            FeatureCategory::PhotoProcess => "Photolithography",
            FeatureCategory::TestElectrical => "Electrical Testing",
            FeatureCategory::TestPhysical => "Physical Testing",
            FeatureCategory::Environmental => "Environmental Monitoring",
        }
    }
}

impl std::fmt::Display for FeatureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One (measurement type, unit, normal range) entry of a category's cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementKind {
    pub measurement_type: &'static str,
    pub unit: &'static str,
    pub range_min: f64,
    pub range_max: f64,
}

/// A fully described feature, as stored in `feature_meta`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDefinition {
    /// 1-based id (feature index + 1)
    pub feature_id: u32,

    /// Column code in the raw data, `F{index}`
    pub code: String,

    pub name: String,

    pub category: FeatureCategory,

    pub stage: String,

    pub measurement_type: String,

    pub unit: String,

    /// Lower bound of the normal range
    pub range_min: f64,

    /// Upper bound of the normal range
    pub range_max: f64,

    pub description: String,

    /// Critical features get tighter review
    pub is_critical: bool,
}

impl FeatureDefinition {
    /// Zero-based column index in the raw measurement matrix
    pub fn index(&self) -> u32 {
        self.feature_id - 1
    }
}

/// Normal range of a loaded feature definition, used for out-of-spec checks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRange {
    pub feature_id: u32,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FeatureRange {
    pub fn new(feature_id: u32, min: f64, max: f64) -> Self {
        Self {
            feature_id,
            min: Some(min),
            max: Some(max),
        }
    }

    /// Midpoint of the range, when both bounds are known
    pub fn midpoint(&self) -> Option<f64> {
        match (self.min, self.max) {
            (Some(min), Some(max)) => Some((min + max) / 2.0),
            _ => None,
        }
    }

    /// Whether `value` lies within the bounds (inclusive). An open bound
    /// accepts everything on its side.
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

impl From<&FeatureDefinition> for FeatureRange {
    fn from(def: &FeatureDefinition) -> Self {
        FeatureRange::new(def.feature_id, def.range_min, def.range_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_midpoint() {
        assert_eq!(FeatureRange::new(1, 0.0, 100.0).midpoint(), Some(50.0));
        let open = FeatureRange {
            feature_id: 1,
            min: None,
            max: Some(10.0),
        };
        assert_eq!(open.midpoint(), None);
    }

    #[test]
    fn test_range_contains() {
        let range = FeatureRange::new(1, 0.0, 100.0);
        assert!(range.contains(0.0));
        assert!(range.contains(100.0));
        assert!(!range.contains(100.5));
        assert!(!range.contains(-1.0));
        let open = FeatureRange {
            feature_id: 1,
            min: None,
            max: Some(10.0),
        };
        assert!(open.contains(-1e9));
        assert!(!open.contains(11.0));
    }
}
