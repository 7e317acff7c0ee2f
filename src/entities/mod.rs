//! Record type definitions
//!
//! secom-seed writes the following records:
//!
//! **Reference data:**
//! - [`FeatureDefinition`] - Descriptive metadata for each of the 590 SECOM sensor columns
//! - [`Shift`] plus the operator, equipment and product-type seed tables
//!
//! **Production data:**
//! - [`NewLot`] - One production lot per SECOM sample
//! - [`NewMeasurement`] - One reading per feature per lot, with an out-of-spec flag
//! - [`NewQualityResult`] - Verdict, synthesized risk score and defect disposition

pub mod feature;
pub mod lot;
pub mod quality;
pub mod reference;

pub use feature::{FeatureCategory, FeatureDefinition, FeatureRange, MeasurementKind};
pub use lot::{MeasurementRow, NewLot, NewMeasurement, LOT_STATUS_COMPLETED};
pub use quality::{
    Classification, DefectDetails, DefectType, Disposition, NewQualityResult, RiskFactors,
};
pub use reference::Shift;
