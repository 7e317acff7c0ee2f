//! Per-record enrichment: one raw sample in, one lot with its measurements
//! and quality result out.

use chrono::{Duration, Timelike};
use miette::Diagnostic;
use rand::Rng;
use thiserror::Error;

use super::assign::{equipment_for, operator_for, product_type_for, shift_for_hour};
use super::parse::{parse_label_line, parse_measurement_line, synthetic_timestamp, LabelError};
use super::risk::{self, Evaluation};
use crate::entities::lot::lot_number;
use crate::entities::quality::MODEL_VERSION;
use crate::entities::reference::INSPECTOR_IDS;
use crate::entities::{
    Classification, DefectDetails, DefectType, Disposition, FeatureRange, NewLot,
    NewMeasurement, NewQualityResult, LOT_STATUS_COMPLETED,
};

/// Wafer counts a lot can carry
pub const WAFER_COUNTS: [u32; 3] = [23, 24, 25];

/// Bounds (hours) of a lot's production time
pub const PRODUCTION_HOURS: (i64, i64) = (4, 12);

/// Why a single record could not be enriched
#[derive(Debug, Error, Diagnostic)]
pub enum EnrichError {
    #[error("invalid label line")]
    #[diagnostic(code(secom::record::label))]
    Label(#[from] LabelError),

    #[error("record has {found} values but only {expected} feature definitions are loaded")]
    #[diagnostic(
        code(secom::record::feature_count),
        help("run `secom-seed init` so feature metadata covers every measurement column")
    )]
    TooManyValues { found: usize, expected: usize },
}

/// A fully derived record, ready to be written
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedRecord {
    /// Zero-based record index
    pub index: usize,
    pub lot: NewLot,
    pub measurements: Vec<NewMeasurement>,
    pub quality: NewQualityResult,
    pub anomaly_count: usize,
}

fn pick<'a, T, R: Rng>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[rng.random_range(0..items.len())]
}

/// Draw a defect type by cumulative probability, then a note for it
pub fn assign_defect<R: Rng>(rng: &mut R, fail_sequence: usize) -> DefectDetails {
    let draw: f64 = rng.random();
    let mut cumulative = 0.0;

    for (defect_type, probability) in DefectType::WEIGHTED {
        cumulative += probability;
        if draw <= cumulative {
            return DefectDetails {
                defect_type,
                defect_code: defect_type.code(fail_sequence),
                note: *pick(rng, defect_type.notes()),
            };
        }
    }

    let (fallback, _) = DefectType::WEIGHTED[0];
    DefectDetails {
        defect_type: fallback,
        defect_code: fallback.code(fail_sequence),
        note: fallback.notes()[0],
    }
}

/// Turns raw records into lots, measurements and quality results.
///
/// Holds the random source and the running count of failed lots, which
/// numbers defect codes. Records must be fed in index order.
pub struct Enricher<R: Rng> {
    rng: R,
    fail_count: usize,
}

impl<R: Rng> Enricher<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, fail_count: 0 }
    }

    /// Failed lots seen so far
    pub fn fail_count(&self) -> usize {
        self.fail_count
    }

    /// Enrich the record at `index` against the loaded feature ranges
    pub fn enrich(
        &mut self,
        index: usize,
        measurement_line: &str,
        label_line: &str,
        ranges: &[FeatureRange],
    ) -> Result<EnrichedRecord, EnrichError> {
        let values = parse_measurement_line(measurement_line);
        if values.len() > ranges.len() {
            return Err(EnrichError::TooManyValues {
                found: values.len(),
                expected: ranges.len(),
            });
        }
        let label = parse_label_line(label_line)?;

        let produced_at = label
            .test_datetime
            .unwrap_or_else(|| synthetic_timestamp(index));

        let shift = shift_for_hour(produced_at.hour());
        let hours = self
            .rng
            .random_range(PRODUCTION_HOURS.0..=PRODUCTION_HOURS.1);
        let wafer_count = *pick(&mut self.rng, &WAFER_COUNTS);

        let lot = NewLot {
            lot_number: lot_number(&produced_at, index + 1),
            product_type_id: product_type_for(index),
            equipment_id: equipment_for(index),
            operator_id: operator_for(shift, index),
            shift_id: shift.id(),
            production_start: produced_at - Duration::hours(hours),
            production_end: produced_at,
            wafer_count,
            status: LOT_STATUS_COMPLETED,
        };

        let Evaluation {
            measurements,
            anomalies,
        } = risk::evaluate_measurements(&values, ranges);

        let classification = label.classification;
        let quality_score = risk::quality_score(&mut self.rng, classification);
        let predicted_risk = risk::predicted_risk(&mut self.rng, classification, anomalies.len());

        let (defect, disposition) = match classification {
            Classification::Fail => {
                self.fail_count += 1;
                let defect = assign_defect(&mut self.rng, self.fail_count);
                let disposition = *pick(&mut self.rng, &Disposition::FAIL_POOL);
                (Some(defect), disposition)
            }
            Classification::Pass => (None, Disposition::Released),
        };

        let inspector_id = *pick(&mut self.rng, &INSPECTOR_IDS);

        let quality = NewQualityResult {
            classification,
            raw_timestamp: label.raw_timestamp,
            test_datetime: produced_at,
            predicted_risk,
            risk_score: risk::risk_score(predicted_risk),
            risk_factors: risk::risk_factors(&anomalies),
            model_version: MODEL_VERSION,
            quality_score,
            defect,
            inspector_id,
            disposition,
        };

        Ok(EnrichedRecord {
            index,
            lot,
            measurements,
            quality,
            anomaly_count: anomalies.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog_ranges() -> Vec<FeatureRange> {
        catalog::definitions().iter().map(FeatureRange::from).collect()
    }

    fn enricher(seed: u64) -> Enricher<StdRng> {
        Enricher::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_enrich_pass_record() {
        let ranges = catalog_ranges();
        let mut e = enricher(1);
        let rec = e
            .enrich(0, "1000.5 NAN 3.2", "-1 \"19/07/2008 11:55:00\"", &ranges)
            .unwrap();

        let end = NaiveDate::from_ymd_opt(2025, 9, 19)
            .unwrap()
            .and_hms_opt(11, 55, 0)
            .unwrap();
        assert_eq!(rec.lot.lot_number, "LOT-202509-0001");
        assert_eq!(rec.lot.production_end, end);
        let hours = (end - rec.lot.production_start).num_hours();
        assert!((4..=12).contains(&hours));
        assert!(WAFER_COUNTS.contains(&rec.lot.wafer_count));
        assert_eq!(rec.lot.shift_id, 1);
        assert_eq!(rec.lot.operator_id, 1);
        assert_eq!(rec.lot.equipment_id, 1);
        assert_eq!(rec.lot.product_type_id, 1);

        assert_eq!(rec.measurements.len(), 590);
        assert_eq!(rec.measurements[0].value, Some(1000.5));
        assert_eq!(rec.measurements[1].value, None);
        assert_eq!(rec.measurements[2].value, Some(3.2));
        assert!(rec.measurements[3..].iter().all(|m| m.value.is_none()));
        // 1000.5 °C is above the 200–800 deposition range
        assert!(rec.measurements[0].is_out_of_spec);
        assert_eq!(rec.anomaly_count, 1);

        let q = &rec.quality;
        assert_eq!(q.classification, Classification::Pass);
        assert_eq!(q.disposition, Disposition::Released);
        assert!(q.defect.is_none());
        assert!(INSPECTOR_IDS.contains(&q.inspector_id));
        assert!((85.0..=100.0).contains(&q.quality_score));
        assert_eq!(q.risk_factors.as_ref().unwrap()["F0_high"], 1.0);
        assert_eq!(q.model_version, "v1.0.0");
        assert_eq!(e.fail_count(), 0);
    }

    #[test]
    fn test_enrich_fail_record_numbers_defects() {
        let ranges = catalog_ranges();
        let mut e = enricher(2);
        let first = e.enrich(0, "", "1 \"19/07/2008 11:55:00\"", &ranges).unwrap();
        let _ = e.enrich(1, "", "-1 \"19/07/2008 12:55:00\"", &ranges).unwrap();
        let second = e.enrich(2, "", "1 \"19/07/2008 13:55:00\"", &ranges).unwrap();

        let d1 = first.quality.defect.unwrap();
        let d2 = second.quality.defect.unwrap();
        assert!(d1.defect_code.ends_with("-001"));
        assert!(d2.defect_code.ends_with("-002"));
        assert!(d1.defect_type.notes().contains(&d1.note));
        assert_ne!(first.quality.disposition, Disposition::Released);
        assert!((40.0..=75.0).contains(&first.quality.quality_score));
        // No anomalies: risk stays inside the failure band
        assert!((0.6..=0.95).contains(&first.quality.predicted_risk));
        assert_eq!(first.quality.risk_factors, None);
        assert_eq!(e.fail_count(), 2);
    }

    #[test]
    fn test_missing_timestamp_uses_synthetic_timeline() {
        let ranges = catalog_ranges();
        let mut e = enricher(3);
        let rec = e.enrich(5, "", "-1", &ranges).unwrap();

        assert_eq!(rec.lot.production_end, synthetic_timestamp(5));
        // 2025-09-15 14:30 falls in the day shift
        assert_eq!(rec.lot.shift_id, 1);
        assert_eq!(rec.lot.operator_id, 1);
        assert_eq!(rec.lot.lot_number, "LOT-202509-0006");
        assert_eq!(rec.quality.raw_timestamp, None);
    }

    #[test]
    fn test_too_many_values_rejected() {
        let ranges = vec![FeatureRange::new(1, 0.0, 1.0)];
        let mut e = enricher(4);
        let err = e.enrich(0, "0.5 0.5", "-1", &ranges).unwrap_err();
        assert!(matches!(
            err,
            EnrichError::TooManyValues {
                found: 2,
                expected: 1
            }
        ));
    }

    #[test]
    fn test_bad_label_rejected() {
        let ranges = catalog_ranges();
        let mut e = enricher(4);
        let err = e.enrich(0, "1.0", "2", &ranges).unwrap_err();
        assert!(matches!(err, EnrichError::Label(LabelError::InvalidClassification(_))));
    }

    #[test]
    fn test_same_seed_same_records() {
        let ranges = catalog_ranges();
        let lines = [
            ("3030.93 2564 NAN", "-1 \"19/07/2008 11:55:00\""),
            ("2932.61 2559.94 2186.41", "1 \"19/07/2008 12:32:00\""),
            ("NAN NAN 1", "-1"),
        ];

        let run = |seed| {
            let mut e = enricher(seed);
            lines
                .iter()
                .enumerate()
                .map(|(i, (m, l))| e.enrich(i, m, l, &ranges).unwrap())
                .collect::<Vec<_>>()
        };

        assert_eq!(run(42), run(42));
    }

    #[test]
    fn test_assign_defect_distribution() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut electrical = 0;
        let mut contamination = 0;
        for i in 1..=10_000 {
            match assign_defect(&mut rng, i).defect_type {
                DefectType::ElectricalFail => electrical += 1,
                DefectType::Contamination => contamination += 1,
                _ => {}
            }
        }
        assert!((3700..=4300).contains(&electrical), "electrical = {}", electrical);
        assert!((800..=1200).contains(&contamination), "contamination = {}", contamination);
    }
}
