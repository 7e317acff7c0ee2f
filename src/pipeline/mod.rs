//! Production data loader
//!
//! Reads the line-aligned SECOM measurement and label files and writes one
//! lot, one measurement per feature and one quality result per sample.
//!
//! Work is committed in windows of `commit_every` records. Any error rolls
//! back the open window and aborts the run; windows committed earlier stay.

pub mod assign;
pub mod enrich;
pub mod parse;
pub mod risk;

pub use enrich::{assign_defect, EnrichError, EnrichedRecord, Enricher};
pub use parse::{parse_label_line, parse_measurement_line, LabelRecord};

use std::path::PathBuf;
use std::time::Instant;

use miette::Diagnostic;
use rand::Rng;
use thiserror::Error;

use crate::core::store::{ProductionStore, StoreError};
use crate::core::{Config, DataFiles};
use crate::entities::{FeatureRange, MeasurementRow};

#[derive(Debug, Error, Diagnostic)]
pub enum PipelineError {
    #[error("Failed to read {}", path.display())]
    #[diagnostic(code(secom::load::io), help("set data_dir or SECOM_DATA_DIR to the SECOM data directory"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Mismatch: {features} feature lines vs {labels} label lines")]
    #[diagnostic(
        code(secom::load::mismatch),
        help("secom.data and secom_labels.data must have one line per sample")
    )]
    LengthMismatch { features: usize, labels: usize },

    #[error("No feature metadata loaded")]
    #[diagnostic(code(secom::load::no_features), help("run `secom-seed init` first"))]
    NoFeatureDefinitions,

    #[error("Record {line} could not be loaded")]
    #[diagnostic(code(secom::load::record))]
    Record {
        /// 1-based line number in the input files
        line: usize,
        #[source]
        #[diagnostic_source]
        source: RecordError,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Failure while handling a single record
#[derive(Debug, Error, Diagnostic)]
pub enum RecordError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Enrich(#[from] EnrichError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// Line-aligned raw input
#[derive(Debug, Clone, Default)]
pub struct SourceRecords {
    measurement_lines: Vec<String>,
    label_lines: Vec<String>,
}

impl SourceRecords {
    /// Read both input files; fails before any write if they are not aligned
    pub fn read(files: &DataFiles) -> Result<Self, PipelineError> {
        let read = |path: &PathBuf| {
            std::fs::read_to_string(path).map_err(|source| PipelineError::Io {
                path: path.clone(),
                source,
            })
        };
        let features = read(&files.features)?;
        let labels = read(&files.labels)?;

        Self::from_lines(
            features.lines().map(String::from).collect(),
            labels.lines().map(String::from).collect(),
        )
    }

    pub fn from_lines(
        measurement_lines: Vec<String>,
        label_lines: Vec<String>,
    ) -> Result<Self, PipelineError> {
        if measurement_lines.len() != label_lines.len() {
            return Err(PipelineError::LengthMismatch {
                features: measurement_lines.len(),
                labels: label_lines.len(),
            });
        }
        Ok(Self {
            measurement_lines,
            label_lines,
        })
    }

    pub fn len(&self) -> usize {
        self.measurement_lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.measurement_lines.is_empty()
    }

    fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.measurement_lines
            .iter()
            .map(String::as_str)
            .zip(self.label_lines.iter().map(String::as_str))
    }
}

/// Batching knobs for a load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOptions {
    /// Records per transaction window
    pub commit_every: usize,
    /// Pending measurement rows that trigger a flush
    pub measurement_flush_rows: usize,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            commit_every: 100,
            measurement_flush_rows: 10_000,
        }
    }
}

impl From<&Config> for LoadOptions {
    fn from(config: &Config) -> Self {
        Self {
            commit_every: config.commit_every.max(1),
            measurement_flush_rows: config.measurement_flush_rows.max(1),
        }
    }
}

/// Reported after every committed window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub processed: usize,
    pub total: usize,
    pub measurements: usize,
}

/// Totals of a finished load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub lots: usize,
    pub measurements: usize,
    pub out_of_spec: usize,
    pub failures: usize,
    pub commits: usize,
    pub flushes: usize,
    pub duration_ms: u64,
}

/// Drives the enrichment of every record into the store
pub struct Pipeline<'a, R: Rng> {
    store: &'a ProductionStore,
    enricher: Enricher<R>,
    options: LoadOptions,
}

impl<'a, R: Rng> Pipeline<'a, R> {
    pub fn new(store: &'a ProductionStore, rng: R, options: LoadOptions) -> Self {
        Self {
            store,
            enricher: Enricher::new(rng),
            options: LoadOptions {
                commit_every: options.commit_every.max(1),
                measurement_flush_rows: options.measurement_flush_rows.max(1),
            },
        }
    }

    /// Load every record. `on_progress` is called after each committed window.
    pub fn run<F>(&mut self, source: &SourceRecords, mut on_progress: F) -> Result<LoadStats, PipelineError>
    where
        F: FnMut(&LoadProgress),
    {
        let start = Instant::now();
        let ranges = self.store.feature_ranges()?;
        if ranges.is_empty() {
            return Err(PipelineError::NoFeatureDefinitions);
        }
        tracing::info!(
            records = source.len(),
            features = ranges.len(),
            "starting production load"
        );

        self.store.begin()?;
        match self.process(source, &ranges, &mut on_progress) {
            Ok(mut stats) => {
                stats.duration_ms = start.elapsed().as_millis() as u64;
                tracing::info!(lots = stats.lots, measurements = stats.measurements, "production load complete");
                Ok(stats)
            }
            Err(e) => {
                if let Err(rollback_err) = self.store.rollback() {
                    tracing::error!(error = %rollback_err, "rollback failed");
                }
                tracing::error!(error = %e, "production load aborted, open window rolled back");
                Err(e)
            }
        }
    }

    fn process<F>(
        &mut self,
        source: &SourceRecords,
        ranges: &[FeatureRange],
        on_progress: &mut F,
    ) -> Result<LoadStats, PipelineError>
    where
        F: FnMut(&LoadProgress),
    {
        let mut stats = LoadStats::default();
        let mut batch: Vec<MeasurementRow> = Vec::new();

        for (index, (measurement_line, label_line)) in source.iter().enumerate() {
            self.process_record(index, measurement_line, label_line, ranges, &mut batch, &mut stats)
                .map_err(|err| PipelineError::Record {
                    line: index + 1,
                    source: err,
                })?;

            if (index + 1) % self.options.commit_every == 0 {
                self.flush(&mut batch, &mut stats)?;
                self.store.commit()?;
                stats.commits += 1;
                tracing::debug!(processed = index + 1, "window committed");
                on_progress(&LoadProgress {
                    processed: index + 1,
                    total: source.len(),
                    measurements: stats.measurements,
                });
                self.store.begin()?;
            }
        }

        self.flush(&mut batch, &mut stats)?;
        self.store.commit()?;
        stats.commits += 1;
        stats.failures = self.enricher.fail_count();

        Ok(stats)
    }

    fn process_record(
        &mut self,
        index: usize,
        measurement_line: &str,
        label_line: &str,
        ranges: &[FeatureRange],
        batch: &mut Vec<MeasurementRow>,
        stats: &mut LoadStats,
    ) -> Result<(), RecordError> {
        let record = self
            .enricher
            .enrich(index, measurement_line, label_line, ranges)?;

        let lot_id = self.store.insert_lot(&record.lot)?;
        let measured_at = record.lot.production_end;
        batch.extend(record.measurements.iter().map(|m| MeasurementRow {
            lot_id,
            feature_id: m.feature_id,
            value: m.value,
            is_out_of_spec: m.is_out_of_spec,
            measured_at,
        }));

        if batch.len() >= self.options.measurement_flush_rows {
            self.flush(batch, stats)?;
        }

        self.store.insert_quality_result(lot_id, &record.quality)?;

        stats.lots += 1;
        stats.measurements += record.measurements.len();
        stats.out_of_spec += record.anomaly_count;
        Ok(())
    }

    fn flush(&self, batch: &mut Vec<MeasurementRow>, stats: &mut LoadStats) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }
        self.store.insert_measurements(batch)?;
        tracing::debug!(rows = batch.len(), "measurement batch flushed");
        stats.flushes += 1;
        batch.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn initialized_store() -> ProductionStore {
        let store = ProductionStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store.seed_reference_data().unwrap();
        store
            .insert_feature_definitions(&catalog::definitions())
            .unwrap();
        store
    }

    fn sample_source(n: usize) -> SourceRecords {
        let measurements = (0..n)
            .map(|i| format!("{} 50 NAN 1000000", 300 + i))
            .collect();
        let labels = (0..n)
            .map(|i| {
                if i % 4 == 3 {
                    format!("1 \"{:02}/07/2008 {:02}:15:00\"", 1 + i % 28, i % 24)
                } else {
                    format!("-1 \"{:02}/08/2008 {:02}:15:00\"", 1 + i % 28, i % 24)
                }
            })
            .collect();
        SourceRecords::from_lines(measurements, labels).unwrap()
    }

    #[test]
    fn test_length_mismatch_fails_fast() {
        let err = SourceRecords::from_lines(vec!["1".into(), "2".into()], vec!["-1".into()])
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::LengthMismatch {
                features: 2,
                labels: 1
            }
        ));
        assert_eq!(err.to_string(), "Mismatch: 2 feature lines vs 1 label lines");
    }

    #[test]
    fn test_read_missing_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = SourceRecords::read(&DataFiles::in_dir(tmp.path())).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
    }

    #[test]
    fn test_every_lot_gets_590_measurements_and_one_result() {
        let store = initialized_store();
        let options = LoadOptions {
            commit_every: 4,
            measurement_flush_rows: 1000,
        };
        let mut progress = Vec::new();
        let stats = Pipeline::new(&store, StdRng::seed_from_u64(1), options)
            .run(&sample_source(10), |p| progress.push(*p))
            .unwrap();

        assert_eq!(stats.lots, 10);
        assert_eq!(stats.measurements, 5900);
        assert_eq!(stats.failures, 2);
        // Windows after records 4 and 8, then the final commit
        assert_eq!(stats.commits, 3);
        assert_eq!(progress.iter().map(|p| p.processed).collect::<Vec<_>>(), vec![4, 8]);
        assert_eq!(progress[1].measurements, 8 * 590);

        let summary = store.summary().unwrap();
        assert_eq!(summary.lot_count, 10);
        assert_eq!(summary.quality_count, 10);
        assert_eq!(summary.measurement_count, 5900);
        assert_eq!(summary.fail_count, 2);
        assert!(store
            .measurements_per_lot()
            .unwrap()
            .iter()
            .all(|(_, n)| *n == 590));
    }

    #[test]
    fn test_out_of_spec_rows_are_flagged() {
        let store = initialized_store();
        let stats = Pipeline::new(&store, StdRng::seed_from_u64(2), LoadOptions::default())
            .run(&sample_source(3), |_| {})
            .unwrap();

        // Column 0 (200–800 °C) is in range; column 3 (RF power, 0–3000 W) is not
        assert_eq!(stats.out_of_spec, 3);
        assert_eq!(store.summary().unwrap().out_of_spec_count, 3);
    }

    #[test]
    fn test_failure_rolls_back_open_window_only() {
        let store = initialized_store();
        let mut source = sample_source(6);
        source.label_lines[4] = "7 \"01/08/2008 10:00:00\"".to_string();

        let options = LoadOptions {
            commit_every: 3,
            measurement_flush_rows: 1,
        };
        let err = Pipeline::new(&store, StdRng::seed_from_u64(3), options)
            .run(&source, |_| {})
            .unwrap_err();

        assert!(matches!(err, PipelineError::Record { line: 5, .. }));
        assert!(!store.in_transaction());

        // First window (records 1-3) stays committed; record 4 is rolled back
        let summary = store.summary().unwrap();
        assert_eq!(summary.lot_count, 3);
        assert_eq!(summary.measurement_count, 3 * 590);
        assert_eq!(summary.quality_count, 3);
    }

    #[test]
    fn test_no_feature_definitions() {
        let store = ProductionStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        let err = Pipeline::new(&store, StdRng::seed_from_u64(4), LoadOptions::default())
            .run(&sample_source(1), |_| {})
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoFeatureDefinitions));
    }

    #[test]
    fn test_flush_threshold_batches_rows() {
        let store = initialized_store();
        let options = LoadOptions {
            commit_every: 100,
            measurement_flush_rows: 1180,
        };
        let stats = Pipeline::new(&store, StdRng::seed_from_u64(5), options)
            .run(&sample_source(5), |_| {})
            .unwrap();

        // Flush after lots 2 and 4, then the final flush for lot 5
        assert_eq!(stats.flushes, 3);
        assert_eq!(store.summary().unwrap().measurement_count, 5 * 590);
    }

    #[test]
    fn test_seeded_runs_write_identical_data() {
        let dump = |seed| {
            let store = initialized_store();
            Pipeline::new(&store, StdRng::seed_from_u64(seed), LoadOptions::default())
                .run(&sample_source(8), |_| {})
                .unwrap();
            store.summary().unwrap()
        };
        assert_eq!(dump(99), dump(99));
    }
}
