//! Reads and writes against the production tables

use rusqlite::params;

use super::{LoadSummary, ProductionStore, ReferenceCounts, StoreError, DATETIME_FORMAT};
use crate::entities::reference::{EQUIPMENT, OPERATORS, PRODUCT_TYPES};
use crate::entities::{FeatureDefinition, FeatureRange, MeasurementRow, NewLot, NewQualityResult, Shift};

impl ProductionStore {
    /// Insert shifts, operators, equipment and product types.
    /// Existing rows with the same id are left untouched.
    pub fn seed_reference_data(&self) -> Result<ReferenceCounts, StoreError> {
        let mut counts = ReferenceCounts::default();

        for shift in Shift::ALL {
            let (start, end) = shift.hours();
            counts.shifts += self.conn.execute(
                r#"INSERT OR IGNORE INTO shift (shift_id, shift_code, shift_name, start_time, end_time, description)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
                params![
                    shift.id(),
                    shift.code(),
                    shift.name(),
                    format!("{:02}:00:00", start),
                    format!("{:02}:00:00", end % 24),
                    format!("{:02}:00-{:02}:00", start, end),
                ],
            )?;
        }

        for op in &OPERATORS {
            counts.operators += self.conn.execute(
                r#"INSERT OR IGNORE INTO operator (operator_id, operator_code, operator_name, department, shift_id)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![op.id, op.code, op.name, op.department, op.shift.id()],
            )?;
        }

        for eq in &EQUIPMENT {
            counts.equipment += self.conn.execute(
                r#"INSERT OR IGNORE INTO equipment (equipment_id, equipment_code, equipment_name, equipment_type, location)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![eq.id, eq.code, eq.name, eq.equipment_type, eq.location],
            )?;
        }

        for pt in &PRODUCT_TYPES {
            counts.product_types += self.conn.execute(
                r#"INSERT OR IGNORE INTO product_type (product_type_id, product_code, product_name, product_family, target_yield)
                   VALUES (?1, ?2, ?3, ?4, ?5)"#,
                params![pt.id, pt.code, pt.name, pt.family, pt.target_yield],
            )?;
        }

        Ok(counts)
    }

    /// Insert feature metadata rows
    pub fn insert_feature_definitions(&self, defs: &[FeatureDefinition]) -> Result<usize, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            r#"INSERT INTO feature_meta
               (feature_id, feature_code, feature_name, feature_category, process_stage, measurement_type,
                unit, normal_range_min, normal_range_max, description, is_critical)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"#,
        )?;

        for def in defs {
            stmt.execute(params![
                def.feature_id,
                def.code,
                def.name,
                def.category.as_str(),
                def.stage,
                def.measurement_type,
                def.unit,
                def.range_min,
                def.range_max,
                def.description,
                def.is_critical,
            ])?;
        }

        Ok(defs.len())
    }

    pub fn feature_count(&self) -> Result<usize, StoreError> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM feature_meta", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Normal ranges of all loaded features, ordered by feature id
    pub fn feature_ranges(&self) -> Result<Vec<FeatureRange>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT feature_id, normal_range_min, normal_range_max FROM feature_meta ORDER BY feature_id",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(FeatureRange {
                feature_id: row.get(0)?,
                min: row.get(1)?,
                max: row.get(2)?,
            })
        })?;

        let mut ranges = Vec::new();
        for row in rows {
            ranges.push(row?);
        }
        Ok(ranges)
    }

    /// Insert a lot and return its generated id
    pub fn insert_lot(&self, lot: &NewLot) -> Result<i64, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            r#"INSERT INTO lot (lot_number, product_type_id, equipment_id, operator_id, shift_id,
                               production_start, production_end, wafer_count, status)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
        )?;
        stmt.execute(params![
            lot.lot_number,
            lot.product_type_id,
            lot.equipment_id,
            lot.operator_id,
            lot.shift_id,
            lot.production_start.format(DATETIME_FORMAT).to_string(),
            lot.production_end.format(DATETIME_FORMAT).to_string(),
            lot.wafer_count,
            lot.status,
        ])?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Insert a batch of measurement rows
    pub fn insert_measurements(&self, rows: &[MeasurementRow]) -> Result<usize, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            r#"INSERT INTO lot_measurement (lot_id, feature_id, measurement_value, is_out_of_spec, measured_at)
               VALUES (?1, ?2, ?3, ?4, ?5)"#,
        )?;
        for row in rows {
            stmt.execute(params![
                row.lot_id,
                row.feature_id,
                row.value,
                row.is_out_of_spec,
                row.measured_at.format(DATETIME_FORMAT).to_string(),
            ])?;
        }
        Ok(rows.len())
    }

    /// Insert the quality result of a lot
    pub fn insert_quality_result(&self, lot_id: i64, result: &NewQualityResult) -> Result<i64, StoreError> {
        let mut stmt = self.conn.prepare_cached(
            r#"INSERT INTO quality_result
               (lot_id, classification, test_timestamp_raw, test_datetime, predicted_risk, risk_score,
                risk_factors, model_version, quality_score, defect_type, defect_code, inspector_id, notes, disposition)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"#,
        )?;
        let defect = result.defect.as_ref();
        stmt.execute(params![
            lot_id,
            result.classification.code(),
            result.raw_timestamp,
            result.test_datetime.format(DATETIME_FORMAT).to_string(),
            result.predicted_risk,
            result.risk_score,
            result.risk_factors_json(),
            result.model_version,
            result.quality_score,
            defect.map(|d| d.defect_type.as_str()),
            defect.map(|d| d.defect_code.as_str()),
            result.inspector_id,
            defect.map(|d| d.note),
            result.disposition.as_str(),
        ])?;
        Ok(self.conn.last_insert_rowid())
    }

    pub(super) fn count(&self, sql: &str) -> Result<usize, StoreError> {
        Ok(self.conn.query_row(sql, [], |row| row.get(0))?)
    }

    /// Verification counts over the loaded data
    pub fn summary(&self) -> Result<LoadSummary, StoreError> {
        let avg_risk = |class: i32| -> Result<Option<f64>, StoreError> {
            Ok(self.conn.query_row(
                "SELECT AVG(predicted_risk) FROM quality_result WHERE classification = ?1",
                params![class],
                |row| row.get(0),
            )?)
        };

        Ok(LoadSummary {
            feature_count: self.feature_count()?,
            critical_features: self.count("SELECT COUNT(*) FROM feature_meta WHERE is_critical")?,
            feature_categories: self
                .count("SELECT COUNT(DISTINCT feature_category) FROM feature_meta")?,
            lot_count: self.count("SELECT COUNT(*) FROM lot")?,
            measurement_count: self.count("SELECT COUNT(*) FROM lot_measurement")?,
            quality_count: self.count("SELECT COUNT(*) FROM quality_result")?,
            pass_count: self.count("SELECT COUNT(*) FROM quality_result WHERE classification = -1")?,
            fail_count: self.count("SELECT COUNT(*) FROM quality_result WHERE classification = 1")?,
            out_of_spec_count: self
                .count("SELECT COUNT(*) FROM lot_measurement WHERE is_out_of_spec")?,
            avg_risk_fail: avg_risk(1)?,
            avg_risk_pass: avg_risk(-1)?,
        })
    }

    /// Measurement rows per lot, for integrity checks
    pub fn measurements_per_lot(&self) -> Result<Vec<(String, usize)>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"SELECT l.lot_number, COUNT(m.measurement_id)
               FROM lot l LEFT JOIN lot_measurement m ON m.lot_id = l.lot_id
               GROUP BY l.lot_id ORDER BY l.lot_id"#,
        )?;
        let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}
