//! Database schema initialization

use rusqlite::params;

use super::{ProductionStore, StoreError};

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

impl ProductionStore {
    /// Create every table that does not exist yet
    pub fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Operational shifts
            CREATE TABLE IF NOT EXISTS shift (
                shift_id INTEGER PRIMARY KEY,
                shift_code TEXT NOT NULL UNIQUE,
                shift_name TEXT NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                description TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            -- Operators and inspectors
            CREATE TABLE IF NOT EXISTS operator (
                operator_id INTEGER PRIMARY KEY,
                operator_code TEXT NOT NULL UNIQUE,
                operator_name TEXT NOT NULL,
                department TEXT,
                shift_id INTEGER REFERENCES shift(shift_id),
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            -- Process equipment
            CREATE TABLE IF NOT EXISTS equipment (
                equipment_id INTEGER PRIMARY KEY,
                equipment_code TEXT NOT NULL UNIQUE,
                equipment_name TEXT NOT NULL,
                equipment_type TEXT NOT NULL,
                location TEXT,
                status TEXT NOT NULL DEFAULT 'active',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            -- Product types
            CREATE TABLE IF NOT EXISTS product_type (
                product_type_id INTEGER PRIMARY KEY,
                product_code TEXT NOT NULL UNIQUE,
                product_name TEXT NOT NULL,
                product_family TEXT NOT NULL,
                target_yield REAL NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );

            -- Feature metadata (one row per SECOM column)
            CREATE TABLE IF NOT EXISTS feature_meta (
                feature_id INTEGER PRIMARY KEY,
                feature_code TEXT NOT NULL UNIQUE,
                feature_name TEXT NOT NULL,
                feature_category TEXT NOT NULL,
                process_stage TEXT,
                measurement_type TEXT,
                unit TEXT,
                normal_range_min REAL,
                normal_range_max REAL,
                description TEXT,
                is_critical INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_feature_meta_category ON feature_meta(feature_category);

            -- Production lots
            CREATE TABLE IF NOT EXISTS lot (
                lot_id INTEGER PRIMARY KEY AUTOINCREMENT,
                lot_number TEXT NOT NULL UNIQUE,
                product_type_id INTEGER NOT NULL REFERENCES product_type(product_type_id),
                equipment_id INTEGER NOT NULL REFERENCES equipment(equipment_id),
                operator_id INTEGER NOT NULL REFERENCES operator(operator_id),
                shift_id INTEGER NOT NULL REFERENCES shift(shift_id),
                production_start TEXT NOT NULL,
                production_end TEXT,
                wafer_count INTEGER,
                status TEXT NOT NULL DEFAULT 'in_progress',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_lot_equipment ON lot(equipment_id);
            CREATE INDEX IF NOT EXISTS idx_lot_shift ON lot(shift_id);

            -- Per-feature measurements
            CREATE TABLE IF NOT EXISTS lot_measurement (
                measurement_id INTEGER PRIMARY KEY AUTOINCREMENT,
                lot_id INTEGER NOT NULL REFERENCES lot(lot_id) ON DELETE CASCADE,
                feature_id INTEGER NOT NULL REFERENCES feature_meta(feature_id),
                measurement_value REAL,
                is_out_of_spec INTEGER NOT NULL DEFAULT 0,
                measured_at TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_lot_measurement_lot ON lot_measurement(lot_id);
            CREATE INDEX IF NOT EXISTS idx_lot_measurement_feature ON lot_measurement(feature_id);

            -- Quality results (1:1 with lot)
            CREATE TABLE IF NOT EXISTS quality_result (
                result_id INTEGER PRIMARY KEY AUTOINCREMENT,
                lot_id INTEGER NOT NULL UNIQUE REFERENCES lot(lot_id) ON DELETE CASCADE,
                classification INTEGER NOT NULL CHECK (classification IN (-1, 1)),
                test_timestamp_raw TEXT,
                test_datetime TEXT,
                predicted_risk REAL,
                risk_score REAL,
                risk_factors TEXT,
                model_version TEXT,
                quality_score REAL,
                defect_type TEXT,
                defect_code TEXT,
                inspector_id INTEGER REFERENCES operator(operator_id),
                notes TEXT,
                disposition TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            );
            CREATE INDEX IF NOT EXISTS idx_quality_result_class ON quality_result(classification);
            "#,
        )?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }

    /// Drop every table (data included)
    pub fn reset(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            DROP TABLE IF EXISTS quality_result;
            DROP TABLE IF EXISTS lot_measurement;
            DROP TABLE IF EXISTS lot;
            DROP TABLE IF EXISTS feature_meta;
            DROP TABLE IF EXISTS product_type;
            DROP TABLE IF EXISTS equipment;
            DROP TABLE IF EXISTS operator;
            DROP TABLE IF EXISTS shift;
            DROP TABLE IF EXISTS schema_version;
            "#,
        )?;
        Ok(())
    }

    /// Whether feature metadata has been loaded
    pub fn is_initialized(&self) -> Result<bool, StoreError> {
        let exists: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'feature_meta'",
            [],
            |row| row.get(0),
        )?;
        if exists == 0 {
            return Ok(false);
        }
        Ok(self.feature_count()? > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let store = ProductionStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store.init_schema().unwrap();
        assert!(!store.is_initialized().unwrap());
    }

    #[test]
    fn test_reset_drops_tables() {
        let store = ProductionStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store.seed_reference_data().unwrap();
        store
            .insert_feature_definitions(&crate::catalog::definitions())
            .unwrap();
        assert!(store.is_initialized().unwrap());

        store.reset().unwrap();
        assert!(!store.is_initialized().unwrap());
    }
}
