//! Read-only analytics over loaded lots

use rusqlite::types::Type;
use rusqlite::{params, Row};

use super::{DefectBreakdown, EquipmentHealth, HighRiskLot, ProductionStore, ShiftPerformance, StoreError};
use crate::entities::Classification;

/// Predicted risk at or above which a lot counts as high risk
pub const DEFAULT_RISK_THRESHOLD: f64 = 0.7;

/// Most high-risk lots listed by default
pub const DEFAULT_HIGH_RISK_LIMIT: usize = 50;

/// Split a `GROUP_CONCAT` column into sorted values
fn split_distinct(joined: Option<String>) -> Vec<String> {
    let mut values: Vec<String> = joined
        .unwrap_or_default()
        .split(',')
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();
    values.sort();
    values.dedup();
    values
}

fn classification_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Classification> {
    let code: i64 = row.get(idx)?;
    Classification::try_from(code)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Integer, e.into()))
}

impl ProductionStore {
    /// Lot counts, fail rate and staffing per shift, every shift listed
    pub fn shift_performance(&self) -> Result<Vec<ShiftPerformance>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"SELECT s.shift_code, s.shift_name,
                      COUNT(l.lot_id),
                      COALESCE(SUM(q.classification = -1), 0),
                      COALESCE(SUM(q.classification = 1), 0),
                      AVG(q.quality_score),
                      COUNT(DISTINCT l.operator_id),
                      COUNT(DISTINCT l.equipment_id)
               FROM shift s
               LEFT JOIN lot l ON l.shift_id = s.shift_id
               LEFT JOIN quality_result q ON q.lot_id = l.lot_id
               GROUP BY s.shift_id
               ORDER BY s.shift_id"#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(ShiftPerformance {
                shift_code: row.get(0)?,
                shift_name: row.get(1)?,
                total_lots: row.get(2)?,
                pass_count: row.get(3)?,
                fail_count: row.get(4)?,
                avg_quality_score: row.get(5)?,
                operator_count: row.get(6)?,
                equipment_used: row.get(7)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Throughput and failures per piece of equipment, idle equipment included
    pub fn equipment_health(&self) -> Result<Vec<EquipmentHealth>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"SELECT e.equipment_code, e.equipment_name, e.equipment_type, e.status,
                      COUNT(l.lot_id),
                      COALESCE(SUM(q.classification = 1), 0),
                      AVG(q.quality_score),
                      COUNT(DISTINCT date(l.production_start))
               FROM equipment e
               LEFT JOIN lot l ON l.equipment_id = e.equipment_id
               LEFT JOIN quality_result q ON q.lot_id = l.lot_id
               GROUP BY e.equipment_id
               ORDER BY e.equipment_id"#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(EquipmentHealth {
                equipment_code: row.get(0)?,
                equipment_name: row.get(1)?,
                equipment_type: row.get(2)?,
                status: row.get(3)?,
                total_lots: row.get(4)?,
                failed_lots: row.get(5)?,
                avg_quality_score: row.get(6)?,
                days_operated: row.get(7)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Failed lots grouped by defect type, most frequent first
    pub fn defect_breakdown(&self) -> Result<Vec<DefectBreakdown>, StoreError> {
        let total_failures = self.count("SELECT COUNT(*) FROM quality_result WHERE classification = 1")?;

        let mut stmt = self.conn.prepare(
            r#"SELECT q.defect_type,
                      COUNT(*),
                      AVG(q.quality_score),
                      GROUP_CONCAT(DISTINCT pt.product_family),
                      GROUP_CONCAT(DISTINCT e.equipment_type)
               FROM quality_result q
               JOIN lot l ON l.lot_id = q.lot_id
               JOIN product_type pt ON pt.product_type_id = l.product_type_id
               JOIN equipment e ON e.equipment_id = l.equipment_id
               WHERE q.classification = 1 AND q.defect_type IS NOT NULL
               GROUP BY q.defect_type
               ORDER BY COUNT(*) DESC, q.defect_type"#,
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(DefectBreakdown {
                defect_type: row.get(0)?,
                occurrences: row.get(1)?,
                total_failures,
                avg_quality_score: row.get(2)?,
                product_families: split_distinct(row.get(3)?),
                equipment_types: split_distinct(row.get(4)?),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Lots with predicted risk at or above `threshold`, riskiest first
    pub fn high_risk_lots(&self, threshold: f64, limit: usize) -> Result<Vec<HighRiskLot>, StoreError> {
        let mut stmt = self.conn.prepare(
            r#"SELECT l.lot_number, pt.product_name, e.equipment_code,
                      q.predicted_risk, q.risk_score, q.test_datetime, q.classification
               FROM quality_result q
               JOIN lot l ON l.lot_id = q.lot_id
               JOIN product_type pt ON pt.product_type_id = l.product_type_id
               JOIN equipment e ON e.equipment_id = l.equipment_id
               WHERE q.predicted_risk >= ?1
               ORDER BY q.predicted_risk DESC, l.lot_number
               LIMIT ?2"#,
        )?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt.query_map(params![threshold, limit], |row| {
            Ok(HighRiskLot {
                lot_number: row.get(0)?,
                product_name: row.get(1)?,
                equipment_code: row.get(2)?,
                predicted_risk: row.get(3)?,
                risk_score: row.get(4)?,
                test_datetime: row.get(5)?,
                classification: classification_at(row, 6)?,
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::entities::quality::MODEL_VERSION;
    use crate::entities::{
        DefectDetails, DefectType, Disposition, NewLot, NewQualityResult, LOT_STATUS_COMPLETED,
    };
    use chrono::NaiveDate;

    struct LotFixture {
        number: &'static str,
        day: u32,
        shift_id: u32,
        equipment_id: u32,
        operator_id: u32,
        product_type_id: u32,
        defect: Option<DefectType>,
        risk: f64,
        quality: f64,
    }

    fn add_lot(store: &ProductionStore, fixture: &LotFixture) {
        let end = NaiveDate::from_ymd_opt(2025, 9, fixture.day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let lot_id = store
            .insert_lot(&NewLot {
                lot_number: fixture.number.to_string(),
                product_type_id: fixture.product_type_id,
                equipment_id: fixture.equipment_id,
                operator_id: fixture.operator_id,
                shift_id: fixture.shift_id,
                production_start: end - chrono::Duration::hours(6),
                production_end: end,
                wafer_count: 25,
                status: LOT_STATUS_COMPLETED,
            })
            .unwrap();

        let (classification, disposition) = match fixture.defect {
            Some(_) => (Classification::Fail, Disposition::Scrap),
            None => (Classification::Pass, Disposition::Released),
        };
        let result = NewQualityResult {
            classification,
            raw_timestamp: None,
            test_datetime: end,
            predicted_risk: fixture.risk,
            risk_score: fixture.risk * 100.0,
            risk_factors: None,
            model_version: MODEL_VERSION,
            quality_score: fixture.quality,
            defect: fixture.defect.map(|d| DefectDetails {
                defect_type: d,
                defect_code: d.code(1),
                note: d.notes()[0],
            }),
            inspector_id: 3,
            disposition,
        };
        store.insert_quality_result(lot_id, &result).unwrap();
    }

    /// Four lots: Day shift on CVD-01/CVD-02, Night shift on CVD-01 only
    fn loaded_store() -> ProductionStore {
        let store = ProductionStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store.seed_reference_data().unwrap();
        store
            .insert_feature_definitions(&catalog::definitions())
            .unwrap();

        let lots = [
            LotFixture { number: "LOT-202509-0001", day: 19, shift_id: 1, equipment_id: 1, operator_id: 1, product_type_id: 1, defect: None, risk: 0.10, quality: 95.0 },
            LotFixture { number: "LOT-202509-0002", day: 19, shift_id: 1, equipment_id: 2, operator_id: 2, product_type_id: 2, defect: Some(DefectType::ElectricalFail), risk: 0.85, quality: 60.0 },
            LotFixture { number: "LOT-202509-0003", day: 20, shift_id: 3, equipment_id: 1, operator_id: 11, product_type_id: 1, defect: Some(DefectType::ElectricalFail), risk: 0.72, quality: 70.0 },
            LotFixture { number: "LOT-202509-0004", day: 21, shift_id: 3, equipment_id: 1, operator_id: 12, product_type_id: 3, defect: Some(DefectType::Contamination), risk: 0.65, quality: 50.0 },
        ];
        for fixture in &lots {
            add_lot(&store, fixture);
        }
        store
    }

    #[test]
    fn test_shift_performance_lists_every_shift() {
        let store = loaded_store();
        let shifts = store.shift_performance().unwrap();
        assert_eq!(shifts.len(), 3);

        let day = &shifts[0];
        assert_eq!(day.shift_code, "DAY");
        assert_eq!((day.total_lots, day.pass_count, day.fail_count), (2, 1, 1));
        assert_eq!(day.fail_rate(), 50.0);
        assert_eq!(day.avg_quality_score, Some(77.5));
        assert_eq!((day.operator_count, day.equipment_used), (2, 2));

        let swing = &shifts[1];
        assert_eq!(swing.total_lots, 0);
        assert_eq!(swing.avg_quality_score, None);
        assert_eq!(swing.fail_rate(), 0.0);

        let night = &shifts[2];
        assert_eq!((night.total_lots, night.fail_count), (2, 2));
        assert_eq!(night.fail_rate(), 100.0);
        assert_eq!((night.operator_count, night.equipment_used), (2, 1));
    }

    #[test]
    fn test_equipment_health_includes_idle_equipment() {
        let store = loaded_store();
        let health = store.equipment_health().unwrap();
        assert_eq!(health.len(), 6);

        let cvd1 = &health[0];
        assert_eq!(cvd1.equipment_code, "CVD-01");
        assert_eq!((cvd1.total_lots, cvd1.failed_lots, cvd1.days_operated), (3, 2, 3));
        assert_eq!(cvd1.lots_between_failures(), Some(1.5));
        let score = cvd1.health_score().unwrap();
        assert!((score - 33.333).abs() < 0.01);

        let cvd2 = &health[1];
        assert_eq!((cvd2.total_lots, cvd2.failed_lots, cvd2.days_operated), (1, 1, 1));
        assert_eq!(cvd2.health_score(), Some(0.0));

        let idle = &health[5];
        assert_eq!(idle.equipment_code, "PHOTO-02");
        assert_eq!(idle.total_lots, 0);
        assert_eq!(idle.health_score(), None);
        assert_eq!(idle.lots_between_failures(), None);
    }

    #[test]
    fn test_defect_breakdown_shares_of_failures() {
        let store = loaded_store();
        let defects = store.defect_breakdown().unwrap();
        assert_eq!(defects.len(), 2);

        let electrical = &defects[0];
        assert_eq!(electrical.defect_type, "electrical_fail");
        assert_eq!((electrical.occurrences, electrical.total_failures), (2, 3));
        assert!((electrical.pct_of_failures() - 66.667).abs() < 0.01);
        assert_eq!(electrical.avg_quality_score, Some(65.0));
        assert_eq!(electrical.product_families, vec!["LOGIC"]);
        assert_eq!(electrical.equipment_types, vec!["CVD"]);

        let contamination = &defects[1];
        assert_eq!(contamination.defect_type, "contamination");
        assert_eq!(contamination.product_families, vec!["MEMORY"]);
    }

    #[test]
    fn test_high_risk_lots_threshold_and_limit() {
        let store = loaded_store();

        let lots = store.high_risk_lots(DEFAULT_RISK_THRESHOLD, DEFAULT_HIGH_RISK_LIMIT).unwrap();
        let numbers: Vec<&str> = lots.iter().map(|l| l.lot_number.as_str()).collect();
        assert_eq!(numbers, vec!["LOT-202509-0002", "LOT-202509-0003"]);
        assert_eq!(lots[0].product_name, "Logic Processor B200");
        assert_eq!(lots[0].equipment_code, "CVD-02");
        assert_eq!(lots[0].classification, Classification::Fail);
        assert_eq!(lots[0].test_datetime.as_deref(), Some("2025-09-19 10:00:00"));

        assert_eq!(store.high_risk_lots(0.0, 1).unwrap().len(), 1);
        assert_eq!(store.high_risk_lots(0.0, 10).unwrap().len(), 4);
        assert!(store.high_risk_lots(0.9, 10).unwrap().is_empty());
    }

    #[test]
    fn test_reports_on_empty_store() {
        let store = ProductionStore::open_in_memory().unwrap();
        store.init_schema().unwrap();
        store.seed_reference_data().unwrap();

        assert!(store.shift_performance().unwrap().iter().all(|s| s.total_lots == 0));
        assert!(store.defect_breakdown().unwrap().is_empty());
        assert!(store.high_risk_lots(0.0, 10).unwrap().is_empty());
    }
}
