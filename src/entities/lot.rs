//! Lot records - one production lot per SECOM sample

use chrono::NaiveDateTime;

/// Status of every loaded lot; the source data only holds finished lots
pub const LOT_STATUS_COMPLETED: &str = "completed";

/// A lot ready to be inserted (the store assigns `lot_id`)
#[derive(Debug, Clone, PartialEq)]
pub struct NewLot {
    /// `LOT-{YYYYMM}-{seq:04}`
    pub lot_number: String,
    pub product_type_id: u32,
    pub equipment_id: u32,
    pub operator_id: u32,
    pub shift_id: u32,
    pub production_start: NaiveDateTime,
    pub production_end: NaiveDateTime,
    /// Always one of 23, 24 or 25
    pub wafer_count: u32,
    pub status: &'static str,
}

/// Build a lot number from the production timestamp and 1-based sequence
pub fn lot_number(production_end: &NaiveDateTime, sequence: usize) -> String {
    format!("LOT-{}-{:04}", production_end.format("%Y%m"), sequence)
}

/// One measurement row of a lot, before the owning lot id is known
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewMeasurement {
    pub feature_id: u32,
    pub value: Option<f64>,
    pub is_out_of_spec: bool,
}

/// A measurement row bound to its lot, as written to `lot_measurement`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasurementRow {
    pub lot_id: i64,
    pub feature_id: u32,
    pub value: Option<f64>,
    pub is_out_of_spec: bool,
    pub measured_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_lot_number_format() {
        let end = NaiveDate::from_ymd_opt(2025, 9, 19)
            .unwrap()
            .and_hms_opt(11, 55, 0)
            .unwrap();
        assert_eq!(lot_number(&end, 1), "LOT-202509-0001");
        assert_eq!(lot_number(&end, 1567), "LOT-202509-1567");
    }
}
