//! Scheduling and resource assignment rules
//!
//! All rules are pure functions of the record index (and the effective hour
//! for shifts), so a given SECOM row always lands on the same shift,
//! operator, equipment and product type.

use crate::entities::Shift;

/// Operators per shift roster
pub const OPERATORS_PER_SHIFT: u32 = 5;

/// Shift owning an hour of the day (Day 08–16, Swing 16–24, Night 00–08)
pub fn shift_for_hour(hour: u32) -> Shift {
    match hour {
        8..=15 => Shift::Day,
        16..=23 => Shift::Swing,
        _ => Shift::Night,
    }
}

/// Round-robin operator within the shift's roster
pub fn operator_for(shift: Shift, index: usize) -> u32 {
    let base = (shift.id() - 1) * OPERATORS_PER_SHIFT + 1;
    base + (index % OPERATORS_PER_SHIFT as usize) as u32
}

/// Equipment over an 8-slot cycle; the etchers take two slots each
pub fn equipment_for(index: usize) -> u32 {
    match index % 8 {
        0 => 1,     // CVD-01
        1 => 2,     // CVD-02
        2 | 3 => 3, // ETCH-01
        4 | 5 => 4, // ETCH-02
        6 => 5,     // PHOTO-01
        _ => 6,     // PHOTO-02
    }
}

/// Product type over a 100-slot cycle split 40/30/20/10
pub fn product_type_for(index: usize) -> u32 {
    match index % 100 {
        0..=39 => 1,  // LOGIC-A100
        40..=69 => 2, // LOGIC-B200
        70..=89 => 3, // MEMORY-M300
        _ => 4,       // ANALOG-X400
    }
}
