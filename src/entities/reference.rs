//! Reference data - shifts, operators, equipment and product types
//!
//! These rows are seeded once by `secom-seed init` so that every foreign key
//! written by the production loader resolves. Ids are fixed; the loader's
//! assignment rules depend on them.


/// Operational shift (three fixed 8-hour windows)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shift {
    Day,
    Swing,
    Night,
}

impl Shift {
    pub const ALL: [Shift; 3] = [Shift::Day, Shift::Swing, Shift::Night];

    /// Database id of the shift
    pub fn id(&self) -> u32 {
        match self {
            Shift::Day => 1,
            Shift::Swing => 2,
            Shift::Night => 3,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Shift::Day => "DAY",
            Shift::Swing => "SWING",
            Shift::Night => "NIGHT",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shift::Day => "Day Shift",
            Shift::Swing => "Swing Shift",
            Shift::Night => "Night Shift",
        }
    }

    /// Half-open hour window `[start, end)`
    pub fn hours(&self) -> (u32, u32) {
        match self {
            Shift::Day => (8, 16),
            Shift::Swing => (16, 24),
            Shift::Night => (0, 8),
        }
    }
}

/// Operator seed row
#[derive(Debug, Clone, Copy)]
pub struct OperatorSeed {
    pub id: u32,
    pub code: &'static str,
    pub name: &'static str,
    pub department: &'static str,
    pub shift: Shift,
}

/// Equipment seed row
#[derive(Debug, Clone, Copy)]
pub struct EquipmentSeed {
    pub id: u32,
    pub code: &'static str,
    pub name: &'static str,
    pub equipment_type: &'static str,
    pub location: &'static str,
}

/// Product type seed row
#[derive(Debug, Clone, Copy)]
pub struct ProductTypeSeed {
    pub id: u32,
    pub code: &'static str,
    pub name: &'static str,
    pub family: &'static str,
    pub target_yield: f64,
}

/// Operators in id order; five per shift, Quality inspectors at 3, 8 and 13
pub const OPERATORS: [OperatorSeed; 15] = [
    OperatorSeed { id: 1, code: "OPR-001", name: "Kim Min-jun", department: "Production", shift: Shift::Day },
    OperatorSeed { id: 2, code: "OPR-002", name: "Lee Seo-yeon", department: "Production", shift: Shift::Day },
    OperatorSeed { id: 3, code: "OPR-003", name: "Park Ji-ho", department: "Quality", shift: Shift::Day },
    OperatorSeed { id: 4, code: "OPR-004", name: "Choi Ha-eun", department: "Production", shift: Shift::Day },
    OperatorSeed { id: 5, code: "OPR-005", name: "Jung Do-yun", department: "Maintenance", shift: Shift::Day },
    OperatorSeed { id: 6, code: "OPR-006", name: "Kang Seo-jun", department: "Production", shift: Shift::Swing },
    OperatorSeed { id: 7, code: "OPR-007", name: "Cho Ye-jin", department: "Production", shift: Shift::Swing },
    OperatorSeed { id: 8, code: "OPR-008", name: "Yoon Ji-woo", department: "Quality", shift: Shift::Swing },
    OperatorSeed { id: 9, code: "OPR-009", name: "Jang Eun-woo", department: "Production", shift: Shift::Swing },
    OperatorSeed { id: 10, code: "OPR-010", name: "Lim Su-ah", department: "Maintenance", shift: Shift::Swing },
    OperatorSeed { id: 11, code: "OPR-011", name: "Han Si-woo", department: "Production", shift: Shift::Night },
    OperatorSeed { id: 12, code: "OPR-012", name: "Oh Ji-an", department: "Production", shift: Shift::Night },
    OperatorSeed { id: 13, code: "OPR-013", name: "Seo Ha-jun", department: "Quality", shift: Shift::Night },
    OperatorSeed { id: 14, code: "OPR-014", name: "Shin Yu-na", department: "Production", shift: Shift::Night },
    OperatorSeed { id: 15, code: "OPR-015", name: "Kwon Joo-won", department: "Maintenance", shift: Shift::Night },
];

/// Quality-department operators that sign off inspections
pub const INSPECTOR_IDS: [u32; 3] = [3, 8, 13];

pub const EQUIPMENT: [EquipmentSeed; 6] = [
    EquipmentSeed { id: 1, code: "CVD-01", name: "CVD Chamber 1", equipment_type: "CVD", location: "Fab 1 Bay A" },
    EquipmentSeed { id: 2, code: "CVD-02", name: "CVD Chamber 2", equipment_type: "CVD", location: "Fab 1 Bay A" },
    EquipmentSeed { id: 3, code: "ETCH-01", name: "Plasma Etcher 1", equipment_type: "ETCH", location: "Fab 1 Bay B" },
    EquipmentSeed { id: 4, code: "ETCH-02", name: "Plasma Etcher 2", equipment_type: "ETCH", location: "Fab 1 Bay B" },
    EquipmentSeed { id: 5, code: "PHOTO-01", name: "Scanner 1", equipment_type: "PHOTO", location: "Fab 1 Bay C" },
    EquipmentSeed { id: 6, code: "PHOTO-02", name: "Scanner 2", equipment_type: "PHOTO", location: "Fab 1 Bay C" },
];

pub const PRODUCT_TYPES: [ProductTypeSeed; 4] = [
    ProductTypeSeed { id: 1, code: "LOGIC-A100", name: "Logic Controller A100", family: "LOGIC", target_yield: 95.0 },
    ProductTypeSeed { id: 2, code: "LOGIC-B200", name: "Logic Processor B200", family: "LOGIC", target_yield: 93.5 },
    ProductTypeSeed { id: 3, code: "MEMORY-M300", name: "DRAM Module M300", family: "MEMORY", target_yield: 92.0 },
    ProductTypeSeed { id: 4, code: "ANALOG-X400", name: "Analog Sensor X400", family: "ANALOG", target_yield: 96.0 },
];
