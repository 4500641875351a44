//! Shared primitive types used across the entire simulation.

/// A simulation tick. One tick = one in-game month.
pub type Tick = u64;

/// The canonical run identifier.
pub type RunId = String;

/// The three herds the estate feeds and breeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Herd {
    Slaves,
    Oxen,
    Horses,
}

impl Herd {
    pub const ALL: [Herd; 3] = [Herd::Slaves, Herd::Oxen, Herd::Horses];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Slaves => "slaves",
            Self::Oxen => "oxen",
            Self::Horses => "horses",
        }
    }
}

/// Goods traded on the world market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Commodity {
    Wheat = 0,
    Slaves = 1,
    Oxen = 2,
    Horses = 3,
    Manure = 4,
    Land = 5,
}

impl Commodity {
    pub const ALL: [Commodity; 6] = [
        Commodity::Wheat,
        Commodity::Slaves,
        Commodity::Oxen,
        Commodity::Horses,
        Commodity::Manure,
        Commodity::Land,
    ];

    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| *c as u8 == code)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Wheat => "wheat",
            Self::Slaves => "slaves",
            Self::Oxen => "oxen",
            Self::Horses => "horses",
            Self::Manure => "manure",
            Self::Land => "land",
        }
    }
}
