use serde::{Deserialize, Serialize};

/// The measurement units used by the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    Celsius,
    Litre,
    Metre,
    Gram,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Celsius => "°C",
            Unit::Litre => "L",
            Unit::Metre => "m",
            Unit::Gram => "g",
        }
    }
}

/// An amount of something, tagged with its unit.
///
/// The unit is fixed at construction; only the value mutates, and only
/// through the owner of the quantity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quantity {
    pub value: f32,
    pub unit: Unit,
}

impl Quantity {
    pub fn new(value: f32, unit: Unit) -> Self {
        Quantity { value, unit }
    }

    pub fn litres(value: f32) -> Self {
        Quantity::new(value, Unit::Litre)
    }

    pub fn celsius(value: f32) -> Self {
        Quantity::new(value, Unit::Celsius)
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2} {}", self.value, self.unit.symbol())
    }
}

/// Each tile occupies a 1x1 world-unit footprint, so 1000 L of standing
/// water is exactly 1 vertical unit of water column.
pub fn litres_to_cubic_metres(litres: f32) -> f32 {
    litres / 1000.0
}

pub fn cubic_metres_to_litres(cubic_metres: f32) -> f32 {
    cubic_metres * 1000.0
}
