use serde::{Deserialize, Serialize};

use crate::units::Quantity;

const START_TEMPERATURE: f32 = 22.0;
const START_WATER_VAPOUR_LITRES: f32 = 0.5;

/// One column of air above a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub temperature: Quantity,
    pub water_vapour: Quantity,
}

impl Cell {
    pub fn new() -> Self {
        Cell {
            temperature: Quantity::celsius(START_TEMPERATURE),
            water_vapour: Quantity::litres(START_WATER_VAPOUR_LITRES),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::new()
    }
}

/// The air layer over the tilemap, one cell per tile, flattened row-major
/// like the tile arena. Carried in the save record; no dynamics yet.
///
/// TODO: evaporation from standing water into the cell above, once the
/// hydrology pass exposes per-tile surface area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atmosphere {
    width: u32,
    depth: u32,
    cells: Vec<Cell>,
}

impl Atmosphere {
    pub fn new(width: u32, depth: u32) -> Self {
        Atmosphere {
            width,
            depth,
            cells: vec![Cell::new(); (width * depth) as usize],
        }
    }

    /// Rebuild from persisted cells. The caller has already validated the
    /// length against the configured dimensions.
    pub fn from_cells(width: u32, depth: u32, cells: Vec<Cell>) -> Self {
        debug_assert_eq!(cells.len(), (width * depth) as usize);
        Atmosphere {
            width,
            depth,
            cells,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, x: i32, z: i32) -> Option<&Cell> {
        if x >= 0 && (x as u32) < self.width && z >= 0 && (z as u32) < self.depth {
            Some(&self.cells[(x as u32 + z as u32 * self.width) as usize])
        } else {
            None
        }
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;

    #[test]
    fn new_atmosphere_covers_every_tile() {
        let atmos = Atmosphere::new(6, 4);
        assert_eq!(atmos.len(), 24);
    }

    #[test]
    fn cells_start_at_ambient_conditions() {
        let atmos = Atmosphere::new(2, 2);
        let cell = atmos.cell(1, 1).unwrap();
        assert_eq!(cell.temperature.value, 22.0);
        assert_eq!(cell.temperature.unit, Unit::Celsius);
        assert_eq!(cell.water_vapour.value, 0.5);
        assert_eq!(cell.water_vapour.unit, Unit::Litre);
    }

    #[test]
    fn out_of_bounds_cell_is_none() {
        let atmos = Atmosphere::new(2, 2);
        assert!(atmos.cell(-1, 0).is_none());
        assert!(atmos.cell(2, 0).is_none());
        assert!(atmos.cell(0, 2).is_none());
    }

    #[test]
    fn serde_round_trip_preserves_cells() {
        let atmos = Atmosphere::new(3, 3);
        let encoded = bincode::serialize(&atmos).expect("serialize");
        let decoded: Atmosphere = bincode::deserialize(&encoded).expect("deserialize");
        assert_eq!(atmos, decoded);
    }
}
