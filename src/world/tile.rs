use serde::{Deserialize, Serialize};

use crate::units::{litres_to_cubic_metres, Quantity};

/// Divisor applied to the raw heightmap band before a tile is placed in the
/// world. Cosmetic flattening only; not part of the hydrology invariants.
pub const VISUAL_HEIGHT_DIVISOR: f32 = 3.0;

// === Enums ===

/// Terrain material of a tile, ordered by typical spawn elevation
/// (Sand lowest, Stone highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileType {
    Sand,
    Dirt,
    Grass,
    Stone,
}

impl TileType {
    /// All tile types in spawn-elevation order. The heightmap-to-type
    /// mapping buckets normalized elevation into `ALL.len()` equal bands.
    pub const ALL: [TileType; 4] = [
        TileType::Sand,
        TileType::Dirt,
        TileType::Grass,
        TileType::Stone,
    ];

    /// Probability that a plant-placement attempt succeeds on this type.
    pub fn fertility(&self) -> f32 {
        match self {
            TileType::Sand => 0.05,
            TileType::Dirt => 0.33,
            TileType::Grass => 0.80,
            TileType::Stone => 0.00,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TileType::Sand => "sand",
            TileType::Dirt => "dirt",
            TileType::Grass => "grass",
            TileType::Stone => "stone",
        }
    }
}

/// The six hex directions, in neighbour-offset table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Right,
    TopRight,
    BottomRight,
    Left,
    TopLeft,
    BottomLeft,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Right,
        Direction::TopRight,
        Direction::BottomRight,
        Direction::Left,
        Direction::TopLeft,
        Direction::BottomLeft,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }
}

/// The tiles surrounding one tile: six slots of non-owning arena indices
/// into the grid's tile storage, in [`Direction`] order. Edge tiles leave
/// out-of-bounds slots empty.
pub type Neighbourhood = [Option<u32>; 6];

// === Tile ===

/// One cell of the hex grid.
///
/// `map_x`, `map_z`, `world_y` and `kind` are fixed at creation. Water and
/// temperature mutate during the simulation; `water_level` only ever
/// changes through [`Tile::add_water`], so the conservation invariant is
/// auditable at a single choke point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub map_x: i32,
    pub map_z: i32,
    /// Base elevation of the tile top, excluding standing water.
    pub world_y: f32,
    pub kind: TileType,

    pub water_level: Quantity,
    pub temperature: Quantity,
    /// Phase counter for the water-spread pass, randomized at creation so
    /// tiles don't all spread on the same tick.
    pub water_tick: u32,
    /// Derived adjacency; rebuilt after construction or load, never saved.
    #[serde(skip)]
    pub neighbours: Neighbourhood,
    pub planted: bool,
}

impl Tile {
    pub fn new(
        map_x: i32,
        map_z: i32,
        world_y: f32,
        kind: TileType,
        temperature: f32,
        water_litres: f32,
        water_tick: u32,
    ) -> Self {
        Tile {
            map_x,
            map_z,
            world_y,
            kind,
            water_level: Quantity::litres(water_litres),
            temperature: Quantity::celsius(temperature),
            water_tick,
            neighbours: [None; 6],
            planted: false,
        }
    }

    /// World-space placement for pointy-top hex packing. Consumed by the
    /// renderer; the grid coordinates themselves drive neighbour lookups.
    pub fn world_position(&self) -> (f32, f32) {
        let x = (self.map_x as f32 + 0.5 * self.map_z.rem_euclid(2) as f32)
            * (std::f32::consts::PI / 3.0).sin();
        let z = self.map_z as f32 * 0.75;
        (x, z)
    }

    /// Elevation of the top of the tile including its standing water
    /// column. This is the quantity compared during the water-spread pass.
    pub fn elevation(&self) -> f32 {
        self.world_y + litres_to_cubic_metres(self.water_level.value)
    }

    /// Add water to the tile; a negative delta removes water. The volume is
    /// clamped at a floor of zero and the magnitude of any
    /// requested-but-impossible removal is returned as backflow so the
    /// caller can redistribute it. This is the only way water volume
    /// changes.
    pub fn add_water(&mut self, delta: f32) -> f32 {
        let backflow = -(self.water_level.value + delta);
        self.water_level.value = (self.water_level.value + delta).max(0.0);
        backflow.max(0.0)
    }

    /// The neighbour slot in a given direction.
    pub fn neighbour(&self, direction: Direction) -> Option<u32> {
        self.neighbours[direction.index()]
    }

    /// Whether a planting attempt is worth rolling on this tile.
    pub fn plantable(&self) -> bool {
        !self.planted && self.kind.fertility() > 0.0
    }

    pub fn info_string(&self) -> String {
        format!(
            "{} ({}, {}): {} water, {}",
            self.kind.name(),
            self.map_x,
            self.map_z,
            self.water_level,
            self.temperature,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Unit;

    fn make_tile(water: f32) -> Tile {
        Tile::new(0, 0, 1.0, TileType::Grass, 22.0, water, 0)
    }

    #[test]
    fn tile_types_ordered_by_spawn_elevation() {
        assert_eq!(TileType::ALL[0], TileType::Sand);
        assert_eq!(TileType::ALL[3], TileType::Stone);
    }

    #[test]
    fn stone_is_infertile() {
        assert_eq!(TileType::Stone.fertility(), 0.0);
        assert!(TileType::Grass.fertility() > TileType::Dirt.fertility());
        assert!(TileType::Dirt.fertility() > TileType::Sand.fertility());
    }

    #[test]
    fn add_water_accumulates() {
        let mut tile = make_tile(10.0);
        let backflow = tile.add_water(5.0);
        assert_eq!(backflow, 0.0);
        assert_eq!(tile.water_level.value, 15.0);
        assert_eq!(tile.water_level.unit, Unit::Litre);
    }

    #[test]
    fn add_water_clamps_at_zero_and_returns_backflow() {
        let mut tile = make_tile(10.0);
        let backflow = tile.add_water(-25.0);
        assert_eq!(backflow, 15.0);
        assert_eq!(tile.water_level.value, 0.0);
    }

    #[test]
    fn add_water_exact_drain_has_no_backflow() {
        let mut tile = make_tile(10.0);
        let backflow = tile.add_water(-10.0);
        assert_eq!(backflow, 0.0);
        assert_eq!(tile.water_level.value, 0.0);
    }

    #[test]
    fn elevation_includes_water_column() {
        let mut tile = make_tile(0.0);
        assert_eq!(tile.elevation(), 1.0);
        tile.add_water(1000.0);
        assert!((tile.elevation() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn world_position_staggers_odd_rows() {
        let even = Tile::new(3, 0, 0.0, TileType::Sand, 22.0, 0.0, 0);
        let odd = Tile::new(3, 1, 0.0, TileType::Sand, 22.0, 0.0, 0);
        let (ex, _) = even.world_position();
        let (ox, oz) = odd.world_position();
        assert!(ox > ex, "odd rows shift half a tile right");
        assert!((oz - 0.75).abs() < 1e-6);
    }

    #[test]
    fn plantable_requires_fertility_and_vacancy() {
        let mut grass = make_tile(0.0);
        assert!(grass.plantable());
        grass.planted = true;
        assert!(!grass.plantable());

        let stone = Tile::new(0, 0, 2.0, TileType::Stone, 22.0, 0.0, 0);
        assert!(!stone.plantable());
    }

    #[test]
    fn tile_serde_round_trip_preserves_dynamic_state() {
        let mut tile = make_tile(37.25);
        tile.temperature.value = 18.5;
        tile.water_tick = 7;
        let encoded = bincode::serialize(&tile).expect("serialize");
        let decoded: Tile = bincode::deserialize(&encoded).expect("deserialize");
        assert_eq!(decoded.water_level, tile.water_level);
        assert_eq!(decoded.temperature, tile.temperature);
        assert_eq!(decoded.water_tick, 7);
        // Neighbour indices are derived data and never persisted.
        assert_eq!(decoded.neighbours, [None; 6]);
    }
}
