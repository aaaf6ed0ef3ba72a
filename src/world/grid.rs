use crate::world::tile::Tile;
use crate::world::topology;

/// The tilemap: a flat row-major arena of tiles plus its dimensions.
///
/// Tiles are addressed either by grid coordinate `(x, z)` or by arena index
/// `x + z * width`. Neighbour slots store arena indices, so the arena layout
/// is part of the contract: tiles never move after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct TileGrid {
    width: u32,
    depth: u32,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Build a grid from a complete row-major tile vector and wire up every
    /// neighbourhood. The caller must supply exactly `width * depth` tiles.
    pub fn from_tiles(width: u32, depth: u32, mut tiles: Vec<Tile>) -> Self {
        debug_assert_eq!(tiles.len(), (width * depth) as usize);
        topology::assign_neighbourhoods(&mut tiles, width, depth);
        TileGrid {
            width,
            depth,
            tiles,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn in_bounds(&self, x: i32, z: i32) -> bool {
        topology::in_bounds(x, z, self.width, self.depth)
    }

    /// Arena index for a grid coordinate, if it is on the map.
    pub fn index_of(&self, x: i32, z: i32) -> Option<usize> {
        if self.in_bounds(x, z) {
            Some((x as u32 + z as u32 * self.width) as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: i32, z: i32) -> Option<&Tile> {
        self.index_of(x, z).map(|i| &self.tiles[i])
    }

    pub fn get_mut(&mut self, x: i32, z: i32) -> Option<&mut Tile> {
        self.index_of(x, z).map(move |i| &mut self.tiles[i])
    }

    pub fn tile(&self, index: u32) -> &Tile {
        &self.tiles[index as usize]
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tiles_mut(&mut self) -> &mut [Tile] {
        &mut self.tiles
    }

    /// Total standing water across the map, in litres. The hydrology pass
    /// conserves this quantity.
    pub fn total_water(&self) -> f64 {
        self.tiles
            .iter()
            .map(|t| t.water_level.value as f64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::tile::TileType;

    fn make_grid(width: u32, depth: u32, water: f32) -> TileGrid {
        let mut tiles = Vec::new();
        for z in 0..depth as i32 {
            for x in 0..width as i32 {
                tiles.push(Tile::new(x, z, 0.0, TileType::Dirt, 22.0, water, 0));
            }
        }
        TileGrid::from_tiles(width, depth, tiles)
    }

    #[test]
    fn index_of_is_row_major() {
        let grid = make_grid(4, 3, 0.0);
        assert_eq!(grid.index_of(0, 0), Some(0));
        assert_eq!(grid.index_of(3, 0), Some(3));
        assert_eq!(grid.index_of(0, 1), Some(4));
        assert_eq!(grid.index_of(3, 2), Some(11));
    }

    #[test]
    fn out_of_bounds_lookup_is_none() {
        let grid = make_grid(4, 3, 0.0);
        assert!(grid.get(-1, 0).is_none());
        assert!(grid.get(4, 0).is_none());
        assert!(grid.get(0, 3).is_none());
    }

    #[test]
    fn get_returns_tile_at_coordinate() {
        let grid = make_grid(4, 3, 0.0);
        let tile = grid.get(2, 1).unwrap();
        assert_eq!(tile.map_x, 2);
        assert_eq!(tile.map_z, 1);
    }

    #[test]
    fn construction_wires_neighbourhoods() {
        let grid = make_grid(5, 5, 0.0);
        let centre = grid.get(2, 2).unwrap();
        assert_eq!(centre.neighbours.iter().flatten().count(), 6);
    }

    #[test]
    fn total_water_sums_all_tiles() {
        let mut grid = make_grid(4, 3, 10.0);
        assert!((grid.total_water() - 120.0).abs() < 1e-9);
        grid.get_mut(1, 1).unwrap().add_water(5.0);
        assert!((grid.total_water() - 125.0).abs() < 1e-9);
    }
}
