use crate::world::tile::{Neighbourhood, Tile};

/// Base hexmap neighbourhood offsets as `(dx, dz)`, in [`crate::world::tile::Direction`]
/// order: Right, TopRight, BottomRight, Left, TopLeft, BottomLeft.
///
/// The "diagonal" directions (indices not divisible by 3) get an extra x
/// offset of -1 on even rows; the pointy-top packing shifts odd rows half a
/// tile right, so the same direction lands on a different column depending
/// on row parity.
const NEIGHBOUR_OFFSETS: [(i32, i32); 6] = [
    (1, 0),  // Right
    (1, -1), // Top right
    (1, 1),  // Bottom right
    (-1, 0), // Left
    (0, -1), // Top left
    (0, 1),  // Bottom left
];

/// Check whether a grid coordinate is inside the tilemap boundaries.
pub fn in_bounds(x: i32, z: i32, width: u32, depth: u32) -> bool {
    x >= 0 && (x as u32) < width && z >= 0 && (z as u32) < depth
}

/// Compute the six neighbour slots for the tile at `(x, z)`. Out-of-bounds
/// candidates are left absent.
pub fn neighbour_slots(x: i32, z: i32, width: u32, depth: u32) -> Neighbourhood {
    let mut slots: Neighbourhood = [None; 6];

    for (i, &(dx, dz)) in NEIGHBOUR_OFFSETS.iter().enumerate() {
        let mut nx = x + dx;
        let nz = z + dz;

        // Stagger offsets on the x axis for every other row on the
        // "top/bottom" neighbours.
        if z % 2 == 0 && i % 3 != 0 {
            nx -= 1;
        }

        if in_bounds(nx, nz, width, depth) {
            slots[i] = Some(nx as u32 + nz as u32 * width);
        }
    }

    slots
}

/// Assign every tile its neighbourhood. Must run exactly once, after every
/// tile exists (construction or load), since slots index into the final
/// arena layout. Tiles are stored row-major: `index = x + z * width`.
pub fn assign_neighbourhoods(tiles: &mut [Tile], width: u32, depth: u32) {
    for z in 0..depth as i32 {
        for x in 0..width as i32 {
            let idx = (x as u32 + z as u32 * width) as usize;
            tiles[idx].neighbours = neighbour_slots(x, z, width, depth);
        }
    }
}
