use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use tracing::warn;

use crate::units::cubic_metres_to_litres;
use crate::world::grid::TileGrid;
use crate::world::tile::Tile;

/// A tile spreads water only when its phase counter has climbed past this
/// threshold; the counter then resets, so each tile spreads roughly once
/// every eleven passes.
const SPREAD_PHASE_THRESHOLD: u32 = 10;

/// One water-spread pass over the whole grid, row-major. Strictly
/// sequential: each tile sees the water levels its predecessors already
/// produced this pass. Total water is conserved up to f32 rounding.
pub fn spread_pass(grid: &mut TileGrid, rng: &mut ChaCha8Rng) {
    for index in 0..grid.len() as u32 {
        spread_tile(grid, index, rng);
    }
}

fn spread_tile(grid: &mut TileGrid, index: u32, rng: &mut ChaCha8Rng) {
    let (elevation, neighbours) = {
        let tile = &mut grid.tiles_mut()[index as usize];

        tile.water_tick += 1;
        // The counter only resets when the tile actually spreads; a dry
        // tile keeps accumulating phase, so water it receives later moves
        // on the very next pass instead of waiting out a fresh gate.
        if tile.water_tick <= SPREAD_PHASE_THRESHOLD || tile.water_level.value == 0.0 {
            return;
        }
        tile.water_tick = 0;

        (tile.elevation(), tile.neighbours)
    };

    // Candidates are the strictly lower neighbours. Shuffled so ties in
    // the greedy pick below don't favour any fixed direction.
    let mut lower: Vec<u32> = neighbours
        .iter()
        .flatten()
        .copied()
        .filter(|&n| grid.tile(n).elevation() < elevation)
        .collect();
    lower.shuffle(rng);

    while !lower.is_empty() {
        let source_elevation = grid.tile(index).elevation();

        // Greedy: always equalize against the lowest remaining candidate.
        // First encountered wins ties, hence the shuffle above.
        let mut pick = 0;
        for (i, &candidate) in lower.iter().enumerate() {
            if grid.tile(candidate).elevation() < grid.tile(lower[pick]).elevation() {
                pick = i;
            }
        }
        let target = lower[pick];
        let target_elevation = grid.tile(target).elevation();

        // Water already shed this pass can leave the tile sitting in a
        // local minimum; once the lowest candidate is level or higher,
        // every remaining candidate is too.
        if target_elevation >= source_elevation {
            break;
        }

        let delta =
            cubic_metres_to_litres(source_elevation - target_elevation) / lower.len() as f32;

        let (source, dest) = two_tiles_mut(grid.tiles_mut(), index as usize, target as usize);
        let granted = delta - source.add_water(-delta);
        let residual = dest.add_water(granted);
        if residual != 0.0 {
            warn!(
                source = index,
                target,
                residual,
                "Water transfer produced nonzero residual"
            );
        }

        lower.remove(pick);

        if grid.tile(index).water_level.value == 0.0 {
            break;
        }
    }
}

/// Disjoint mutable borrows of two tiles in the arena.
fn two_tiles_mut(tiles: &mut [Tile], a: usize, b: usize) -> (&mut Tile, &mut Tile) {
    debug_assert_ne!(a, b);
    if a < b {
        let (left, right) = tiles.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = tiles.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}
