use noise::{NoiseFn, Perlin};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::world::grid::TileGrid;
use crate::world::tile::{Tile, TileType, VISUAL_HEIGHT_DIVISOR};

/// Frequency applied to grid coordinates before sampling the noise field.
/// Perlin noise is zero at every integer lattice point, so the raw grid
/// coordinates would produce a dead-flat map.
const NOISE_FREQUENCY: f64 = 0.1;

/// Starting surface temperature for every tile, in °C.
const START_TEMPERATURE: f32 = 22.0;

/// Water-tick phases are randomized over this range at creation so tiles
/// don't all spread on the same pass.
const WATER_TICK_PHASES: u32 = 100;

/// A generated elevation field plus its observed range.
#[derive(Debug, Clone)]
pub struct Heightmap {
    pub width: u32,
    pub depth: u32,
    pub values: Vec<f32>,
    pub min: f32,
    pub max: f32,
}

impl Heightmap {
    /// Sample a `width x depth` field of single-octave Perlin noise,
    /// folded positive. Deterministic for a fixed seed.
    pub fn generate(seed: u64, width: u32, depth: u32) -> Self {
        let perlin = Perlin::new(seed as u32);
        let mut values = Vec::with_capacity((width * depth) as usize);
        let mut min = f32::MAX;
        let mut max = f32::MIN;

        for z in 0..depth {
            for x in 0..width {
                let sample = perlin
                    .get([x as f64 * NOISE_FREQUENCY, z as f64 * NOISE_FREQUENCY])
                    .abs() as f32;
                min = min.min(sample);
                max = max.max(sample);
                values.push(sample);
            }
        }

        Heightmap {
            width,
            depth,
            values,
            min,
            max,
        }
    }

    /// Normalize a raw sample into a band index `[0, bands)`. A degenerate
    /// flat field maps everything to band 0.
    pub fn band(&self, raw: f32, bands: usize) -> f32 {
        let range = self.max - self.min;
        if range <= f32::EPSILON {
            return 0.0;
        }
        let scaled = bands as f32 * (raw - self.min) / range;
        scaled.min(bands as f32 - 1.0)
    }
}

/// Build the tilemap for a fresh world: heightmap, terrain banding, initial
/// water and temperature, neighbourhood wiring.
pub fn generate_grid(
    seed: u64,
    width: u32,
    depth: u32,
    start_water_litres: f32,
    rng: &mut ChaCha8Rng,
) -> TileGrid {
    let heightmap = Heightmap::generate(seed, width, depth);
    let bands = TileType::ALL.len();
    let mut tiles = Vec::with_capacity((width * depth) as usize);

    for z in 0..depth as i32 {
        for x in 0..width as i32 {
            let raw = heightmap.values[(x as u32 + z as u32 * width) as usize];
            let band = heightmap.band(raw, bands);
            let kind = TileType::ALL[band as usize];
            let world_y = band / VISUAL_HEIGHT_DIVISOR;
            let water_tick = rng.gen_range(0..WATER_TICK_PHASES);

            tiles.push(Tile::new(
                x,
                z,
                world_y,
                kind,
                START_TEMPERATURE,
                start_water_litres,
                water_tick,
            ));
        }
    }

    let grid = TileGrid::from_tiles(width, depth, tiles);
    info!(
        seed,
        width,
        depth,
        total_water_litres = grid.total_water(),
        "Tilemap generated"
    );
    grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn heightmap_is_deterministic_per_seed() {
        let a = Heightmap::generate(7, 16, 16);
        let b = Heightmap::generate(7, 16, 16);
        assert_eq!(a.values, b.values);

        let c = Heightmap::generate(8, 16, 16);
        assert_ne!(a.values, c.values);
    }

    #[test]
    fn heightmap_values_are_non_negative() {
        let hm = Heightmap::generate(3, 32, 32);
        assert!(hm.values.iter().all(|v| *v >= 0.0));
        assert!(hm.min >= 0.0);
        assert!(hm.max >= hm.min);
    }

    #[test]
    fn band_clamps_to_top_band() {
        let hm = Heightmap::generate(3, 16, 16);
        let band = hm.band(hm.max, TileType::ALL.len());
        assert!(band <= TileType::ALL.len() as f32 - 1.0);
    }

    #[test]
    fn flat_field_maps_to_band_zero() {
        let hm = Heightmap {
            width: 2,
            depth: 2,
            values: vec![0.5; 4],
            min: 0.5,
            max: 0.5,
        };
        assert_eq!(hm.band(0.5, TileType::ALL.len()), 0.0);
    }

    #[test]
    fn generated_grid_is_deterministic_per_seed() {
        let a = generate_grid(42, 12, 12, 10.0, &mut rng(42));
        let b = generate_grid(42, 12, 12, 10.0, &mut rng(42));
        for (ta, tb) in a.tiles().iter().zip(b.tiles().iter()) {
            assert_eq!(ta.kind, tb.kind);
            assert_eq!(ta.world_y, tb.world_y);
            assert_eq!(ta.water_tick, tb.water_tick);
        }
    }

    #[test]
    fn generated_tiles_start_with_configured_water() {
        let grid = generate_grid(42, 8, 8, 25.0, &mut rng(1));
        for tile in grid.tiles() {
            assert_eq!(tile.water_level.value, 25.0);
            assert_eq!(tile.temperature.value, START_TEMPERATURE);
        }
    }

    #[test]
    fn water_tick_phases_are_spread_out() {
        let grid = generate_grid(42, 16, 16, 10.0, &mut rng(9));
        let distinct: std::collections::HashSet<u32> =
            grid.tiles().iter().map(|t| t.water_tick).collect();
        // 256 tiles over 100 phases; a handful of distinct phases at minimum.
        assert!(distinct.len() > 10);
        assert!(grid.tiles().iter().all(|t| t.water_tick < WATER_TICK_PHASES));
    }
}
