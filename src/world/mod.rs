pub mod atmosphere;
pub mod generation;
pub mod grid;
pub mod tile;
pub mod topology;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::simulation::SimulationConfig;
use crate::entity::{Entity, EntityRegistry, Plant};
use crate::simulation::Clock;

use atmosphere::Atmosphere;
use grid::TileGrid;

/// Volume added by one pour interaction: one cubic metre.
pub const POUR_VOLUME_LITRES: f32 = 1000.0;

/// The whole mutable simulation state. Everything a tick touches hangs off
/// this struct and is reached through it, so the borrow checker sees every
/// cross-component access.
#[derive(Debug, Clone)]
pub struct World {
    pub seed: u64,
    /// Source of all simulation randomness. Seeded from `seed`, so a world
    /// is reproducible from its save record.
    pub rng: ChaCha8Rng,
    pub grid: TileGrid,
    pub atmosphere: Atmosphere,
    pub entities: EntityRegistry,
    pub clock: Clock,
    pub paused: bool,
    pub tick_count: u64,
}

impl World {
    /// Generate a fresh world from a validated config and a seed.
    pub fn generate(config: &SimulationConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let grid = generation::generate_grid(
            seed,
            config.width,
            config.depth,
            config.start_water_litres,
            &mut rng,
        );
        let atmosphere = Atmosphere::new(config.width, config.depth);

        info!(seed, width = config.width, depth = config.depth, "World generated");

        World {
            seed,
            rng,
            grid,
            atmosphere,
            entities: EntityRegistry::new(),
            clock: Clock::new(config.day_length_mins),
            paused: false,
            tick_count: 0,
        }
    }

    /// Reassemble a world from loaded state. The grid arrives with its
    /// neighbour graph already rebuilt.
    pub fn from_parts(
        seed: u64,
        grid: TileGrid,
        atmosphere: Atmosphere,
        entities: EntityRegistry,
        clock: Clock,
    ) -> Self {
        World {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            grid,
            atmosphere,
            entities,
            clock,
            paused: false,
            tick_count: 0,
        }
    }

    /// Dump one cubic metre of water onto a tile. Returns false when the
    /// coordinate is off the map.
    pub fn pour_water(&mut self, x: i32, z: i32) -> bool {
        match self.grid.get_mut(x, z) {
            Some(tile) => {
                tile.add_water(POUR_VOLUME_LITRES);
                debug!(x, z, litres = POUR_VOLUME_LITRES, "Water poured");
                true
            }
            None => false,
        }
    }

    /// Attempt to plant on a tile. The attempt succeeds with the tile
    /// type's fertility as probability; stone and already-planted tiles
    /// always fail. Returns the new entity id on success.
    pub fn try_plant(&mut self, x: i32, z: i32) -> Option<u32> {
        let index = self.grid.index_of(x, z)?;
        let roll: f32 = self.rng.gen_range(0.0..1.0);
        let tile = &mut self.grid.tiles_mut()[index];

        if !tile.plantable() || roll >= tile.kind.fertility() {
            return None;
        }

        tile.planted = true;
        let plant = Plant::sprout(index as u32, &mut self.rng);
        let id = self.entities.add(Entity::Plant(plant));
        debug!(x, z, id, "Plant sprouted");
        Some(id)
    }

    pub fn print_summary(&self) {
        println!("=== World (seed {}) ===", self.seed);
        println!(
            "Tiles: {} ({}x{})",
            self.grid.len(),
            self.grid.width(),
            self.grid.depth()
        );
        println!("Clock: {}", self.clock);
        println!("Total water: {:.1} L", self.grid.total_water());
        println!(
            "Entities: {} ({} plants)",
            self.entities.len(),
            self.entities.plant_count()
        );

        let mut counts = vec![0u32; tile::TileType::ALL.len()];
        for t in self.grid.tiles() {
            counts[tile::TileType::ALL.iter().position(|k| *k == t.kind).unwrap_or(0)] += 1;
        }
        println!("Terrain:");
        for (kind, count) in tile::TileType::ALL.iter().zip(counts.iter()) {
            let pct = 100.0 * *count as f64 / self.grid.len().max(1) as f64;
            println!("  {:<6} {:>6} ({:.1}%)", kind.name(), count, pct);
        }
    }
}
