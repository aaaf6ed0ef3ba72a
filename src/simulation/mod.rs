pub mod clock;
pub mod hydrology;
pub mod scheduler;
pub mod statistics;

use std::time::Instant;

use tracing::debug;

use crate::world::World;

pub use clock::Clock;
pub use scheduler::{Cadence, TickScheduler};
pub use statistics::TickStatistics;

/// Run one world tick: hydrology, entity updates, clock, statistics.
///
/// The water-spread pass is strictly sequential; entity updates run in
/// parallel and are joined before the clock moves, so a completed tick is
/// always a consistent world state. A paused world skips the tick
/// entirely, clock included.
pub fn execute_tick(world: &mut World, clock_advance_ms: f64) -> Option<TickStatistics> {
    if world.paused {
        return None;
    }

    let start = Instant::now();

    hydrology::spread_pass(&mut world.grid, &mut world.rng);
    world.entities.update_all();
    world.clock.advance(clock_advance_ms);
    world.tick_count += 1;

    let stats = TickStatistics::gather(world, start.elapsed().as_secs_f64() * 1000.0);
    debug!(
        tick = stats.tick_count,
        total_water_litres = stats.total_water_litres,
        entities = stats.entity_count,
        duration_ms = stats.tick_duration_ms,
        "Tick complete"
    );
    Some(stats)
}
