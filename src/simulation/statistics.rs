use crate::world::World;

/// Per-tick summary gathered after the simulation phases complete.
#[derive(Debug, Clone, PartialEq)]
pub struct TickStatistics {
    pub tick_count: u64,
    pub total_water_litres: f64,
    pub entity_count: usize,
    pub plant_count: usize,
    pub tick_duration_ms: f64,
}

impl TickStatistics {
    pub fn gather(world: &World, tick_duration_ms: f64) -> Self {
        TickStatistics {
            tick_count: world.tick_count,
            total_water_litres: world.grid.total_water(),
            entity_count: world.entities.len(),
            plant_count: world.entities.plant_count(),
            tick_duration_ms,
        }
    }
}
