pub mod plant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

pub use plant::Plant;

/// A mobile or growing inhabitant of the world. Tiles are not entities;
/// they live in the grid arena and are updated by the hydrology pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Entity {
    Plant(Plant),
    Creature(Creature),
}

impl Entity {
    /// Per-tick behaviour. Must not touch shared state; the registry runs
    /// these in parallel.
    pub fn update(&mut self) {
        match self {
            Entity::Plant(plant) => plant.update(),
            Entity::Creature(creature) => creature.update(),
        }
    }

    pub fn info_string(&self) -> String {
        match self {
            Entity::Plant(plant) => plant.info_string(),
            Entity::Creature(creature) => creature.info_string(),
        }
    }
}

/// Placeholder animal life. Ages but does nothing else yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Creature {
    pub age: u32,
}

impl Creature {
    pub fn new() -> Self {
        Creature { age: 0 }
    }

    pub fn update(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    pub fn info_string(&self) -> String {
        format!("creature: age {}", self.age)
    }
}

impl Default for Creature {
    fn default() -> Self {
        Creature::new()
    }
}

/// Dense entity storage. An entity's id is its index, so ids always form a
/// contiguous `[0, len)` and removal shifts everything above it down.
/// Callers must treat ids as invalidated by any removal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        EntityRegistry {
            entities: Vec::new(),
        }
    }

    /// Register an entity and return its id.
    pub fn add(&mut self, entity: Entity) -> u32 {
        self.entities.push(entity);
        (self.entities.len() - 1) as u32
    }

    /// Remove the entity with the given id, compacting the storage. O(N)
    /// in the number of entities above it.
    pub fn remove(&mut self, id: u32) -> Option<Entity> {
        if (id as usize) < self.entities.len() {
            Some(self.entities.remove(id as usize))
        } else {
            None
        }
    }

    pub fn get(&self, id: u32) -> Option<&Entity> {
        self.entities.get(id as usize)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn plant_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| matches!(e, Entity::Plant(_)))
            .count()
    }

    /// Run every entity's per-tick update. The parallel iterator joins
    /// before returning, so the tick never completes with updates in
    /// flight.
    pub fn update_all(&mut self) {
        self.entities.par_iter_mut().for_each(|entity| {
            entity.update();
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn make_plant(tile: u32) -> Entity {
        let mut rng = ChaCha8Rng::seed_from_u64(tile as u64);
        Entity::Plant(Plant::sprout(tile, &mut rng))
    }

    #[test]
    fn ids_are_contiguous_indices() {
        let mut registry = EntityRegistry::new();
        assert_eq!(registry.add(make_plant(0)), 0);
        assert_eq!(registry.add(make_plant(1)), 1);
        assert_eq!(registry.add(Entity::Creature(Creature::new())), 2);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn removal_compacts_and_shifts_ids() {
        let mut registry = EntityRegistry::new();
        registry.add(make_plant(10));
        registry.add(make_plant(20));
        registry.add(make_plant(30));

        let removed = registry.remove(1).unwrap();
        match removed {
            Entity::Plant(p) => assert_eq!(p.tile_index, 20),
            _ => panic!("expected plant"),
        }

        assert_eq!(registry.len(), 2);
        // The former id 2 slid down into slot 1.
        match registry.get(1).unwrap() {
            Entity::Plant(p) => assert_eq!(p.tile_index, 30),
            _ => panic!("expected plant"),
        }
    }

    #[test]
    fn remove_unknown_id_is_none() {
        let mut registry = EntityRegistry::new();
        registry.add(make_plant(0));
        assert!(registry.remove(5).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn update_all_ages_every_entity() {
        let mut registry = EntityRegistry::new();
        for i in 0..100 {
            registry.add(make_plant(i));
        }
        registry.add(Entity::Creature(Creature::new()));

        registry.update_all();
        registry.update_all();

        for entity in registry.iter() {
            match entity {
                Entity::Plant(p) => assert_eq!(p.age, 2),
                Entity::Creature(c) => assert_eq!(c.age, 2),
            }
        }
    }

    #[test]
    fn plant_count_ignores_creatures() {
        let mut registry = EntityRegistry::new();
        registry.add(make_plant(0));
        registry.add(Entity::Creature(Creature::new()));
        registry.add(make_plant(1));
        assert_eq!(registry.plant_count(), 2);
    }

    #[test]
    fn registry_serde_round_trip() {
        let mut registry = EntityRegistry::new();
        registry.add(make_plant(4));
        registry.add(Entity::Creature(Creature::new()));

        let encoded = bincode::serialize(&registry).expect("serialize");
        let decoded: EntityRegistry = bincode::deserialize(&encoded).expect("deserialize");
        assert_eq!(registry, decoded);
    }
}
