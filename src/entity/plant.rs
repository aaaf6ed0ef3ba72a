use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Age at which a plant's growth factor stops increasing.
const MATURITY_AGE: u32 = 10_000;

/// Heritable appearance and structure parameters, fixed at sprouting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genetics {
    pub colour: [f32; 3],
    pub height: f32,
    pub radius: f32,
    /// Placement jitter within the tile footprint.
    pub offset_x: f32,
    pub offset_z: f32,
    pub rotation: f32,
    pub num_leaves: u32,
    pub leaf_spawn_height: f32,
    pub avg_leaf_size: f32,
    pub leaf_size_variance: f32,
}

impl Genetics {
    pub fn randomized(rng: &mut ChaCha8Rng) -> Self {
        Genetics {
            colour: [
                rng.gen_range(0.0..0.2),
                rng.gen_range(0.4..0.9),
                rng.gen_range(0.0..0.2),
            ],
            height: rng.gen_range(0.5..1.5),
            radius: rng.gen_range(0.02..0.08),
            offset_x: rng.gen_range(-0.25..0.25),
            offset_z: rng.gen_range(-0.25..0.25),
            rotation: rng.gen_range(0.0..std::f32::consts::TAU),
            num_leaves: rng.gen_range(3..9),
            leaf_spawn_height: rng.gen_range(0.3..0.8),
            avg_leaf_size: rng.gen_range(0.05..0.15),
            leaf_size_variance: rng.gen_range(0.0..0.05),
        }
    }
}

/// A rooted plant. Lives in the entity registry; its tile stays marked
/// `planted` for as long as the plant exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plant {
    /// Arena index of the tile this plant is rooted in.
    pub tile_index: u32,
    pub genetics: Genetics,
    /// Ticks since sprouting.
    pub age: u32,
}

impl Plant {
    pub fn sprout(tile_index: u32, rng: &mut ChaCha8Rng) -> Self {
        Plant {
            tile_index,
            genetics: Genetics::randomized(rng),
            age: 0,
        }
    }

    /// Fraction of full genetic size currently expressed. Grows linearly
    /// with age and plateaus at maturity.
    pub fn growth_factor(&self) -> f32 {
        0.1 + 0.001 * self.age.min(MATURITY_AGE) as f32
    }

    pub fn update(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    pub fn info_string(&self) -> String {
        format!(
            "plant on tile {}: age {}, growth {:.2}",
            self.tile_index,
            self.age,
            self.growth_factor()
        )
    }
}
