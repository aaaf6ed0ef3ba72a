use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::persistence;
use crate::simulation::{self, TickScheduler};
use crate::world::World;

/// Sleep granularity of the run loop. Fine enough that the 60 Hz
/// controller cadence never starves.
const LOOP_SLEEP_MS: u64 = 4;

/// Run the simulation until interrupted: load or generate a world, then
/// drive the scheduler's cadences from wall-clock time.
pub async fn run_simulation(
    config: &SimulationConfig,
    world_path: Option<&str>,
) -> Result<(), String> {
    let save_dir = Path::new(&config.save_directory);
    let mut world = match world_path {
        Some(path) => {
            info!(path, "Loading world");
            persistence::load_world(Path::new(path), config)
                .map_err(|e| format!("Failed to load save: {}", e))?
        }
        None => {
            info!(dir = %save_dir.display(), "Loading latest save");
            persistence::load_latest_valid_save(save_dir, config)
                .map_err(|e| format!("Failed to load save: {}", e))?
        }
    };

    info!(
        seed = world.seed,
        tiles = world.grid.len(),
        clock = %world.clock,
        "World loaded"
    );

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.store(true, Ordering::Relaxed);
            }
        });
    }

    let mut scheduler = TickScheduler::new(config.ticks_per_second);
    let mut last = Instant::now();

    info!(
        ticks_per_second = config.ticks_per_second,
        "Simulation running"
    );

    loop {
        let now = Instant::now();
        let elapsed_ms = now.duration_since(last).as_secs_f64() * 1000.0;
        last = now;

        let cadence = scheduler.advance(elapsed_ms);

        if let Some(accumulated_ms) = cadence.world_tick {
            simulation::execute_tick(&mut world, accumulated_ms);
        }

        // The controller cadence is where interactive input would be
        // polled; headless, it only services the shutdown flag.
        if cadence.controller_tick && shutdown.load(Ordering::Relaxed) {
            info!("Shutdown signal received");
            break;
        }

        if let Some(tps) = cadence.tps_report {
            info!(
                tps,
                tick = world.tick_count,
                clock = %world.clock,
                total_water_litres = world.grid.total_water(),
                "Tick rate"
            );
        }

        tokio::time::sleep(Duration::from_millis(LOOP_SLEEP_MS)).await;
    }

    if config.save_on_exit {
        match persistence::save_world(&world, save_dir) {
            Ok(path) => info!(path = %path.display(), "Final save written"),
            Err(e) => warn!(error = %e, "Final save failed"),
        }
    }

    info!(tick = world.tick_count, "Simulation stopped");
    Ok(())
}

/// Generate a fresh world and write its first save.
pub fn generate(config: &SimulationConfig, seed: u64) -> Result<(), String> {
    let world = World::generate(config, seed);
    world.print_summary();

    let save_dir = Path::new(&config.save_directory);
    let path = persistence::save_world(&world, save_dir)
        .map_err(|e| format!("Cannot write save: {}", e))?;
    println!("\nWorld saved to {}", path.display());
    Ok(())
}

/// Inspect a tile or world summary from the latest save.
pub fn inspect(
    config: &SimulationConfig,
    tile: Option<(i32, i32)>,
    show_world: bool,
) -> Result<(), String> {
    let save_dir = Path::new(&config.save_directory);
    let world = persistence::load_latest_valid_save(save_dir, config)
        .map_err(|e| format!("Failed to load save: {}", e))?;

    if let Some((x, z)) = tile {
        inspect_tile(&world, x, z)
    } else if show_world {
        world.print_summary();
        Ok(())
    } else {
        Err("Specify --x <X> --z <Z> or --world".to_string())
    }
}

fn inspect_tile(world: &World, x: i32, z: i32) -> Result<(), String> {
    let tile = world.grid.get(x, z).ok_or_else(|| {
        format!(
            "Tile ({}, {}) is off the map ({}x{})",
            x,
            z,
            world.grid.width(),
            world.grid.depth()
        )
    })?;

    println!("=== Tile ({}, {}) ===", x, z);
    println!("{}", tile.info_string());
    println!("Base elevation: {:.3}", tile.world_y);
    println!("Surface elevation: {:.3}", tile.elevation());
    println!("Fertility: {:.2}", tile.kind.fertility());
    println!("Planted: {}", tile.planted);
    println!(
        "Neighbours: {}",
        tile.neighbours.iter().flatten().count()
    );
    if let Some(cell) = world.atmosphere.cell(x, z) {
        println!("Air: {}, {} vapour", cell.temperature, cell.water_vapour);
    }
    if tile.planted {
        let index = world.grid.index_of(x, z).unwrap_or_default() as u32;
        for entity in world.entities.iter() {
            if let crate::entity::Entity::Plant(plant) = entity {
                if plant.tile_index == index {
                    println!("Rooted: {}", entity.info_string());
                }
            }
        }
    }

    Ok(())
}

/// Print the save inventory for a directory.
pub fn list_saves(dir: &Path) -> Result<(), String> {
    let saves =
        persistence::list_saves(dir).map_err(|e| format!("Error listing saves: {}", e))?;

    if saves.is_empty() {
        println!("No saves found in {}", dir.display());
        return Ok(());
    }

    println!("{:<32} {:>20} {:>12}", "File", "Seed", "Size");
    println!("{}", "-".repeat(66));
    for s in &saves {
        let name = s.path.file_name().and_then(|n| n.to_str()).unwrap_or("?");
        let size_kb = s.file_size / 1024;
        println!("{:<32} {:>20} {:>9} KB", name, s.seed, size_kb);
    }
    println!("\n{} save(s) in {}", saves.len(), dir.display());
    Ok(())
}
