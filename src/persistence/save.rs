use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::entity::{Entity, EntityRegistry, Plant};
use crate::simulation::Clock;
use crate::world::atmosphere::{Atmosphere, Cell};
use crate::world::grid::TileGrid;
use crate::world::tile::Tile;
use crate::world::World;

/// Metadata about a save file on disk.
#[derive(Debug, Clone)]
pub struct SaveMetadata {
    pub path: PathBuf,
    pub seed: u64,
    pub timestamp: u64,
    pub file_size: u64,
}

/// Errors that can occur during save operations.
#[derive(Debug)]
pub enum SaveError {
    Io(io::Error),
    Serialize(String),
    Deserialize(String),
    Corrupt(PathBuf, String),
    NoValidSaves,
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "I/O error: {}", e),
            SaveError::Serialize(e) => write!(f, "Serialization error: {}", e),
            SaveError::Deserialize(e) => write!(f, "Deserialization error: {}", e),
            SaveError::Corrupt(path, reason) => {
                write!(f, "Corrupt save {}: {}", path.display(), reason)
            }
            SaveError::NoValidSaves => {
                write!(
                    f,
                    "No valid saves found. Generate a new world with: tidelands generate"
                )
            }
        }
    }
}

impl std::error::Error for SaveError {}

impl From<io::Error> for SaveError {
    fn from(e: io::Error) -> Self {
        SaveError::Io(e)
    }
}

/// Persisted clock state. The day length itself comes from config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockState {
    pub timer_ms: f64,
    pub day: u32,
    pub twelve_hour: bool,
}

/// One tile plus whatever is rooted in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRecord {
    pub tile: Tile,
    pub plant: Option<Plant>,
}

/// The complete save payload. Tiles and atmosphere cells are stored
/// row-major (`index = x + z * width`); the neighbour graph is derived
/// data and rebuilt on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRecord {
    pub seed: u64,
    pub clock: ClockState,
    pub atmosphere: Vec<Cell>,
    pub tiles: Vec<TileRecord>,
}

impl SaveRecord {
    pub fn from_world(world: &World) -> Self {
        let mut tiles: Vec<TileRecord> = world
            .grid
            .tiles()
            .iter()
            .map(|tile| TileRecord {
                tile: tile.clone(),
                plant: None,
            })
            .collect();

        for entity in world.entities.iter() {
            if let Entity::Plant(plant) = entity {
                if let Some(record) = tiles.get_mut(plant.tile_index as usize) {
                    record.plant = Some(plant.clone());
                }
            }
        }

        SaveRecord {
            seed: world.seed,
            clock: ClockState {
                timer_ms: world.clock.timer_ms(),
                day: world.clock.day(),
                twelve_hour: world.clock.twelve_hour,
            },
            atmosphere: world.atmosphere.cells().to_vec(),
            tiles,
        }
    }
}

fn save_filename(seed: u64, timestamp: u64) -> String {
    format!("world-{}-{}.bin", seed, timestamp)
}

/// Parse seed and timestamp from a save filename.
/// Expected format: `world-{seed}-{timestamp}.bin`
fn parse_save_filename(filename: &str) -> Option<(u64, u64)> {
    let stem = filename.strip_suffix(".bin")?;
    let rest = stem.strip_prefix("world-")?;
    let (seed_str, ts_str) = rest.split_once('-')?;
    let seed = seed_str.parse::<u64>().ok()?;
    let ts = ts_str.parse::<u64>().ok()?;
    Some((seed, ts))
}

fn unix_timestamp_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Save a world to the save directory using atomic write.
///
/// Writes to a temporary file first, then renames to the final path, so a
/// partial write never leaves a truncated save behind.
pub fn save_world(world: &World, save_dir: &Path) -> Result<PathBuf, SaveError> {
    fs::create_dir_all(save_dir)?;

    let ts = unix_timestamp_now();
    let filename = save_filename(world.seed, ts);
    let target = save_dir.join(&filename);
    let tmp = save_dir.join(format!(".{}.tmp", filename));

    let record = SaveRecord::from_world(world);
    let encoded =
        bincode::serialize(&record).map_err(|e| SaveError::Serialize(e.to_string()))?;

    if let Err(e) = fs::write(&tmp, &encoded) {
        let _ = fs::remove_file(&tmp);
        return Err(SaveError::Io(e));
    }

    if let Err(e) = fs::rename(&tmp, &target) {
        let _ = fs::remove_file(&tmp);
        return Err(SaveError::Io(e));
    }

    Ok(target)
}

/// Load a world from a save file. All-or-nothing: every validation runs
/// against the raw record before any world state is built.
pub fn load_world(path: &Path, config: &SimulationConfig) -> Result<World, SaveError> {
    let data = fs::read(path)?;
    let record: SaveRecord =
        bincode::deserialize(&data).map_err(|e| SaveError::Deserialize(e.to_string()))?;

    // usize arithmetic so absurd configured dimensions fail the length
    // check instead of overflowing.
    let expected = config.width as usize * config.depth as usize;
    if record.tiles.len() != expected {
        return Err(SaveError::Corrupt(
            path.to_path_buf(),
            format!(
                "tile count {} does not match configured {}x{}",
                record.tiles.len(),
                config.width,
                config.depth
            ),
        ));
    }
    if record.atmosphere.len() != expected {
        return Err(SaveError::Corrupt(
            path.to_path_buf(),
            format!(
                "atmosphere cell count {} does not match configured {}x{}",
                record.atmosphere.len(),
                config.width,
                config.depth
            ),
        ));
    }

    for (i, tile_record) in record.tiles.iter().enumerate() {
        let expected_x = (i as u32 % config.width) as i32;
        let expected_z = (i as u32 / config.width) as i32;
        if tile_record.tile.map_x != expected_x || tile_record.tile.map_z != expected_z {
            return Err(SaveError::Corrupt(
                path.to_path_buf(),
                format!(
                    "tile {} has coordinates ({}, {}), expected ({}, {})",
                    i, tile_record.tile.map_x, tile_record.tile.map_z, expected_x, expected_z
                ),
            ));
        }
    }

    let mut tiles = Vec::with_capacity(expected);
    let mut entities = EntityRegistry::new();
    for (i, tile_record) in record.tiles.into_iter().enumerate() {
        if let Some(mut plant) = tile_record.plant {
            plant.tile_index = i as u32;
            entities.add(Entity::Plant(plant));
        }
        tiles.push(tile_record.tile);
    }

    let grid = TileGrid::from_tiles(config.width, config.depth, tiles);
    let atmosphere = Atmosphere::from_cells(config.width, config.depth, record.atmosphere);
    let clock = Clock::from_state(
        config.day_length_mins,
        record.clock.timer_ms,
        record.clock.day,
        record.clock.twelve_hour,
    );

    Ok(World::from_parts(
        record.seed,
        grid,
        atmosphere,
        entities,
        clock,
    ))
}

/// List all saves in a directory, newest first.
pub fn list_saves(save_dir: &Path) -> Result<Vec<SaveMetadata>, SaveError> {
    if !save_dir.exists() {
        return Ok(Vec::new());
    }

    let mut saves = Vec::new();

    for entry in fs::read_dir(save_dir)? {
        let entry = entry?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }

        let filename = match path.file_name().and_then(|n| n.to_str()) {
            Some(n) => n.to_string(),
            None => continue,
        };

        // Skip temp files
        if filename.starts_with('.') {
            continue;
        }

        if let Some((seed, timestamp)) = parse_save_filename(&filename) {
            let file_size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            saves.push(SaveMetadata {
                path: path.clone(),
                seed,
                timestamp,
                file_size,
            });
        }
    }

    saves.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));

    Ok(saves)
}

/// Load the most recent valid save, falling back to older ones if the
/// latest is corrupt. Errors only if nothing loads.
pub fn load_latest_valid_save(
    save_dir: &Path,
    config: &SimulationConfig,
) -> Result<World, SaveError> {
    let saves = list_saves(save_dir)?;

    if saves.is_empty() {
        return Err(SaveError::NoValidSaves);
    }

    for save in &saves {
        match load_world(&save.path, config) {
            Ok(world) => return Ok(world),
            Err(e) => {
                warn!(
                    path = %save.path.display(),
                    error = %e,
                    "Corrupt save, trying next"
                );
            }
        }
    }

    Err(SaveError::NoValidSaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config() -> SimulationConfig {
        SimulationConfig::for_tests(8, 8)
    }

    fn make_world(seed: u64) -> World {
        let mut world = World::generate(&test_config(), seed);
        world.pour_water(3, 3);
        world
    }

    fn plant_somewhere(world: &mut World) -> u32 {
        let (x, z) = world
            .grid
            .tiles()
            .iter()
            .find(|t| t.plantable())
            .map(|t| (t.map_x, t.map_z))
            .expect("fertile ground exists");
        (0..10_000)
            .find_map(|_| world.try_plant(x, z))
            .expect("planting succeeds eventually")
    }

    #[test]
    fn save_and_load_round_trip_preserves_tiles() {
        let dir = TempDir::new().unwrap();
        let world = make_world(42);

        let path = save_world(&world, dir.path()).unwrap();
        let restored = load_world(&path, &test_config()).unwrap();

        assert_eq!(restored.seed, world.seed);
        for (orig, rest) in world.grid.tiles().iter().zip(restored.grid.tiles().iter()) {
            assert_eq!(orig.water_level, rest.water_level);
            assert_eq!(orig.temperature, rest.temperature);
            assert_eq!(orig.water_tick, rest.water_tick);
            assert_eq!(orig.kind, rest.kind);
            assert_eq!(orig.world_y, rest.world_y);
        }
        assert_eq!(restored.atmosphere, world.atmosphere);
    }

    #[test]
    fn round_trip_rebuilds_a_symmetric_neighbour_graph() {
        let dir = TempDir::new().unwrap();
        let world = make_world(42);

        let path = save_world(&world, dir.path()).unwrap();
        let restored = load_world(&path, &test_config()).unwrap();

        for (idx, tile) in restored.grid.tiles().iter().enumerate() {
            assert_eq!(tile.neighbours, world.grid.tiles()[idx].neighbours);
            for n in tile.neighbours.iter().flatten() {
                assert!(restored.grid.tiles()[*n as usize]
                    .neighbours
                    .iter()
                    .any(|slot| *slot == Some(idx as u32)));
            }
        }
    }

    #[test]
    fn round_trip_preserves_clock_state() {
        let dir = TempDir::new().unwrap();
        let mut world = make_world(42);
        world.clock.advance(90_000.0);
        world.clock.twelve_hour = true;

        let path = save_world(&world, dir.path()).unwrap();
        let restored = load_world(&path, &test_config()).unwrap();

        assert_eq!(restored.clock, world.clock);
    }

    #[test]
    fn round_trip_restores_plants() {
        let dir = TempDir::new().unwrap();
        let mut world = make_world(42);
        let id = plant_somewhere(&mut world);
        let original = match world.entities.get(id).unwrap() {
            Entity::Plant(p) => p.clone(),
            _ => unreachable!(),
        };

        let path = save_world(&world, dir.path()).unwrap();
        let restored = load_world(&path, &test_config()).unwrap();

        assert_eq!(restored.entities.plant_count(), 1);
        match restored.entities.get(0).unwrap() {
            Entity::Plant(p) => {
                assert_eq!(p.genetics, original.genetics);
                assert_eq!(p.age, original.age);
                assert_eq!(p.tile_index, original.tile_index);
            }
            _ => panic!("expected plant"),
        }
        assert!(restored.grid.tiles()[original.tile_index as usize].planted);
    }

    #[test]
    fn load_rejects_dimension_mismatch() {
        let dir = TempDir::new().unwrap();
        let world = make_world(42);
        let path = save_world(&world, dir.path()).unwrap();

        let wrong = SimulationConfig::for_tests(8, 9);
        let err = load_world(&path, &wrong).unwrap_err();
        assert!(matches!(err, SaveError::Corrupt(_, _)));
    }

    #[test]
    fn load_corrupt_file_returns_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("world-1-1000.bin");
        fs::write(&path, b"this is not valid bincode data").unwrap();

        assert!(load_world(&path, &test_config()).is_err());
    }

    #[test]
    fn load_truncated_file_returns_error() {
        let dir = TempDir::new().unwrap();
        let world = make_world(42);
        let path = save_world(&world, dir.path()).unwrap();
        let data = fs::read(&path).unwrap();
        fs::write(&path, &data[..data.len() / 2]).unwrap();

        assert!(load_world(&path, &test_config()).is_err());
    }

    #[test]
    fn save_filename_parse_round_trip() {
        let filename = save_filename(42, 1708300000);
        assert_eq!(filename, "world-42-1708300000.bin");

        let (seed, ts) = parse_save_filename(&filename).unwrap();
        assert_eq!(seed, 42);
        assert_eq!(ts, 1708300000);
    }

    #[test]
    fn parse_invalid_filename_returns_none() {
        assert!(parse_save_filename("random.bin").is_none());
        assert!(parse_save_filename("world-.bin").is_none());
        assert!(parse_save_filename("world-abc-123.bin").is_none());
        assert!(parse_save_filename("world-42-abc.bin").is_none());
        assert!(parse_save_filename("not-a-save.txt").is_none());
    }

    #[test]
    fn list_saves_returns_sorted_newest_first() {
        let dir = TempDir::new().unwrap();
        let world = make_world(42);
        let data = bincode::serialize(&SaveRecord::from_world(&world)).unwrap();

        fs::write(dir.path().join("world-42-1000.bin"), &data).unwrap();
        fs::write(dir.path().join("world-42-3000.bin"), &data).unwrap();
        fs::write(dir.path().join("world-42-2000.bin"), &data).unwrap();

        let saves = list_saves(dir.path()).unwrap();
        assert_eq!(saves.len(), 3);
        assert_eq!(saves[0].timestamp, 3000);
        assert_eq!(saves[1].timestamp, 2000);
        assert_eq!(saves[2].timestamp, 1000);
    }

    #[test]
    fn list_saves_skips_non_save_files() {
        let dir = TempDir::new().unwrap();
        let world = make_world(42);
        let data = bincode::serialize(&SaveRecord::from_world(&world)).unwrap();

        fs::write(dir.path().join("world-42-1000.bin"), &data).unwrap();
        fs::write(dir.path().join("notes.txt"), "not a save").unwrap();
        fs::write(dir.path().join(".world-42-9999.bin.tmp"), "temp file").unwrap();

        let saves = list_saves(dir.path()).unwrap();
        assert_eq!(saves.len(), 1);
    }

    #[test]
    fn list_saves_nonexistent_dir() {
        let saves = list_saves(Path::new("/tmp/nonexistent_save_dir_12345")).unwrap();
        assert!(saves.is_empty());
    }

    #[test]
    fn load_latest_valid_falls_back_on_corrupt() {
        let dir = TempDir::new().unwrap();
        let world = make_world(42);
        let valid = bincode::serialize(&SaveRecord::from_world(&world)).unwrap();

        // Oldest: valid. Newest: corrupt.
        fs::write(dir.path().join("world-42-1000.bin"), &valid).unwrap();
        fs::write(dir.path().join("world-42-2000.bin"), b"corrupt data").unwrap();

        let restored = load_latest_valid_save(dir.path(), &test_config()).unwrap();
        assert_eq!(restored.seed, 42);
    }

    #[test]
    fn load_latest_valid_empty_dir_returns_error() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_latest_valid_save(dir.path(), &test_config()).unwrap_err(),
            SaveError::NoValidSaves
        ));
    }

    #[test]
    fn atomic_write_no_temp_files_remain() {
        let dir = TempDir::new().unwrap();
        let world = make_world(42);

        save_world(&world, dir.path()).unwrap();

        let temp_files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_str().is_some_and(|n| n.starts_with('.')))
            .collect();
        assert!(temp_files.is_empty());
    }

    #[test]
    fn save_creates_directory_if_missing() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("deep").join("nested").join("saves");
        let world = make_world(42);

        let path = save_world(&world, &nested).unwrap();
        assert!(path.exists());
    }
}
