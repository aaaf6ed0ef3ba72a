use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_depth")]
    pub depth: u32,
    #[serde(default = "default_ticks_per_second")]
    pub ticks_per_second: u32,
    #[serde(default = "default_day_length_mins")]
    pub day_length_mins: u32,
    #[serde(default = "default_start_water_litres")]
    pub start_water_litres: f32,
    #[serde(default = "default_save_directory")]
    pub save_directory: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_save_on_exit")]
    pub save_on_exit: bool,
}

fn default_width() -> u32 {
    64
}
fn default_depth() -> u32 {
    64
}
fn default_ticks_per_second() -> u32 {
    24
}
fn default_day_length_mins() -> u32 {
    20
}
fn default_start_water_litres() -> f32 {
    10.0
}
fn default_save_directory() -> String {
    "./saves".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_save_on_exit() -> bool {
    true
}

impl SimulationConfig {
    pub fn from_file(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, String> {
        let config: SimulationConfig =
            toml::from_str(content).map_err(|e| format!("{}: {}", source_path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Upper bound on each map dimension. Keeps `width * depth` well
    /// inside `u32` so arena indices never overflow.
    pub const MAX_DIMENSION: u32 = 4096;

    pub fn validate(&self) -> Result<(), String> {
        let mut errors = Vec::new();

        if !(1..=Self::MAX_DIMENSION).contains(&self.width) {
            errors.push(format!(
                "width must be 1-{}, got {}. Example: width = 64",
                Self::MAX_DIMENSION,
                self.width
            ));
        }

        if !(1..=Self::MAX_DIMENSION).contains(&self.depth) {
            errors.push(format!(
                "depth must be 1-{}, got {}. Example: depth = 64",
                Self::MAX_DIMENSION,
                self.depth
            ));
        }

        if self.ticks_per_second == 0 {
            errors.push(format!(
                "ticks_per_second must be >= 1, got {}. Example: ticks_per_second = 24",
                self.ticks_per_second
            ));
        }

        if self.day_length_mins == 0 {
            errors.push(format!(
                "day_length_mins must be >= 1, got {}. Example: day_length_mins = 20",
                self.day_length_mins
            ));
        }

        if !self.start_water_litres.is_finite() || self.start_water_litres < 0.0 {
            errors.push(format!(
                "start_water_litres must be >= 0.0, got {}. Example: start_water_litres = 10.0",
                self.start_water_litres
            ));
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.join("\n"))
        }
    }

    /// Small validated config for unit tests.
    #[cfg(test)]
    pub fn for_tests(width: u32, depth: u32) -> Self {
        SimulationConfig {
            width,
            depth,
            ticks_per_second: default_ticks_per_second(),
            day_length_mins: 1,
            start_water_litres: default_start_water_litres(),
            save_directory: default_save_directory(),
            log_level: default_log_level(),
            save_on_exit: false,
        }
    }
}
