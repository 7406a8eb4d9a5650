use crate::error::{Error, Result};
use log::{info, warn};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub visual: VisualConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GridConfig {
    #[serde(default = "default_rows")]
    pub rows: i32,
    #[serde(default = "default_cols")]
    pub cols: i32,
    #[serde(default = "default_cell_size")]
    pub cell_size: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchConfig {
    /// Visualization speed, 1 (slowest) to 100 (fastest)
    #[serde(default = "default_speed")]
    pub speed: u32,
    /// Upper bound on steps taken in a single frame at high speeds
    #[serde(default = "default_steps_per_frame_cap")]
    pub steps_per_frame_cap: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VisualConfig {
    #[serde(default = "default_window_title")]
    pub window_title: String,
    #[serde(default = "default_show_costs")]
    pub show_costs: bool,
    #[serde(default = "default_panel_width")]
    pub panel_width: f32,
    #[serde(default)]
    pub colors: ColorScheme,
}

/// RGB triples for every element drawn by the visualizer
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ColorScheme {
    #[serde(default = "default_background")]
    pub background: [u8; 3],
    #[serde(default = "default_grid_lines")]
    pub grid_lines: [u8; 3],
    #[serde(default = "default_start")]
    pub start: [u8; 3],
    #[serde(default = "default_goal")]
    pub goal: [u8; 3],
    #[serde(default = "default_obstacle")]
    pub obstacle: [u8; 3],
    #[serde(default = "default_open_set")]
    pub open_set: [u8; 3],
    #[serde(default = "default_closed_set")]
    pub closed_set: [u8; 3],
    #[serde(default = "default_path")]
    pub path: [u8; 3],
    #[serde(default = "default_waypoint")]
    pub waypoint: [u8; 3],
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_scene_path")]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoggingConfig {
    /// Default log filter when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub level: String,
}

// Default values
fn default_rows() -> i32 { 35 }
fn default_cols() -> i32 { 50 }
fn default_cell_size() -> f32 { 18.0 }
fn default_speed() -> u32 { 50 }
fn default_steps_per_frame_cap() -> u32 { 64 }
fn default_window_title() -> String { "A* Pathfinding Visualization".to_string() }
fn default_show_costs() -> bool { true }
fn default_panel_width() -> f32 { 260.0 }
fn default_background() -> [u8; 3] { [0, 0, 0] }
fn default_grid_lines() -> [u8; 3] { [40, 40, 40] }
fn default_start() -> [u8; 3] { [0, 255, 0] }
fn default_goal() -> [u8; 3] { [255, 0, 0] }
fn default_obstacle() -> [u8; 3] { [128, 128, 128] }
fn default_open_set() -> [u8; 3] { [0, 255, 255] }
fn default_closed_set() -> [u8; 3] { [255, 165, 0] }
fn default_path() -> [u8; 3] { [255, 255, 0] }
fn default_waypoint() -> [u8; 3] { [255, 0, 255] }
fn default_scene_path() -> String { "scene.json".to_string() }
fn default_log_level() -> String { "info".to_string() }

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            cols: default_cols(),
            cell_size: default_cell_size(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            speed: default_speed(),
            steps_per_frame_cap: default_steps_per_frame_cap(),
        }
    }
}

impl Default for VisualConfig {
    fn default() -> Self {
        Self {
            window_title: default_window_title(),
            show_costs: default_show_costs(),
            panel_width: default_panel_width(),
            colors: ColorScheme::default(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            background: default_background(),
            grid_lines: default_grid_lines(),
            start: default_start(),
            goal: default_goal(),
            obstacle: default_obstacle(),
            open_set: default_open_set(),
            closed_set: default_closed_set(),
            path: default_path(),
            waypoint: default_waypoint(),
        }
    }
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            path: default_scene_path(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            grid: GridConfig::default(),
            search: SearchConfig::default(),
            visual: VisualConfig::default(),
            scene: SceneConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SearchConfig {
    pub const MIN_SPEED: u32 = 1;
    pub const MAX_SPEED: u32 = 100;

    pub fn clamped_speed(&self) -> u32 {
        self.speed.clamp(Self::MIN_SPEED, Self::MAX_SPEED)
    }

    /// Delay between two engine steps: 1000 / speed milliseconds
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.clamped_speed()))
    }
}

impl Config {
    /// Parse a configuration; missing sections and fields take their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Turn a load attempt into a usable configuration, falling back to
    /// defaults when the file is missing or invalid
    pub fn resolve(loaded: Result<Self>) -> Self {
        match loaded {
            Ok(config) => {
                info!("Loaded configuration from {}", CONFIG_PATH);
                config
            }
            Err(Error::Io(_)) => {
                info!("No {} found, using default configuration", CONFIG_PATH);
                Config::default()
            }
            Err(e) => {
                warn!("Failed to parse {}: {}", CONFIG_PATH, e);
                warn!("Using default configuration");
                Config::default()
            }
        }
    }
}
