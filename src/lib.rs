pub mod config;
pub mod error;
pub mod frontier;
pub mod grid;
pub mod leg;
pub mod node;
pub mod path;
pub mod scene;
pub mod sequencer;
pub mod snapshot;

pub use config::Config;
pub use error::{Error, InvalidConfiguration, Result};
pub use grid::{CellState, Grid, Position};
pub use leg::CellCost;
pub use scene::Scene;
pub use sequencer::{Engine, EngineStatus, Leg, LegSummary, SequencerStep, MAX_WAYPOINTS};
pub use snapshot::EngineSnapshot;
