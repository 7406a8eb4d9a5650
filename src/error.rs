use crate::grid::Position;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// astarviz error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Checkpoints rejected by `Engine::begin`
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(#[from] InvalidConfiguration),

    /// Frontier misuse; a correct engine never produces this
    #[error("Frontier error: {0}")]
    Frontier(#[from] FrontierError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Scene (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file parse error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Scene grid too large, empty or negative
    #[error("Grid size {rows}x{cols} is not supported (each side must be 1..={max})")]
    GridSize { rows: i32, cols: i32, max: i32 },

    /// Malformed text layout, or a scene the layout cannot represent
    #[error("Layout error: {0}")]
    Layout(String),

    /// Clipboard unavailable or rejected the operation
    #[error("Clipboard error: {0}")]
    Clipboard(String),
}

/// Why a set of checkpoints cannot be searched
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidConfiguration {
    #[error("start position is not set")]
    MissingStart,

    #[error("goal position is not set")]
    MissingGoal,

    #[error("{count} waypoints given, at most {max} are supported")]
    TooManyWaypoints { count: usize, max: usize },

    #[error("{checkpoint} {position} is outside the grid")]
    OutOfBounds {
        checkpoint: String,
        position: Position,
    },

    #[error("{checkpoint} {position} is on a blocked cell")]
    Blocked {
        checkpoint: String,
        position: Position,
    },
}

/// Frontier contract violations
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrontierError {
    #[error("pop from an empty frontier")]
    Empty,

    #[error("{0} is already open")]
    AlreadyOpen(Position),

    #[error("{0} is not open")]
    NotOpen(Position),

    #[error("cost {new_g:.3} at {position} does not improve on {current_g:.3}")]
    NotDecreased {
        position: Position,
        current_g: f64,
        new_g: f64,
    },
}
