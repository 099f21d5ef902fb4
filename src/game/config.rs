use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest supported number of rows
pub const MIN_ROWS: usize = 13;
/// Smallest supported number of columns
pub const MIN_COLUMNS: usize = 13;
/// Length of the snake at the start of an episode
pub const INITIAL_SNAKE_LENGTH: usize = 4;
/// Columns between the head and the first apple
pub const INITIAL_APPLE_OFFSET: i32 = 4;

/// Errors raised while validating configuration
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("grid must be at least {min_rows}x{min_columns}, got {rows}x{columns}")]
    GridTooSmall {
        rows: usize,
        columns: usize,
        min_rows: usize,
        min_columns: usize,
    },

    #[error("discount must be in [0, 1), got {0}")]
    InvalidDiscount(f64),

    #[error("convergence threshold must be positive, got {0}")]
    InvalidThreshold(f64),

    #[error("max_sweeps must be at least 1")]
    ZeroSweeps,

    #[error("episodes must be at least 1")]
    ZeroEpisodes,
}

/// Configuration for the game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of rows, border included
    pub rows: usize,
    /// Number of columns, border included
    pub columns: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            rows: 21,
            columns: 21,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(rows: usize, columns: usize) -> Self {
        Self { rows, columns }
    }

    /// Smallest valid board
    pub fn small() -> Self {
        Self::new(MIN_ROWS, MIN_COLUMNS)
    }

    /// Check that the board can hold the initial snake and apple
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rows < MIN_ROWS || self.columns < MIN_COLUMNS {
            return Err(ConfigError::GridTooSmall {
                rows: self.rows,
                columns: self.columns,
                min_rows: MIN_ROWS,
                min_columns: MIN_COLUMNS,
            });
        }
        Ok(())
    }
}
