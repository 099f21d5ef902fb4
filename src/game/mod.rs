//! Board model for the snake world
//!
//! This module holds the grid, the snake and the transition rules, without any
//! rendering or planning dependencies.

pub mod action;
pub mod config;
pub mod engine;
pub mod rewards;
pub mod state;

// Re-export commonly used types
pub use action::Action;
pub use config::{ConfigError, GameConfig, MIN_COLUMNS, MIN_ROWS};
pub use engine::{CollisionType, Environment, StepInfo, StepResult, StepStatus};
pub use rewards::RewardTable;
pub use state::{CellKind, Grid, Position, Snake};
