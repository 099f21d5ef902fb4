//! DP Snake - Snake steered by a value-iteration planner
//!
//! This library provides:
//! - Core game logic and the grid environment (game module)
//! - The value iteration planner, re-solved every tick (planner module)
//! - The episode loop and its observers (episode module)
//! - Rolling episode statistics (metrics module)
//! - TUI rendering and input (render, input modules)
//! - Execution modes (headless, watch)

pub mod episode;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod planner;
pub mod render;
