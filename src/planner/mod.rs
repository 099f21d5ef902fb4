//! Planning agents that choose the snake's next move
//!
//! Provides:
//! - The [`Planner`] capability the episode loop drives every tick
//! - A value iteration planner that re-solves the board's MDP each tick

pub mod config;
pub mod value_iteration;

pub use config::{PlannerConfig, StoppingRule};
pub use value_iteration::{SolveOutcome, ValueIterationPlanner};

use crate::game::{Action, Grid, Position};

/// An agent that recommends one move per tick
pub trait Planner {
    /// Size internal tables for a board of `rows` x `columns`
    fn create(&mut self, rows: usize, columns: usize);

    /// Take in the board as it is at the start of a tick
    fn update(&mut self, grid: &Grid);

    /// Recommend a move for the head, or `None` if nothing qualifies
    fn get_action(&mut self, head: Position, legal_actions: &[Action]) -> Option<Action>;
}
