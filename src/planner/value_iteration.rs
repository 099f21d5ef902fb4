//! Dynamic programming planner over the snake grid
//!
//! Every cell of the board is a state of a deterministic MDP whose actions are
//! the four moves. The planner turns the board into a reward table, runs
//! in-place (Gauss-Seidel) value iteration until the Bellman update stops
//! moving, and then steers the head toward the best-valued neighbour.

use tracing::{debug, warn};

use super::config::{PlannerConfig, StoppingRule};
use super::Planner;
use crate::game::{Action, ConfigError, Grid, Position};

/// How a call to [`ValueIterationPlanner::solve`] ended
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolveOutcome {
    /// The sweep delta dropped to the threshold
    Converged { sweeps: usize },
    /// `max_sweeps` ran out first; the table holds the last sweep's values
    SweepLimit { sweeps: usize, delta: f64 },
}

impl SolveOutcome {
    pub fn sweeps(&self) -> usize {
        match self {
            SolveOutcome::Converged { sweeps } | SolveOutcome::SweepLimit { sweeps, .. } => {
                *sweeps
            }
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, SolveOutcome::Converged { .. })
    }
}

/// Value iteration planner with a value table shaped like the grid
#[derive(Debug, Clone)]
pub struct ValueIterationPlanner {
    config: PlannerConfig,
    rows: usize,
    columns: usize,
    rewards: Vec<f64>,
    values: Vec<f64>,
    last_outcome: Option<SolveOutcome>,
}

impl ValueIterationPlanner {
    pub fn new(config: PlannerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rows: 0,
            columns: 0,
            rewards: Vec::new(),
            values: Vec::new(),
            last_outcome: None,
        })
    }

    pub fn config(&self) -> &PlannerConfig {
        &self.config
    }

    /// Allocate zeroed reward and value tables
    pub fn allocate(&mut self, rows: usize, columns: usize) {
        self.rows = rows;
        self.columns = columns;
        self.rewards = vec![0.0; rows * columns];
        self.values = vec![0.0; rows * columns];
        self.last_outcome = None;
    }

    /// Refresh the reward table from the board
    pub fn ingest(&mut self, grid: &Grid) {
        if grid.rows() != self.rows || grid.columns() != self.columns {
            self.allocate(grid.rows(), grid.columns());
        }

        let table = self.config.rewards;
        for (reward, kind) in self.rewards.iter_mut().zip(grid.cells()) {
            *reward = table.reward(*kind);
        }
    }

    /// Run value iteration on the current rewards.
    ///
    /// Sweeps the table row-major, updating each cell in place so later cells
    /// in the same sweep already see the fresh values of earlier ones. The
    /// table is reused from the previous solve as a starting point.
    pub fn solve(&mut self) -> SolveOutcome {
        let discount = self.config.discount;
        let mut sweeps = 0;
        let mut delta = f64::INFINITY;

        while sweeps < self.config.max_sweeps {
            sweeps += 1;
            let mut max_delta: f64 = 0.0;
            let mut last_delta = 0.0;

            for row in 0..self.rows {
                for column in 0..self.columns {
                    let idx = row * self.columns + column;
                    let old = self.values[idx];
                    let new = self.rewards[idx] + discount * self.best_neighbour(row, column);
                    self.values[idx] = new;

                    last_delta = (new - old).abs();
                    max_delta = max_delta.max(last_delta);
                }
            }

            delta = match self.config.stopping {
                StoppingRule::MaxDelta => max_delta,
                StoppingRule::LastCell => last_delta,
            };

            if delta <= self.config.threshold {
                debug!(sweeps, delta, "value iteration converged");
                let outcome = SolveOutcome::Converged { sweeps };
                self.last_outcome = Some(outcome);
                return outcome;
            }
        }

        warn!(sweeps, delta, "value iteration hit the sweep limit");
        let outcome = SolveOutcome::SweepLimit { sweeps, delta };
        self.last_outcome = Some(outcome);
        outcome
    }

    /// Largest value among in-bounds orthogonal neighbours
    fn best_neighbour(&self, row: usize, column: usize) -> f64 {
        let mut best = f64::NEG_INFINITY;

        if row > 0 {
            best = best.max(self.values[(row - 1) * self.columns + column]);
        }
        if row + 1 < self.rows {
            best = best.max(self.values[(row + 1) * self.columns + column]);
        }
        if column > 0 {
            best = best.max(self.values[row * self.columns + column - 1]);
        }
        if column + 1 < self.columns {
            best = best.max(self.values[row * self.columns + column + 1]);
        }

        best
    }

    /// Pick the legal move whose destination has the highest value.
    ///
    /// Ties go to the earlier action in North, South, West, East order.
    /// Returns `None` when no direction is legal.
    pub fn select_action(&self, head: Position, legal_actions: &[Action]) -> Option<Action> {
        let mut best: Option<(Action, f64)> = None;

        for action in Action::ALL {
            if !legal_actions.contains(&action) {
                continue;
            }
            let Some(value) = self.value(head.moved_in_direction(action)) else {
                continue;
            };

            match best {
                Some((_, best_value)) if value <= best_value => {}
                _ => best = Some((action, value)),
            }
        }

        best.map(|(action, _)| action)
    }

    /// Value of one cell, `None` outside the table
    pub fn value(&self, pos: Position) -> Option<f64> {
        if pos.row < 0
            || pos.column < 0
            || pos.row as usize >= self.rows
            || pos.column as usize >= self.columns
        {
            return None;
        }
        Some(self.values[pos.row as usize * self.columns + pos.column as usize])
    }

    /// Value table, row-major
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn last_outcome(&self) -> Option<SolveOutcome> {
        self.last_outcome
    }
}

impl Planner for ValueIterationPlanner {
    fn create(&mut self, rows: usize, columns: usize) {
        self.allocate(rows, columns);
    }

    fn update(&mut self, grid: &Grid) {
        self.ingest(grid);
    }

    fn get_action(&mut self, head: Position, legal_actions: &[Action]) -> Option<Action> {
        self.solve();
        self.select_action(head, legal_actions)
    }
}
