use std::sync::Arc;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{
    action::Action,
    config::{ConfigError, GameConfig, INITIAL_APPLE_OFFSET, INITIAL_SNAKE_LENGTH},
    state::{CellKind, Grid, Position, Snake},
};

/// Whether the episode goes on after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Continuing,
    Terminated,
}

/// What the head ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionType {
    Wall,
    Body,
}

/// Information about a step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepInfo {
    /// Whether the snake ate an apple this step
    pub ate_apple: bool,
    /// Type of collision if one occurred
    pub collision: Option<CollisionType>,
    /// Set when no empty cell was left for the next apple
    pub board_full: bool,
}

/// Result of applying one action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResult {
    pub status: StepStatus,
    pub info: StepInfo,
}

impl StepResult {
    fn new(status: StepStatus, ate_apple: bool, collision: Option<CollisionType>) -> Self {
        Self {
            status,
            info: StepInfo {
                ate_apple,
                collision,
                board_full: false,
            },
        }
    }

    pub fn is_terminated(&self) -> bool {
        self.status == StepStatus::Terminated
    }
}

/// Owns the board, the snake and the score, and advances them one tick at a time.
///
/// The random source used for apple placement is injected so that episodes
/// can be replayed from a seed.
pub struct Environment<R: Rng = StdRng> {
    config: GameConfig,
    grid: Grid,
    snake: Snake,
    score: u32,
    steps: u32,
    terminated: bool,
    rng: R,
}

impl Environment<StdRng> {
    /// Create an environment seeded from OS entropy
    pub fn new(config: GameConfig) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an environment with a reproducible apple sequence
    pub fn seeded(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Environment<R> {
    /// Create an environment that draws apple positions from `rng`.
    ///
    /// Fails without allocating a board if the configured grid is too small.
    pub fn with_rng(config: GameConfig, rng: R) -> Result<Self, ConfigError> {
        config.validate()?;

        let grid = Grid::new(config.rows, config.columns, CellKind::Empty);
        let mut env = Self {
            config,
            grid,
            snake: Snake { body: Vec::new() },
            score: 0,
            steps: 0,
            terminated: false,
            rng,
        };
        env.reset();
        Ok(env)
    }

    /// Reset the board to the start-of-episode layout
    pub fn reset(&mut self) {
        let rows = self.config.rows;
        let columns = self.config.columns;

        self.grid = Grid::new(rows, columns, CellKind::Empty);
        for row in 0..rows {
            for column in 0..columns {
                let pos = Position::new(row as i32, column as i32);
                if self.grid.is_border(pos) {
                    self.grid.set(pos, CellKind::Wall);
                }
            }
        }

        let head = Position::new((rows / 2) as i32, (columns / 2) as i32 - 1);
        self.snake = Snake::new(head, Action::East, INITIAL_SNAKE_LENGTH);

        let last = self.snake.len() - 1;
        for (i, segment) in self.snake.body.iter().enumerate() {
            let kind = if i == 0 {
                CellKind::Head
            } else if i == last {
                CellKind::Tail
            } else {
                CellKind::Body
            };
            self.grid.set(*segment, kind);
        }

        self.grid
            .set(head.moved_by(0, INITIAL_APPLE_OFFSET), CellKind::Apple);

        self.score = 0;
        self.steps = 0;
        self.terminated = false;
    }

    /// Position the head would reach by taking `action`
    pub fn next_head(&self, action: Action) -> Position {
        self.snake.head().moved_in_direction(action)
    }

    /// True if `action` would turn the head back into its own neck
    pub fn is_reversal(&self, action: Action) -> bool {
        self.snake.neck() == Some(self.next_head(action))
    }

    /// Actions that do not reverse into the neck, in priority order
    pub fn legal_actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|action| !self.is_reversal(*action))
            .collect()
    }

    /// Advance the board by one move.
    ///
    /// The action is not checked against `legal_actions`; a reversal simply
    /// runs the head into the body.
    pub fn apply(&mut self, action: Action) -> StepResult {
        if self.terminated {
            return StepResult::new(StepStatus::Terminated, false, None);
        }

        let next_head = self.next_head(action);
        let destination = self.grid.get(next_head).unwrap_or(CellKind::Wall);
        self.steps += 1;

        match destination {
            CellKind::Wall => {
                self.terminated = true;
                StepResult::new(StepStatus::Terminated, false, Some(CollisionType::Wall))
            }
            CellKind::Body | CellKind::Head => {
                self.terminated = true;
                StepResult::new(StepStatus::Terminated, false, Some(CollisionType::Body))
            }
            CellKind::Apple => {
                self.score += 1;
                self.advance_head(next_head);

                if self.spawn_apple().is_none() {
                    warn!(score = self.score, "no empty cell left for a new apple");
                    self.terminated = true;
                    let mut result = StepResult::new(StepStatus::Terminated, true, None);
                    result.info.board_full = true;
                    return result;
                }

                StepResult::new(StepStatus::Continuing, true, None)
            }
            CellKind::Tail | CellKind::Empty => {
                let tail = self.snake.tail();
                self.grid.set(tail, CellKind::Empty);
                self.snake.body.pop();
                let new_tail = self.snake.tail();
                self.grid.set(new_tail, CellKind::Tail);

                self.advance_head(next_head);
                StepResult::new(StepStatus::Continuing, false, None)
            }
        }
    }

    fn advance_head(&mut self, next_head: Position) {
        let old_head = self.snake.head();
        self.grid.set(old_head, CellKind::Body);
        self.snake.body.insert(0, next_head);
        self.grid.set(next_head, CellKind::Head);
    }

    /// Drop an apple on a uniformly random empty cell.
    ///
    /// Samples the whole board and retries until it lands on an empty cell.
    /// Returns `None` when the board has no empty cell at all.
    fn spawn_apple(&mut self) -> Option<Position> {
        if self.grid.count(CellKind::Empty) == 0 {
            return None;
        }

        loop {
            let row = self.rng.gen_range(0..self.config.rows) as i32;
            let column = self.rng.gen_range(0..self.config.columns) as i32;
            let pos = Position::new(row, column);

            if self.grid.get(pos) == Some(CellKind::Empty) {
                self.grid.set(pos, CellKind::Apple);
                return Some(pos);
            }
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Immutable copy of the board for observers
    pub fn snapshot(&self) -> Arc<Grid> {
        Arc::new(self.grid.clone())
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn head(&self) -> Position {
        self.snake.head()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_env() -> Environment {
        Environment::seeded(GameConfig::small(), 7).unwrap()
    }

    fn border_is_wall(grid: &Grid) -> bool {
        grid.iter()
            .filter(|(pos, _)| grid.is_border(*pos))
            .all(|(_, kind)| kind == CellKind::Wall)
    }

    #[test]
    fn test_reset_layout_on_minimum_grid() {
        let env = small_env();
        let grid = env.grid();

        assert_eq!(grid.get(Position::new(6, 5)), Some(CellKind::Head));
        assert_eq!(grid.get(Position::new(6, 4)), Some(CellKind::Body));
        assert_eq!(grid.get(Position::new(6, 3)), Some(CellKind::Body));
        assert_eq!(grid.get(Position::new(6, 2)), Some(CellKind::Tail));
        assert_eq!(grid.get(Position::new(6, 9)), Some(CellKind::Apple));
        assert_eq!(grid.count(CellKind::Apple), 1);
        assert!(border_is_wall(grid));
        assert_eq!(env.score(), 0);
        assert_eq!(env.snake().len(), 4);
    }

    #[test]
    fn test_legal_actions_exclude_neck() {
        let env = small_env();
        assert_eq!(
            env.legal_actions(),
            vec![Action::North, Action::South, Action::East]
        );
        assert!(env.is_reversal(Action::West));
    }

    #[test]
    fn test_too_small_grid_rejected() {
        let result = Environment::seeded(GameConfig::new(12, 13), 0);
        assert!(matches!(result, Err(ConfigError::GridTooSmall { .. })));
    }

    #[test]
    fn test_normal_move() {
        let mut env = small_env();
        let result = env.apply(Action::North);

        assert_eq!(result.status, StepStatus::Continuing);
        assert!(!result.info.ate_apple);
        assert_eq!(env.snake().len(), 4);
        assert_eq!(env.head(), Position::new(5, 5));

        let grid = env.grid();
        assert_eq!(grid.get(Position::new(5, 5)), Some(CellKind::Head));
        assert_eq!(grid.get(Position::new(6, 5)), Some(CellKind::Body));
        assert_eq!(grid.get(Position::new(6, 3)), Some(CellKind::Tail));
        assert_eq!(grid.get(Position::new(6, 2)), Some(CellKind::Empty));
        assert_eq!(env.steps(), 1);
    }

    #[test]
    fn test_apple_growth_and_respawn() {
        let mut env = small_env();
        for _ in 0..3 {
            assert_eq!(env.apply(Action::East).status, StepStatus::Continuing);
        }
        let empty_before: Vec<Position> = env
            .grid()
            .iter()
            .filter(|(_, kind)| *kind == CellKind::Empty)
            .map(|(pos, _)| pos)
            .collect();

        let result = env.apply(Action::East);

        assert!(result.info.ate_apple);
        assert_eq!(result.status, StepStatus::Continuing);
        assert_eq!(env.score(), 1);
        assert_eq!(env.snake().len(), 5);
        assert_eq!(env.head(), Position::new(6, 9));
        assert_eq!(env.grid().count(CellKind::Apple), 1);

        let apple = env
            .grid()
            .iter()
            .find(|(_, kind)| *kind == CellKind::Apple)
            .map(|(pos, _)| pos)
            .unwrap();
        assert!(empty_before.contains(&apple));
        assert!(border_is_wall(env.grid()));
    }

    #[test]
    fn test_wall_collision_leaves_board_untouched() {
        let mut env = small_env();
        for _ in 0..5 {
            env.apply(Action::North);
        }
        assert_eq!(env.head(), Position::new(1, 5));
        let before = env.grid().clone();
        let snake_before = env.snake().clone();

        let result = env.apply(Action::North);

        assert_eq!(result.status, StepStatus::Terminated);
        assert_eq!(result.info.collision, Some(CollisionType::Wall));
        assert_eq!(env.grid(), &before);
        assert_eq!(env.snake(), &snake_before);
        assert!(env.is_terminated());
    }

    #[test]
    fn test_reversal_hits_body() {
        let mut env = small_env();
        let result = env.apply(Action::West);

        assert_eq!(result.status, StepStatus::Terminated);
        assert_eq!(result.info.collision, Some(CollisionType::Body));
        assert_eq!(env.snake().len(), 4);
    }

    #[test]
    fn test_moving_into_tail_is_allowed() {
        let mut env = small_env();
        // circle around so that the head meets the cell the tail is leaving
        env.apply(Action::North);
        env.apply(Action::West);
        let result = env.apply(Action::South);
        assert_eq!(result.status, StepStatus::Continuing);
        assert_eq!(env.head(), Position::new(6, 4));
        assert_eq!(env.snake().len(), 4);
        assert_eq!(env.grid().count(CellKind::Head), 1);
        assert_eq!(env.grid().count(CellKind::Tail), 1);
    }

    #[test]
    fn test_terminated_environment_no_update() {
        let mut env = small_env();
        env.apply(Action::West);
        let steps = env.steps();
        let result = env.apply(Action::North);

        assert!(result.is_terminated());
        assert_eq!(env.steps(), steps);
    }

    #[test]
    fn test_reset_clears_score() {
        let mut env = small_env();
        for _ in 0..4 {
            env.apply(Action::East);
        }
        assert_eq!(env.score(), 1);

        env.reset();
        assert_eq!(env.score(), 0);
        assert_eq!(env.steps(), 0);
        assert!(!env.is_terminated());
        assert_eq!(env.snake().len(), 4);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut env = small_env();
        let snapshot = env.snapshot();
        env.apply(Action::North);

        assert_eq!(snapshot.get(Position::new(6, 5)), Some(CellKind::Head));
        assert_eq!(env.grid().get(Position::new(6, 5)), Some(CellKind::Body));
    }

    #[test]
    fn test_same_seed_same_apples() {
        let mut a = Environment::seeded(GameConfig::small(), 42).unwrap();
        let mut b = Environment::seeded(GameConfig::small(), 42).unwrap();
        for _ in 0..4 {
            a.apply(Action::East);
            b.apply(Action::East);
        }
        assert_eq!(a.grid(), b.grid());
    }
}
