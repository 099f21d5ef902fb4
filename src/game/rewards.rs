use serde::{Deserialize, Serialize};

use super::state::CellKind;

/// Reward for a lethal cell
pub const LETHAL_REWARD: f64 = -1e13;
/// Reward for eating an apple
pub const APPLE_REWARD: f64 = 1e9;
/// Cost of an ordinary step
pub const STEP_REWARD: f64 = -1.0;

/// Scalar reward per cell kind
///
/// Lethal cells are weighted so far below the apple that, after convergence,
/// every cell reachable without a collision ranks above every wall or body cell
/// no matter how much the discount attenuates the apple across the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewardTable {
    pub wall: f64,
    pub body: f64,
    pub tail: f64,
    pub head: f64,
    pub apple: f64,
    pub empty: f64,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            wall: LETHAL_REWARD,
            body: LETHAL_REWARD,
            tail: STEP_REWARD,
            head: LETHAL_REWARD,
            apple: APPLE_REWARD,
            empty: STEP_REWARD,
        }
    }
}

impl RewardTable {
    pub fn reward(&self, kind: CellKind) -> f64 {
        match kind {
            CellKind::Wall => self.wall,
            CellKind::Body => self.body,
            CellKind::Tail => self.tail,
            CellKind::Head => self.head,
            CellKind::Apple => self.apple,
            CellKind::Empty => self.empty,
        }
    }
}
