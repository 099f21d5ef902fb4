use serde::{Deserialize, Serialize};

/// One of the four moves available to the snake's head
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    North,
    South,
    West,
    East,
}

impl Action {
    /// All actions in tie-break priority order
    pub const ALL: [Action; 4] = [Action::North, Action::South, Action::West, Action::East];

    /// Returns the (row, column) delta for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Action::North => (-1, 0),
            Action::South => (1, 0),
            Action::West => (0, -1),
            Action::East => (0, 1),
        }
    }

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Action) -> bool {
        matches!(
            (self, other),
            (Action::North, Action::South)
                | (Action::South, Action::North)
                | (Action::West, Action::East)
                | (Action::East, Action::West)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::North => "north",
            Action::South => "south",
            Action::West => "west",
            Action::East => "east",
        }
    }
}
